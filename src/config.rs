use iron::typemap::Key;
use sodiumoxide::randombytes;
use std::{env, process};
use std::borrow::Cow;
use std::fmt::Write;

const KEY_BYTES: usize = 32;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub roster_path: String
}

/// The key flash cookies are sealed with. Only the server needs it.
#[derive(Clone, Copy)]
pub struct Secret(pub [u8; KEY_BYTES]);

impl Config {
    pub fn get() -> Config {
        let port = env::var("PORT")
            .map_err(|_| "unspecified")
            .and_then(|port| {
                port.parse()
                    .map_err(|_| "invalid")
            }).unwrap_or_else(|e| {
                warn!("PORT {}, defaulting to port 5000.", e);
                5000
            });

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| {
                warn!("DATABASE_URL unspecified, defaulting to access.db.");
                "access.db".to_owned()
            });

        let roster_path = env::var("ROSTER_PATH")
            .unwrap_or_else(|_| {
                info!("ROSTER_PATH unspecified, using access_policy.json.");
                "access_policy.json".to_owned()
            });

        Config {
            port: port,
            database_url: database_url,
            roster_path: roster_path
        }
    }
}

impl Secret {
    pub fn get() -> Secret {
        let key = env::var("SECRET")
            .map_err(|_| "unspecified".into())
            .and_then(|s| parse_secret(&s))
            .unwrap_or_else(|e| {
                error!("SECRET {}.", e);

                let mut key = [0; KEY_BYTES];
                randombytes::randombytes_into(&mut key);

                let mut hex = String::new();
                for n in key.iter() {
                    // String writes should succeed.
                    write!(&mut hex, "{:02X}", n).unwrap()
                }

                info!("Here's a good secret if you need one: {}", hex);
                process::exit(1);
            });

        Secret(key)
    }
}

/// Decodes a key written as hexadecimal digits.
pub fn parse_secret(s: &str) -> Result<[u8; KEY_BYTES], Cow<'static, str>> {
    const EXPECTED_LENGTH: usize = KEY_BYTES * 2;

    if s.len() != EXPECTED_LENGTH {
        let msg = format!("not {} characters long", EXPECTED_LENGTH);
        return Err(Cow::Owned(msg));
    }

    let mut res = [0; KEY_BYTES];
    for (i, n) in res.iter_mut().enumerate() {
        let start = i * 2;
        let end = start + 2;
        let res = s.get(start..end).map(|s| u8::from_str_radix(s, 16));

        if let Some(Ok(res)) = res {
            *n = res;
        } else {
            return Err("contains non-hexadecimal digits".into());
        }
    }

    Ok(res)
}

impl Key for Secret {
    type Value = Secret;
}
