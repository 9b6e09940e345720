use base64;
use bincode;
use iron::headers::{Cookie, SetCookie};
use iron::prelude::*;
use sodiumoxide::crypto::secretbox;

const NAME: &'static str = "flash";

/// Messages queued for the next page the client renders.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Flash {
    pub messages: Vec<String>
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct SealedFlash {
    nonce: [u8; secretbox::NONCEBYTES],
    cipher: Vec<u8>
}

impl Flash {
    /// Whatever the client sent back. Missing, stale or tampered cookies
    /// all read as an empty queue.
    pub fn from_request(req: &Request, key: [u8; 32]) -> Flash {
        req.headers.get::<Cookie>()
            .and_then(|&Cookie(ref cookies)| find(cookies, NAME))
            .and_then(|value| Flash::unseal(value, key))
            .unwrap_or_default()
    }

    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn seal(&self, key: [u8; 32]) -> Result<String, bincode::Error> {
        let plain = bincode::serialize(self)?;

        let nonce = secretbox::gen_nonce();
        let cipher = secretbox::seal(&plain, &nonce, &secretbox::Key(key));

        let sealed = bincode::serialize(&SealedFlash {
            nonce: nonce.0,
            cipher: cipher
        })?;

        Ok(base64::encode_config(&sealed, base64::URL_SAFE_NO_PAD))
    }

    pub fn unseal(value: &str, key: [u8; 32]) -> Option<Flash> {
        let bytes = base64::decode_config(value, base64::URL_SAFE_NO_PAD).ok()?;
        let sealed: SealedFlash = bincode::deserialize(&bytes).ok()?;

        let plain = secretbox::open(
            &sealed.cipher,
            &secretbox::Nonce(sealed.nonce),
            &secretbox::Key(key)
        ).ok()?;

        bincode::deserialize(&plain).ok()
    }

    /// Stores the queue on the client, or clears the cookie if it's empty.
    pub fn store(&self, res: &mut Response, key: [u8; 32]) {
        let cookie = if self.is_empty() {
            format!("{}=; Path=/; Max-Age=0", NAME)
        } else {
            match self.seal(key) {
                Ok(value) => format!("{}={}; Path=/; HttpOnly", NAME, value),
                Err(e) => {
                    error!("Could not seal flash messages: {}.", e);
                    return;
                }
            }
        };

        res.headers.set(SetCookie(vec![cookie]));
    }
}

/// Finds a cookie's value in a `Cookie` header, which may hold several
/// `name=value` pairs per line.
fn find<'a>(cookies: &'a [String], name: &str) -> Option<&'a str> {
    cookies.iter()
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(k), Some(v)) if k == name => Some(v),
                _ => None
            }
        })
        .next()
}

#[cfg(test)]
mod tests {
    use sodiumoxide;
    use super::*;

    fn flash() -> Flash {
        let mut flash = Flash::default();
        flash.push("Alice is a Graduate student: Access Granted");
        flash.push("Unable to infer role based on permission status: Access Denied");
        flash
    }

    #[test]
    fn sealed_messages_survive_the_trip() {
        let _ = sodiumoxide::init();
        let key = [7; 32];

        let value = flash().seal(key).unwrap();
        assert_eq!(Flash::unseal(&value, key), Some(flash()));
    }

    #[test]
    fn wrong_key_or_garbage_reads_as_nothing() {
        let _ = sodiumoxide::init();
        let value = flash().seal([7; 32]).unwrap();

        assert_eq!(Flash::unseal(&value, [8; 32]), None);
        assert_eq!(Flash::unseal("not a cookie", [7; 32]), None);
        assert_eq!(Flash::unseal("", [7; 32]), None);
    }

    #[test]
    fn finds_cookie_among_others() {
        let cookies = vec![
            "theme=dark; flash=abc-123".to_owned(),
            "flash=ignored".to_owned()
        ];

        assert_eq!(find(&cookies, "flash"), Some("abc-123"));
        assert_eq!(find(&cookies, "theme"), Some("dark"));
        assert_eq!(find(&cookies, "session"), None);
    }
}
