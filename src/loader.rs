use diesel;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use membership;
use people::{self, NewPerson};
use serde_json;
use std::{error, fmt, io};
use std::fs::File;
use std::path::Path;

/// The roster document: `{"Pitt": [{name, role, permission, department}, ..]}`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Roster {
    #[serde(rename = "Pitt")]
    pub pitt: Vec<Descriptor>
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Descriptor {
    pub name: String,
    pub role: String,
    pub permission: String,
    pub department: String
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub people: usize,
    pub graduates: usize,
    pub cs: usize
}

#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Json(serde_json::Error),
    Database(diesel::result::Error)
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LoadError::Io(ref e) => write!(f, "could not read roster: {}", e),
            LoadError::Json(ref e) => write!(f, "malformed roster: {}", e),
            LoadError::Database(ref e) => write!(f, "database error: {}", e)
        }
    }
}

impl error::Error for LoadError {}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> LoadError { LoadError::Io(e) }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> LoadError { LoadError::Json(e) }
}

impl From<diesel::result::Error> for LoadError {
    fn from(e: diesel::result::Error) -> LoadError { LoadError::Database(e) }
}

impl Roster {
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Roster, LoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Roster, LoadError> {
        Roster::from_reader(io::BufReader::new(File::open(path)?))
    }
}

/// Inserts everyone in document order, then derives both membership sets
/// from the stored rows. Expects freshly reset tables. Runs in a single
/// transaction, so a duplicate name leaves every table untouched.
pub fn load(conn: &SqliteConnection, roster: &Roster) -> Result<Summary, LoadError> {
    conn.transaction::<_, LoadError, _>(|| {
        for person in &roster.pitt {
            debug!("Adding {}.", person.name);
            people::insert(conn, &NewPerson {
                name: &person.name,
                role: &person.role,
                permission: &person.permission,
                department: &person.department
            })?;
        }

        let graduates = membership::derive_graduates(conn)?;
        let cs = membership::derive_cs(conn)?;

        Ok(Summary {
            people: roster.pitt.len(),
            graduates: graduates,
            cs: cs
        })
    })
}
