//! The four access checks. Each one resolves a name against the roster and
//! consults the membership sets or the person's attributes. None of them
//! write anything; a name that matches nobody is simply denied.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use membership;
use people;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Granted(String),
    Denied(String)
}

impl Decision {
    pub fn granted(&self) -> bool {
        match *self {
            Decision::Granted(_) => true,
            Decision::Denied(_) => false
        }
    }

    pub fn message(&self) -> &str {
        match *self {
            Decision::Granted(ref msg) | Decision::Denied(ref msg) => msg
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Granted iff the person appears in the graduate set.
pub fn indirection(conn: &SqliteConnection, name: &str) -> QueryResult<Decision> {
    let id = people::id_from_name(conn, name)?;

    Ok(if membership::is_graduate(conn, id)? {
        Decision::Granted(format!(
            "{} is a Graduate student: Access Granted", name))
    } else {
        Decision::Denied(format!(
            "{} is not a Graduate student: Access Denied", name))
    })
}

/// The CS department confirms the claimed role.
///
/// No claimed role at all is denied outright. A CS member whose role
/// differs from the claimed one gets no decision.
pub fn delegation(
    conn: &SqliteConnection,
    name: &str,
    role: Option<&str>
) -> QueryResult<Option<Decision>> {
    let role = match role {
        Some(role) => role,
        None => return Ok(Some(unconfirmed(name, "")))
    };

    let person = people::find_by_name(conn, name)?;
    let id = person.as_ref().map(|p| p.id);

    if membership::is_cs(conn, id)? {
        match person {
            Some(ref p) if p.role == role => Ok(Some(Decision::Granted(format!(
                "CS department confirms that {} is a {}: Access Granted",
                name, role)))),
            //LONG: Decide whether a role mismatch should be an explicit denial.
            _ => Ok(None)
        }
    } else {
        Ok(Some(unconfirmed(name, role)))
    }
}

fn unconfirmed(name: &str, role: &str) -> Decision {
    Decision::Denied(format!(
        "CS department does not confirm that {} is a {}: Access Denied",
        name, role))
}

/// Granted for members of either set, CS checked first.
pub fn intersection(conn: &SqliteConnection, name: &str) -> QueryResult<Decision> {
    let id = people::id_from_name(conn, name)?;

    Ok(if membership::is_cs(conn, id)? {
        Decision::Granted(format!(
            "{} is a member of the CS department: Access Granted", name))
    } else if membership::is_graduate(conn, id)? {
        Decision::Granted(format!(
            "{} is a graduate student: Access Granted", name))
    } else {
        Decision::Denied(format!(
            "{} is not in CS nor is a graduate student: Access Denied", name))
    })
}

/// Read-only permission is taken as evidence of being an undergrad.
pub fn inference(conn: &SqliteConnection, name: &str) -> QueryResult<Decision> {
    let person = people::find_by_name(conn, name)?;

    Ok(match person {
        Some(ref p) if p.permission == "read" => Decision::Granted(format!(
            "{} has read only permission and is therefore an undergrad: \
             Access Granted", name)),
        _ => Decision::Denied(
            "Unable to infer role based on permission status: Access Denied"
                .to_owned())
    })
}
