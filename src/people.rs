use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use schema::pitt;
use std::fmt;

/// A roster entry. Identifiers are assigned by the database on insert and
/// never change afterwards.
#[derive(Queryable, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub role: String,
    pub permission: String,
    pub department: String
}

#[derive(Insertable)]
#[table_name="pitt"]
pub struct NewPerson<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub permission: &'a str,
    pub department: &'a str
}

/// Exact-match lookup. Names are unique, so there is at most one.
pub fn find_by_name(
    conn: &SqliteConnection,
    person_name: &str
) -> QueryResult<Option<Person>> {
    pitt::table
        .filter(pitt::name.eq(person_name))
        .first::<Person>(conn)
        .optional()
}

pub fn id_from_name(
    conn: &SqliteConnection,
    person_name: &str
) -> QueryResult<Option<i32>> {
    pitt::table
        .filter(pitt::name.eq(person_name))
        .select(pitt::pitt_id)
        .first::<i32>(conn)
        .optional()
}

/// The whole roster, in insertion order.
pub fn all(conn: &SqliteConnection) -> QueryResult<Vec<Person>> {
    pitt::table
        .order(pitt::pitt_id.asc())
        .load::<Person>(conn)
}

pub fn insert(conn: &SqliteConnection, person: &NewPerson) -> QueryResult<()> {
    ::diesel::insert_into(pitt::table)
        .values(person)
        .execute(conn)
        .map(|_| ())
}

/// Formats a person for the roster view.
pub struct RosterLine<'a>(pub &'a Person);

impl<'a> fmt::Display for RosterLine<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let p = self.0;
        write!(f, "{} {} {} {}", p.name, p.role, p.permission, p.department)
    }
}
