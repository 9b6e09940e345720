use diesel::{self, select};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use schema::{cs, graduate, pitt};

#[derive(Insertable)]
#[table_name="graduate"]
pub struct NewGraduate {
    pub pitt_id: i32
}

#[derive(Insertable)]
#[table_name="cs"]
pub struct NewCs {
    pub pitt_id: i32
}

// A missing person is never a member of anything.

pub fn is_graduate(
    conn: &SqliteConnection,
    id: Option<i32>
) -> QueryResult<bool> {
    let id = match id {
        Some(id) => id,
        None => return Ok(false)
    };

    select(exists(graduate::table.filter(graduate::pitt_id.eq(id))))
        .get_result::<bool>(conn)
}

pub fn is_cs(conn: &SqliteConnection, id: Option<i32>) -> QueryResult<bool> {
    let id = match id {
        Some(id) => id,
        None => return Ok(false)
    };

    select(exists(cs::table.filter(cs::pitt_id.eq(id))))
        .get_result::<bool>(conn)
}

/// Snapshots every person whose role is exactly "graduate".
pub fn derive_graduates(conn: &SqliteConnection) -> QueryResult<usize> {
    let ids = pitt::table
        .filter(pitt::role.eq("graduate"))
        .select(pitt::pitt_id)
        .order(pitt::pitt_id.asc())
        .load::<i32>(conn)?;

    for &id in &ids {
        diesel::insert_into(graduate::table)
            .values(&NewGraduate { pitt_id: id })
            .execute(conn)?;
    }

    Ok(ids.len())
}

/// Snapshots every person whose department is exactly "CS".
pub fn derive_cs(conn: &SqliteConnection) -> QueryResult<usize> {
    let ids = pitt::table
        .filter(pitt::department.eq("CS"))
        .select(pitt::pitt_id)
        .order(pitt::pitt_id.asc())
        .load::<i32>(conn)?;

    for &id in &ids {
        diesel::insert_into(cs::table)
            .values(&NewCs { pitt_id: id })
            .execute(conn)?;
    }

    Ok(ids.len())
}
