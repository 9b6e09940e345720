use config::Config;
use diesel::connection::SimpleConnection;
use diesel::result::QueryResult;
use diesel::sqlite::SqliteConnection;
use r2d2;
use r2d2_diesel::ConnectionManager;
use iron::prelude::*;
use iron::typemap::Key;
use iron::BeforeMiddleware;
use std::ops::Deref;

pub type Connection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct Database(pub r2d2::Pool<ConnectionManager<SqliteConnection>>);

impl Database {
    pub fn new(config: &Config) -> Result<Database, r2d2::Error> {
        let db_url = config.database_url.as_str();
        let db_manager = ConnectionManager::new(db_url);
        let db = r2d2::Pool::new(db_manager)?;
        Ok(Database(db))
    }
}

impl BeforeMiddleware for Database {
    fn before(&self, req: &mut Request) -> IronResult<()> {
        req.extensions
            .entry::<Database>()
            .or_insert(self.clone());

        Ok(())
    }
}

impl Key for Database {
    type Value = Database;
}

impl Deref for Database {
    type Target = r2d2::Pool<ConnectionManager<SqliteConnection>>;
    fn deref(&self) -> &Self::Target { &self.0 }
}

/// Creates the `pitt`, `graduate` and `cs` tables on an empty database.
pub fn create_tables(conn: &SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(include_str!("schema.sql"))
}

/// Drops every table and recreates them empty.
pub fn reset(conn: &SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(
        "DROP TABLE IF EXISTS cs;
         DROP TABLE IF EXISTS graduate;
         DROP TABLE IF EXISTS pitt;"
    )?;

    create_tables(conn)
}

#[cfg(test)]
pub mod tests {
    use diesel::connection::SimpleConnection;
    use diesel::prelude::*;
    use diesel::sqlite::SqliteConnection;
    use schema::pitt;
    use super::{create_tables, reset};

    pub fn memory() -> SqliteConnection {
        let conn = SqliteConnection::establish(":memory:").unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn reset_empties_the_roster() {
        let conn = memory();
        conn.batch_execute(
            "INSERT INTO pitt (name, role, permission, department)
             VALUES ('Alice', 'graduate', 'write', 'CS');"
        ).unwrap();

        reset(&conn).unwrap();

        let count: i64 = pitt::table.count().get_result(&conn).unwrap();
        assert_eq!(count, 0);
    }
}
