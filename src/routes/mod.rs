use config::Secret;
use database::{self, Database};
use iron::prelude::*;
use iron::status;
use persistent::Read;
use router::Router;
use std::{error, fmt};

mod access;
mod roster;

pub fn build() -> Router {
    let mut router = Router::new();

    router.get("/", roster::index, "root");
    router.get("/index", roster::index, "index");

    router.post("/indirection", access::indirection, "indirection");
    router.post("/delegation", access::delegation, "delegation");
    router.post("/intersection", access::intersection, "intersection");
    router.post("/inference", access::inference, "inference");

    router
}

#[derive(Debug)]
pub struct ServerError(&'static str);

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl error::Error for ServerError {}

/// Logs the cause and answers with a bare 500.
fn fail<E: fmt::Display>(what: &'static str, e: E) -> IronError {
    error!("{}: {}.", what, e);
    IronError::new(ServerError(what), status::InternalServerError)
}

fn secret(req: &Request) -> IronResult<[u8; 32]> {
    req.extensions.get::<Read<Secret>>()
        .map(|secret| secret.0)
        .ok_or_else(|| fail("Secret unavailable", "not linked"))
}

fn connection(req: &Request) -> IronResult<database::Connection> {
    let db = req.extensions.get::<Database>()
        .ok_or_else(|| fail("Database unavailable", "not linked"))?;

    db.get().map_err(|e| fail("Could not get a database connection", e))
}
