// Database libraries.
#[macro_use] extern crate diesel;
extern crate r2d2;
extern crate r2d2_diesel;

// Serialization libraries.
#[macro_use] extern crate serde_derive;
extern crate serde_json;
extern crate serde;
extern crate bincode;
extern crate base64;

// Logging libraries.
#[macro_use] extern crate log;
extern crate badlog;
extern crate logger;

// Web framework.
extern crate iron; // Core.
extern crate persistent; // Shared memory middleware.
extern crate router; // Routing.
extern crate urlencoded; // Form bodies.

// Other libraries.
extern crate chrono; // Time.
extern crate sodiumoxide; // Cryptography.

use chrono::Utc;
use config::{Config, Secret};
use database::Database;
use iron::prelude::*;
use loader::Roster;
use logger::Logger;
use persistent::Read;
use std::{env, process};
use std::net::Ipv4Addr;

mod config;
mod database;
mod flash;
mod loader;
mod membership;
mod people;
mod policy;
mod routes;
mod schema;

//LONG: Reload the roster without restarting the server.

fn main() {
    // Initialize the environment.
    badlog::init_from_env("LOG_LEVEL");
    if sodiumoxide::init().is_err() {
        error!("Could not initialize libsodium.");
        process::exit(1);
    }
    let config = Config::get();

    // Set up the database.
    let db = match Database::new(&config) {
        Ok(db) => db,
        Err(e) => {
            error!("Could not initialize the database: {}.", e);
            process::exit(1);
        }
    };

    let command = env::args().nth(1);
    match command.as_ref().map(|s| s.as_str()) {
        Some("initdb") => initdb(&db, &config),
        Some("serve") | None => serve(db, config),
        Some(other) => {
            error!("Unknown command {}, expected initdb or serve.", other);
            process::exit(2);
        }
    }
}

/// Drops and recreates every table, then loads the roster. Any failure is
/// fatal, and the load itself commits all or nothing.
fn initdb(db: &Database, config: &Config) {
    let conn = match db.get() {
        Ok(conn) => conn,
        Err(e) => {
            error!("Could not connect to the database: {}.", e);
            process::exit(1);
        }
    };

    if let Err(e) = database::reset(&conn) {
        error!("Could not reset the database: {}.", e);
        process::exit(1);
    }

    let before = Utc::now();
    info!("Before: {}", before.timestamp());

    let summary = Roster::open(&config.roster_path)
        .and_then(|roster| loader::load(&conn, &roster));

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            error!("Could not load {}: {}.", config.roster_path, e);
            process::exit(1);
        }
    };

    let after = Utc::now();
    info!("After: {}", after.timestamp());
    info!("Delta: {}", after.timestamp() - before.timestamp());
    info!(
        "Loaded {} people ({} graduates, {} in CS).",
        summary.people,
        summary.graduates,
        summary.cs
    );
    info!("Initialized the database.");
}

fn serve(db: Database, config: Config) {
    let secret = Secret::get();
    let addr = (Ipv4Addr::new(0, 0, 0, 0), config.port);

    let mut chain = Chain::new(routes::build());
    chain.link_before(db);
    chain.link_before(Read::<Secret>::one(secret));
    chain.link(Logger::new(None));

    match Iron::new(chain).http(addr) {
        Ok(x) => info!("Listening on {}!", x.socket),
        Err(e) => error!("Could not initialize server: {}.", e)
    }
}
