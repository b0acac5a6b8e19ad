//! Integration tests
//!
//! `pages` and `api` run against the real router with a lazily connected
//! pool and only hit routes that never reach the database.
//! `ledger` and `flows` need PostgreSQL: `DATABASE_URL=... cargo test -- --ignored`

mod api;
mod common;
mod flows;
mod ledger;
