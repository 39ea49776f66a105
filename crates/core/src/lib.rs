//! Domain types and pure helpers shared by the db, worker, and api crates.
//!
//! This crate has no I/O: everything here is testable without a database
//! or a network.

pub mod error;
pub mod jobs;
pub mod limits;
pub mod outbox;
pub mod types;
