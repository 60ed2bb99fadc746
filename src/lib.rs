//! UniqueWager — unique-answer wagering web service
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod payout;
pub mod backend;
pub mod server;
