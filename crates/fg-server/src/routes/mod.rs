//! Route handlers for the HTTP API.

pub mod health;
pub mod open_output;
pub mod process;
pub mod tools;
