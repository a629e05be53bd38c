//! Wire model of the license server.

pub mod models;
pub mod timestamp;
