//! HTTP host: wires the bookstore hooks to an in-memory database.

pub mod app;
pub mod config;
