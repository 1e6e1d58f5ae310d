//! `bookstore-core`: shared building blocks for the bookstore extensions.
//!
//! This crate contains **pure domain** primitives (no persistence concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{ClientId, OrgId, RecordId};
