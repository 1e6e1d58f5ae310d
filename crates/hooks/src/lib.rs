//! Bookstore extension hooks.
//!
//! - [`ProductProvisioner`]: gives every new book version a sellable product.
//! - [`GenreBatchEditor`]: adds, removes or replaces genre links across a
//!   selection of books in one transaction.

pub mod config;
pub mod genre_batch;
pub mod process;
pub mod provisioning;
pub mod reference;

#[cfg(test)]
mod testing;

pub use config::ProvisioningConfig;
pub use genre_batch::{
    BatchError, BatchSummary, BatchValidationError, GenreBatch, GenreBatchEditor, GenreEdit,
    GenreOperation,
};
pub use process::{ProcessActionHandler, ProcessMessage, ProcessRequest, ProcessResponse};
pub use provisioning::{ProductProvisioner, ProvisioningError};
pub use reference::ReferenceData;
