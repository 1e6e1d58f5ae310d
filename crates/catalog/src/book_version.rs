use serde::{Deserialize, Serialize};

use bookstore_core::{ClientId, Entity, OrgId, RecordId, record_id_newtype};

use crate::book::BookId;
use crate::product::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookVersionId(RecordId);

record_id_newtype!(BookVersionId, "BookVersionId");

/// A specific edition/printing of a book.
///
/// Saving a new version without a `product` triggers product provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookVersion {
    pub id: BookVersionId,
    pub client: ClientId,
    pub organization: OrgId,
    #[serde(default)]
    pub book: Option<BookId>,
    pub name: String,
    pub search_key: String,
    #[serde(default)]
    pub product: Option<ProductId>,
}

impl BookVersion {
    pub const PROPERTY_PRODUCT: &'static str = "product";

    pub fn has_product(&self) -> bool {
        self.product.is_some()
    }
}

impl Entity for BookVersion {
    const ENTITY_NAME: &'static str = "BKS_BookVersion";
    type Id = BookVersionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
