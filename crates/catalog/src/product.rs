use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookstore_core::{ClientId, Entity, OrgId, RecordId, record_id_newtype};

use crate::book_version::BookVersion;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(RecordId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCategoryId(RecordId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UomId(RecordId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxCategoryId(RecordId);

record_id_newtype!(ProductId, "ProductId");
record_id_newtype!(ProductCategoryId, "ProductCategoryId");
record_id_newtype!(UomId, "UomId");
record_id_newtype!(TaxCategoryId, "TaxCategoryId");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: ProductCategoryId,
    pub client: ClientId,
    pub organization: OrgId,
    pub search_key: String,
    pub name: String,
}

impl ProductCategory {
    pub const PROPERTY_SEARCH_KEY: &'static str = "searchKey";
}

impl Entity for ProductCategory {
    const ENTITY_NAME: &'static str = "ProductCategory";
    type Id = ProductCategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Unit of measure (system-wide master data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Uom {
    pub id: UomId,
    pub name: String,
    pub symbol: String,
}

impl Uom {
    pub const PROPERTY_NAME: &'static str = "name";
}

impl Entity for Uom {
    const ENTITY_NAME: &'static str = "UOM";
    type Id = UomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCategory {
    pub id: TaxCategoryId,
    pub client: ClientId,
    pub organization: OrgId,
    pub name: String,
}

impl TaxCategory {
    pub const PROPERTY_NAME: &'static str = "name";
}

impl Entity for TaxCategory {
    const ENTITY_NAME: &'static str = "FinancialMgmtTaxCategory";
    type Id = TaxCategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub client: ClientId,
    pub organization: OrgId,
    pub active: bool,
    pub name: String,
    pub search_key: String,
    pub stocked: bool,
    pub production: bool,
    pub product_category: ProductCategoryId,
    pub uom: UomId,
    pub tax_category: TaxCategoryId,
    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    const ENTITY_NAME: &'static str = "Product";
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Master data a provisioned product points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReferences {
    pub category: ProductCategoryId,
    pub uom: UomId,
    pub tax_category: TaxCategoryId,
}

impl Product {
    /// Build the sellable product for a book version.
    ///
    /// Books are sold but neither stock-tracked nor manufactured, so the
    /// product is active with `stocked` and `production` off.
    pub fn for_book_version(version: &BookVersion, refs: ProductReferences) -> Self {
        Self {
            id: ProductId::generate(),
            client: version.client.clone(),
            organization: version.organization.clone(),
            active: true,
            name: version.name.clone(),
            search_key: version.search_key.clone(),
            stocked: false,
            production: false,
            product_category: refs.category,
            uom: refs.uom,
            tax_category: refs.tax_category,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(name: &str, search_key: &str) -> BookVersion {
        BookVersion {
            id: "BV1".parse().unwrap(),
            client: "C1".parse().unwrap(),
            organization: "O1".parse().unwrap(),
            book: None,
            name: name.to_string(),
            search_key: search_key.to_string(),
            product: None,
        }
    }

    fn refs() -> ProductReferences {
        ProductReferences {
            category: "CAT".parse().unwrap(),
            uom: "100".parse().unwrap(),
            tax_category: "TAX".parse().unwrap(),
        }
    }

    #[test]
    fn product_copies_identity_fields_from_version() {
        let bv = version("Dune (1st ed.)", "DUNE-1");
        let p = Product::for_book_version(&bv, refs());

        assert_eq!(p.client, bv.client);
        assert_eq!(p.organization, bv.organization);
        assert_eq!(p.name, "Dune (1st ed.)");
        assert_eq!(p.search_key, "DUNE-1");
    }

    #[test]
    fn product_is_active_but_not_stocked_or_produced() {
        let p = Product::for_book_version(&version("Dune", "DUNE"), refs());
        assert!(p.active);
        assert!(!p.stocked);
        assert!(!p.production);
    }

    #[test]
    fn product_points_at_given_references() {
        let p = Product::for_book_version(&version("Dune", "DUNE"), refs());
        assert_eq!(p.product_category.as_str(), "CAT");
        assert_eq!(p.uom.as_str(), "100");
        assert_eq!(p.tax_category.as_str(), "TAX");
    }

    #[test]
    fn blank_name_and_search_key_are_copied_unchecked() {
        let p = Product::for_book_version(&version("  ", ""), refs());
        assert_eq!(p.name, "  ");
        assert_eq!(p.search_key, "");
        assert!(p.active);
    }

    #[test]
    fn property_constants_match_serialized_fields() {
        let cat = ProductCategory {
            id: "CAT".parse().unwrap(),
            client: "C1".parse().unwrap(),
            organization: "0".parse().unwrap(),
            search_key: "Book".to_string(),
            name: "Books".to_string(),
        };
        let json = serde_json::to_value(&cat).unwrap();
        assert_eq!(json[ProductCategory::PROPERTY_SEARCH_KEY], "Book");
    }
}
