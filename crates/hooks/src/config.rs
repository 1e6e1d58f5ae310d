//! Reference-data keys used by product provisioning.

use bookstore_catalog::UomId;
use bookstore_core::RecordId;

pub const ENV_PRODUCT_CATEGORY: &str = "BOOKSTORE_PRODUCT_CATEGORY";
pub const ENV_UOM_NAME: &str = "BOOKSTORE_UOM_NAME";
pub const ENV_UOM_FALLBACK_ID: &str = "BOOKSTORE_UOM_FALLBACK_ID";
pub const ENV_TAX_CATEGORY: &str = "BOOKSTORE_TAX_CATEGORY";

/// Which master-data records a provisioned product points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningConfig {
    /// Search key of the product category.
    pub product_category: String,
    /// Name of the unit of measure.
    pub uom_name: String,
    /// Unit of measure used when the name lookup misses. `None` makes a miss fatal.
    pub uom_fallback_id: Option<UomId>,
    /// Name of the tax category.
    pub tax_category: String,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            product_category: "Book".to_string(),
            uom_name: "Unit".to_string(),
            uom_fallback_id: "100".parse().ok(),
            tax_category: "Exempt".to_string(),
        }
    }
}

impl ProvisioningConfig {
    /// Defaults overridden by `BOOKSTORE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    ///
    /// An empty fallback id disables the fallback.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup(ENV_PRODUCT_CATEGORY).filter(|v| !v.trim().is_empty()) {
            config.product_category = v;
        }
        if let Some(v) = lookup(ENV_UOM_NAME).filter(|v| !v.trim().is_empty()) {
            config.uom_name = v;
        }
        if let Some(v) = lookup(ENV_UOM_FALLBACK_ID) {
            config.uom_fallback_id = RecordId::parse(v.trim()).ok().map(UomId::from);
        }
        if let Some(v) = lookup(ENV_TAX_CATEGORY).filter(|v| !v.trim().is_empty()) {
            config.tax_category = v;
        }

        config
    }
}
