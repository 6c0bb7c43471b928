#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

use clinreg_model::{DEFAULT_CONTROL_GROUP_CODE, EntityDescriptor};

pub const CATALOG_SCHEMA: &str = "clinreg.entity-catalog";
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

/// On-disk shape of `catalog/entities.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub catalog: CatalogHeader,
    pub registry: RegistrySection,
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    pub entity: String,
    #[serde(default = "default_control_group_code")]
    pub control_group_code: i64,
}

fn default_control_group_code() -> i64 {
    DEFAULT_CONTROL_GROUP_CODE
}
