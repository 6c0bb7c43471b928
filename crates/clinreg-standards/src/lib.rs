#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod paths;

pub use crate::catalog::{Catalog, load_catalog, load_catalog_from, load_default_catalog};
pub use crate::error::CatalogError;
pub use crate::paths::{CATALOG_ENV_VAR, CatalogSource, resolve_catalog_source};
