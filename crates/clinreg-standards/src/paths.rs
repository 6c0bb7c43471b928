//! Catalog resource resolution.

use std::path::{Path, PathBuf};

/// Environment variable for overriding the catalog file.
pub const CATALOG_ENV_VAR: &str = "CLINREG_CATALOG";

/// Where the entity catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The catalog compiled into the binary from `catalog/entities.toml`.
    Embedded,
    File(PathBuf),
}

/// Resolve the catalog source.
///
/// Resolution order:
/// 1. An explicit path (the `--catalog` flag)
/// 2. `CLINREG_CATALOG` environment variable
/// 3. The embedded catalog
pub fn resolve_catalog_source(explicit: Option<&Path>) -> CatalogSource {
    if let Some(path) = explicit {
        return CatalogSource::File(path.to_path_buf());
    }
    match std::env::var_os(CATALOG_ENV_VAR) {
        Some(value) if !value.is_empty() => CatalogSource::File(PathBuf::from(value)),
        _ => CatalogSource::Embedded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let source = resolve_catalog_source(Some(Path::new("/tmp/catalog.toml")));
        assert_eq!(
            source,
            CatalogSource::File(PathBuf::from("/tmp/catalog.toml"))
        );
    }
}
