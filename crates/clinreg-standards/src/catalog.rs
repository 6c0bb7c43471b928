//! The entity catalog: every known table kind, in declared order.
//!
//! Descriptors are paired records, so a legacy name can never drift out of
//! alignment with its canonical name. The catalog is validated once at
//! construction; every later lookup is infallible except for a name miss.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use clinreg_model::EntityDescriptor;
use clinreg_model::fields::{SUBJECT_GROUP_ID, SUBJECT_UID};

use crate::error::CatalogError;
use crate::hash::sha256_hex;
use crate::manifest::{CATALOG_SCHEMA, CATALOG_SCHEMA_VERSION, CatalogManifest};
use crate::paths::CatalogSource;

/// The catalog shipped with the workspace.
pub const DEFAULT_CATALOG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../catalog/entities.toml"
));

#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Vec<EntityDescriptor>,
    registry_index: usize,
    control_group_code: i64,
    fingerprint: String,
}

impl Catalog {
    /// Build a catalog from paired descriptors.
    ///
    /// `registry` names the subject registry entity and is resolved by name.
    pub fn new(
        entities: Vec<EntityDescriptor>,
        registry: &str,
        control_group_code: i64,
    ) -> Result<Self, CatalogError> {
        validate_entities(&entities)?;
        let registry_index = entities
            .iter()
            .position(|entity| entity.matches_name(registry))
            .ok_or_else(|| CatalogError::MissingRegistry {
                entity: registry.to_string(),
            })?;
        let registry_entity = &entities[registry_index];
        for column in [SUBJECT_UID, SUBJECT_GROUP_ID] {
            if !registry_entity.has_column(column) {
                return Err(CatalogError::RegistryColumn {
                    entity: registry_entity.canonical_name.clone(),
                    column: column.to_string(),
                });
            }
        }
        let fingerprint = fingerprint(&entities, registry_index, control_group_code);
        Ok(Self {
            entities,
            registry_index,
            control_group_code,
            fingerprint,
        })
    }

    /// Build a catalog from index-aligned legacy names, canonical names and
    /// schemas. The lists must have equal length.
    pub fn from_parallel_lists(
        legacy_names: Vec<String>,
        canonical_names: Vec<String>,
        schemas: Vec<Vec<String>>,
        registry: &str,
        control_group_code: i64,
    ) -> Result<Self, CatalogError> {
        if legacy_names.len() != canonical_names.len() {
            return Err(CatalogError::LengthMismatch {
                legacy: legacy_names.len(),
                canonical: canonical_names.len(),
            });
        }
        if schemas.len() != legacy_names.len() {
            return Err(CatalogError::SchemaCountMismatch {
                entities: legacy_names.len(),
                schemas: schemas.len(),
            });
        }
        let entities = legacy_names
            .into_iter()
            .zip(canonical_names)
            .zip(schemas)
            .map(|((legacy, canonical), columns)| {
                EntityDescriptor::new(legacy, canonical, columns)
            })
            .collect();
        Self::new(entities, registry, control_group_code)
    }

    /// Parse and validate a TOML catalog. `origin` names the text in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let manifest: CatalogManifest = toml::from_str(text).map_err(|e| CatalogError::Toml {
            origin: origin.to_string(),
            source: e,
        })?;
        if manifest.catalog.schema != CATALOG_SCHEMA {
            return Err(CatalogError::InvalidCatalog {
                message: format!("unsupported schema: {}", manifest.catalog.schema),
            });
        }
        if manifest.catalog.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(CatalogError::InvalidCatalog {
                message: format!(
                    "unsupported schema_version: {}",
                    manifest.catalog.schema_version
                ),
            });
        }
        Self::new(
            manifest.entities,
            &manifest.registry.entity,
            manifest.registry.control_group_code,
        )
    }

    /// Look up a descriptor by legacy name, canonical name or canonical stem.
    pub fn descriptor_for(&self, name: &str) -> Result<&EntityDescriptor, CatalogError> {
        self.entities
            .iter()
            .find(|entity| entity.matches_name(name))
            .ok_or_else(|| CatalogError::UnknownEntity {
                name: name.to_string(),
            })
    }

    /// Every descriptor in declared order.
    pub fn all_descriptors(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The subject registry descriptor.
    pub fn registry(&self) -> &EntityDescriptor {
        &self.entities[self.registry_index]
    }

    pub fn is_registry(&self, entity: &EntityDescriptor) -> bool {
        entity.canonical_name == self.registry().canonical_name
    }

    pub fn control_group_code(&self) -> i64 {
        self.control_group_code
    }

    /// SHA-256 over the catalog's canonical content.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

pub fn load_default_catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_toml_str(DEFAULT_CATALOG, "embedded catalog")
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    Catalog::from_toml_str(&contents, &path.display().to_string())
}

pub fn load_catalog_from(source: &CatalogSource) -> Result<Catalog, CatalogError> {
    match source {
        CatalogSource::Embedded => load_default_catalog(),
        CatalogSource::File(path) => load_catalog(path),
    }
}

fn validate_entities(entities: &[EntityDescriptor]) -> Result<(), CatalogError> {
    if entities.is_empty() {
        return Err(CatalogError::InvalidCatalog {
            message: "catalog declares no entities".to_string(),
        });
    }
    let mut legacy_names = BTreeSet::new();
    let mut canonical_names = BTreeSet::new();
    for entity in entities {
        if entity.legacy_name.trim().is_empty() || entity.canonical_name.trim().is_empty() {
            return Err(CatalogError::InvalidCatalog {
                message: "entity names must not be empty".to_string(),
            });
        }
        if !legacy_names.insert(entity.legacy_name.to_ascii_lowercase()) {
            return Err(CatalogError::DuplicateName {
                kind: "legacy",
                name: entity.legacy_name.clone(),
            });
        }
        if !canonical_names.insert(entity.canonical_name.to_ascii_lowercase()) {
            return Err(CatalogError::DuplicateName {
                kind: "canonical",
                name: entity.canonical_name.clone(),
            });
        }
        if entity.columns.is_empty() {
            return Err(CatalogError::EmptySchema {
                entity: entity.canonical_name.clone(),
            });
        }
        let mut columns = BTreeSet::new();
        for column in &entity.columns {
            if !columns.insert(column.as_str()) {
                return Err(CatalogError::DuplicateColumn {
                    entity: entity.canonical_name.clone(),
                    column: column.clone(),
                });
            }
        }
    }
    Ok(())
}

fn fingerprint(entities: &[EntityDescriptor], registry_index: usize, control_code: i64) -> String {
    let mut canonical = String::new();
    let _ = writeln!(canonical, "registry={registry_index};control={control_code}");
    for entity in entities {
        let _ = writeln!(
            canonical,
            "{}\t{}\t{}",
            entity.legacy_name,
            entity.canonical_name,
            entity.columns.join(",")
        );
    }
    sha256_hex(canonical.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn registry_is_found_by_name_not_position() {
        let catalog = Catalog::new(
            vec![
                EntityDescriptor::new(
                    "raw_subjects.csv",
                    "subjects.csv",
                    columns(&["Participant_ID", "SubjectUID", "subject_group_id"]),
                ),
                EntityDescriptor::new(
                    "raw_vitals.csv",
                    "Vital_Signs.csv",
                    columns(&["Participant_ID", "SubjectUID", "height"]),
                ),
            ],
            "subjects",
            5,
        )
        .expect("catalog");
        assert_eq!(catalog.registry().canonical_name, "subjects.csv");
        assert!(catalog.is_registry(&catalog.all_descriptors()[0]));
        assert!(!catalog.is_registry(&catalog.all_descriptors()[1]));
    }

    #[test]
    fn fingerprint_tracks_schema_changes() {
        let build = |extra: &str| {
            Catalog::new(
                vec![EntityDescriptor::new(
                    "raw.csv",
                    "subjects.csv",
                    columns(&["SubjectUID", "subject_group_id", extra]),
                )],
                "subjects",
                5,
            )
            .expect("catalog")
        };
        assert_eq!(build("a").fingerprint(), build("a").fingerprint());
        assert_ne!(build("a").fingerprint(), build("b").fingerprint());
    }
}
