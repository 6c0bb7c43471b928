#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid catalog: {message}")]
    InvalidCatalog { message: String },

    #[error(
        "legacy and canonical name lists differ in length ({legacy} legacy, {canonical} canonical)"
    )]
    LengthMismatch { legacy: usize, canonical: usize },

    #[error("schema list length {schemas} does not match {entities} entities")]
    SchemaCountMismatch { entities: usize, schemas: usize },

    #[error("duplicate {kind} name in catalog: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("entity {entity} declares column {column} more than once")]
    DuplicateColumn { entity: String, column: String },

    #[error("entity {entity} has an empty column schema")]
    EmptySchema { entity: String },

    #[error("registry entity {entity} is not in the catalog")]
    MissingRegistry { entity: String },

    #[error("registry entity {entity} lacks required column {column}")]
    RegistryColumn { entity: String, column: String },

    #[error("unknown entity: {name}")]
    UnknownEntity { name: String },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
