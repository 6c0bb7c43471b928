pub mod cohort;
pub mod curation;
pub mod entity;
pub mod error;
pub mod fields;
pub mod validation;

pub use cohort::{Cohort, DEFAULT_CONTROL_GROUP_CODE, ParticipantId, parse_group_code};
pub use curation::{
    AssignmentOutcome, CurationReport, EntityCuration, MaterializeStatus, MaterializedFile,
    ReclassificationOutcome, SchemaChanges,
};
pub use entity::EntityDescriptor;
pub use error::{ModelError, RegistryError, Result};
pub use validation::{FileOutcome, FileValidation, Mismatch, MismatchReason, ValidationReport};
