pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod materialize;
pub mod registry;
pub mod writer;

pub use csv_table::{CsvTable, read_csv_table, read_declared_table, read_table};
pub use discovery::{ensure_directory, list_csv_files};
pub use error::{IngestError, Result};
pub use frame::{any_to_string, column_names, column_values, string_column};
pub use materialize::{
    CLINICAL_DIR_NAME, MaterializeReport, default_clinical_dir, materialize,
};
pub use registry::{RegistryEntry, SubjectRegistry, load_registry};
pub use writer::{TableEdit, update_declared_table, update_table, write_table};
