pub mod api;
pub mod csv_export;
pub mod csv_import;
pub mod documents;
pub mod file;

pub use api::{JsonFileApi, StudioApi};
pub use documents::{DocumentStore, FsDocumentStore};
