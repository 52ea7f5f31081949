//! The four stages of the merge workflow. Each stage takes the previous
//! stage's output by reference and returns a new value.

pub mod arrange;
pub mod edit;
pub mod export;
pub mod ingest;
pub mod merge;

pub use arrange::{arrange, default_column_selection};
pub use edit::{CellEdit, apply_edit};
pub use export::{DEFAULT_EXPORT_FILE_NAME, EXPORT_SHEET_NAME, ExportedFile, XLSX_MIME_TYPE, export};
pub use ingest::{IngestedFile, Ingestion, SheetListing, SheetSelection, default_sheet_selection, ingest};
pub use merge::{MergeOutcome, concat, merge};
