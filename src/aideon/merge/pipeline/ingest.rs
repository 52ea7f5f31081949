use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::io::excel_read;
use crate::aideon::merge::model::{Notice, UploadedFile};

/// Extension accepted by the uploader.
pub const ACCEPTED_EXTENSION: &str = "xlsx";

/// An upload whose workbook opened successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedFile {
    pub file: UploadedFile,
    pub sheet_names: Vec<String>,
}

impl IngestedFile {
    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn listing(&self) -> SheetListing {
        SheetListing {
            file: self.file.name.clone(),
            sheets: self.sheet_names.clone(),
            default_selection: default_sheet_selection(&self.sheet_names),
        }
    }
}

/// Sheets offered for one file, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetListing {
    pub file: String,
    pub sheets: Vec<String>,
    pub default_selection: Vec<String>,
}

/// Result of processing an upload batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingestion {
    pub files: Vec<IngestedFile>,
    pub notices: Vec<Notice>,
}

/// Opens every upload and enumerates its sheets.
///
/// A file that cannot be opened is reported in `notices` and left out; the
/// remaining files are still processed.
#[instrument(level = "info", skip_all, fields(upload_count = uploads.len()))]
pub fn ingest(uploads: Vec<UploadedFile>) -> Ingestion {
    let mut ingestion = Ingestion::default();
    let mut seen: HashSet<String> = HashSet::new();

    for upload in uploads {
        match inspect(&upload, &seen) {
            Ok(sheet_names) => {
                debug!(file = %upload.name, sheet_count = sheet_names.len(), "workbook opened");
                seen.insert(upload.name.clone());
                ingestion.files.push(IngestedFile {
                    file: upload,
                    sheet_names,
                });
            }
            Err(error) => {
                warn!(file = %upload.name, %error, "upload rejected");
                ingestion
                    .notices
                    .push(Notice::error(format!("Error reading {}: {error}", upload.name)));
            }
        }
    }

    info!(file_count = ingestion.files.len(), "uploads ingested");
    ingestion
}

fn inspect(upload: &UploadedFile, seen: &HashSet<String>) -> Result<Vec<String>> {
    if !has_accepted_extension(&upload.name) {
        return Err(MergeError::UnsupportedFormat(upload.name.clone()));
    }
    if seen.contains(&upload.name) {
        return Err(MergeError::DuplicateUpload(upload.name.clone()));
    }
    excel_read::list_sheets(upload)
}

fn has_accepted_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION))
}

/// Sheets pre-selected for a freshly uploaded file: the first one, if any.
pub fn default_sheet_selection(sheet_names: &[String]) -> Vec<String> {
    sheet_names.first().cloned().into_iter().collect()
}

/// Chosen sheets per file, kept in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSelection {
    entries: Vec<(String, Vec<String>)>,
}

impl SheetSelection {
    /// Applies [`default_sheet_selection`] to every file.
    pub fn defaults(files: &[IngestedFile]) -> Self {
        let entries = files
            .iter()
            .map(|file| {
                (
                    file.name().to_string(),
                    default_sheet_selection(&file.sheet_names),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, file: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == file)
            .map(|(_, sheets)| sheets.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, sheets)| (name.as_str(), sheets.as_slice()))
    }

    /// Returns a copy with `file`'s selection replaced by `sheets`.
    ///
    /// Sheets keep the order given; repeated names are dropped after their
    /// first occurrence.
    pub fn with_sheets(
        &self,
        files: &[IngestedFile],
        file: &str,
        sheets: &[String],
    ) -> Result<Self> {
        let ingested = files
            .iter()
            .find(|candidate| candidate.name() == file)
            .ok_or_else(|| MergeError::UnknownFile(file.to_string()))?;

        let mut chosen: Vec<String> = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            if !ingested.sheet_names.contains(sheet) {
                return Err(MergeError::MissingSheet {
                    file: file.to_string(),
                    sheet: sheet.clone(),
                });
            }
            if !chosen.contains(sheet) {
                chosen.push(sheet.clone());
            }
        }

        let mut next = self.clone();
        match next.entries.iter_mut().find(|(name, _)| name == file) {
            Some((_, existing)) => *existing = chosen,
            None => next.entries.push((file.to_string(), chosen)),
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingested(name: &str, sheets: &[&str]) -> IngestedFile {
        IngestedFile {
            file: UploadedFile::new(name, Vec::new()),
            sheet_names: sheets.iter().map(|sheet| sheet.to_string()).collect(),
        }
    }

    #[test]
    fn default_selection_is_first_sheet_or_nothing() {
        let sheets = vec!["S1".to_string(), "S2".to_string()];
        assert_eq!(default_sheet_selection(&sheets), vec!["S1".to_string()]);
        assert!(default_sheet_selection(&[]).is_empty());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_accepted_extension("report.xlsx"));
        assert!(has_accepted_extension("REPORT.XLSX"));
        assert!(!has_accepted_extension("report.csv"));
        assert!(!has_accepted_extension("xlsx"));
    }

    #[test]
    fn corrupt_and_foreign_uploads_are_reported_per_file() {
        let ingestion = ingest(vec![
            UploadedFile::new("broken.xlsx", b"not a zip archive".to_vec()),
            UploadedFile::new("notes.csv", b"a,b\n1,2\n".to_vec()),
        ]);

        assert!(ingestion.files.is_empty());
        assert_eq!(ingestion.notices.len(), 2);
        assert!(ingestion.notices[0].message.starts_with("Error reading broken.xlsx"));
        assert!(ingestion.notices[1].message.contains("only .xlsx"));
    }

    #[test]
    fn selection_replaces_entry_and_validates_names() {
        let files = vec![ingested("a.xlsx", &["S1", "S2"]), ingested("b.xlsx", &[])];
        let defaults = SheetSelection::defaults(&files);
        assert_eq!(defaults.get("a.xlsx"), Some(&["S1".to_string()][..]));
        assert_eq!(defaults.get("b.xlsx"), Some(&[][..]));

        let updated = defaults
            .with_sheets(
                &files,
                "a.xlsx",
                &["S2".to_string(), "S1".to_string(), "S2".to_string()],
            )
            .expect("selection accepted");
        assert_eq!(
            updated.get("a.xlsx"),
            Some(&["S2".to_string(), "S1".to_string()][..])
        );
        assert_eq!(defaults.get("a.xlsx"), Some(&["S1".to_string()][..]));

        let missing = defaults.with_sheets(&files, "a.xlsx", &["S9".to_string()]);
        assert!(matches!(missing, Err(MergeError::MissingSheet { .. })));

        let unknown = defaults.with_sheets(&files, "c.xlsx", &[]);
        assert!(matches!(unknown, Err(MergeError::UnknownFile(_))));
    }
}
