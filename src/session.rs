use crate::assembler::{assemble, extract_paths, Headers};
use crate::history::{HistoryRecord, NamingLabels};
use crate::scanner::{AcceptedFile, IngestionResult};

/// Caller-owned accumulator across ingestion calls.
///
/// Live files and skip lines are append-only until [`Session::reset`]. Loading a
/// history record clears the live files and switches the view to the record.
#[derive(Debug, Clone, Default)]
pub struct Session {
    files: Vec<AcceptedFile>,
    skipped: Vec<String>,
    loaded: Option<LoadedRecord>,
}

#[derive(Debug, Clone)]
struct LoadedRecord {
    record: HistoryRecord,
    paths: Vec<String>,
}

/// What a shell should show for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub has_content: bool,
    pub total_files: usize,
    pub total_size: u64,
    pub paths: Vec<String>,
    pub skipped: Vec<String>,
    /// Merged document; empty when there is nothing to show.
    pub output: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one ingestion result. New live files end any history view.
    pub fn append(&mut self, result: IngestionResult) {
        let skipped = result.skipped_lines();
        if !result.files.is_empty() {
            self.loaded = None;
        }
        self.files.extend(result.files);
        self.skipped.extend(skipped);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn files(&self) -> &[AcceptedFile] {
        &self.files
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn is_viewing_history(&self) -> bool {
        self.loaded.is_some()
    }

    /// Show a saved record. Live files are discarded; the skip log becomes the record's.
    pub fn load_history(&mut self, record: HistoryRecord) {
        let paths = extract_paths(&record.content);
        self.files.clear();
        self.skipped = record.stats.skipped_files.clone();
        self.loaded = Some(LoadedRecord { record, paths });
    }

    /// Build a record from the live session. `None` when there are no live files, which
    /// includes the case of viewing a loaded record.
    pub fn save(&self, headers: &Headers, labels: &NamingLabels) -> Option<HistoryRecord> {
        if self.files.is_empty() {
            return None;
        }
        let content = assemble(&self.files, headers);
        Some(HistoryRecord::build(&self.files, &self.skipped, &content, labels))
    }
}

pub fn derive_display_state(session: &Session, headers: &Headers) -> DisplayState {
    if let Some(loaded) = &session.loaded {
        return DisplayState {
            has_content: true,
            total_files: loaded.record.stats.total_files,
            total_size: loaded.record.stats.total_size,
            paths: loaded.paths.clone(),
            skipped: session.skipped.clone(),
            output: loaded.record.content.clone(),
        };
    }
    DisplayState {
        has_content: !session.files.is_empty(),
        total_files: session.files.len(),
        total_size: session.files.iter().map(|f| f.size).sum(),
        paths: session.files.iter().map(|f| f.path.clone()).collect(),
        skipped: session.skipped.clone(),
        output: assemble(&session.files, headers),
    }
}
