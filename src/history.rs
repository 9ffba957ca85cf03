//! History records: a saved merged document plus the statistics of the session that
//! produced it. Records are built here and stored elsewhere.

use crate::assembler::Language;
use crate::scanner::AcceptedFile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    pub total_files: usize,
    pub total_size: u64,
    pub skipped_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub name: String,
    pub content: String,
    pub stats: ProcessingStats,
}

/// Localized words used to build a record's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingLabels {
    pub unknown_folder: String,
    pub others: String,
    pub files: String,
}

impl NamingLabels {
    pub fn for_language(lang: Language) -> Self {
        let (unknown_folder, others, files) = match lang {
            Language::En => ("Unknown Folder", "others", "files"),
            Language::Zh => ("未知文件夹", "其他", "个文件"),
        };
        Self {
            unknown_folder: unknown_folder.to_string(),
            others: others.to_string(),
            files: files.to_string(),
        }
    }
}

impl Default for NamingLabels {
    fn default() -> Self {
        Self::for_language(Language::En)
    }
}

/// Distinct top-level folder names in first-seen order.
///
/// A first segment containing `.` is taken to be a loose file rather than a folder.
pub fn folder_names(files: &[AcceptedFile]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for f in files {
        let first = f.path.split('/').next().unwrap_or_default();
        if first.is_empty() || first.contains('.') || names.contains(&first) {
            continue;
        }
        names.push(first);
    }
    names
}

/// `"<folder> (<n> files)"`, `"<folder> + others (<n> files)"` or the fallback label.
pub fn display_name(files: &[AcceptedFile], labels: &NamingLabels) -> String {
    let names = folder_names(files);
    let base = match names.as_slice() {
        [] => labels.unknown_folder.clone(),
        [only] => only.to_string(),
        [first, ..] => format!("{first} + {}", labels.others),
    };
    format!("{base} ({} {})", files.len(), labels.files)
}

impl HistoryRecord {
    /// Build a record stamped with a fresh id and the current time.
    ///
    /// Stats are copied from the session totals as given; nothing is re-validated.
    pub fn build(
        files: &[AcceptedFile],
        skipped: &[String],
        content: &str,
        labels: &NamingLabels,
    ) -> Self {
        Self::build_with(
            files,
            skipped,
            content,
            labels,
            uuid::Uuid::new_v4().to_string(),
            chrono::Utc::now().timestamp_millis(),
        )
    }

    pub fn build_with(
        files: &[AcceptedFile],
        skipped: &[String],
        content: &str,
        labels: &NamingLabels,
        id: String,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            timestamp,
            name: display_name(files, labels),
            content: content.to_string(),
            stats: ProcessingStats {
                total_files: files.len(),
                total_size: files.iter().map(|f| f.size).sum(),
                skipped_files: skipped.to_vec(),
            },
        }
    }

    /// Local time rendering of `timestamp` for listings.
    pub fn saved_at(&self) -> String {
        use chrono::TimeZone;
        match chrono::Local.timestamp_millis_opt(self.timestamp).single() {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.timestamp.to_string(),
        }
    }
}

/// Saved records, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert at the front. With `limit`, the oldest records beyond it are dropped.
    pub fn push_front(&mut self, record: HistoryRecord, limit: Option<usize>) {
        self.records.insert(0, record);
        if let Some(limit) = limit {
            self.records.truncate(limit.max(1));
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<HistoryRecord> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Resolve a full id or an unambiguous id prefix.
    pub fn resolve(&self, id_or_prefix: &str) -> Option<&HistoryRecord> {
        if let Some(r) = self.get(id_or_prefix) {
            return Some(r);
        }
        if id_or_prefix.is_empty() {
            return None;
        }
        let mut hits = self.records.iter().filter(|r| r.id.starts_with(id_or_prefix));
        let first = hits.next()?;
        match hits.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(path: &str, size: u64) -> AcceptedFile {
        AcceptedFile {
            path: path.to_string(),
            content: String::new(),
            size,
        }
    }

    fn rec(id: &str) -> HistoryRecord {
        HistoryRecord::build_with(&[], &[], "", &NamingLabels::default(), id.to_string(), 0)
    }

    #[test]
    fn single_folder_name() {
        let files = vec![f("src/a.ts", 1), f("src/b/c.ts", 1)];
        assert_eq!(display_name(&files, &NamingLabels::default()), "src (2 files)");
    }

    #[test]
    fn multiple_folders_use_first_plus_others() {
        let files = vec![f("web/a.ts", 1), f("api/b.rs", 1), f("web/c.ts", 1)];
        assert_eq!(
            display_name(&files, &NamingLabels::default()),
            "web + others (3 files)"
        );
    }

    #[test]
    fn loose_files_fall_back_to_unknown() {
        let files = vec![f("README.md", 1), f("main.rs", 1)];
        assert_eq!(
            display_name(&files, &NamingLabels::default()),
            "Unknown Folder (2 files)"
        );
        // Loose files never count as folders even beside a real one.
        let mixed = vec![f("notes.txt", 1), f("lib/x.rs", 1)];
        assert_eq!(folder_names(&mixed), vec!["lib"]);
    }

    #[test]
    fn localized_labels() {
        let files = vec![f("a/x", 1), f("b/y", 1)];
        assert_eq!(
            display_name(&files, &NamingLabels::for_language(Language::Zh)),
            "a + 其他 (2 个文件)"
        );
    }

    #[test]
    fn stats_are_copied_verbatim() {
        let files = vec![f("src/a.ts", 5), f("src/b.ts", 7)];
        let skipped = vec!["node_modules/ (Ignored directory)".to_string()];
        let r = HistoryRecord::build(&files, &skipped, "DOC", &NamingLabels::default());
        assert_eq!(r.stats.total_files, 2);
        assert_eq!(r.stats.total_size, 12);
        assert_eq!(r.stats.skipped_files, skipped);
        assert_eq!(r.content, "DOC");
        assert!(uuid::Uuid::parse_str(&r.id).is_ok());
        assert!(r.timestamp > 0);
    }

    #[test]
    fn serialized_shape_is_camel_case() {
        let r = HistoryRecord::build_with(
            &[f("a/b", 2)],
            &[],
            "c",
            &NamingLabels::default(),
            "id-1".into(),
            42,
        );
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["stats"]["totalFiles"], 1);
        assert_eq!(v["stats"]["totalSize"], 2);
        assert!(v["stats"]["skippedFiles"].as_array().unwrap().is_empty());
        assert_eq!(v["timestamp"], 42);
    }

    #[test]
    fn history_is_most_recent_first() {
        let mut h = History::default();
        h.push_front(rec("one"), None);
        h.push_front(rec("two"), None);
        let ids: Vec<&str> = h.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["two", "one"]);

        assert!(h.remove("one").is_some());
        assert!(h.remove("one").is_none());
        assert_eq!(h.len(), 1);
        h.clear();
        assert!(h.is_empty());
    }

    #[test]
    fn limit_drops_oldest() {
        let mut h = History::default();
        for id in ["a", "b", "c"] {
            h.push_front(rec(id), Some(2));
        }
        let ids: Vec<&str> = h.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn resolve_accepts_unique_prefix() {
        let mut h = History::default();
        h.push_front(rec("abc123"), None);
        h.push_front(rec("abd456"), None);
        assert_eq!(h.resolve("abc").map(|r| r.id.as_str()), Some("abc123"));
        assert!(h.resolve("ab").is_none(), "ambiguous prefix");
        assert!(h.resolve("zzz").is_none());
        assert_eq!(h.resolve("abd456").map(|r| r.id.as_str()), Some("abd456"));
    }
}
