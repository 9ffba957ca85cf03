use crate::config::IgnoreRules;
use crate::filter::{accept_dir, file_rejection, has_ignored_ancestor};
use crate::loader;
use crate::source::fs::{self as fs_source, FsDir, FsNode};
use crate::source::{ChildNode, DirectoryNode, DirectoryReader, FileNode, FlatFile, Node};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A file admitted into the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedFile {
    /// Forward-slash relative path, e.g. `src/app/main.ts`.
    pub path: String,
    pub content: String,
    /// Original byte length (not the decoded char count).
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    IgnoredExtension,
    HiddenFile,
    IgnoredDirectory,
    TooLarge,
    BinaryDetected,
    ReadError,
    AccessError,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::IgnoredExtension => "Ignored extension",
            SkipReason::HiddenFile => "Hidden file",
            SkipReason::IgnoredDirectory => "Ignored directory",
            SkipReason::TooLarge => "Too large > 2MB",
            SkipReason::BinaryDetected => "Binary detected",
            SkipReason::ReadError => "Read error",
            SkipReason::AccessError => "Access denied/error",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the skip log. Directory entries carry a trailing `/` in `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipEntry {
    pub path: String,
    pub reason: SkipReason,
}

impl SkipEntry {
    pub fn new(path: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    fn dir(path: String, reason: SkipReason) -> Self {
        Self::new(format!("{path}/"), reason)
    }
}

impl fmt::Display for SkipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.reason)
    }
}

/// Outcome of one scan call. Both lists are in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionResult {
    pub files: Vec<AcceptedFile>,
    pub skipped: Vec<SkipEntry>,
}

impl IngestionResult {
    pub fn extend(&mut self, other: IngestionResult) {
        self.files.extend(other.files);
        self.skipped.extend(other.skipped);
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Skip log rendered as `"<path> (<cause>)"` lines.
    pub fn skipped_lines(&self) -> Vec<String> {
        self.skipped.iter().map(ToString::to_string).collect()
    }

    fn record(&mut self, outcome: Result<AcceptedFile, SkipEntry>) {
        match outcome {
            Ok(f) => self.files.push(f),
            Err(s) => self.skipped.push(s),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hierarchical entries
// ─────────────────────────────────────────────────────────────────────────────

/// Scan root entries depth-first. Roots contribute their own names to every path.
pub async fn scan_entries<D>(roots: &[ChildNode<D>], rules: &IgnoreRules) -> IngestionResult
where
    D: DirectoryNode,
{
    let mut out = IngestionResult::default();
    for root in roots {
        out.extend(scan_node::<D>(root, "", rules).await);
    }
    out
}

/// Scan one entry whose parent path is `prefix` (empty, or ending in `/`).
pub fn scan_node<'a, D>(
    node: &'a ChildNode<D>,
    prefix: &'a str,
    rules: &'a IgnoreRules,
) -> BoxFuture<'a, IngestionResult>
where
    D: DirectoryNode + 'a,
{
    Box::pin(async move {
        let mut out = IngestionResult::default();
        match node {
            Node::File(file) => {
                let path = format!("{prefix}{}", file.name());
                out.record(admit_file(file, path, rules).await);
            }
            Node::Directory(dir) => {
                let name = dir.name();
                if !accept_dir(name, rules) {
                    tracing::debug!(dir = %format!("{prefix}{name}"), "pruned ignored directory");
                    out.skipped
                        .push(SkipEntry::dir(format!("{prefix}{name}"), SkipReason::IgnoredDirectory));
                    return out;
                }

                // A listing failure drops the whole subtree, including children already
                // received in earlier batches.
                let children = match list_children(dir).await {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!(dir = %format!("{prefix}{name}"), error = %e, "cannot list directory");
                        out.skipped
                            .push(SkipEntry::dir(format!("{prefix}{name}"), SkipReason::AccessError));
                        return out;
                    }
                };

                let child_prefix = format!("{prefix}{name}/");
                for child in &children {
                    out.extend(scan_node::<D>(child, &child_prefix, rules).await);
                }
            }
        }
        out
    })
}

async fn list_children<D: DirectoryNode>(dir: &D) -> io::Result<Vec<ChildNode<D>>> {
    let mut reader = dir.reader();
    let mut entries = Vec::new();
    loop {
        let batch = reader.read_batch().await?;
        if batch.is_empty() {
            break;
        }
        entries.extend(batch);
    }
    Ok(entries)
}

async fn admit_file<F: FileNode>(
    file: &F,
    path: String,
    rules: &IgnoreRules,
) -> Result<AcceptedFile, SkipEntry> {
    if let Some(reason) = file_rejection(file.name(), &rules.exts) {
        return Err(SkipEntry::new(path, reason));
    }
    match loader::load(file, &path).await {
        Ok(accepted) => Ok(accepted),
        Err(reason) => Err(SkipEntry::new(path, reason)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Flat selections
// ─────────────────────────────────────────────────────────────────────────────

/// Scan a flat file list. No directory nodes exist here, so ignored directories are
/// detected per file from the ancestor segments of its relative path.
pub async fn scan_file_list<F: FileNode>(files: &[FlatFile<F>], rules: &IgnoreRules) -> IngestionResult {
    let mut out = IngestionResult::default();
    for flat in files {
        let path = flat.path().to_string();
        if has_ignored_ancestor(&path, rules) {
            out.skipped
                .push(SkipEntry::new(path, SkipReason::IgnoredDirectory));
            continue;
        }
        out.record(admit_file(&flat.file, path, rules).await);
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Filesystem entry points
// ─────────────────────────────────────────────────────────────────────────────

/// Open every root first, then scan them in order.
///
/// Any root that cannot be opened fails the call before a result exists, so callers
/// never commit a partial ingestion.
pub async fn scan_paths(paths: &[PathBuf], rules: &IgnoreRules) -> Result<IngestionResult> {
    let mut roots: Vec<FsNode> = Vec::with_capacity(paths.len());
    for p in paths {
        roots.push(fs_source::open(p).await?);
    }
    Ok(scan_entries::<FsDir>(&roots, rules).await)
}
