//! Filesystem-backed entry source on top of `tokio::fs`.
//!
//! Children are yielded in `read_dir` order. Every non-directory entry becomes an
//! [`FsFile`], but only regular files (after following symlinks) are ever opened.
//! FIFOs, sockets, device nodes and links to directories fail at `size()`, which the
//! scanner records as a read error.

use super::{ChildNode, DirectoryNode, DirectoryReader, FileNode, FlatFile, Node};
use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on entries returned by one [`FsDirReader::read_batch`] call.
pub const READ_BATCH_SIZE: usize = 64;

pub type FsNode = Node<FsFile, FsDir>;

#[derive(Debug, Clone)]
pub struct FsFile {
    path: PathBuf,
    name: String,
}

impl FsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = bare_name(&path);
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileNode for FsFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn size(&self) -> io::Result<u64> {
        let meta = tokio::fs::metadata(&self.path).await?;
        // Reading a FIFO or a character device can block forever.
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", self.path.display()),
            ));
        }
        Ok(meta.len())
    }

    async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

#[derive(Debug, Clone)]
pub struct FsDir {
    path: PathBuf,
    name: String,
}

impl FsDir {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectoryNode for FsDir {
    type File = FsFile;
    type Reader = FsDirReader;

    fn name(&self) -> &str {
        &self.name
    }

    fn reader(&self) -> FsDirReader {
        FsDirReader {
            path: self.path.clone(),
            inner: None,
            exhausted: false,
        }
    }
}

pub struct FsDirReader {
    path: PathBuf,
    inner: Option<tokio::fs::ReadDir>,
    exhausted: bool,
}

impl DirectoryReader for FsDirReader {
    type Dir = FsDir;

    async fn read_batch(&mut self) -> io::Result<Vec<ChildNode<FsDir>>> {
        if self.exhausted {
            return Ok(Vec::new());
        }
        if self.inner.is_none() {
            self.inner = Some(tokio::fs::read_dir(&self.path).await?);
        }
        let Some(read_dir) = self.inner.as_mut() else {
            return Ok(Vec::new());
        };

        let mut batch = Vec::new();
        while batch.len() < READ_BATCH_SIZE {
            let Some(entry) = read_dir.next_entry().await? else {
                self.exhausted = true;
                break;
            };
            let file_type = entry.file_type().await?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            batch.push(if file_type.is_dir() {
                Node::Directory(FsDir { path, name })
            } else {
                Node::File(FsFile { path, name })
            });
        }
        Ok(batch)
    }
}

/// Resolve a user-supplied path into a root node.
///
/// This is the only fallible step before scanning starts: a path that cannot be
/// stat'ed fails the whole ingestion call.
pub async fn open(path: &Path) -> Result<FsNode> {
    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot open {}", path.display()))?;

    let name = match path.file_name() {
        Some(n) => n.to_string_lossy().into_owned(),
        None => {
            let canonical = tokio::fs::canonicalize(path)
                .await
                .with_context(|| format!("Failed to resolve {}", path.display()))?;
            bare_name(&canonical)
        }
    };

    let path = path.to_path_buf();
    Ok(if meta.is_dir() {
        Node::Directory(FsDir { path, name })
    } else {
        Node::File(FsFile { path, name })
    })
}

/// Build a flat selection from `(on-disk path, relative path)` pairs.
///
/// Relative paths are normalized to forward slashes. No I/O happens here; missing
/// files surface later as read errors.
pub fn flat_files<I, P>(entries: I) -> Vec<FlatFile<FsFile>>
where
    I: IntoIterator<Item = (P, String)>,
    P: Into<PathBuf>,
{
    entries
        .into_iter()
        .map(|(abs, rel)| {
            let rel = rel.replace('\\', "/");
            let rel = rel.trim_start_matches("./").to_string();
            FlatFile::new(FsFile::new(abs), Some(rel))
        })
        .collect()
}

fn bare_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
