//! In-memory entry source for synthetic trees.
//!
//! Directories hand out children in insertion order, `batch_size` at a time, and can be
//! told to fail listing. Files can be told to fail reading. Every file counts how often
//! its bytes were read, so callers can assert that rejected files were never opened.

use super::{ChildNode, DirectoryNode, DirectoryReader, FileNode, FlatFile, Node};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub type MemNode = Node<MemFile, MemDir>;

#[derive(Debug, Clone)]
pub struct MemFile {
    name: String,
    bytes: Arc<Vec<u8>>,
    unreadable: bool,
    /// Size reported by `size()` when it should differ from the real byte count.
    reported_size: Option<u64>,
    reads: Arc<AtomicUsize>,
}

impl MemFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(bytes.into()),
            unreadable: false,
            reported_size: None,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report `n` from `size()` regardless of the actual content, like a file that
    /// changes between stat and read.
    pub fn reported_size(mut self, n: u64) -> Self {
        self.reported_size = Some(n);
        self
    }

    /// Every size/read call fails with `PermissionDenied`.
    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> io::Result<()> {
        if self.unreadable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: permission denied", self.name),
            ));
        }
        Ok(())
    }
}

impl FileNode for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn size(&self) -> io::Result<u64> {
        self.check()?;
        Ok(self.reported_size.unwrap_or(self.bytes.len() as u64))
    }

    async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.as_ref().clone())
    }
}

#[derive(Debug, Clone)]
pub struct MemDir {
    name: String,
    children: Arc<Vec<MemNode>>,
    batch_size: usize,
    /// Listing fails once this many batches have been served. `None` never fails.
    fail_after_batches: Option<usize>,
}

impl MemDir {
    pub fn new(name: impl Into<String>, children: Vec<MemNode>) -> Self {
        Self {
            name: name.into(),
            children: Arc::new(children),
            batch_size: usize::MAX,
            fail_after_batches: None,
        }
    }

    /// Serve children in batches of `n` (minimum 1).
    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }

    /// Fail the listing immediately.
    pub fn unlistable(self) -> Self {
        self.fail_after(0)
    }

    /// Serve `batches` successful batches, then fail.
    pub fn fail_after(mut self, batches: usize) -> Self {
        self.fail_after_batches = Some(batches);
        self
    }

    pub fn children(&self) -> &[MemNode] {
        &self.children
    }
}

impl DirectoryNode for MemDir {
    type File = MemFile;
    type Reader = MemDirReader;

    fn name(&self) -> &str {
        &self.name
    }

    fn reader(&self) -> MemDirReader {
        MemDirReader {
            dir: self.clone(),
            pos: 0,
            served: 0,
        }
    }
}

pub struct MemDirReader {
    dir: MemDir,
    pos: usize,
    served: usize,
}

impl DirectoryReader for MemDirReader {
    type Dir = MemDir;

    async fn read_batch(&mut self) -> io::Result<Vec<ChildNode<MemDir>>> {
        if self.dir.fail_after_batches.is_some_and(|n| self.served >= n) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: listing denied", self.dir.name),
            ));
        }
        let end = self
            .pos
            .saturating_add(self.dir.batch_size)
            .min(self.dir.children.len());
        let batch = self.dir.children[self.pos..end].to_vec();
        self.pos = end;
        self.served += 1;
        Ok(batch)
    }
}

pub fn file(name: &str, bytes: impl Into<Vec<u8>>) -> MemNode {
    Node::File(MemFile::new(name, bytes))
}

pub fn dir(name: &str, children: Vec<MemNode>) -> MemNode {
    Node::Directory(MemDir::new(name, children))
}

/// Build root entries from `path -> bytes` pairs, creating intermediate directories.
///
/// Siblings keep first-seen order, so `[("src/a.ts", ..), ("img.png", ..)]` yields the
/// roots `src/` then `img.png`.
pub fn tree<P, B>(entries: impl IntoIterator<Item = (P, B)>) -> Vec<MemNode>
where
    P: AsRef<str>,
    B: Into<Vec<u8>>,
{
    let mut roots = Vec::new();
    for (path, bytes) in entries {
        let segments: Vec<&str> = path
            .as_ref()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        insert(&mut roots, &segments, bytes.into());
    }
    roots
}

fn insert(level: &mut Vec<MemNode>, segments: &[&str], bytes: Vec<u8>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        level.push(file(head, bytes));
        return;
    }
    let existing = level
        .iter()
        .position(|n| matches!(n, Node::Directory(d) if d.name == *head));
    let idx = match existing {
        Some(i) => i,
        None => {
            level.push(dir(head, Vec::new()));
            level.len() - 1
        }
    };
    if let Node::Directory(d) = &mut level[idx] {
        insert(Arc::make_mut(&mut d.children), rest, bytes);
    }
}

/// Flat selection where every file carries its relative path.
pub fn flat<P, B>(entries: impl IntoIterator<Item = (P, B)>) -> Vec<FlatFile<MemFile>>
where
    P: AsRef<str>,
    B: Into<Vec<u8>>,
{
    entries
        .into_iter()
        .map(|(path, bytes)| {
            let path = path.as_ref();
            let name = path.rsplit('/').next().unwrap_or(path);
            FlatFile::new(MemFile::new(name, bytes), Some(path.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_groups_by_directory_in_first_seen_order() {
        let roots = tree([
            ("src/a.ts", "a"),
            ("img.png", "p"),
            ("src/lib/b.ts", "b"),
            ("src/c.ts", "c"),
        ]);
        let names: Vec<&str> = roots.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["src", "img.png"]);

        let Node::Directory(src) = &roots[0] else {
            panic!("src should be a directory");
        };
        let names: Vec<&str> = src.children().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a.ts", "lib", "c.ts"]);
    }

    #[tokio::test]
    async fn reader_respects_batch_size_and_failure() {
        let d = MemDir::new("d", tree([("a", ""), ("b", ""), ("c", "")])).batch_size(2);
        let mut r = d.reader();
        assert_eq!(r.read_batch().await.unwrap().len(), 2);
        assert_eq!(r.read_batch().await.unwrap().len(), 1);
        assert!(r.read_batch().await.unwrap().is_empty());

        let mut r = d.clone().fail_after(1).reader();
        assert_eq!(r.read_batch().await.unwrap().len(), 2);
        assert!(r.read_batch().await.is_err());
    }

    #[tokio::test]
    async fn unreadable_file_never_counts_reads() {
        let f = MemFile::new("x.txt", "hi").unreadable();
        assert!(f.size().await.is_err());
        assert!(f.read_bytes().await.is_err());
        assert_eq!(f.read_count(), 0);
    }
}
