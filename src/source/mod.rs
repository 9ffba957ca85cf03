//! Entry sources the scanner walks.
//!
//! A source hands out [`Node`]s: files that can report a size and produce bytes, and
//! directories whose children arrive through a paginated [`DirectoryReader`]. The
//! scanner only sees these traits, so the same traversal runs over the real
//! filesystem ([`fs`]) and over synthetic trees ([`memory`]).

pub mod fs;
pub mod memory;

use std::future::Future;
use std::io;

/// One entry in a tree: either a file or a directory.
#[derive(Debug, Clone)]
pub enum Node<F, D> {
    File(F),
    Directory(D),
}

impl<F: FileNode, D: DirectoryNode> Node<F, D> {
    pub fn name(&self) -> &str {
        match self {
            Node::File(f) => f.name(),
            Node::Directory(d) => d.name(),
        }
    }
}

pub trait FileNode {
    /// Bare file name, no path separators.
    fn name(&self) -> &str;

    /// Byte length as reported by the source, before any content is read.
    fn size(&self) -> impl Future<Output = io::Result<u64>>;

    fn read_bytes(&self) -> impl Future<Output = io::Result<Vec<u8>>>;
}

pub trait DirectoryNode: Sized {
    type File: FileNode;
    type Reader: DirectoryReader<Dir = Self>;

    fn name(&self) -> &str;

    /// Fresh reader positioned at the first child.
    fn reader(&self) -> Self::Reader;
}

/// Paginated child listing. A call may return a partial batch; an empty batch means
/// the listing is exhausted.
pub trait DirectoryReader {
    type Dir: DirectoryNode;

    fn read_batch(&mut self) -> impl Future<Output = io::Result<Vec<ChildNode<Self::Dir>>>>;
}

/// Child node type yielded by directory `D`.
pub type ChildNode<D> = Node<<D as DirectoryNode>::File, D>;

/// A file from a flat selection, carrying the relative path it was selected under.
#[derive(Debug, Clone)]
pub struct FlatFile<F> {
    pub file: F,
    /// Forward-slash relative path (`src/app/main.ts`). Falls back to the file name.
    pub relative_path: Option<String>,
}

impl<F: FileNode> FlatFile<F> {
    pub fn new(file: F, relative_path: Option<String>) -> Self {
        Self { file, relative_path }
    }

    pub fn path(&self) -> &str {
        match self.relative_path.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => self.file.name(),
        }
    }
}
