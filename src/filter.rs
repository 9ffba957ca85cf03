//! Admission predicates for single entries. Pure: no I/O, no allocation on the hot path
//! beyond lowercasing the extension.

use crate::config::IgnoreRules;
use crate::scanner::SkipReason;
use std::collections::HashSet;

/// Lowercased extension of a bare file name, including the leading dot.
///
/// `None` when the name has no `.` at all. `"archive.tar.GZ"` gives `".gz"`.
pub fn extension_of(name: &str) -> Option<String> {
    name.rfind('.').map(|i| name[i..].to_lowercase())
}

/// Why a file named `name` would be rejected, if at all.
pub fn file_rejection(name: &str, exts: &HashSet<String>) -> Option<SkipReason> {
    if name.starts_with('.') {
        return Some(SkipReason::HiddenFile);
    }
    match extension_of(name) {
        Some(ext) if exts.contains(&ext) => Some(SkipReason::IgnoredExtension),
        _ => None,
    }
}

pub fn accept(name: &str, exts: &HashSet<String>) -> bool {
    file_rejection(name, exts).is_none()
}

/// Directories are pruned on exact bare-name match, at any depth.
pub fn accept_dir(name: &str, rules: &IgnoreRules) -> bool {
    !rules.dirs.contains(name)
}

/// Flat-list variant: any ancestor segment (everything but the file name) matching
/// an ignored directory name rejects the whole path.
pub fn has_ignored_ancestor(rel_path: &str, rules: &IgnoreRules) -> bool {
    let segments: Vec<&str> = rel_path.split('/').collect();
    let Some((_, ancestors)) = segments.split_last() else {
        return false;
    };
    ancestors.iter().any(|seg| rules.dirs.contains(*seg))
}
