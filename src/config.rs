use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    ".next",
    "coverage",
    "__pycache__",
    ".DS_Store",
    ".idea",
    ".vscode",
];

pub const DEFAULT_IGNORED_EXTS: &[&str] = &[
    // Images
    ".png", ".jpg", ".jpeg", ".gif", ".ico", ".svg", ".webp",
    // Video
    ".mp4", ".mov", ".avi", ".webm",
    // Audio
    ".mp3", ".wav", ".ogg",
    // Archives
    ".zip", ".tar", ".gz", ".7z", ".rar",
    // Binaries
    ".exe", ".dll", ".so", ".dylib", ".bin",
    // Documents
    ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx",
    // Compiled
    ".pyc", ".class", ".o",
    // Fonts
    ".eot", ".ttf", ".woff", ".woff2",
];

/// User-editable ignore policy.
///
/// Persisted as `{ "ignoredDirs": [...], "ignoredExts": [...] }`. Never consulted
/// directly during a scan: callers snapshot it with [`IgnoreConfig::rules`] first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IgnoreConfig {
    /// Directory *names* to prune anywhere in the tree (compared per segment, not by path).
    pub ignored_dirs: Vec<String>,
    /// Extensions with a leading dot, e.g. `.png`. Matched case-insensitively.
    pub ignored_exts: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            ignored_exts: DEFAULT_IGNORED_EXTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl IgnoreConfig {
    /// Snapshot into fast-lookup sets for a single run.
    pub fn rules(&self) -> IgnoreRules {
        IgnoreRules {
            dirs: self.ignored_dirs.iter().cloned().collect(),
            exts: self
                .ignored_exts
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Add extra names without duplicating existing ones. Order of first appearance wins.
    pub fn extend(&mut self, dirs: &[String], exts: &[String]) {
        for d in clean_list(dirs) {
            if !self.ignored_dirs.contains(&d) {
                self.ignored_dirs.push(d);
            }
        }
        for e in clean_list(exts).into_iter().map(normalize_ext) {
            if !self.ignored_exts.contains(&e) {
                self.ignored_exts.push(e);
            }
        }
    }
}

/// Split user input on `,`, `;` and newlines, trimming and dropping blanks.
///
/// Accepts either pre-split values (`["a", "b"]`) or one joined string (`["a, b"]`).
pub fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split([',', ';', '\n']))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalize_ext(ext: String) -> String {
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Per-run snapshot of an [`IgnoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    pub dirs: HashSet<String>,
    /// Lowercased, leading dot.
    pub exts: HashSet<String>,
}

/// Per-project additions read from `.folder2prompt.json` in the working directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    pub extra_ignored_dirs: Vec<String>,
    pub extra_ignored_exts: Vec<String>,
}

pub fn load_project_config(repo_root: &Path) -> ProjectConfig {
    let primary = repo_root.join(".folder2prompt.json");

    let text = std::fs::read_to_string(&primary);
    let Ok(text) = text else { return ProjectConfig::default() };

    serde_json::from_str::<ProjectConfig>(&text).unwrap_or_else(|e| {
        tracing::warn!(path = %primary.display(), error = %e, "ignoring unparsable project config");
        ProjectConfig::default()
    })
}
