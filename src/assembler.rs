use crate::scanner::AcceptedFile;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

/// The three section headers of a merged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headers {
    pub project_context: String,
    pub dir_structure: String,
    pub file_contents: String,
}

impl Headers {
    pub fn for_language(lang: Language) -> Self {
        let (project_context, dir_structure, file_contents) = match lang {
            Language::En => ("# Project Context", "## Directory Structure", "## File Contents"),
            Language::Zh => ("# 项目上下文", "## 目录结构", "## 文件内容"),
        };
        Self {
            project_context: project_context.to_string(),
            dir_structure: dir_structure.to_string(),
            file_contents: file_contents.to_string(),
        }
    }
}

impl Default for Headers {
    fn default() -> Self {
        Self::for_language(Language::En)
    }
}

/// Fence language tag: extension of the final path segment without the dot, `txt`
/// when there is none.
pub fn language_tag(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(i) if i + 1 < name.len() => &name[i + 1..],
        _ => "txt",
    }
}

/// Serialize files into the merged prompt document.
///
/// An empty slice yields `""`, the "nothing to show" sentinel. Order is kept exactly as
/// given and duplicate paths are emitted as many times as they appear.
pub fn assemble(files: &[AcceptedFile], headers: &Headers) -> String {
    if files.is_empty() {
        return String::new();
    }

    let tree = files
        .iter()
        .map(|f| format!("- {}", f.path))
        .collect::<Vec<_>>()
        .join("\n");

    let blocks = files
        .iter()
        .map(|f| {
            format!(
                "### {}\n```{}\n{}\n```",
                f.path,
                language_tag(&f.path),
                f.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n{}\n{}\n\n{}\n\n{}\n",
        headers.project_context, headers.dir_structure, tree, headers.file_contents, blocks
    )
}

/// Recover the ordered path list from a merged document.
///
/// Reads lines up to the first code fence and collects every `- <path>` line.
pub fn extract_paths(document: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for line in document.lines() {
        if line.starts_with("```") {
            break;
        }
        // Only leading whitespace is insignificant; paths may end in spaces.
        if let Some(path) = line.trim_start().strip_prefix("- ") {
            paths.push(path.to_string());
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> AcceptedFile {
        AcceptedFile {
            path: path.to_string(),
            content: content.to_string(),
            size: content.len() as u64,
        }
    }

    #[test]
    fn empty_input_is_empty_string() {
        assert_eq!(assemble(&[], &Headers::default()), "");
    }

    #[test]
    fn single_file_exact_layout() {
        let doc = assemble(&[file("a.ts", "x")], &Headers::default());
        assert_eq!(
            doc,
            "# Project Context\n\n## Directory Structure\n- a.ts\n\n## File Contents\n\n### a.ts\n```ts\nx\n```\n"
        );
    }

    #[test]
    fn blocks_separated_by_one_blank_line() {
        let doc = assemble(
            &[file("src/main.rs", "fn main() {}"), file("Makefile", "all:")],
            &Headers::default(),
        );
        assert!(doc.contains("```rs\nfn main() {}\n```\n\n### Makefile\n```txt\nall:\n```\n"));
        assert!(doc.ends_with("```\n"));
        assert!(!doc.ends_with("\n\n"));
    }

    #[test]
    fn language_tag_uses_final_segment() {
        assert_eq!(language_tag("a.ts"), "ts");
        assert_eq!(language_tag("web/app.test.tsx"), "tsx");
        assert_eq!(language_tag("LICENSE"), "txt");
        assert_eq!(language_tag("v1.2/Dockerfile"), "txt");
        assert_eq!(language_tag("odd."), "txt");
    }

    #[test]
    fn headers_are_caller_supplied() {
        let doc = assemble(&[file("a.py", "pass")], &Headers::for_language(Language::Zh));
        assert!(doc.starts_with("# 项目上下文\n\n## 目录结构\n- a.py\n\n## 文件内容\n\n"));
    }

    #[test]
    fn duplicate_paths_are_preserved() {
        let files = vec![file("a.txt", "1"), file("a.txt", "2")];
        let doc = assemble(&files, &Headers::default());
        assert_eq!(extract_paths(&doc), vec!["a.txt", "a.txt"]);
        assert_eq!(doc.matches("### a.txt").count(), 2);
    }

    #[test]
    fn extract_paths_round_trips_listing_order() {
        let files = vec![
            file("src/z.rs", "// - not/a/path"),
            file("docs/a.md", "- bullet in content\n```\nfence\n```"),
            file("b", ""),
        ];
        let doc = assemble(&files, &Headers::default());
        assert_eq!(extract_paths(&doc), vec!["src/z.rs", "docs/a.md", "b"]);
    }

    #[test]
    fn extract_paths_keeps_trailing_whitespace() {
        let files = vec![file("src/a.txt ", "a"), file("b\t", "b")];
        let doc = assemble(&files, &Headers::default());
        assert_eq!(extract_paths(&doc), vec!["src/a.txt ", "b\t"]);
    }

    #[test]
    fn extract_paths_on_empty_document() {
        assert!(extract_paths("").is_empty());
    }
}
