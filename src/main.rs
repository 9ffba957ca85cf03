use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use folder2prompt::assembler::{extract_paths, Headers, Language};
use folder2prompt::clipboard::Clipboard;
use folder2prompt::config::{clean_list, load_project_config, normalize_ext, IgnoreConfig, IgnoreRules};
use folder2prompt::format::format_bytes;
use folder2prompt::history::NamingLabels;
use folder2prompt::scanner::{scan_file_list, scan_paths, IngestionResult};
use folder2prompt::session::{derive_display_state, Session};
use folder2prompt::source::fs::flat_files;
use folder2prompt::store::{PersistentStore, StoreLayout};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "folder2prompt")]
#[command(version)]
#[command(about = "Pack folders and files into one paste-ready prompt document for AI assistants")]
struct Cli {
    /// Folders or files to pack, in order. Each one is scanned and appended to the session.
    /// A directory that shares a subcommand name must be written as `./history`.
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Also pack a flat file list: one relative path per line, resolved against the current dir.
    #[arg(long, value_name = "LIST")]
    files_from: Option<PathBuf>,

    /// Write the document to FILE instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Header language (defaults to the saved preference)
    #[arg(long, value_enum)]
    lang: Option<Language>,

    /// Extra directory name to ignore for this run (repeatable, comma separated allowed)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    ignore_dirs: Vec<String>,

    /// Extra extension to ignore for this run, e.g. `.lock` (repeatable)
    #[arg(long = "ignore-ext", value_name = "EXT")]
    ignore_exts: Vec<String>,

    /// Print the skip log to stderr
    #[arg(long)]
    show_skipped: bool,

    /// Save the document to history
    #[arg(long)]
    save: bool,

    /// Copy the document to the clipboard instead of printing it
    /// (honors $FOLDER2PROMPT_COPY_CMD)
    #[arg(long)]
    copy: bool,

    /// Directory holding ignore_config.json, history.json and preferences.json
    #[arg(long, value_name = "DIR", global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Browse and manage saved prompts
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show or edit the persisted ignore rules and preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    /// List saved prompts, most recent first
    List,
    /// Print a saved document (ID may be a unique prefix)
    Show {
        id: String,
        /// Copy the document to the clipboard instead of printing it
        #[arg(long)]
        copy: bool,
    },
    /// Print the file paths listed in a saved document
    Paths { id: String },
    /// Delete one saved prompt
    Delete { id: String },
    /// Delete every saved prompt
    Clear,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the ignore rules and preferences as JSON
    Show,
    /// Restore the default ignore rules
    Reset,
    /// Replace the ignored directory names and/or extensions
    Set {
        #[arg(long, num_args = 1.., value_name = "NAME")]
        dirs: Option<Vec<String>>,
        #[arg(long, num_args = 1.., value_name = "EXT")]
        exts: Option<Vec<String>>,
    },
    /// Set the default header language
    Lang {
        #[arg(value_enum)]
        lang: Language,
    },
    /// Keep at most N history records (omit N to keep everything)
    HistoryLimit { limit: Option<usize> },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let mut cli = Cli::parse();
    let layout = StoreLayout::resolve(cli.store_dir.as_deref())?;

    if let Some(cmd) = cli.cmd.take() {
        return match cmd {
            Command::History { action } => run_history(&layout, action),
            Command::Config { action } => run_config(&layout, action),
        };
    }

    if cli.paths.is_empty() && cli.files_from.is_none() {
        bail!("Nothing to pack: pass one or more PATHs or --files-from <LIST>");
    }

    let cwd = std::env::current_dir().context("Failed to get current dir")?;
    let prefs = layout.preferences().load_or_default();
    let lang = cli.lang.unwrap_or(prefs.language);
    let headers = Headers::for_language(lang);

    // Snapshot the rules once; nothing below may change them mid-run.
    let mut ignore = layout.ignore_config().load_or_default();
    let project = load_project_config(&cwd);
    ignore.extend(&project.extra_ignored_dirs, &project.extra_ignored_exts);
    ignore.extend(&cli.ignore_dirs, &cli.ignore_exts);
    let rules = ignore.rules();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message("processing files...");

    let rt = tokio::runtime::Runtime::new()?;
    let results = rt.block_on(ingest_all(&cli, &cwd, &rules));
    let results = match results {
        Ok(r) => r,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.context("processing failed"));
        }
    };

    let mut session = Session::new();
    for r in results {
        session.append(r);
    }
    let view = derive_display_state(&session, &headers);
    spinner.finish_with_message(format!(
        "packed {} files ({}), skipped {}",
        view.total_files,
        format_bytes(view.total_size),
        view.skipped.len()
    ));

    if cli.show_skipped {
        for line in &view.skipped {
            eprintln!("  skipped: {line}");
        }
    }

    if !view.has_content {
        eprintln!("No files were accepted; nothing to write.");
        return Ok(());
    }

    match cli.output.as_ref() {
        Some(out) => {
            std::fs::write(out, &view.output)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            eprintln!("Wrote {} bytes to {}", view.output.len(), out.display());
        }
        None if !cli.copy => print!("{}", view.output),
        None => {}
    }

    if cli.save {
        let labels = NamingLabels::for_language(lang);
        if let Some(record) = session.save(&headers, &labels) {
            let store = layout.history();
            let mut history = store.load_or_default();
            let (id, name) = (record.id.clone(), record.name.clone());
            history.push_front(record, prefs.history_limit);
            store.save(&history)?;
            eprintln!("Saved to history: {name} [{}]", short_id(&id));
        }
    }

    // Last, so a clipboard failure never costs the saved record.
    if cli.copy {
        copy_document(&view.output)?;
    }

    Ok(())
}

fn copy_document(doc: &str) -> Result<()> {
    let tool = Clipboard::from_env()
        .copy_text(doc)
        .context("Failed to copy to clipboard")?;
    eprintln!("Copied {} to clipboard via {tool}", format_bytes(doc.len() as u64));
    Ok(())
}

/// One ingestion call per PATH, then the flat list. Any call that fails before producing
/// a result aborts the run.
async fn ingest_all(cli: &Cli, cwd: &Path, rules: &IgnoreRules) -> Result<Vec<IngestionResult>> {
    let mut results = Vec::new();
    for p in &cli.paths {
        results.push(scan_paths(std::slice::from_ref(p), rules).await?);
    }
    if let Some(list) = cli.files_from.as_ref() {
        let text = tokio::fs::read_to_string(list)
            .await
            .with_context(|| format!("Failed to read file list {}", list.display()))?;
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| (cwd.join(l), l.to_string()));
        results.push(scan_file_list(&flat_files(entries), rules).await);
    }
    Ok(results)
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn run_history(layout: &StoreLayout, action: HistoryAction) -> Result<()> {
    let store = layout.history();
    let mut history = store.load_or_default();

    match action {
        HistoryAction::List => {
            if history.is_empty() {
                eprintln!("No history yet.");
            }
            for r in history.records() {
                println!(
                    "{}  {}  {}  {}  skipped {}",
                    short_id(&r.id),
                    r.saved_at(),
                    r.name,
                    format_bytes(r.stats.total_size),
                    r.stats.skipped_files.len()
                );
            }
        }
        HistoryAction::Show { id, copy } => {
            let r = history
                .resolve(&id)
                .with_context(|| format!("No unique history record matches '{id}'"))?;
            if copy {
                copy_document(&r.content)?;
            } else {
                print!("{}", r.content);
            }
        }
        HistoryAction::Paths { id } => {
            let r = history
                .resolve(&id)
                .with_context(|| format!("No unique history record matches '{id}'"))?;
            for p in extract_paths(&r.content) {
                println!("{p}");
            }
        }
        HistoryAction::Delete { id } => {
            let full_id = history
                .resolve(&id)
                .map(|r| r.id.clone())
                .with_context(|| format!("No unique history record matches '{id}'"))?;
            history.remove(&full_id);
            store.save(&history)?;
            eprintln!("Deleted {}", short_id(&full_id));
        }
        HistoryAction::Clear => {
            let n = history.len();
            history.clear();
            store.save(&history)?;
            eprintln!("Cleared {n} history records");
        }
    }
    Ok(())
}

fn run_config(layout: &StoreLayout, action: ConfigAction) -> Result<()> {
    let ignore_store = layout.ignore_config();
    let prefs_store = layout.preferences();

    match action {
        ConfigAction::Show => {
            let out = json!({
                "storeDir": layout.root().to_string_lossy(),
                "ignore": ignore_store.load_or_default(),
                "preferences": prefs_store.load_or_default(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ConfigAction::Reset => {
            ignore_store.save(&IgnoreConfig::default())?;
            eprintln!("Ignore rules reset to defaults");
        }
        ConfigAction::Set { dirs, exts } => {
            if dirs.is_none() && exts.is_none() {
                bail!("Nothing to set: pass --dirs and/or --exts");
            }
            let mut cfg = ignore_store.load_or_default();
            if let Some(d) = dirs {
                cfg.ignored_dirs = clean_list(&d);
            }
            if let Some(e) = exts {
                cfg.ignored_exts = clean_list(&e).into_iter().map(normalize_ext).collect();
            }
            ignore_store.save(&cfg)?;
            eprintln!(
                "Saved {} ignored directories, {} ignored extensions",
                cfg.ignored_dirs.len(),
                cfg.ignored_exts.len()
            );
        }
        ConfigAction::Lang { lang } => {
            let mut prefs = prefs_store.load_or_default();
            prefs.language = lang;
            prefs_store.save(&prefs)?;
        }
        ConfigAction::HistoryLimit { limit } => {
            let mut prefs = prefs_store.load_or_default();
            prefs.history_limit = limit.filter(|n| *n > 0);
            prefs_store.save(&prefs)?;
        }
    }
    Ok(())
}
