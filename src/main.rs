use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use hashref_patcher::{
    discover, line_fingerprint, load_from_path, Edit, EditArgs, EditResult, EditShape, Engine,
    ReadOutput,
};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hashref")]
#[command(about = "Line-hash references for file edits", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a hashref.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root for relative paths (overrides HASHREF_WORKSPACE and config)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the fingerprint of a line of text
    Hash {
        /// Line content
        text: String,
    },

    /// Print a file with a line reference on every line
    View {
        file: PathBuf,

        /// First line to show (1-based)
        #[arg(long)]
        offset: Option<usize>,

        /// Maximum number of lines to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Resolve hash-reference edits (JSON) into a patch document
    Patch {
        /// JSON edit arguments, or '-' for stdin
        edits: PathBuf,
    },

    /// Resolve a single hash-reference edit (JSON) and apply it
    Edit {
        /// JSON edit arguments, or '-' for stdin
        edits: PathBuf,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Hash { text } => {
            println!("{}", line_fingerprint(&text));
            Ok(())
        }
        Commands::View {
            file,
            offset,
            limit,
        } => {
            let engine = build_engine(cli.config.as_deref(), cli.workspace)?;
            cmd_view(engine, &file, offset, limit)
        }
        Commands::Patch { edits } => {
            let engine = build_engine(cli.config.as_deref(), cli.workspace)?;
            cmd_patch(engine, &edits)
        }
        Commands::Edit {
            edits,
            dry_run,
            diff,
        } => {
            let engine = build_engine(cli.config.as_deref(), cli.workspace)?;
            cmd_edit(engine, &edits, dry_run, diff)
        }
    }
}

/// Log to stderr, filtered by `HASHREF_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("HASHREF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the workspace root.
///
/// Priority order:
/// 1. Explicit --workspace flag
/// 2. HASHREF_WORKSPACE environment variable
/// 3. `workspace_root` from the config file
/// 4. Current directory
///
/// Without --config, `hashref.toml` in the workspace root is used if present.
fn build_engine(config_path: Option<&Path>, workspace: Option<PathBuf>) -> Result<Engine> {
    let workspace = workspace.or_else(env_workspace);
    let mut config = match config_path {
        Some(path) => load_from_path(path)?,
        None => discover(workspace.as_deref().unwrap_or(Path::new(".")))?.unwrap_or_default(),
    };

    if let Some(path) = workspace {
        config.workspace_root = Some(path);
    }

    Ok(Engine::new(config))
}

fn env_workspace() -> Option<PathBuf> {
    let env_path = env::var("HASHREF_WORKSPACE").ok()?;
    let path = PathBuf::from(&env_path);
    if path.is_dir() {
        Some(path)
    } else {
        eprintln!(
            "{}",
            format!("Warning: HASHREF_WORKSPACE is not a directory: {env_path}").yellow()
        );
        None
    }
}

fn read_args(source: &Path) -> Result<EditArgs> {
    let text = if source == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read edit arguments from stdin")?;
        buf
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("failed to read edit arguments from {}", source.display()))?
    };
    serde_json::from_str(&text).context("edit arguments are not valid JSON")
}

fn cmd_view(mut engine: Engine, file: &Path, offset: Option<usize>, limit: Option<usize>) -> Result<()> {
    let path = engine.workspace().resolve(file);
    let content =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;

    let first = offset.unwrap_or(1).max(1);
    let listing = content
        .lines()
        .enumerate()
        .skip(first - 1)
        .take(limit.unwrap_or(usize::MAX))
        .map(|(idx, line)| format!("{}: {}", idx + 1, line))
        .collect::<Vec<_>>()
        .join("\n");

    let read = ReadOutput {
        path: path.to_string_lossy().into_owned(),
        output: listing,
        partial: offset.is_some() || limit.is_some(),
    };
    println!("{}", engine.on_read(&read));
    Ok(())
}

fn cmd_patch(mut engine: Engine, source: &Path) -> Result<()> {
    let args = read_args(source)?;
    let edits = match args.shape(engine.workspace())? {
        EditShape::Batch(edits) => edits,
        EditShape::Single(edit) => vec![edit],
        EditShape::Legacy { .. } | EditShape::Unrelated => {
            anyhow::bail!("{} contains no hash-reference edits", source.display())
        }
    };

    let outcome = engine.resolve_batch(&edits)?;
    for skipped in &outcome.skipped {
        eprintln!("{} skipped: {}", "⊘".yellow(), skipped);
    }
    if outcome.document.is_empty() {
        anyhow::bail!("no file could be read; nothing to patch");
    }

    println!("{}", outcome.document);
    Ok(())
}

fn cmd_edit(mut engine: Engine, source: &Path, dry_run: bool, show_diff: bool) -> Result<()> {
    let args = read_args(source)?;
    let edit = match args.shape(engine.workspace())? {
        EditShape::Single(edit) => edit,
        EditShape::Batch(mut edits) if edits.len() == 1 => edits.remove(0),
        EditShape::Batch(edits) => {
            anyhow::bail!(
                "edit applies one change at a time ({} given); use `hashref patch` for batches",
                edits.len()
            )
        }
        EditShape::Legacy { .. } | EditShape::Unrelated => {
            anyhow::bail!("{} contains no hash-reference edit", source.display())
        }
    };

    let replacement = engine.resolve_single(&edit)?;
    let original = fs::read_to_string(&edit.path)
        .with_context(|| format!("failed to read {}", edit.path.display()))?;
    let pinned = Edit::for_replacement(&edit.path, &original, &replacement)?;

    let display_path = engine.workspace().relative(&edit.path);
    if dry_run {
        println!("{}", "[DRY RUN - nothing written]".cyan());
        if show_diff {
            display_diff(&display_path, &original, &pinned.preview(&original)?);
        }
        println!("{} Would edit {}", "✓".green(), display_path);
        return Ok(());
    }

    let result = pinned.apply()?;
    engine.after_edit();

    match result {
        EditResult::Applied { bytes_changed, .. } => {
            if show_diff {
                let updated = fs::read_to_string(&edit.path)?;
                display_diff(&display_path, &original, &updated);
            }
            println!(
                "{} Edited {} ({} bytes written)",
                "✓".green(),
                display_path,
                bytes_changed
            );
        }
        EditResult::AlreadyApplied { .. } => {
            println!("{} {}: already up to date", "⊙".yellow(), display_path);
        }
    }
    Ok(())
}

fn display_diff(file: &str, original: &str, modified: &str) {
    println!("\n{}", format!("--- {file} (original)").dimmed());
    println!("{}", format!("+++ {file} (edited)").dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
