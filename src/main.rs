//! cache-code-updater: carry hand-annotated scripts and ID tables across
//! game-cache revisions.

#![allow(clippy::struct_excessive_bools)]

use anyhow::{bail, Context, Result};
use cache_code_updater::{
    cli::{self, AlignKind},
    config::{self, AppConfig, AppConfigBuilder, OutputFormat, Validatable},
    pipeline::exit_codes,
};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cache-code-updater")]
#[command(version)]
#[command(about = "Carry local script edits and ID tables onto a new cache revision", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Everything updated, unchanged or skipped on purpose
    1  Some objects failed, were lost upstream, or need review
    3  Error occurred

EXAMPLES:
    # Rebase maintained scripts from one dumped cache onto the next
    cache-code-updater scripts scripts/ --old dump/230 --new dump/231

    # Follow widget ids, writing a commit message
    cache-code-updater widgets src/InterfaceID.java --old dump/230 --new dump/231 \\
        --journal COMMIT_MSG

    # Preview how two versions of a script line up
    cache-code-updater align old.rs2asm new.rs2asm")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "CACHE_CODE_UPDATER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// The two cache snapshots of an update.
#[derive(Args)]
struct SnapshotArgs {
    /// Snapshot the local files were last updated against
    #[arg(long)]
    old: PathBuf,

    /// Snapshot to update to
    #[arg(long)]
    new: PathBuf,
}

/// Flags layered over the config file.
#[derive(Args)]
struct UpdateArgs {
    /// Worker threads (defaults to the available parallelism)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Compute everything but write nothing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip re-validating rebased scripts
    #[arg(long)]
    no_validate: bool,

    /// Version named in the journal subject (defaults to today's date)
    #[arg(long, value_name = "VERSION")]
    cache_version: Option<String>,

    /// Write a commit message for the update to this file
    #[arg(long)]
    journal: Option<PathBuf>,

    /// Summary format
    #[arg(short, long)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how two versions of an artifact line up
    Align {
        /// Old version
        old: PathBuf,

        /// New version
        new: PathBuf,

        /// Artifact kind
        #[arg(short, long, value_enum, default_value = "script")]
        kind: AlignKind,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Carry local edits of one script onto its new upstream version
    Rebase {
        /// Upstream script the local edits were made against
        old_vanilla: PathBuf,

        /// New upstream script
        new_vanilla: PathBuf,

        /// Locally modified script
        old_modified: PathBuf,

        /// Write the merged script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Shift slot-count directives by the upstream change
        #[arg(long)]
        adjust_var_counts: bool,

        #[command(flatten)]
        update: UpdateArgs,
    },

    /// Rebase every maintained script of a directory
    Scripts {
        /// Directory of `<name>.rs2asm` / `<name>.hash` pairs
        dir: PathBuf,

        #[command(flatten)]
        snapshots: SnapshotArgs,

        /// Shift slot-count directives by the upstream change
        #[arg(long)]
        adjust_var_counts: bool,

        #[command(flatten)]
        update: UpdateArgs,
    },

    /// Remap packed widget ids in a constants file
    Widgets {
        /// Constants file to rewrite
        constants: PathBuf,

        #[command(flatten)]
        snapshots: SnapshotArgs,

        #[command(flatten)]
        update: UpdateArgs,
    },

    /// Remap definition ids in a constants file
    Ids {
        /// Constants file to rewrite
        constants: PathBuf,

        /// Table the constants name rows of
        #[arg(short, long)]
        table: String,

        #[command(flatten)]
        snapshots: SnapshotArgs,

        #[command(flatten)]
        update: UpdateArgs,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate an example .cache-code-updater.yaml
    InitConfig {
        /// Where to write it (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Spell out every option with its default
        #[arg(long)]
        full: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let config_path = cli.config.as_deref();

    // Dispatch to command handlers
    match cli.command {
        Commands::Align {
            old,
            new,
            kind,
            format,
        } => {
            let mut builder = AppConfigBuilder::from_config(load_config(config_path)?);
            if let Some(format) = format {
                builder = builder.format(format);
            }
            cli::run_align(&old, &new, kind, &builder.build())
        }

        Commands::Rebase {
            old_vanilla,
            new_vanilla,
            old_modified,
            output,
            adjust_var_counts,
            update,
        } => {
            let config = apply_update_args(load_config(config_path)?, update, adjust_var_counts);
            cli::run_rebase(&old_vanilla, &new_vanilla, &old_modified, output, &config)
        }

        Commands::Scripts {
            dir,
            snapshots,
            adjust_var_counts,
            update,
        } => {
            let config = apply_update_args(load_config(config_path)?, update, adjust_var_counts);
            cli::run_script_update(&dir, &snapshots.old, &snapshots.new, &config)
        }

        Commands::Widgets {
            constants,
            snapshots,
            update,
        } => {
            let config = apply_update_args(load_config(config_path)?, update, false);
            cli::run_widget_update(&constants, &snapshots.old, &snapshots.new, &config)
        }

        Commands::Ids {
            constants,
            table,
            snapshots,
            update,
        } => {
            let config = apply_update_args(load_config(config_path)?, update, false);
            cli::run_id_update(&constants, &table, &snapshots.old, &snapshots.new, &config)
        }

        Commands::ConfigSchema { output } => {
            let schema = config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::InitConfig { output, full } => {
            let target = match output {
                Some(path) => path,
                None => std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(config::file::CONFIG_FILE_NAMES[0]),
            };
            if target.exists() {
                bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            let content = if full {
                config::generate_full_example_config()
            } else {
                config::generate_example_config()
            };
            std::fs::write(&target, content)
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
            Ok(exit_codes::SUCCESS)
        }

        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "cache-code-updater",
                &mut io::stdout(),
            );
            Ok(exit_codes::SUCCESS)
        }
    }
}

/// Load the effective config file and reject it if invalid.
fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let (config, loaded_from) = config::load_or_default(explicit)?;
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  {error}");
        }
        bail!("invalid configuration ({} problems)", errors.len());
    }
    Ok(config)
}

fn apply_update_args(config: AppConfig, args: UpdateArgs, adjust_var_counts: bool) -> AppConfig {
    let mut builder = AppConfigBuilder::from_config(config);
    if args.workers.is_some() {
        builder = builder.workers(args.workers);
    }
    if args.dry_run {
        builder = builder.dry_run(true);
    }
    if args.no_validate {
        builder = builder.validate_output(false);
    }
    if adjust_var_counts {
        builder = builder.adjust_var_counts(true);
    }
    if let Some(version) = args.cache_version {
        builder = builder.version(version);
    }
    if let Some(journal) = args.journal {
        builder = builder.journal(journal);
    }
    if let Some(format) = args.format {
        builder = builder.format(format);
    }
    builder.build()
}
