//! CLI entry point for the sitegen static-site builder.
//!
//! # Usage
//!
//! ```bash
//! sitegen [OPTIONS] <COMMAND>
//!
//! # Render pages and mirror assets once
//! sitegen build --source www --destination _site
//!
//! # Build, then rebuild on every change until Ctrl-C
//! sitegen watch -s www -d _site
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use sg_core::{Config, ErrorPolicy};
use sg_site::SiteGenerator;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration file picked up from the working directory when `--config`
/// is not given.
const DEFAULT_CONFIG_FILE: &str = "sitegen.json";

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Incremental static-site builder.
///
/// Renders the top-level templates of a source directory and mirrors its
/// `css/`, `js/` and `img/` directories into a destination directory.
#[derive(Parser)]
#[command(name = "sitegen", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Source directory holding templates and assets.
    #[arg(short, long, global = true, env = "SITEGEN_SOURCE")]
    source: Option<Utf8PathBuf>,

    /// Destination directory for the generated site.
    #[arg(short, long, global = true, env = "SITEGEN_DESTINATION")]
    destination: Option<Utf8PathBuf>,

    /// JSON configuration file.
    ///
    /// Defaults to `sitegen.json` in the working directory if it exists.
    #[arg(short, long, global = true, env = "SITEGEN_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Render every page and synchronize every asset directory once.
    Build {
        /// Keep rendering after a page fails and report all failures.
        #[arg(short, long)]
        keep_going: bool,
    },

    /// Rebuild on every change until interrupted.
    Watch {
        /// Skip the full build before watching.
        #[arg(long)]
        no_initial_build: bool,

        /// Debounce window in milliseconds.
        #[arg(long, env = "SITEGEN_DEBOUNCE_MS")]
        debounce_ms: Option<u64>,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// The `notify` backend is filtered to `warn` level.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Loads the configuration file, then applies command-line overrides.
///
/// # Errors
///
/// Returns an error if an explicitly named file cannot be loaded, or if the
/// default file exists but is invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None if Utf8Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            Config::load(Utf8Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Config::default(),
    };

    if let Some(source) = &cli.source {
        config.site.source.clone_from(source);
    }
    if let Some(destination) = &cli.destination {
        config.site.destination.clone_from(destination);
    }

    match &cli.command {
        Commands::Build { keep_going } => {
            if *keep_going {
                config.build.on_error = ErrorPolicy::Continue;
            }
        }
        Commands::Watch {
            no_initial_build,
            debounce_ms,
        } => {
            if *no_initial_build {
                config.watch.initial_build = false;
            }
            if let Some(ms) = debounce_ms {
                config.watch.debounce_ms = *ms;
            }
        }
    }

    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs a one-shot build and prints its summary.
///
/// # Errors
///
/// Returns an error if the build fails, or if any page failed under
/// `--keep-going`.
fn run_build(config: Config) -> color_eyre::Result<()> {
    let generator = SiteGenerator::new(config)?;
    info!(source = %generator.site().source_root(), "Starting build");

    let report = generator.generate()?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{report}")?;
    for failure in &report.pages.failures {
        writeln!(handle, "  {} - {}", failure.page, failure.error)?;
    }

    if !report.pages.is_success() {
        return Err(color_eyre::eyre::eyre!(
            "{} page(s) failed to render",
            report.pages.failures.len()
        ));
    }
    Ok(())
}

/// Watches the source tree until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the site is invalid or cannot be watched.
async fn run_watch(config: Config) -> color_eyre::Result<()> {
    let generator = SiteGenerator::new(config)?;
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        trigger.cancel();
    });

    let (outcome, stats) = generator.generate_on_file_change(&cancel).await?;
    info!(outcome = ?outcome, "Stopped watching");

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{stats}")?;
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM on Unix.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(error) => tracing::warn!(error = %error, "Cannot listen for SIGTERM"),
        }
    }

    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl-C, shutting down");
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Route to appropriate command
    let config = build_config(&cli)?;
    match cli.command {
        Commands::Build { .. } => run_build(config),
        Commands::Watch { .. } => run_watch(config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    /// Parses `args` with `--config` pointing at a scratch file, so neither a
    /// `sitegen.json` in the working directory nor `SITEGEN_CONFIG` is read.
    fn parse_with_config(contents: &str, args: &[&str]) -> (tempfile::TempDir, Cli) {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("site.json");
        std::fs::write(&path, contents).unwrap();

        let mut argv = vec!["sitegen", "--config", path.to_str().unwrap()];
        argv.extend_from_slice(args);
        (temp, Cli::parse_from(argv))
    }

    #[test]
    fn test_flags_override_file_values() {
        let (_temp, cli) = parse_with_config(
            r#"{"site": {"source": "from-file", "destination": "out"},
                "watch": {"debounce_ms": 5}}"#,
            &[
                "-s", "www", "-d", "public", "watch", "--no-initial-build",
                "--debounce-ms", "250",
            ],
        );
        let config = build_config(&cli).unwrap();

        assert_eq!(config.site.source, "www");
        assert_eq!(config.site.destination, "public");
        assert!(!config.watch.initial_build);
        assert_eq!(config.watch.debounce_ms, 250);
    }

    #[test]
    fn test_file_values_kept_without_flags() {
        let (_temp, cli) = parse_with_config(
            r#"{"build": {"template_suffix": ".htm"}, "sync": {"parallel": false}}"#,
            &["build"],
        );
        let config = build_config(&cli).unwrap();

        assert_eq!(config.build.template_suffix, ".htm");
        assert!(!config.sync.parallel);
        assert_eq!(config.build.on_error, ErrorPolicy::Abort);
    }

    #[test]
    fn test_keep_going_switches_policy() {
        let (_temp, cli) = parse_with_config("{}", &["build", "--keep-going"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.build.on_error, ErrorPolicy::Continue);
    }
}
