use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;

use rla_core::command::build_command;
use rla_core::config::Config;
use rla_core::config::DEFAULT_CONFIG_PATH;
use rla_core::github::resolve_base_ref;
use rla_core::github::GithubEvent;
use rla_exec::contracts::ExitReport;
use rla_exec::installer::Installer;
use rla_exec::runner::shell_request;
use rla_exec::runner::ProcessRunner;
use rla_exec::runner::SystemRunner;

#[derive(Debug, Parser)]
#[command(name = "rla", version, about = "Install rubocop and run it from a linter action config")]
struct Cli {
    /// Linter action config document, relative to the workspace unless absolute.
    #[arg(long, global = true, env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Repository checkout the commands run in.
    #[arg(long, global = true, env = "GITHUB_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Webhook payload written by GitHub Actions; supplies the pull request base.
    #[arg(long, global = true, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Diff base used when the config has no `base_branch`. Overrides the event payload.
    #[arg(long, global = true)]
    base_ref: Option<String>,

    #[arg(long, global = true, env = "GITHUB_BASE_REF", hide = true)]
    github_base_ref: Option<String>,

    /// Log at debug level (RLA_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the rubocop command line.
    Command,
    /// Install rubocop and configured plugin gems.
    Install {
        /// Print the install command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Run rubocop and exit with its status.
    Run {
        /// Install dependencies first.
        #[arg(long)]
        install: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("RLA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_log_directives(verbose)));
    // stdout carries the command line, keep logs off it.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// The binary logs under target `rla`; the `rla_core`/`rla_exec` targets share that prefix.
fn default_log_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("rla={level}")
}

fn run(cli: &Cli) -> Result<i32> {
    let config = load_config(cli)?;

    match cli.command {
        Commands::Command => {
            println!("{}", lint_command(cli, config.as_ref()));
            Ok(0)
        }
        Commands::Install { dry_run } => install(cli, config.as_ref(), dry_run),
        Commands::Run { install: with_install } => {
            if with_install {
                let code = install(cli, config.as_ref(), false)?;
                if code != 0 {
                    return Ok(code);
                }
            }
            let command = lint_command(cli, config.as_ref());
            let report = SystemRunner
                .run(&shell_request(&cli.workspace, &command))
                .context("failed to run rubocop")?;
            Ok(exit_code(report))
        }
    }
}

fn load_config(cli: &Cli) -> Result<Option<Config>> {
    let path = config_path(&cli.workspace, &cli.config);
    let config = Config::load(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    match &config {
        Some(config) => tracing::info!(
            path = %path.display(),
            scope = config.check_scope.label(),
            "using linter config"
        ),
        None => tracing::info!(path = %path.display(), "no linter config, using defaults"),
    }
    Ok(config)
}

fn config_path(workspace: &Path, config: &Path) -> PathBuf {
    if config.is_absolute() {
        config.to_path_buf()
    } else {
        workspace.join(config)
    }
}

fn lint_command(cli: &Cli, config: Option<&Config>) -> String {
    let external_ref = external_ref(cli);
    tracing::debug!(external_ref = ?external_ref, "resolved platform base ref");
    build_command(config, external_ref.as_deref())
}

fn external_ref(cli: &Cli) -> Option<String> {
    if let Some(base_ref) = &cli.base_ref {
        return Some(base_ref.clone());
    }
    let event = cli
        .event_path
        .as_deref()
        .and_then(|path| match GithubEvent::load(path) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring event payload");
                None
            }
        });
    resolve_base_ref(event.as_ref(), cli.github_base_ref.as_deref())
}

fn install(cli: &Cli, config: Option<&Config>, dry_run: bool) -> Result<i32> {
    let defaults = Config::default();
    let installer = Installer::new(config.unwrap_or(&defaults));

    if dry_run {
        println!("{}", installer.request(&cli.workspace));
        return Ok(0);
    }

    let report = installer
        .run(&SystemRunner, &cli.workspace)
        .context("failed to install dependencies")?;
    Ok(exit_code(report))
}

fn exit_code(report: ExitReport) -> i32 {
    report.code.unwrap_or(1)
}
