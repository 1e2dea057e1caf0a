mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// Package and launch a prebuilt Node.js web application
#[derive(Parser)]
#[command(name = "pkgwrap")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a recipe and show the resolved parameters
  Check {
    /// Path to the recipe file
    recipe: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Patch the source, run the build scripts, stage and wrap
  Build {
    /// Path to the recipe file
    recipe: PathBuf,

    /// Fetched source tree
    #[arg(long)]
    src: PathBuf,

    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// Skip the database, code-generation and build scripts
    #[arg(long)]
    skip_scripts: bool,
  },

  /// Stage an already built source tree and generate launchers
  Install {
    /// Path to the recipe file
    recipe: PathBuf,

    /// Built source tree
    #[arg(long)]
    src: PathBuf,

    /// Output directory
    #[arg(long)]
    out: PathBuf,
  },

  /// Check a staged tree against its completion marker
  Verify {
    /// Output directory or staged root
    path: PathBuf,
  },

  /// Run a launcher from a launch plan (invoked by the generated shims)
  Launch {
    /// Path to launch.json
    plan: PathBuf,

    /// Launcher artifact name (server, migrate)
    launcher: String,

    /// Arguments forwarded to the artifact
    #[arg(last = true, allow_hyphen_values = true)]
    args: Vec<String>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Check { recipe, output } => cmd::cmd_check(&recipe, output),
    Commands::Build {
      recipe,
      src,
      out,
      skip_scripts,
    } => cmd::cmd_build(&recipe, &src, &out, !skip_scripts),
    Commands::Install { recipe, src, out } => cmd::cmd_install(&recipe, &src, &out),
    Commands::Verify { path } => cmd::cmd_verify(&path),
    Commands::Launch { plan, launcher, args } => cmd::cmd_launch(&plan, &launcher, &args),
  }
}
