//! Order Builder CLI
//!
//! Show config (YAML) → timing sheet + performer call sheets
//! Master CSV → hard-rule audit

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "order_builder")]
#[command(about = "Generate and audit run-order sheets", long_about = None)]
struct Cli {
    /// Log debug-level scheduling decisions
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Generate the master sheet and call sheets from a show config
    Generate {
        /// Show config YAML path
        #[arg(long)]
        config: PathBuf,

        /// Output directory
        #[arg(long)]
        out: PathBuf,

        /// Output history snapshot JSON file
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Re-check a master sheet against the hard rules
    Validate {
        /// Master sheet CSV path (show_order.csv)
        #[arg(long)]
        csv: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Generate {
            config,
            out,
            history,
        } => generate(&config, &out, history.as_deref()),
        Commands::Validate { csv } => validate(&csv),
    }
}

#[cfg(feature = "cli")]
fn generate(config_path: &Path, out: &Path, history: Option<&Path>) -> Result<()> {
    println!("🎭 Generating run order...");
    println!("   Config: {}", config_path.display());
    println!("   Output: {}", out.display());

    let config = order_core::ShowConfig::from_path(config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    let schedule = order_core::generate_schedule(&config).context("Scheduling failed")?;
    let manifest = order_builder::write_checked_sheets(out, &config, &schedule)
        .context("❌ Sheets not written")?;

    println!("\n✅ Schedule built successfully!");
    println!("   Runs:          {}", manifest.runs);
    println!("   Intermissions: {}", manifest.intermissions);
    println!("   Relaxations:   {}", schedule.relaxation_count());
    println!("   Master sheet:  {}", manifest.master.display());
    for path in &manifest.call_sheets {
        println!("   Call sheet:    {}", path.display());
    }

    if let Some(path) = history {
        let snapshot = schedule
            .history
            .snapshot(&schedule.roster, config.character_names());
        order_builder::write_history(path, &snapshot)?;
        println!("\n📄 History saved to: {}", path.display());
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn validate(csv: &Path) -> Result<()> {
    println!("🔍 Validating {}...", csv.display());

    let sheet = order_builder::read_master_sheet(csv)?;
    let report = order_core::validate_runs(&sheet.runs);

    println!("   Characters: {} / {}", sheet.characters[0], sheet.characters[1]);
    println!("   {}", report.summary());

    if report.is_valid() {
        println!("✅ All hard rules hold");
        Ok(())
    } else {
        anyhow::bail!("❌ {} violation(s) found", report.violations.len())
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("order_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
