//! Éclat CLI
//!
//! Validate storefront page configs and preview scroll-driven motion
//! headlessly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eclat_page::{PageConfig, PageLayout, Slot};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod simulate;

use simulate::SimulationOptions;

#[derive(Parser)]
#[command(name = "eclat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Éclat storefront motion CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a page config and print its layout
    Check {
        /// Page config (TOML); defaults to the built-in storefront
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Viewport size used for the layout
        #[arg(long, default_value = "1280x800")]
        viewport: String,
    },

    /// Scroll a page headlessly and report bindings and reveals
    Simulate {
        /// Page config (TOML); defaults to the built-in storefront
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Viewport size
        #[arg(long, default_value = "1280x800")]
        viewport: String,

        /// Target scroll offset in px (defaults to the bottom of the page)
        #[arg(long)]
        to: Option<f32>,

        /// Length of the scroll gesture
        #[arg(long, default_value = "1200")]
        duration_ms: u32,

        /// Frame rate
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Print every frame report as a JSON line
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Check { config, viewport } => cmd_check(config.as_deref(), &viewport),

        Commands::Simulate {
            config,
            viewport,
            to,
            duration_ms,
            fps,
            json,
        } => {
            let options = SimulationOptions {
                viewport: simulate::parse_viewport(&viewport)?,
                to,
                duration_ms,
                fps,
            };
            cmd_simulate(config.as_deref(), options, json)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PageConfig> {
    match path {
        Some(path) => PageConfig::load(path)
            .with_context(|| format!("failed to load page config {}", path.display())),
        None => PageConfig::storefront().context("built-in storefront config is invalid"),
    }
}

fn cmd_check(path: Option<&Path>, viewport: &str) -> Result<()> {
    let config = load_config(path)?;
    let viewport = simulate::parse_viewport(viewport)?;

    info!(
        "Config OK: {} ({} sections, {} bindings, {} reveals)",
        config.brand.name,
        config.sections.len(),
        config.bindings.len(),
        config.reveal_count()
    );

    let layout = PageLayout::build(&config, viewport, &Default::default());
    println!(
        "{} at {}x{}",
        config.brand.name, viewport.width, viewport.height
    );
    println!("document height: {:.1}px", layout.document_height());
    println!();
    for (index, section) in layout.sections().iter().enumerate() {
        let items = layout
            .elements()
            .iter()
            .filter(|e| e.section == index && matches!(e.slot, Slot::Item(_)))
            .count();
        println!(
            "  {:<12} y={:>8.1}  h={:>8.1}  items={}",
            section.id,
            section.rect.y(),
            section.rect.height(),
            items
        );
    }
    println!();
    for binding in &config.bindings {
        println!(
            "  binding {:<20} {:<12} {:?} -> {:?}",
            binding.name, binding.target, binding.input, binding.output
        );
    }

    Ok(())
}

fn cmd_simulate(path: Option<&Path>, options: SimulationOptions, json: bool) -> Result<()> {
    let config = load_config(path)?;
    let sim = simulate::run(config, options)?;

    for report in &sim.reports {
        if json {
            println!("{}", serde_json::to_string(report)?);
            continue;
        }
        if report.triggered.is_empty() && report.completed.is_empty() {
            continue;
        }
        let bindings: Vec<String> = report
            .bindings
            .iter()
            .map(|b| format!("{}={:.1}", b.name, b.value))
            .collect();
        println!(
            "t={:>7.1}ms  offset={:>7.1}  progress={:.3}  [{}]",
            report.time_ms,
            report.scroll_offset,
            report.progress,
            bindings.join(" ")
        );
        for label in &report.triggered {
            println!("    triggered {label}");
        }
        for label in &report.completed {
            println!("    completed {label}");
        }
    }

    if !json {
        println!();
        println!(
            "{} frames, {} reveals triggered, {} pending",
            sim.reports.len(),
            sim.triggered().count(),
            sim.pending.len()
        );
        for label in &sim.pending {
            println!("    pending {label}");
        }
    }

    info!(
        document_height = sim.document_height,
        frames = sim.reports.len(),
        "simulation finished"
    );
    Ok(())
}
