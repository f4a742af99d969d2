use anyhow::{Context, Result};
use clap::Parser;
use lineage_graph::config::init_logger;
use lineage_graph::{Config, LineageError, Pipeline};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export")]
#[command(about = "Export the lineage graph as a self-contained HTML page")]
struct Args {
    /// Output file (default: <export_dir>/<export_file> from the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Background image reference (absolute path or file name under avatars/data/root)
    #[arg(long)]
    background_image: Option<String>,

    /// Accent color for highlights and the detail panel
    #[arg(long)]
    accent: Option<String>,

    /// Edge color
    #[arg(long)]
    edge: Option<String>,

    /// Page background color (used when no background image resolves)
    #[arg(long)]
    background: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logger();
    let mut config = Config::load().context("Failed to load configuration")?;
    config.apply_log_level();

    if let Some(image) = args.background_image {
        config.style.background_image = Some(image);
    }
    if let Some(accent) = args.accent {
        config.style.accent_color = accent;
    }
    if let Some(edge) = args.edge {
        config.style.edge_color = edge;
    }
    if let Some(background) = args.background {
        config.style.background = background;
    }
    config.validate().context("Invalid style override")?;

    let pipeline = Pipeline::new(config);
    match pipeline.export(args.output.as_deref()) {
        Ok(report) => {
            println!("Exported: {}", report.path.display());
            println!("  Size:      {} bytes", report.bytes);
            println!("  SHA-256:   {}", report.sha256);
            println!("  Generated: {}", report.generated_at.to_rfc3339());
            Ok(())
        }
        Err(e @ (LineageError::DataNotReady(_) | LineageError::NoRelations)) => {
            eprintln!("Nothing to export: {}", e);
            Err(e.into())
        }
        Err(e) => Err(e).context("Export failed"),
    }
}
