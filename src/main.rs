use anyhow::{Context, Result};
use lineage_graph::config::init_logger;
use lineage_graph::image::discover_images;
use lineage_graph::server::PreviewServer;
use lineage_graph::{Config, Pipeline, RenderOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let config = Config::load().context("Failed to load configuration")?;
    config.apply_log_level();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "serve" => run_preview_server(config).await?,
        "verify" => run_verification(config)?,
        other => {
            log::warn!("Unknown command '{}', running verify", other);
            run_verification(config)?;
        }
    }

    Ok(())
}

/// Serve the live preview
async fn run_preview_server(config: Config) -> Result<()> {
    log::info!("Starting lineage-graph preview v{}", env!("CARGO_PKG_VERSION"));
    let port = config.server.port;
    let server = PreviewServer::new(Pipeline::new(config));
    server.run(port).await?;
    Ok(())
}

/// Load configuration and data, and log whether a render would succeed
fn run_verification(config: Config) -> Result<()> {
    log::info!("Starting lineage-graph v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Project root: {}", config.root().display());
    log::info!("Persons table: {}", config.persons_path().display());
    log::info!("Relations table: {}", config.relations_path().display());
    log::info!("Spirit keywords: {}", config.keyword_terms().join(", "));

    let backgrounds = discover_images(&config.data_dir());
    log::info!("Background images in data directory: {}", backgrounds.len());

    let pipeline = Pipeline::new(config);
    let outcome = pipeline.render();
    if let Some(message) = outcome.message() {
        log::warn!("{}", message);
    }

    match outcome {
        RenderOutcome::Ready(rendered) => {
            log::info!(
                "✓ Ready: {} nodes ({} highlighted), {} edges",
                rendered.model.nodes.len(),
                rendered.model.highlighted_count(),
                rendered.model.edges.len()
            );
            Ok(())
        }
        other => {
            other.into_result().context("Data is not ready to render")?;
            Ok(())
        }
    }
}
