use anyhow::{Context, Result};
use clap::Parser;
use lineage_graph::config::init_logger;
use lineage_graph::image::discover_images;
use lineage_graph::{build_graph, parse_relations, Config, Pipeline};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "stats")]
#[command(about = "Show statistics for the person and relation tables")]
struct Args {
    /// Print statistics as JSON
    #[arg(long)]
    json: bool,

    /// Number of most-connected persons to list
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[derive(Serialize, Debug)]
struct KeywordCount {
    term: String,
    description: String,
    persons: usize,
}

#[derive(Serialize, Debug)]
struct Degree {
    name: String,
    outgoing: usize,
}

#[derive(Serialize, Debug)]
struct Stats {
    persons: usize,
    relation_rows: usize,
    triples: usize,
    nodes: usize,
    edges: usize,
    highlighted: usize,
    /// Graph nodes with no person record (rendered with the placeholder)
    unresolved: Vec<String>,
    keywords: Vec<KeywordCount>,
    most_connected: Vec<Degree>,
    images: Vec<String>,
}

fn collect(pipeline: &Pipeline, top: usize) -> Stats {
    let config = pipeline.config();
    let keywords = pipeline.keywords();
    let persons = pipeline.load_persons();
    let relations = pipeline.load_relations();
    let triples = parse_relations(&relations);
    let graph = build_graph(&triples);

    let highlighted = graph
        .nodes()
        .filter(|id| persons.resolve(id.as_str(), keywords).highlighted)
        .count();

    let unresolved = graph
        .nodes()
        .filter(|id| persons.find(id.as_str()).is_none())
        .map(|id| id.to_string())
        .collect();

    let keyword_counts = config
        .spirit
        .keywords
        .iter()
        .map(|keyword| {
            let term = keyword.term.trim();
            KeywordCount {
                term: term.to_string(),
                description: keyword.description.clone(),
                persons: persons.records().iter().filter(|r| r.bio.contains(term)).count(),
            }
        })
        .collect();

    let mut most_connected: Vec<Degree> = graph
        .nodes()
        .map(|id| Degree {
            name: id.to_string(),
            outgoing: graph.neighbors_out(id).count(),
        })
        .filter(|d| d.outgoing > 0)
        .collect();
    most_connected.sort_by(|a, b| b.outgoing.cmp(&a.outgoing));
    most_connected.truncate(top);

    let images = discover_images(&config.data_dir())
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();

    Stats {
        persons: persons.len(),
        relation_rows: relations.len(),
        triples: triples.len(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        highlighted,
        unresolved,
        keywords: keyword_counts,
        most_connected,
        images,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logger();
    let config = Config::load().context("Failed to load configuration")?;
    config.apply_log_level();

    let pipeline = Pipeline::new(config);
    let stats = collect(&pipeline, args.top);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("\n=== Lineage Graph Statistics ===\n");
    println!("Persons:          {}", stats.persons);
    println!("Relation rows:    {}", stats.relation_rows);
    println!("Parsed triples:   {}", stats.triples);
    println!("Nodes:            {}", stats.nodes);
    println!("Edges:            {}", stats.edges);
    println!("Highlighted:      {}", stats.highlighted);

    println!("\nSpirit keywords (persons mentioning):");
    println!("{:-<40}", "");
    for keyword in &stats.keywords {
        println!("{:<20} {:>8}", keyword.term, keyword.persons);
    }

    println!("\n五老精神 诠释与宣言:");
    println!("{:-<40}", "");
    for keyword in &stats.keywords {
        println!("{}: {}", keyword.term, keyword.description);
    }

    if !stats.most_connected.is_empty() {
        println!("\nMost connected:");
        println!("{:-<40}", "");
        for degree in &stats.most_connected {
            println!("{:<20} {:>8}", degree.name, degree.outgoing);
        }
    }

    if stats.unresolved.is_empty() {
        println!("\nEvery node has a person record.");
    } else {
        println!("\nNodes without a person record ({}):", stats.unresolved.len());
        for name in &stats.unresolved {
            println!("  {}", name);
        }
    }

    println!("\nBackground images in {}:", pipeline.config().data_dir().display());
    if stats.images.is_empty() {
        println!("  (none)");
    }
    for image in &stats.images {
        println!("  {}", image);
    }
    println!();

    Ok(())
}
