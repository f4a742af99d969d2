pub mod config;
pub mod error;
pub mod table;
pub mod graph;
pub mod person;
pub mod image;
pub mod visual;
pub mod export;
pub mod pipeline;
pub mod server;

pub use config::Config;
pub use error::{LineageError, Result};
pub use graph::{build_graph, parse_relations, Graph, NodeId, RelationTriple};
pub use pipeline::{Pipeline, RenderOutcome, Rendered};
