mod client;
mod export;
mod graph;
mod load;
mod payload;

use std::path::PathBuf;

use thiserror::Error;

pub use export::{EXPORT_FILE_NAME, export_result};
pub use graph::{GraphError, GraphModel};
pub use load::{AnalysisSource, LoadedAnalysis, load_analysis};
pub use payload::{AnalysisResult, GraphNode, SuspiciousAccount};

#[cfg(test)]
pub(crate) use graph::fixtures;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Service { status: u16, message: String },
    #[error("malformed analysis payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid transaction graph: {0}")]
    Graph(#[from] GraphError),
}

impl LoadError {
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|status| status.as_u16()),
            Self::Io { .. } | Self::Malformed(_) | Self::Graph(_) => None,
        }
    }
}
