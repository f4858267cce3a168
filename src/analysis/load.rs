use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use super::client::{classify_response, upload_csv};
use super::graph::GraphModel;
use super::payload::{AnalysisResponse, AnalysisResult, Transaction};
use super::LoadError;

#[derive(Clone, Debug)]
pub enum AnalysisSource {
    Upload {
        endpoint: String,
        csv_path: PathBuf,
        timeout: Duration,
    },
    SavedResponse {
        path: PathBuf,
    },
}

impl AnalysisSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Upload { csv_path, .. } => csv_path.display().to_string(),
            Self::SavedResponse { path } => path.display().to_string(),
        }
    }
}

pub struct LoadedAnalysis {
    pub result: AnalysisResult,
    pub transactions: Vec<Transaction>,
    pub model: GraphModel,
}

pub fn load_analysis(source: &AnalysisSource) -> Result<LoadedAnalysis, LoadError> {
    let body = match source {
        AnalysisSource::Upload {
            endpoint,
            csv_path,
            timeout,
        } => upload_csv(endpoint, csv_path, *timeout)?,
        AnalysisSource::SavedResponse { path } => {
            let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            classify_response(200, &raw)?
        }
    };

    let loaded = decode_body(body).inspect_err(|error| {
        warn!(source = %source.describe(), %error, "rejected analysis payload");
    })?;
    info!(
        source = %source.describe(),
        nodes = loaded.model.node_count(),
        links = loaded.model.link_count(),
        flagged = loaded.result.suspicious_accounts.len(),
        "analysis loaded"
    );
    Ok(loaded)
}

pub(super) fn decode_body(body: Value) -> Result<LoadedAnalysis, LoadError> {
    let response: AnalysisResponse = serde_json::from_value(body)?;
    let (result, transactions, nodes, links) = response.into_parts();
    let model = GraphModel::new(nodes, links)?;
    Ok(LoadedAnalysis {
        result,
        transactions,
        model,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::analysis::GraphError;

    fn body(edges: Value) -> Value {
        json!({
            "transactions": [],
            "suspicious_accounts": [],
            "fraud_rings": [],
            "summary": {
                "total_accounts_analyzed": 1,
                "suspicious_accounts_flagged": 0,
                "fraud_rings_detected": 0,
                "processing_time_seconds": 0.0
            },
            "nodes": [{"id": "A", "degree": 1, "isSuspicious": false}],
            "edges": edges
        })
    }

    #[test]
    fn dangling_link_fails_before_any_model_exists() {
        let error = decode_body(body(json!([{"source": "A", "target": "Z", "amount": 1, "timestamp": ""}])))
            .err()
            .unwrap();
        assert!(matches!(
            error,
            LoadError::Graph(GraphError::DanglingLink { ref missing, .. }) if missing == "Z"
        ));
    }

    #[test]
    fn edges_become_model_links() {
        let loaded = decode_body(body(json!([{"source": "A", "target": "A", "amount": 5, "timestamp": "t"}])))
            .ok()
            .unwrap();
        assert_eq!(loaded.model.link_count(), 1);
        assert_eq!(loaded.model.link_endpoints(), &[(0, 0)]);
    }

    #[test]
    fn link_without_amount_is_malformed() {
        let error = decode_body(body(json!([{"source": "A", "target": "A", "timestamp": "t"}])))
            .err()
            .unwrap();
        assert!(matches!(error, LoadError::Malformed(_)));
    }

    #[test]
    fn node_without_degree_is_malformed() {
        let mut payload = body(json!([]));
        payload["nodes"] = json!([{"id": "A"}]);
        assert!(matches!(decode_body(payload), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn account_without_patterns_is_malformed() {
        let mut payload = body(json!([]));
        payload["suspicious_accounts"] = json!([{"account_id": "A", "suspicion_score": 50.0}]);
        assert!(matches!(decode_body(payload), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn absent_flag_and_ring_fall_back() {
        let mut payload = body(json!([]));
        payload["nodes"] = json!([{"id": "A", "degree": 0}]);
        payload["suspicious_accounts"] = json!([
            {"account_id": "A", "suspicion_score": 50.0, "detected_patterns": []}
        ]);
        let loaded = decode_body(payload).ok().unwrap();
        assert!(!loaded.model.nodes()[0].is_suspicious);
        assert_eq!(loaded.result.suspicious_accounts[0].ring_id, None);
    }

    #[test]
    fn saved_response_goes_through_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", body(json!([]))).unwrap();

        let source = AnalysisSource::SavedResponse {
            path: file.path().to_path_buf(),
        };
        let loaded = load_analysis(&source).ok().unwrap();
        assert_eq!(loaded.model.node_count(), 1);
    }

    #[test]
    fn missing_saved_file_is_an_io_error() {
        let source = AnalysisSource::SavedResponse {
            path: PathBuf::from("/definitely/not/here.json"),
        };
        assert!(matches!(load_analysis(&source), Err(LoadError::Io { .. })));
    }
}
