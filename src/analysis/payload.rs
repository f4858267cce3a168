use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnalysisResponse {
    pub transactions: Vec<Transaction>,
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: AnalysisSummary,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphLink>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Transaction {
    #[serde(deserialize_with = "id_string")]
    pub transaction_id: String,
    #[serde(deserialize_with = "id_string")]
    pub sender_id: String,
    #[serde(deserialize_with = "id_string")]
    pub receiver_id: String,
    pub amount: f64,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SuspiciousAccount {
    #[serde(deserialize_with = "id_string")]
    pub account_id: String,
    pub suspicion_score: f64,
    pub detected_patterns: Vec<String>,
    pub ring_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FraudRing {
    pub ring_id: String,
    #[serde(deserialize_with = "id_strings")]
    pub member_accounts: Vec<String>,
    pub pattern_type: String,
    pub risk_score: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnalysisSummary {
    pub total_accounts_analyzed: u64,
    pub suspicious_accounts_flagged: u64,
    pub fraud_rings_detected: u64,
    pub processing_time_seconds: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GraphNode {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub degree: u32,
    #[serde(default, rename = "isSuspicious")]
    pub is_suspicious: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GraphLink {
    #[serde(deserialize_with = "id_string")]
    pub source: String,
    #[serde(deserialize_with = "id_string")]
    pub target: String,
    pub amount: f64,
    pub timestamp: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResult {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: AnalysisSummary,
}

impl AnalysisResponse {
    pub fn into_parts(self) -> (AnalysisResult, Vec<Transaction>, Vec<GraphNode>, Vec<GraphLink>) {
        let result = AnalysisResult {
            suspicious_accounts: self.suspicious_accounts,
            fraud_rings: self.fraud_rings,
            summary: self.summary,
        };
        (result, self.transactions, self.nodes, self.edges)
    }
}

// Ids arrive as JSON strings or numbers; the service reads numeric-looking
// CSV columns as integers.
fn id_from_value(value: Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(format!("expected string or number id, found {other}")),
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(value).map_err(serde::de::Error::custom)
}

fn id_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(|value| id_from_value(value).map_err(serde::de::Error::custom))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "transactions": [
            {"transaction_id": 1, "sender_id": "A", "receiver_id": "B", "amount": 100.0, "timestamp": "2024-01-01 00:00:00"}
        ],
        "suspicious_accounts": [
            {"account_id": "B", "suspicion_score": 87.25, "detected_patterns": ["cycle_length_3", "fan_in"], "ring_id": "RING_001"}
        ],
        "fraud_rings": [
            {"ring_id": "RING_001", "member_accounts": ["B", 42], "pattern_type": "cycle", "risk_score": 90.0}
        ],
        "summary": {"total_accounts_analyzed": 2, "suspicious_accounts_flagged": 1, "fraud_rings_detected": 1, "processing_time_seconds": 0.012},
        "nodes": [{"id": "A", "degree": 1, "isSuspicious": false}, {"id": "B", "degree": 1, "isSuspicious": true}],
        "edges": [{"source": "A", "target": "B", "amount": 100, "timestamp": "2024-01-01 00:00:00"}]
    }"#;

    #[test]
    fn decodes_service_body() {
        let response: AnalysisResponse = serde_json::from_str(BODY).unwrap();
        assert_eq!(response.transactions[0].transaction_id, "1");
        assert_eq!(response.fraud_rings[0].member_accounts, vec!["B", "42"]);
        assert!(response.nodes[1].is_suspicious);
        assert_eq!(response.edges[0].amount, 100.0);
    }

    #[test]
    fn numeric_node_ids_become_strings() {
        let node: GraphNode = serde_json::from_str(r#"{"id": 1007, "degree": 3}"#).unwrap();
        assert_eq!(node.id, "1007");
        assert!(!node.is_suspicious);
    }

    #[test]
    fn missing_edges_field_is_rejected() {
        let mut value: Value = serde_json::from_str(BODY).unwrap();
        value.as_object_mut().unwrap().remove("edges");
        assert!(serde_json::from_value::<AnalysisResponse>(value).is_err());
    }

    #[test]
    fn split_keeps_report_document() {
        let response: AnalysisResponse = serde_json::from_str(BODY).unwrap();
        let (result, transactions, nodes, links) = response.into_parts();
        assert_eq!(result.suspicious_accounts[0].ring_id.as_deref(), Some("RING_001"));
        assert_eq!(result.summary.fraud_rings_detected, 1);
        assert_eq!((transactions.len(), nodes.len(), links.len()), (1, 2, 1));
    }
}
