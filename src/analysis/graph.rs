use std::collections::HashMap;

use thiserror::Error;

use super::payload::{GraphLink, GraphNode};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate node id `{id}`")]
    DuplicateNode { id: String },
    #[error("link #{index} ({from} -> {to}) references unknown node `{missing}`")]
    DanglingLink {
        index: usize,
        from: String,
        to: String,
        missing: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransferTotals {
    pub incoming: usize,
    pub outgoing: usize,
    pub received: f64,
    pub sent: f64,
}

/// Validated node/link set for one analysis result.
///
/// Node order is the payload order and is the index space the simulation
/// and projection share. Links keep multigraph duplicates.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    endpoints: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
}

impl GraphModel {
    pub fn new(nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Result<Self, GraphError> {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if index_by_id.insert(node.id.clone(), index).is_some() {
                return Err(GraphError::DuplicateNode {
                    id: node.id.clone(),
                });
            }
        }

        let mut endpoints = Vec::with_capacity(links.len());
        for (index, link) in links.iter().enumerate() {
            let source = index_by_id.get(&link.source).copied();
            let target = index_by_id.get(&link.target).copied();
            match (source, target) {
                (Some(source), Some(target)) => endpoints.push((source, target)),
                (None, _) | (_, None) => {
                    let missing = if source.is_none() {
                        &link.source
                    } else {
                        &link.target
                    };
                    return Err(GraphError::DanglingLink {
                        index,
                        from: link.source.clone(),
                        to: link.target.clone(),
                        missing: missing.clone(),
                    });
                }
            }
        }

        Ok(Self {
            nodes,
            links,
            endpoints,
            index_by_id,
        })
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[GraphLink] {
        &self.links
    }

    pub fn link_endpoints(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn suspicious_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_suspicious).count()
    }

    pub fn transfers_of(&self, index: usize) -> TransferTotals {
        let mut totals = TransferTotals::default();
        for (link, &(source, target)) in self.links().iter().zip(self.link_endpoints()) {
            if source == index {
                totals.outgoing += 1;
                totals.sent += link.amount;
            }
            if target == index {
                totals.incoming += 1;
                totals.received += link.amount;
            }
        }
        totals
    }
}
