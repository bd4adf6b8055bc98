use super::FlowTable;
use crate::flow::FlowKey;
use std::collections::HashMap;
use tracing::trace;

/// One-level view of how completed flows chain together: an edge `A -> B`
/// means B originates from the host A was talking to. Matching is by host,
/// not full endpoint, since a relay opens its outbound leg from a fresh
/// source port. Only direct children are computed, so cyclic capture data
/// cannot cause unbounded traversal.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionTree {
    edges: HashMap<FlowKey, Vec<FlowKey>>,
}

impl ConnectionTree {
    /// Read-only pass over a finished table. Every completed-handshake
    /// flow gets an entry, children in table order.
    pub fn build(table: &FlowTable) -> Self {
        let mut edges = HashMap::new();
        for upstream in table.iter().filter(|flow| flow.completed_handshake()) {
            let mut downstream: Vec<FlowKey> = Vec::new();
            for candidate in table.iter().filter(|flow| flow.completed_handshake()) {
                if candidate.key == upstream.key {
                    continue;
                }
                if candidate.source.ip == upstream.destination.ip
                    && candidate.destination.ip != upstream.source.ip
                {
                    trace!(
                        upstream = %upstream.key.endpoints,
                        downstream = %candidate.key.endpoints,
                        "Linked chained flows"
                    );
                    downstream.push(candidate.key);
                }
            }
            edges.insert(upstream.key, downstream);
        }
        ConnectionTree { edges }
    }

    /// Direct downstream flows of `key`; empty for keys that never
    /// completed a handshake.
    pub fn downstream(&self, key: &FlowKey) -> &[FlowKey] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &FlowKey) -> bool {
        self.edges.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
