use std::collections::HashMap;

use petgraph::graphmap::DiGraphMap;

use crate::records::{CallFrame, NetworkRecord, RecordId};

/// Canonical form of a URL for lookups: parsed, fragment dropped, reserialized. Strings that do
/// not parse as absolute URLs are kept as they are.
pub fn normalize_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.into()
        }
        Err(_) => url.to_string(),
    }
}

/// Maps request URLs back to the network records that fetched them.
///
/// The records are borrowed from the caller for the lifetime of the index. When several records
/// share a URL, the first one in input order is the one that gets indexed.
pub struct RequestIndex<'a> {
    records: &'a [NetworkRecord],
    by_url: HashMap<String, RecordId>,
}

impl<'a> RequestIndex<'a> {
    pub fn new(records: &'a [NetworkRecord]) -> Self {
        let mut by_url = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            by_url.entry(normalize_url(&record.url)).or_insert_with(|| RecordId::from(i));
        }
        Self { records, by_url }
    }

    pub fn lookup(&self, url: &str) -> Option<(RecordId, &'a NetworkRecord)> {
        self.by_url
            .get(&normalize_url(url))
            .map(|id| (*id, &self.records[id.index()]))
    }

    pub fn record(&self, id: RecordId) -> &'a NetworkRecord {
        &self.records[id.index()]
    }

    pub fn resolver(&self) -> FrameResolver<'_, 'a> {
        FrameResolver { index: self }
    }

    /// Builds the graph of script dependencies between records. There is an edge from `a` to
    /// `b` whenever one of the frames in `a`'s initiator stacks resolves to the script record `b`.
    pub fn dependency_graph(&self, max_stack_depth: usize) -> DependencyGraph {
        let resolver = self.resolver();
        let mut graph = DiGraphMap::new();
        for (i, record) in self.records.iter().enumerate() {
            let id = RecordId::from(i);
            graph.add_node(id);
            for (child, _) in resolver.resolve_initiators(record, max_stack_depth) {
                graph.add_edge(id, child, ());
            }
        }
        DependencyGraph { graph }
    }
}

/// Resolves call frames to the script records that loaded them.
pub struct FrameResolver<'i, 'a> {
    index: &'i RequestIndex<'a>,
}

impl<'i, 'a> FrameResolver<'i, 'a> {
    /// Returns the script record for the frame's URL. Frames pointing at URLs that were never
    /// requested, or that were requested as something other than a script, are not part of the
    /// dependency graph and resolve to `None`.
    pub fn resolve(&self, frame: &CallFrame) -> Option<(RecordId, &'a NetworkRecord)> {
        match self.index.lookup(&frame.url) {
            Some((id, record)) if record.is_script() => Some((id, record)),
            Some((id, record)) => {
                tracing::trace!(url = %frame.url, record = %id, resource_type = record.resource_type.as_str(), "skipping frame resolving to a non-script record");
                None
            }
            None => {
                tracing::trace!(url = %frame.url, "skipping frame with no matching record");
                None
            }
        }
    }

    /// Resolves every frame of `record`'s initiator stack and its parents, dropping unresolved
    /// frames and collapsing repeats of the same script. Order of first appearance is kept.
    pub fn resolve_initiators(&self, record: &NetworkRecord, max_stack_depth: usize) -> Vec<(RecordId, &'a NetworkRecord)> {
        let stack = match &record.initiator.stack {
            Some(stack) => stack,
            None => {
                tracing::trace!(url = %record.url, initiator = record.initiator.kind.as_str(), "no initiator stack");
                return vec![];
            }
        };

        let mut seen = std::collections::HashSet::new();
        stack
            .all_frames(max_stack_depth)
            .filter_map(|frame| self.resolve(frame))
            .filter(|(id, _)| seen.insert(*id))
            .collect()
    }
}

/// Script-to-script dependencies across the whole record set.
pub struct DependencyGraph {
    pub graph: DiGraphMap<RecordId, ()>,
}

impl DependencyGraph {
    /// Whether any chain of script dependencies loops back on itself.
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    pub fn edges(&self) -> impl Iterator<Item = (RecordId, RecordId)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| (a, b))
    }
}
