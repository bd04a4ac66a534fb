use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::config::AnalysisConfig;
use crate::graph::{DependencyGraph, EdgeDirection};
use crate::model::Model;
use crate::references::ReferenceRegistry;
use crate::{log_op_end, log_op_start};

/// Layer bucket for ids that appear in references but not in the model
pub const UNKNOWN_LAYER: &str = "unknown";

/// Which way to trace from an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceDirection {
    /// What the element depends on (follows its outgoing references)
    Up,
    /// What depends on the element (follows incoming references)
    Down,
    /// Union of both
    Both,
}

/// One simple path between two elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyPath {
    pub source: String,
    pub target: String,
    /// Element ids from source to target inclusive
    pub path: Vec<String>,
    /// Number of hops
    pub depth: usize,
    /// Reference type of each hop, in path order
    pub relationship_types: Vec<String>,
}

/// Read-only dependency queries over a model and its references
#[derive(Debug)]
pub struct DependencyTracker<'m> {
    model: &'m Model,
    graph: DependencyGraph,
    config: AnalysisConfig,
}

impl<'m> DependencyTracker<'m> {
    /// Register every element of `model` into a fresh registry and build the graph
    pub fn new(model: &'m Model) -> Self {
        Self::new_with_config(model, AnalysisConfig::default())
    }

    /// Like `new`, but the registry scans with `config.reference_scan_depth`
    /// and queries default to the config's limits
    pub fn new_with_config(model: &'m Model, config: AnalysisConfig) -> Self {
        let start = Instant::now();
        log_op_start!("tracker_build", element_count = model.len());

        let mut registry = ReferenceRegistry::from_config(&config);
        registry.register_model(model);
        let tracker = Self {
            model,
            graph: registry.dependency_graph(),
            config,
        };

        log_op_end!(
            "tracker_build",
            duration_ms = start.elapsed().as_millis() as u64,
            reference_count = registry.len()
        );
        tracker
    }

    /// Build the graph from an already populated registry
    pub fn with_registry(model: &'m Model, registry: &ReferenceRegistry) -> Self {
        let start = Instant::now();
        log_op_start!("tracker_build", element_count = model.len());

        let tracker = Self {
            model,
            graph: registry.dependency_graph(),
            config: AnalysisConfig::default(),
        };

        log_op_end!(
            "tracker_build",
            duration_ms = start.elapsed().as_millis() as u64,
            reference_count = registry.len()
        );
        tracker
    }

    /// Replace the defaults used when callers pass no limit
    ///
    /// The graph is already built; use `new_with_config` for the scan depth.
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Elements reachable from `element_id` in `direction`
    ///
    /// `max_depth` of `None` means unlimited. The element itself is never
    /// included, even when it sits on a cycle. Unknown ids yield an empty set.
    pub fn trace_dependencies(
        &self,
        element_id: &str,
        direction: TraceDirection,
        max_depth: Option<usize>,
    ) -> BTreeSet<String> {
        let trace = |edge_direction: EdgeDirection| match max_depth {
            Some(depth) => self.graph.reachable_within(element_id, edge_direction, depth),
            None => self.graph.reachable(element_id, edge_direction),
        };

        match direction {
            TraceDirection::Up => trace(EdgeDirection::Outgoing),
            TraceDirection::Down => trace(EdgeDirection::Incoming),
            TraceDirection::Both => {
                let mut all = trace(EdgeDirection::Outgoing);
                all.extend(trace(EdgeDirection::Incoming));
                all
            }
        }
    }

    /// Simple paths from `source` to `target`, with the reference type of each hop
    ///
    /// Stops after `max_paths` (config default when `None`).
    pub fn find_dependency_paths(
        &self,
        source: &str,
        target: &str,
        max_paths: Option<usize>,
    ) -> Vec<DependencyPath> {
        let limit = max_paths.unwrap_or(self.config.max_paths);

        self.graph
            .simple_paths(source, target, limit)
            .into_iter()
            .map(|path| {
                let relationship_types = path
                    .windows(2)
                    .map(|hop| {
                        self.graph
                            .edge_type(&hop[0], &hop[1])
                            .unwrap_or_default()
                            .to_string()
                    })
                    .collect();
                DependencyPath {
                    source: source.to_string(),
                    target: target.to_string(),
                    depth: path.len() - 1,
                    path,
                    relationship_types,
                }
            })
            .collect()
    }

    /// Everything connected to `element_id` in either direction, grouped by layer
    ///
    /// Ids referenced but absent from the model land under `"unknown"`.
    pub fn dependency_layers(&self, element_id: &str) -> BTreeMap<String, BTreeSet<String>> {
        let mut layers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for id in self.trace_dependencies(element_id, TraceDirection::Both, None) {
            let layer = self
                .model
                .get(&id)
                .map(|element| element.layer.clone())
                .unwrap_or_else(|| UNKNOWN_LAYER.to_string());
            layers.entry(layer).or_default().insert(id);
        }
        layers
    }

    /// Model elements with no incoming or outgoing references, in id order
    pub fn orphaned_elements(&self) -> Vec<String> {
        self.model
            .elements()
            .filter(|element| self.graph.degree(&element.id) == 0)
            .map(|element| element.id.clone())
            .collect()
    }

    /// Elements whose total degree reaches `threshold` (config default when `None`)
    ///
    /// Sorted by degree descending, then id ascending. Parallel references
    /// each count toward the degree.
    pub fn hub_elements(&self, threshold: Option<usize>) -> Vec<(String, usize)> {
        let threshold = threshold.unwrap_or(self.config.hub_threshold);
        let mut hubs: Vec<(String, usize)> = self
            .graph
            .nodes()
            .map(|id| (id.to_string(), self.graph.degree(id)))
            .filter(|(_, degree)| *degree >= threshold)
            .collect();
        hubs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hubs
    }
}
