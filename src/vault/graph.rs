//! Graph-based representation of the vault's resolved links.
//!
//! Each markdown file is a node; every link that resolves is an edge from the
//! file containing it to the file it points at. The edge weight is the index
//! of the link in its source file's link list, so incoming-edge queries can
//! hand back the original `Link` in document order.

use std::collections::HashMap;

use petgraph::prelude::*;

use super::{Link, VaultFile};
use crate::host::{FileStore, MetadataIndex};

/// A link found through the graph: the file containing it, the link itself
/// and the file it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: VaultFile,
    /// Position of the source file in [`FileStore::markdown_files`] order
    pub source_order: usize,
    pub link_index: usize,
    pub link: Link,
}

#[derive(Debug, Default)]
pub struct LinkGraph {
    graph: DiGraph<VaultFile, usize>,
    nodes: HashMap<String, NodeIndex>,
    order: HashMap<String, usize>,
}

impl LinkGraph {
    /// Resolves every link of every markdown file once.
    pub fn build<H: FileStore + MetadataIndex>(host: &H) -> LinkGraph {
        let mut link_graph = LinkGraph::default();
        let files = host.markdown_files();

        for (order, file) in files.iter().enumerate() {
            link_graph.order.insert(file.path.clone(), order);
            link_graph.node(file);
        }

        for file in &files {
            let Some(metadata) = host.file_metadata(&file.path) else {
                continue;
            };
            let source = link_graph.node(file);
            for (link_index, link) in metadata.links.iter().enumerate() {
                if let Some(target) = host.resolve_link(&link.raw_target, &file.path) {
                    let target = link_graph.node(&target);
                    link_graph.graph.add_edge(source, target, link_index);
                }
            }
        }

        tracing::debug!(
            "Built link graph with {} nodes and {} edges",
            link_graph.graph.node_count(),
            link_graph.graph.edge_count()
        );

        link_graph
    }

    fn node(&mut self, file: &VaultFile) -> NodeIndex {
        match self.nodes.get(&file.path) {
            Some(index) => *index,
            None => {
                let index = self.graph.add_node(file.clone());
                self.nodes.insert(file.path.clone(), index);
                index
            }
        }
    }

    /// Links pointing at `path`, ordered by source file, then by position in
    /// the source.
    pub fn incoming<M: MetadataIndex>(&self, index: &M, path: &str) -> Vec<GraphEdge> {
        let Some(target) = self.nodes.get(path) else {
            return vec![];
        };

        let mut edges: Vec<GraphEdge> = self
            .graph
            .edges_directed(*target, Direction::Incoming)
            .filter_map(|edge| {
                let source = &self.graph[edge.source()];
                let link_index = *edge.weight();
                let link = index.file_metadata(&source.path)?.links.get(link_index)?;
                Some(GraphEdge {
                    source: source.clone(),
                    source_order: self.order.get(&source.path).copied().unwrap_or(usize::MAX),
                    link_index,
                    link: link.clone(),
                })
            })
            .collect();

        edges.sort_by_key(|edge| (edge.source_order, edge.link_index));
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
