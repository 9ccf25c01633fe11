//! Finding the links that point into a set of files.
//!
//! Two strategies answer the same question. [`ForwardScan`] walks every
//! markdown file and resolves each of its links. [`ReverseIndex`] resolves
//! everything once into a [`LinkGraph`] and asks for incoming edges. Both
//! return hits ordered by source file, then by position in the source.

use std::collections::HashSet;

use itertools::Itertools;

use crate::config::BacklinkStrategy;
use crate::host::{FileStore, MetadataIndex};
use crate::vault::{Link, LinkGraph, VaultFile};

/// A link in `source` that resolves to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHit {
    pub source: VaultFile,
    pub link: Link,
    pub target: VaultFile,
}

pub trait LinkFinder<H: FileStore + MetadataIndex> {
    /// Every link in the vault whose resolved destination is one of `targets`.
    fn links_into(&self, host: &H, targets: &[VaultFile]) -> Vec<LinkHit>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardScan;

impl<H: FileStore + MetadataIndex> LinkFinder<H> for ForwardScan {
    fn links_into(&self, host: &H, targets: &[VaultFile]) -> Vec<LinkHit> {
        let wanted: HashSet<&str> = targets.iter().map(|file| file.path.as_str()).collect();

        host.markdown_files()
            .into_iter()
            .flat_map(|source| {
                let links = host
                    .file_metadata(&source.path)
                    .map(|md| md.links.clone())
                    .unwrap_or_default();

                links
                    .into_iter()
                    .filter_map(|link| {
                        let target = host.resolve_link(&link.raw_target, &source.path)?;
                        wanted.contains(target.path.as_str()).then(|| LinkHit {
                            source: source.clone(),
                            link,
                            target,
                        })
                    })
                    .collect_vec()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseIndex;

impl<H: FileStore + MetadataIndex> LinkFinder<H> for ReverseIndex {
    fn links_into(&self, host: &H, targets: &[VaultFile]) -> Vec<LinkHit> {
        let graph = LinkGraph::build(host);
        if graph.edge_count() == 0 {
            return vec![];
        }

        targets
            .iter()
            .unique_by(|target| target.path.as_str())
            .flat_map(|target| {
                graph
                    .incoming(host, &target.path)
                    .into_iter()
                    .map(move |edge| (edge, target))
            })
            .sorted_by_key(|(edge, _)| (edge.source_order, edge.link_index))
            .map(|(edge, target)| LinkHit {
                source: edge.source,
                link: edge.link,
                target: target.clone(),
            })
            .collect()
    }
}

/// The finder configured by `strategy`.
pub fn finder_for<H: FileStore + MetadataIndex>(
    strategy: BacklinkStrategy,
) -> Box<dyn LinkFinder<H>> {
    match strategy {
        BacklinkStrategy::ForwardScan => Box::new(ForwardScan),
        BacklinkStrategy::ReverseIndex => Box::new(ReverseIndex),
    }
}
