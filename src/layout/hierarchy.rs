use std::collections::HashMap;

use crate::ir::{LocationId, LocationRecord};

use super::ordering::SortKey;

pub(crate) type NodeIdx = usize;

/// Per-call view of one input record with its parent reference resolved.
#[derive(Debug, Clone)]
pub(crate) struct LocationNode<'a> {
    pub record: &'a LocationRecord,
    pub id: &'a str,
    pub parent: Option<NodeIdx>,
    pub child_count: u32,
}

impl<'a> LocationNode<'a> {
    pub fn sort_key(&self) -> SortKey<'a> {
        SortKey {
            child_count: self.child_count,
            type_name: &self.record.type_name,
            name: &self.record.name,
            id: self.id,
        }
    }
}

/// Arena of the snapshot's locations plus the parent -> children adjacency.
///
/// Ids are compared as canonical strings only; nodes are addressed by their
/// position in `nodes`, which follows input order with duplicates removed.
#[derive(Debug)]
pub(crate) struct HierarchyIndex<'a> {
    nodes: Vec<LocationNode<'a>>,
    by_id: HashMap<&'a str, NodeIdx>,
    children: Vec<Vec<NodeIdx>>,
}

impl<'a> HierarchyIndex<'a> {
    pub fn build(locations: &'a [LocationRecord]) -> Self {
        let mut nodes: Vec<LocationNode<'a>> = Vec::with_capacity(locations.len());
        let mut by_id: HashMap<&'a str, NodeIdx> = HashMap::with_capacity(locations.len());
        let mut missing_ids = 0usize;
        let mut duplicates = 0usize;

        for record in locations {
            let Some(id) = record.key() else {
                missing_ids += 1;
                continue;
            };
            if by_id.contains_key(id) {
                duplicates += 1;
                continue;
            }
            by_id.insert(id, nodes.len());
            nodes.push(LocationNode {
                record,
                id,
                parent: None,
                child_count: 0,
            });
        }

        let mut children: Vec<Vec<NodeIdx>> = vec![Vec::new(); nodes.len()];
        for idx in 0..nodes.len() {
            let (record, id) = (nodes[idx].record, nodes[idx].id);
            if let Some(parent_id) = record.parent_id.as_ref().map(LocationId::as_str)
                && parent_id != id
                && let Some(&parent_idx) = by_id.get(parent_id)
            {
                nodes[idx].parent = Some(parent_idx);
                children[parent_idx].push(idx);
            }
        }

        for (node, kids) in nodes.iter_mut().zip(&children) {
            node.child_count = node
                .record
                .child_count
                .unwrap_or_else(|| u32::try_from(kids.len()).unwrap_or(u32::MAX));
        }

        if missing_ids > 0 {
            log::warn!("skipped {missing_ids} location(s) without an id");
        }
        if duplicates > 0 {
            log::warn!("skipped {duplicates} location(s) with a duplicate id");
        }

        Self {
            nodes,
            by_id,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: NodeIdx) -> &LocationNode<'a> {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIdx, &LocationNode<'a>)> {
        self.nodes.iter().enumerate()
    }

    pub fn lookup(&self, id: &str) -> Option<NodeIdx> {
        self.by_id.get(id).copied()
    }

    pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.children[idx]
    }

    /// Parent id -> child ids, for callers that want the plain adjacency.
    pub fn adjacency(&self) -> HashMap<&'a str, Vec<&'a str>> {
        self.nodes
            .iter()
            .zip(&self.children)
            .filter(|(_, kids)| !kids.is_empty())
            .map(|(node, kids)| (node.id, kids.iter().map(|&kid| self.nodes[kid].id).collect()))
            .collect()
    }

    /// Sort node indices with the sibling comparator.
    pub fn sort(&self, ids: &mut [NodeIdx]) {
        ids.sort_by(|&a, &b| self.nodes[a].sort_key().cmp(&self.nodes[b].sort_key()));
    }
}
