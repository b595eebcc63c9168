use std::collections::{BTreeMap, VecDeque};

use super::hierarchy::{HierarchyIndex, NodeIdx};

#[derive(Debug, Clone)]
pub(crate) struct LevelAssignment {
    /// Raw BFS depth, indexed like the hierarchy arena.
    pub levels: Vec<i32>,
    /// Diagram origin: the preferred root if it exists, else the first root
    /// candidate in comparator order.
    pub root: Option<NodeIdx>,
}

#[derive(Debug, Clone)]
pub(crate) struct LevelGroups {
    pub groups: BTreeMap<usize, Vec<NodeIdx>>,
    pub visual_levels: Vec<usize>,
}

pub(crate) fn assign_levels(
    index: &HierarchyIndex<'_>,
    preferred_root: Option<&str>,
    trace: bool,
) -> LevelAssignment {
    let mut candidates: Vec<NodeIdx> = index
        .nodes()
        .filter(|(_, node)| node.parent.is_none())
        .map(|(idx, _)| idx)
        .collect();
    index.sort(&mut candidates);

    let preferred = preferred_root.and_then(|id| index.lookup(id));
    if preferred.is_none()
        && let Some(id) = preferred_root
    {
        log::warn!("preferred root `{id}` is not in the snapshot, using the default origin");
    }
    let root = preferred.or_else(|| candidates.first().copied()).or_else(|| {
        // Every node sits on a parent cycle; fall back to the comparator's pick.
        let mut all: Vec<NodeIdx> = (0..index.len()).collect();
        index.sort(&mut all);
        all.first().copied()
    });

    let mut levels: Vec<Option<i32>> = vec![None; index.len()];
    let mut queue: VecDeque<(NodeIdx, i32)> = VecDeque::new();
    for &idx in &candidates {
        levels[idx] = Some(0);
        queue.push_back((idx, 0));
    }

    while let Some((idx, level)) = queue.pop_front() {
        for &child in index.children(idx) {
            if levels[child].is_some() {
                continue;
            }
            levels[child] = Some(level + 1);
            queue.push_back((child, level + 1));
        }
    }

    let unreached = levels.iter().filter(|level| level.is_none()).count();
    if unreached > 0 {
        log::warn!("{unreached} location(s) unreachable from any root (parent cycle), placed on level 0");
    }
    if trace {
        log::debug!(
            "levels: {} root candidate(s), origin {:?}",
            candidates.len(),
            root.map(|idx| index.node(idx).id)
        );
    }

    LevelAssignment {
        levels: levels.into_iter().map(|level| level.unwrap_or(0)).collect(),
        root,
    }
}

/// Bucket nodes by level, shifted so the shallowest level present is 0.
pub(crate) fn group_levels(assignment: &LevelAssignment) -> LevelGroups {
    let min_level = assignment.levels.iter().copied().min().unwrap_or(0);
    let visual_levels: Vec<usize> = assignment
        .levels
        .iter()
        .map(|&level| usize::try_from(level - min_level).unwrap_or(0))
        .collect();

    let mut groups: BTreeMap<usize, Vec<NodeIdx>> = BTreeMap::new();
    for (idx, &visual) in visual_levels.iter().enumerate() {
        groups.entry(visual).or_default().push(idx);
    }

    LevelGroups {
        groups,
        visual_levels,
    }
}
