use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::LayoutConfig;

use super::hierarchy::{HierarchyIndex, NodeIdx};
use super::ranking::{LevelAssignment, LevelGroups};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Placement {
    pub x: f32,
    pub y: f32,
    pub level: i32,
    pub visual_level: usize,
    pub level_index: usize,
}

#[derive(Debug, Clone, Copy)]
struct Geometry {
    level_vertical_spacing: f32,
    level_horizontal_spacing: f32,
    probe_step: f32,
    sibling_group_padding: f32,
    half_width: f32,
    half_height: f32,
    alignment: f32,
    attempts: usize,
    trace: bool,
}

impl Geometry {
    fn new(config: &LayoutConfig) -> Self {
        let (half_width, half_height) = config.collision_half_extents();
        Self {
            level_vertical_spacing: config.level_vertical_spacing(),
            level_horizontal_spacing: config.level_horizontal_spacing(),
            probe_step: config.probe_step(),
            sibling_group_padding: config.sibling_group_padding(),
            half_width,
            half_height,
            alignment: config.alignment_threshold(),
            attempts: config.probe_attempts(),
            trace: config.debug,
        }
    }

    fn row_y(&self, visual_level: usize) -> f32 {
        visual_level as f32 * self.level_vertical_spacing
    }
}

#[derive(Debug, Clone, Copy)]
struct RegistryEntry {
    node: NodeIdx,
    parent: Option<NodeIdx>,
    x: f32,
    y: f32,
    visual_level: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conflict {
    Overlap(NodeIdx),
    AboveForeignChild(NodeIdx),
    UnderNonParent(NodeIdx),
}

/// Everything placed so far in this call; the only thing the probe looks at.
#[derive(Debug, Default)]
struct PositionRegistry {
    entries: Vec<RegistryEntry>,
    slots: Vec<Option<usize>>,
    right_edge: Option<f32>,
}

impl PositionRegistry {
    fn with_capacity(len: usize) -> Self {
        Self {
            entries: Vec::with_capacity(len),
            slots: vec![None; len],
            right_edge: None,
        }
    }

    fn get(&self, node: NodeIdx) -> Option<&RegistryEntry> {
        self.slots
            .get(node)
            .copied()
            .flatten()
            .map(|slot| &self.entries[slot])
    }

    fn insert(&mut self, entry: RegistryEntry) {
        self.slots[entry.node] = Some(self.entries.len());
        self.right_edge = Some(self.right_edge.map_or(entry.x, |edge| edge.max(entry.x)));
        self.entries.push(entry);
    }

    fn conflict(
        &self,
        node: NodeIdx,
        parent: Option<NodeIdx>,
        x: f32,
        visual_level: usize,
        geometry: &Geometry,
    ) -> Option<Conflict> {
        let y = geometry.row_y(visual_level);
        for other in &self.entries {
            let dx = (other.x - x).abs();
            let dy = (other.y - y).abs();
            if dx < geometry.half_width * 2.0 && dy < geometry.half_height * 2.0 {
                return Some(Conflict::Overlap(other.node));
            }
            if dx >= geometry.alignment {
                continue;
            }
            if other.visual_level > visual_level && other.parent != Some(node) {
                return Some(Conflict::AboveForeignChild(other.node));
            }
            if other.visual_level + 1 == visual_level && Some(other.node) != parent {
                return Some(Conflict::UnderNonParent(other.node));
            }
        }
        None
    }
}

struct Placer<'i, 'a> {
    index: &'i HierarchyIndex<'a>,
    levels: &'i [i32],
    visual_levels: &'i [usize],
    geometry: Geometry,
    registry: PositionRegistry,
    placements: Vec<(NodeIdx, Placement)>,
}

struct ParentGroup {
    parent: NodeIdx,
    children: Vec<NodeIdx>,
    ideal_start: f32,
}

impl<'i, 'a> Placer<'i, 'a> {
    /// Nearest x at or right of `desired_x` that passes all three checks.
    fn find_non_overlapping_x(
        &self,
        node: NodeIdx,
        desired_x: f32,
        visual_level: usize,
    ) -> f32 {
        let parent = self.index.node(node).parent;
        let mut x = desired_x;
        for _ in 0..self.geometry.attempts {
            match self
                .registry
                .conflict(node, parent, x, visual_level, &self.geometry)
            {
                None => return x,
                Some(conflict) => {
                    if self.geometry.trace {
                        log::debug!(
                            "probe: `{}` at x={x} blocked by {}",
                            self.index.node(node).id,
                            self.describe(conflict)
                        );
                    }
                    x += self.geometry.probe_step;
                }
            }
        }
        // Past the right edge of everything placed no check can fail.
        let clear = self
            .registry
            .right_edge
            .map_or(x, |edge| edge + self.geometry.probe_step)
            .max(x);
        if self.geometry.trace {
            log::debug!(
                "probe: `{}` gave up after {} attempts, moved to x={clear}",
                self.index.node(node).id,
                self.geometry.attempts
            );
        }
        clear
    }

    fn describe(&self, conflict: Conflict) -> String {
        match conflict {
            Conflict::Overlap(other) => format!("overlap with `{}`", self.index.node(other).id),
            Conflict::AboveForeignChild(other) => {
                format!("foreign child `{}` below", self.index.node(other).id)
            }
            Conflict::UnderNonParent(other) => {
                format!("non-parent `{}` above", self.index.node(other).id)
            }
        }
    }

    fn place(&mut self, node: NodeIdx, x: f32, level_index: usize) {
        let visual_level = self.visual_levels[node];
        let y = self.geometry.row_y(visual_level);
        self.registry.insert(RegistryEntry {
            node,
            parent: self.index.node(node).parent,
            x,
            y,
            visual_level,
        });
        self.placements.push((
            node,
            Placement {
                x,
                y,
                level: self.levels[node],
                visual_level,
                level_index,
            },
        ));
    }

    fn place_roots(&mut self, nodes: &[NodeIdx]) {
        let mut roots = nodes.to_vec();
        self.index.sort(&mut roots);
        let mut cursor = 0.0f32;
        for (level_index, &node) in roots.iter().enumerate() {
            let x = self.find_non_overlapping_x(node, cursor, 0);
            self.place(node, x, level_index);
            cursor = x + self.geometry.level_horizontal_spacing;
        }
    }

    fn place_level(&mut self, visual_level: usize, nodes: &[NodeIdx]) {
        let spacing = self.geometry.level_horizontal_spacing;
        let mut by_parent: BTreeMap<NodeIdx, Vec<NodeIdx>> = BTreeMap::new();
        let mut orphans: Vec<NodeIdx> = Vec::new();
        for &node in nodes {
            match self
                .index
                .node(node)
                .parent
                .filter(|&parent| self.registry.get(parent).is_some())
            {
                Some(parent) => by_parent.entry(parent).or_default().push(node),
                None => orphans.push(node),
            }
        }

        let mut groups: Vec<ParentGroup> = by_parent
            .into_iter()
            .filter_map(|(parent, mut children)| {
                let parent_x = self.registry.get(parent)?.x;
                self.index.sort(&mut children);
                let group_width = (children.len() as f32 - 1.0) * spacing;
                Some(ParentGroup {
                    parent,
                    children,
                    ideal_start: parent_x - group_width / 2.0,
                })
            })
            .collect();
        groups.sort_by(|a, b| {
            a.ideal_start
                .partial_cmp(&b.ideal_start)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.index.node(a.parent).id.cmp(self.index.node(b.parent).id))
        });

        if self.geometry.trace {
            log::debug!(
                "level {visual_level}: {} node(s) in {} parent group(s), {} orphan(s)",
                nodes.len(),
                groups.len(),
                orphans.len()
            );
        }

        let mut level_index = 0usize;
        let mut rightmost: Option<f32> = None;
        for group in &groups {
            let start = match rightmost {
                Some(edge) => group
                    .ideal_start
                    .max(edge + spacing + self.geometry.sibling_group_padding),
                None => group.ideal_start,
            };
            let mut cursor: Option<f32> = None;
            for (slot, &child) in group.children.iter().enumerate() {
                let ideal = start + slot as f32 * spacing;
                let candidate = cursor.map_or(ideal, |cursor| cursor.max(ideal));
                let x = self.find_non_overlapping_x(child, candidate, visual_level);
                self.place(child, x, level_index);
                level_index += 1;
                cursor = Some(x + spacing);
                rightmost = Some(rightmost.map_or(x, |edge| edge.max(x)));
            }
        }

        self.index.sort(&mut orphans);
        let mut cursor = rightmost.map_or(0.0, |edge| edge + spacing);
        for &orphan in &orphans {
            let x = self.find_non_overlapping_x(orphan, cursor, visual_level);
            self.place(orphan, x, level_index);
            level_index += 1;
            cursor = x + spacing;
        }
    }
}

/// Assign every grouped node a position; returned in placement order.
///
/// Rows are filled top-down. Level 0 is laid out left to right in comparator
/// order; every deeper level is split into parent groups that are centred
/// under their parent and pushed right past the previous group when they
/// would collide. Each candidate x then goes through the collision probe,
/// which steps right until the node neither overlaps a placed node nor reads
/// as hanging under (or sitting above) somebody else's node. Nodes never move
/// once placed, except for the final shift that anchors the diagram at x = 0.
pub(crate) fn assign_positions(
    index: &HierarchyIndex<'_>,
    assignment: &LevelAssignment,
    grouped: &LevelGroups,
    config: &LayoutConfig,
) -> Vec<(NodeIdx, Placement)> {
    let mut placer = Placer {
        index,
        levels: &assignment.levels,
        visual_levels: &grouped.visual_levels,
        geometry: Geometry::new(config),
        registry: PositionRegistry::with_capacity(index.len()),
        placements: Vec::with_capacity(index.len()),
    };

    for (&visual_level, nodes) in &grouped.groups {
        if visual_level == 0 {
            placer.place_roots(nodes);
        } else {
            placer.place_level(visual_level, nodes);
        }
    }

    let mut placements = placer.placements;
    let min_x = placements
        .iter()
        .map(|(_, placement)| placement.x)
        .fold(f32::INFINITY, f32::min);
    if min_x.is_finite() && min_x < 0.0 {
        for (_, placement) in &mut placements {
            placement.x -= min_x;
        }
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::LocationRecord;
    use crate::layout::ranking::{assign_levels, group_levels};

    fn loc(id: &str) -> LocationRecord {
        LocationRecord::new(id, id)
    }

    fn run(locations: &[LocationRecord]) -> Vec<(String, Placement)> {
        let index = HierarchyIndex::build(locations);
        let assignment = assign_levels(&index, None, false);
        let grouped = group_levels(&assignment);
        assign_positions(&index, &assignment, &grouped, &LayoutConfig::default())
            .into_iter()
            .map(|(idx, placement)| (index.node(idx).id.to_string(), placement))
            .collect()
    }

    fn placer<'i, 'a>(
        index: &'i HierarchyIndex<'a>,
        config: &LayoutConfig,
        levels: &'i [i32],
        visual_levels: &'i [usize],
    ) -> Placer<'i, 'a> {
        Placer {
            index,
            levels,
            visual_levels,
            geometry: Geometry::new(config),
            registry: PositionRegistry::with_capacity(index.len()),
            placements: Vec::new(),
        }
    }

    fn x_of(placements: &[(String, Placement)], id: &str) -> f32 {
        placements
            .iter()
            .find(|(node, _)| node == id)
            .map(|(_, placement)| placement.x)
            .unwrap()
    }

    #[test]
    fn children_are_centred_under_their_parent() {
        let placements = run(&[
            loc("A"),
            loc("B").with_parent("A"),
            loc("C").with_parent("A"),
            loc("D").with_parent("A"),
        ]);
        let a = x_of(&placements, "A");
        let b = x_of(&placements, "B");
        let c = x_of(&placements, "C");
        let d = x_of(&placements, "D");
        assert_eq!(c, a);
        assert_eq!(a - b, d - a);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn neighbouring_groups_never_interleave() {
        let placements = run(&[
            loc("P1"),
            loc("P2"),
            loc("a1").with_parent("P1"),
            loc("a2").with_parent("P1"),
            loc("a3").with_parent("P1"),
            loc("b1").with_parent("P2"),
            loc("b2").with_parent("P2"),
            loc("b3").with_parent("P2"),
        ]);
        let config = LayoutConfig::default();
        let first_max = ["a1", "a2", "a3"]
            .iter()
            .map(|id| x_of(&placements, id))
            .fold(f32::MIN, f32::max);
        let second_min = ["b1", "b2", "b3"]
            .iter()
            .map(|id| x_of(&placements, id))
            .fold(f32::MAX, f32::min);
        assert!(
            second_min - first_max
                >= config.level_horizontal_spacing() + config.sibling_group_padding
        );
    }

    #[test]
    fn never_hangs_a_node_under_a_stranger() {
        let locations = vec![loc("A"), loc("B"), loc("C").with_parent("A")];
        let index = HierarchyIndex::build(&locations);
        let config = LayoutConfig::default();
        let (levels, visual_levels) = (vec![0, 0, 1], vec![0, 0, 1]);
        let mut placer = placer(&index, &config, &levels, &visual_levels);
        let a = index.lookup("A").unwrap();
        let b = index.lookup("B").unwrap();
        let c = index.lookup("C").unwrap();
        placer.place(a, 0.0, 0);
        placer.place(b, 200.0, 1);

        assert_eq!(placer.find_non_overlapping_x(c, 0.0, 1), 0.0);
        let x = placer.find_non_overlapping_x(c, 200.0, 1);
        assert_eq!(x, 400.0);
        assert_eq!(
            placer.registry.conflict(c, Some(a), 210.0, 1, &placer.geometry),
            Some(Conflict::UnderNonParent(b))
        );
    }

    #[test]
    fn never_sits_above_a_foreign_child() {
        let locations = vec![loc("A"), loc("B"), loc("K").with_parent("A")];
        let index = HierarchyIndex::build(&locations);
        let config = LayoutConfig::default();
        let (levels, visual_levels) = (vec![0, 0, 1], vec![0, 0, 1]);
        let mut placer = placer(&index, &config, &levels, &visual_levels);
        let b = index.lookup("B").unwrap();
        let k = index.lookup("K").unwrap();
        placer.place(k, 0.0, 0);
        assert_eq!(
            placer.registry.conflict(b, None, 0.0, 0, &placer.geometry),
            Some(Conflict::AboveForeignChild(k))
        );
        assert_eq!(placer.find_non_overlapping_x(b, 0.0, 0), 200.0);
    }

    #[test]
    fn exhausted_attempts_jump_past_everything() {
        let locations: Vec<LocationRecord> = (0..5).map(|i| loc(&format!("n{i}"))).collect();
        let index = HierarchyIndex::build(&locations);
        let config = LayoutConfig {
            max_probe_attempts: 1,
            ..LayoutConfig::default()
        };
        let (levels, visual_levels) = (vec![0; 5], vec![0; 5]);
        let mut placer = placer(&index, &config, &levels, &visual_levels);
        for i in 0..4 {
            placer.place(i, i as f32 * 200.0, i);
        }
        let x = placer.find_non_overlapping_x(4, 0.0, 0);
        assert_eq!(x, 800.0);
        assert!(placer.registry.conflict(4, None, x, 0, &placer.geometry).is_none());
    }

    #[test]
    fn orphans_follow_the_last_group() {
        let locations = vec![loc("A"), loc("B").with_parent("A"), loc("Z"), loc("Y")];
        let index = HierarchyIndex::build(&locations);
        let config = LayoutConfig::default();
        // Y and Z have no placed parent on their row, so they queue as orphans.
        let (levels, visual_levels) = (vec![0, 1, 1, 1], vec![0, 1, 1, 1]);
        let mut placer = placer(&index, &config, &levels, &visual_levels);
        let a = index.lookup("A").unwrap();
        let b = index.lookup("B").unwrap();
        let y = index.lookup("Y").unwrap();
        let z = index.lookup("Z").unwrap();
        placer.place(a, 0.0, 0);
        placer.place_level(1, &[z, b, y]);
        let order: Vec<_> = placer
            .placements
            .iter()
            .skip(1)
            .map(|(idx, placement)| (index.node(*idx).id, placement.x, placement.level_index))
            .collect();
        assert_eq!(order, vec![("B", 0.0, 0), ("Y", 200.0, 1), ("Z", 400.0, 2)]);
    }

    #[test]
    fn rows_follow_grouped_visual_levels() {
        let locations = vec![loc("A"), loc("B").with_parent("A"), loc("C").with_parent("B")];
        let index = HierarchyIndex::build(&locations);
        let assignment = LevelAssignment {
            levels: vec![2, 3, 4],
            root: Some(0),
        };
        let grouped = group_levels(&assignment);
        let config = LayoutConfig::default();
        let placements = assign_positions(&index, &assignment, &grouped, &config);
        let c = index.lookup("C").unwrap();
        let (_, placement) = placements.iter().find(|(idx, _)| *idx == c).unwrap();
        assert_eq!(placement.level, 4);
        assert_eq!(placement.visual_level, 2);
        assert_eq!(placement.y, 2.0 * config.level_vertical_spacing());
    }

    #[test]
    fn empty_input_places_nothing() {
        assert!(run(&[]).is_empty());
    }
}
