mod edges;
mod hierarchy;
mod ordering;
mod placement;
mod ranking;
pub(crate) mod text;
pub(crate) mod types;
pub use edges::build_edges;
pub use ordering::{SortKey, compare_locations};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{LocationId, LocationRecord};
use hierarchy::HierarchyIndex;
use std::collections::HashMap;

/// Lay out `locations` top-down by hierarchy depth.
///
/// Nodes come back in placement order (row by row, left to right within a
/// parent group). Records without an id are left out.
pub fn layout_hierarchically(
    locations: &[LocationRecord],
    preferred_root: Option<&str>,
    config: &LayoutConfig,
) -> Vec<PositionedNode> {
    let index = HierarchyIndex::build(locations);
    position_nodes(&index, preferred_root, config).0
}

/// Nodes, edges, origin and extents in one pass over the snapshot.
pub fn compute_layout(
    locations: &[LocationRecord],
    preferred_root: Option<&str>,
    config: &LayoutConfig,
) -> Layout {
    let index = HierarchyIndex::build(locations);
    let (nodes, root_id) = position_nodes(&index, preferred_root, config);
    let edges = edges::edges_from_index(&index);
    let bounds = Bounds::of_nodes(&nodes);
    Layout {
        nodes,
        edges,
        root_id,
        bounds,
        width: bounds.width(),
        height: bounds.height(),
    }
}

/// Parent id -> child ids for every location that has children in the snapshot.
pub fn children_by_parent(locations: &[LocationRecord]) -> HashMap<LocationId, Vec<LocationId>> {
    HierarchyIndex::build(locations)
        .adjacency()
        .into_iter()
        .map(|(parent, kids)| {
            (
                LocationId::new(parent),
                kids.into_iter().map(LocationId::new).collect(),
            )
        })
        .collect()
}

fn position_nodes(
    index: &HierarchyIndex<'_>,
    preferred_root: Option<&str>,
    config: &LayoutConfig,
) -> (Vec<PositionedNode>, Option<LocationId>) {
    if index.is_empty() {
        return (Vec::new(), None);
    }
    let assignment = ranking::assign_levels(index, preferred_root, config.debug);
    let grouped = ranking::group_levels(&assignment);
    let placements = placement::assign_positions(index, &assignment, &grouped, config);

    let width = config.node_width();
    let height = config.node_height();
    let nodes = placements
        .into_iter()
        .map(|(idx, placement)| {
            let node = index.node(idx);
            let record = node.record;
            let id = LocationId::new(node.id);
            PositionedNode {
                id: id.clone(),
                kind: NodeKind::Location,
                width,
                height,
                position: Position {
                    x: placement.x,
                    y: placement.y,
                },
                data: NodeData {
                    id,
                    name: record.name.clone(),
                    type_name: record.type_name.clone(),
                    parent_id: record.parent_id.clone(),
                    child_count: node.child_count,
                    description: record.description.clone(),
                    level: placement.level,
                    visual_level: placement.visual_level,
                    level_index: placement.level_index,
                },
            }
        })
        .collect();

    let root_id = assignment
        .root
        .map(|idx| LocationId::new(index.node(idx).id));
    (nodes, root_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(id: &str) -> LocationRecord {
        LocationRecord::new(id, id)
    }

    #[test]
    fn single_node_sits_at_origin() {
        let nodes = layout_hierarchically(&[loc("A")], None, &LayoutConfig::default());
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].position, Position { x: 0.0, y: 0.0 });
        assert_eq!(nodes[0].data.visual_level, 0);
        assert_eq!(nodes[0].kind, NodeKind::Location);
    }

    #[test]
    fn layout_bundle_reports_origin_and_extents() {
        let config = LayoutConfig::default();
        let layout = compute_layout(
            &[loc("A"), loc("B").with_parent("A"), loc("C").with_parent("A")],
            None,
            &config,
        );
        assert_eq!(layout.root_id, Some(LocationId::new("A")));
        assert_eq!(layout.edges.len(), 2);
        assert_eq!(
            layout.width,
            config.level_horizontal_spacing() + config.node_width
        );
        assert_eq!(
            layout.height,
            config.level_vertical_spacing() + config.node_height
        );
    }

    #[test]
    fn engine_order_matches_public_comparator() {
        let mut roots = vec![
            loc("hall").with_type("Hall").with_child_count(1),
            loc("keep").with_type("Castle").with_child_count(2),
            loc("yard").with_type("castle").with_child_count(0),
            loc("gate").with_type("Castle").with_child_count(0),
        ];
        let mut locations = roots.clone();
        locations.extend([
            loc("k1").with_parent("keep").with_child_count(0),
            loc("k2").with_parent("keep").with_child_count(0),
            loc("h1").with_parent("hall").with_child_count(0),
        ]);
        let nodes = layout_hierarchically(&locations, None, &LayoutConfig::default());
        let mut engine_roots: Vec<_> = nodes.iter().filter(|node| node.data.visual_level == 0).collect();
        engine_roots.sort_by_key(|node| node.data.level_index);

        roots.sort_by(compare_locations);
        let expected: Vec<&str> = roots.iter().filter_map(LocationRecord::key).collect();
        let actual: Vec<&str> = engine_roots.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(actual, expected);
        assert_eq!(actual, ["keep", "hall", "gate", "yard"]);
    }

    #[test]
    fn children_map_uses_canonical_ids() {
        let map = children_by_parent(&[loc("A"), loc("B").with_parent("A")]);
        assert_eq!(map[&LocationId::new("A")], vec![LocationId::new("B")]);
    }

    #[test]
    fn serialises_in_diagram_node_shape() {
        let nodes = layout_hierarchically(
            &[loc("A").with_type("Realm")],
            None,
            &LayoutConfig::default(),
        );
        let value = serde_json::to_value(&nodes[0]).unwrap();
        assert_eq!(value["type"], "location");
        assert_eq!(value["position"]["x"], 0.0);
        assert_eq!(value["data"]["typeName"], "Realm");
        assert_eq!(value["data"]["visualLevel"], 0);
        assert_eq!(value["data"]["levelIndex"], 0);
        assert!(value["data"]["parentId"].is_null());
    }
}
