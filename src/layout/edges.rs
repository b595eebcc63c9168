use crate::ir::{LocationId, LocationRecord};

use super::hierarchy::HierarchyIndex;
use super::types::Edge;

/// One edge per location whose parent is present in the snapshot.
///
/// Built from the input alone so a relationship is never lost to placement.
pub fn build_edges(locations: &[LocationRecord]) -> Vec<Edge> {
    edges_from_index(&HierarchyIndex::build(locations))
}

pub(crate) fn edges_from_index(index: &HierarchyIndex<'_>) -> Vec<Edge> {
    index
        .nodes()
        .filter_map(|(_, node)| {
            let parent = index.node(node.parent?).id;
            Some(Edge {
                id: format!("edge-{parent}-{}", node.id),
                source: LocationId::new(parent),
                target: LocationId::new(node.id),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_edge_per_resolvable_parent() {
        let locations = vec![
            LocationRecord::new("A", "a"),
            LocationRecord::new("B", "b").with_parent("A"),
            LocationRecord::new("C", "c").with_parent("A"),
            LocationRecord::new("X", "x").with_parent("ghost"),
            LocationRecord::new("S", "s").with_parent("S"),
            LocationRecord::new("B", "dup").with_parent("A"),
        ];
        let edges = build_edges(&locations);
        let ids: Vec<_> = edges.iter().map(|edge| edge.id.as_str()).collect();
        assert_eq!(ids, ["edge-A-B", "edge-A-C"]);
        assert_eq!(edges[0].source.as_str(), "A");
        assert_eq!(edges[0].target.as_str(), "B");
    }

    #[test]
    fn numeric_ids_use_their_canonical_text() {
        let locations = crate::ir::parse_locations(
            r#"[{"id": 1, "name": "Realm"}, {"id": 2, "name": "Shire", "parentId": "1"}]"#,
        )
        .unwrap();
        let edges = build_edges(&locations);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, "edge-1-2");
    }
}
