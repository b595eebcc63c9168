use crate::ir::LocationId;
use crate::layout::{Edge, Layout, PositionedNode};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Wire shape handed to diagram front-ends: the node and edge arrays plus the
/// origin, with the extents the renderer needs to size a viewport.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub root_id: Option<&'a LocationId>,
    pub width: f32,
    pub height: f32,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes: &'a [PositionedNode],
    pub edges: &'a [Edge],
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a Layout) -> Self {
        LayoutDump {
            root_id: layout.root_id.as_ref(),
            width: layout.width,
            height: layout.height,
            node_count: layout.nodes.len(),
            edge_count: layout.edges.len(),
            nodes: &layout.nodes,
            edges: &layout.edges,
        }
    }
}

pub fn layout_to_json(layout: &Layout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}

/// Write the dump to `path`, or to stdout when no path is given.
pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::LocationRecord;
    use crate::layout::compute_layout;

    #[test]
    fn dump_carries_nodes_edges_and_origin() {
        let locations = vec![
            LocationRecord::new("realm", "Realm"),
            LocationRecord::new("town", "Town").with_parent("realm"),
        ];
        let layout = compute_layout(&locations, None, &LayoutConfig::default());
        let json = layout_to_json(&layout).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rootId"], "realm");
        assert_eq!(value["nodeCount"], 2);
        assert_eq!(value["edges"][0]["id"], "edge-realm-town");
        assert_eq!(value["edges"][0]["source"], "realm");
        assert_eq!(value["nodes"][1]["data"]["parentId"], "realm");
    }
}
