use loremap::{LayoutConfig, build_edges, compute_layout, parse_locations};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutRequestOptions {
    root_id: Option<String>,
    layout: Option<LayoutConfig>,
    debug: Option<bool>,
}

fn parse_options(options_json: Option<String>) -> Result<LayoutRequestOptions, String> {
    match options_json {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(&raw).map_err(|error| error.to_string())
        }
        _ => Ok(LayoutRequestOptions::default()),
    }
}

fn layout_json(locations_json: &str, options_json: Option<String>) -> Result<String, String> {
    let locations = parse_locations(locations_json).map_err(|error| error.to_string())?;
    let options = parse_options(options_json)?;
    let mut config = options.layout.unwrap_or_default();
    if let Some(debug) = options.debug {
        config.debug = debug;
    }
    let layout = compute_layout(&locations, options.root_id.as_deref(), &config);
    serde_json::to_string(&layout).map_err(|error| error.to_string())
}

fn edges_json(locations_json: &str) -> Result<String, String> {
    let locations = parse_locations(locations_json).map_err(|error| error.to_string())?;
    serde_json::to_string(&build_edges(&locations)).map_err(|error| error.to_string())
}

/// Lay out a JSON location list; returns the layout (nodes, edges, rootId,
/// extents) as JSON.
#[wasm_bindgen]
pub fn layout_locations(locations_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    layout_json(locations_json, options_json).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn build_location_edges(locations_json: &str) -> Result<String, JsValue> {
    edges_json(locations_json).map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use crate::{edges_json, layout_json};

    const WORLD: &str = r#"[
        {"id": 1, "name": "Realm", "typeName": "Continent"},
        {"id": 2, "name": "Harbor", "typeName": "City", "parentId": 1},
        {"id": 3, "name": "Hills", "typeName": "Region", "parentId": 1}
    ]"#;

    #[test]
    fn lays_out_with_options() {
        let json = layout_json(
            WORLD,
            Some(r#"{"rootId": "3", "layout": {"nodeWidth": 100}}"#.to_string()),
        )
        .expect("layout should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rootId"], "3");
        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["nodes"][0]["width"], 100.0);
        assert_eq!(value["edges"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn reports_bad_input() {
        assert!(layout_json("not json", None).is_err());
        assert!(layout_json(WORLD, Some("{".to_string())).is_err());
        assert_eq!(edges_json(WORLD).unwrap().matches("edge-1-").count(), 2);
    }
}
