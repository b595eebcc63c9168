use crate::config::RenderConfig;
use crate::layout::text::fit_label;
use crate::layout::{Layout, PositionedNode};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

const NODE_RADIUS: f32 = 8.0;
const TYPE_FONT_SCALE: f32 = 0.8;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &RenderConfig) -> String {
    let padding = config.padding.max(0.0);
    let width = (layout.width + padding * 2.0).max(1.0);
    let height = (layout.height + padding * 2.0).max(1.0);
    let offset_x = padding - layout.bounds.min_x;
    let offset_y = padding - layout.bounds.min_y;

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    );
    let _ = write!(
        svg,
        "<defs><marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker></defs>",
        theme.line_color
    );

    let by_id: HashMap<&str, &PositionedNode> = layout
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node))
        .collect();

    for edge in &layout.edges {
        let (Some(parent), Some(child)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let (sx, sy) = (parent.position.x + offset_x, parent.bottom() + offset_y);
        let (tx, ty) = (child.position.x + offset_x, child.top() + offset_y);
        let mid_y = (sy + ty) / 2.0;
        let _ = write!(
            svg,
            "<path id=\"{}\" d=\"M {sx:.2} {sy:.2} C {sx:.2} {mid_y:.2}, {tx:.2} {mid_y:.2}, {tx:.2} {ty:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\"/>",
            escape_xml(&edge.id),
            theme.line_color
        );
    }

    let root = layout.root_id.as_ref().map(|id| id.as_str());
    for node in &layout.nodes {
        let is_root = root == Some(node.id.as_str());
        let (border, stroke_width) = if is_root {
            (theme.root_border.as_str(), 2.2)
        } else {
            (theme.node_border.as_str(), 1.2)
        };
        let _ = write!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{NODE_RADIUS}\" ry=\"{NODE_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
            node.left() + offset_x,
            node.top() + offset_y,
            node.width,
            node.height,
            theme.node_fill,
            border
        );
        svg.push_str(&node_labels_svg(
            node,
            node.position.x + offset_x,
            node.position.y + offset_y,
            theme,
            config,
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn node_labels_svg(
    node: &PositionedNode,
    cx: f32,
    cy: f32,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let budget = node.width * config.label_width_ratio.clamp(0.1, 1.0);
    let name_size = theme.font_size;
    let type_size = theme.font_size * TYPE_FONT_SCALE;
    let name_text = if node.data.name.trim().is_empty() {
        node.id.as_str()
    } else {
        node.data.name.as_str()
    };
    let name = fit_label(
        name_text,
        budget,
        name_size,
        &theme.font_family,
        config.fast_text_metrics,
    );

    let mut text = String::new();
    if node.data.type_name.trim().is_empty() {
        let _ = write!(
            text,
            "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{name_size}\" fill=\"{}\">{}</text>",
            cy + name_size * 0.35,
            escape_xml(&theme.font_family),
            theme.text_color,
            escape_xml(&name)
        );
        return text;
    }

    let type_label = fit_label(
        &node.data.type_name,
        budget,
        type_size,
        &theme.font_family,
        config.fast_text_metrics,
    );
    let _ = write!(
        text,
        "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{name_size}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        cy - name_size * 0.15,
        escape_xml(&theme.font_family),
        theme.text_color,
        escape_xml(&name)
    );
    let _ = write!(
        text,
        "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{type_size}\" fill=\"{}\">{}</text>",
        cy + type_size * 1.25,
        escape_xml(&theme.font_family),
        theme.muted_text_color,
        escape_xml(&type_label)
    );
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme
        .font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .find(|part| !part.is_empty())
    {
        opt.font_family = family.to_string();
    }
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
