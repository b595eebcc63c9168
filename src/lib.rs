#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use ir::{InputError, LocationId, LocationRecord, parse_locations};
pub use layout::{
    Edge, Layout, PositionedNode, build_edges, children_by_parent, compare_locations,
    compute_layout, layout_hierarchically,
};
pub use render::render_svg;
pub use theme::Theme;
