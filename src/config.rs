use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry policy for the hierarchical layout.
///
/// All values are in diagram units. Non-finite values read as their default
/// and finite ones are clamped, so the derived spacings stay finite and boxes
/// grown by `collision_margin` never touch between adjacent slots or rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub vertical_padding: f32,
    pub horizontal_padding: f32,
    pub min_node_gap: f32,
    pub sibling_group_padding: f32,
    pub collision_margin: f32,
    pub max_probe_attempts: usize,
    /// Emit engine trace lines through `log::debug!`.
    pub debug: bool,
}

const DEFAULT_NODE_WIDTH: f32 = 150.0;
const DEFAULT_NODE_HEIGHT: f32 = 60.0;
const DEFAULT_VERTICAL_PADDING: f32 = 80.0;
const DEFAULT_HORIZONTAL_PADDING: f32 = 50.0;
const DEFAULT_MIN_NODE_GAP: f32 = 200.0;
const DEFAULT_SIBLING_GROUP_PADDING: f32 = 40.0;
const DEFAULT_COLLISION_MARGIN: f32 = 10.0;
/// Upper bound for any single geometry value, so sums and probe steps stay finite.
const MAX_DIMENSION: f32 = 1.0e6;

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            vertical_padding: DEFAULT_VERTICAL_PADDING,
            horizontal_padding: DEFAULT_HORIZONTAL_PADDING,
            min_node_gap: DEFAULT_MIN_NODE_GAP,
            sibling_group_padding: DEFAULT_SIBLING_GROUP_PADDING,
            collision_margin: DEFAULT_COLLISION_MARGIN,
            max_probe_attempts: 200,
            debug: false,
        }
    }
}

/// Non-finite values fall back to the default; finite ones are clamped.
fn dimension(value: f32, default: f32, min: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, MAX_DIMENSION)
    } else {
        default
    }
}

impl LayoutConfig {
    fn margin(&self) -> f32 {
        dimension(self.collision_margin, DEFAULT_COLLISION_MARGIN, 0.0)
    }

    pub fn node_width(&self) -> f32 {
        dimension(self.node_width, DEFAULT_NODE_WIDTH, 1.0)
    }

    pub fn node_height(&self) -> f32 {
        dimension(self.node_height, DEFAULT_NODE_HEIGHT, 1.0)
    }

    /// Distance between two rows; always leaves the grown boxes apart.
    pub fn level_vertical_spacing(&self) -> f32 {
        let padding = dimension(self.vertical_padding, DEFAULT_VERTICAL_PADDING, 0.0);
        self.node_height() + padding.max(2.0 * self.margin())
    }

    /// Default step between siblings.
    pub fn level_horizontal_spacing(&self) -> f32 {
        let padding = dimension(self.horizontal_padding, DEFAULT_HORIZONTAL_PADDING, 0.0);
        self.node_width() + padding.max(2.0 * self.margin())
    }

    /// Step used by the collision probe; never smaller than a sibling step.
    pub fn probe_step(&self) -> f32 {
        dimension(self.min_node_gap, DEFAULT_MIN_NODE_GAP, 0.0).max(self.level_horizontal_spacing())
    }

    pub fn sibling_group_padding(&self) -> f32 {
        dimension(self.sibling_group_padding, DEFAULT_SIBLING_GROUP_PADDING, 0.0)
    }

    /// Half extents of a node's collision box.
    pub fn collision_half_extents(&self) -> (f32, f32) {
        (
            self.node_width() / 2.0 + self.margin(),
            self.node_height() / 2.0 + self.margin(),
        )
    }

    /// Two nodes closer than this horizontally read as stacked on each other.
    pub fn alignment_threshold(&self) -> f32 {
        self.node_width() / 2.0
    }

    pub fn probe_attempts(&self) -> usize {
        self.max_probe_attempts.max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
    /// Label width budget as a fraction of the node width.
    pub label_width_ratio: f32,
    /// Estimate label widths per character instead of loading system fonts.
    pub fast_text_metrics: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 24.0,
            background: "#FFFFFF".to_string(),
            label_width_ratio: 0.88,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    root_border: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
    background: Option<String>,
    label_width_ratio: Option<f32>,
    fast_text_metrics: Option<bool>,
}

/// Load a JSON5 config file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => log::warn!("unknown theme `{other}`, keeping the default"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.root_border {
            config.theme.root_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
        if let Some(v) = render.label_width_ratio {
            config.render.label_width_ratio = v;
        }
        if let Some(v) = render.fast_text_metrics {
            config.render.fast_text_metrics = v;
        }
    }

    Ok(config)
}
