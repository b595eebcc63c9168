use crate::config::{Config, load_config};
use crate::ir::{LocationRecord, parse_locations};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "loremap",
    version,
    about = "Lay out a location hierarchy as a top-down diagram"
)]
pub struct Args {
    /// Locations JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for JSON and SVG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Location id to use as the diagram origin
    #[arg(short = 'r', long = "root")]
    pub root: Option<String>,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Trace root selection, level grouping and probe decisions
    #[arg(long = "debug")]
    pub debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut config = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;
    if args.debug {
        config.layout.debug = true;
    }

    let locations = read_locations(args.input.as_deref())?;
    log::info!("read {} location(s)", locations.len());
    render_locations(&locations, &args, &config)
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

fn read_locations(path: Option<&Path>) -> Result<Vec<LocationRecord>> {
    let input = read_input(path)?;
    let locations = parse_locations(&input).with_context(|| match path {
        Some(path) => format!("failed to parse {}", path.display()),
        None => "failed to parse stdin".to_string(),
    })?;
    Ok(locations)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn render_locations(locations: &[LocationRecord], args: &Args, config: &Config) -> Result<()> {
    let layout = compute_layout(locations, args.root.as_deref(), &config.layout);
    log::info!(
        "laid out {} node(s) and {} edge(s) in {:.0}x{:.0}",
        layout.nodes.len(),
        layout.edges.len(),
        layout.width,
        layout.height
    );

    match args.output_format {
        OutputFormat::Json => write_layout_dump(args.output.as_deref(), &layout),
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &config.theme, &config.render);
            write_output_png(&svg, &output, &config.render, &config.theme)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
