use crate::config::load_config;
use crate::dump::write_replay_dump;
use crate::render::{scene_svg, write_output_svg};
use crate::scenario::{parse_scenario, replay};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "anchorline",
    version,
    about = "Replay element placements and draw the connector between them"
)]
pub struct Args {
    /// Scenario file (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (strokeColor, strokeWidth, cornerAngle, ...)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Frame to draw. Defaults to the last frame that produced a line.
    #[arg(long = "frame")]
    pub frame: Option<usize>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let scenario = parse_scenario(&input)?;
    let replay = replay(&scenario, &config);

    if let OutputFormat::Json = args.output_format {
        return write_replay_dump(args.output.as_deref(), &replay);
    }

    let index = match args.frame {
        Some(index) if index < replay.frames.len() => index,
        Some(index) => {
            return Err(anyhow::anyhow!(
                "frame {} out of range (scenario has {} frames)",
                index,
                replay.frames.len()
            ));
        }
        None => replay
            .last_drawn_frame()
            .unwrap_or(replay.frames.len().saturating_sub(1)),
    };
    let frame = replay
        .frames
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("scenario has no frames"))?;
    let svg = scene_svg(
        &frame.first,
        &frame.second,
        frame.drawn_geometry(),
        &config.connector,
        &config.render,
    );

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config.render)
        }
        OutputFormat::Json => Ok(()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, render: &crate::config::RenderConfig) -> Result<()> {
    crate::render::write_output_png(svg, output, render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _render: &crate::config::RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let args = Args::parse_from([
            "anchorline",
            "-i",
            "scene.json",
            "-e",
            "json",
            "-w",
            "640",
            "--frame",
            "2",
        ]);
        assert_eq!(args.input.as_deref(), Some(Path::new("scene.json")));
        assert!(matches!(args.output_format, OutputFormat::Json));
        assert_eq!(args.width, Some(640.0));
        assert_eq!(args.frame, Some(2));
        assert!(args.height.is_none());
    }

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        let path = PathBuf::from("out.png");
        assert_eq!(ensure_output(&Some(path.clone()), "png").unwrap(), path);
    }
}
