use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use morph_core::{
    BackgroundField, MemorySource, Morpher, MorpherStatus, ObjFileSource, RenderHost, SceneConfig,
    ShapeSource,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

/// Built-in morph targets used when no shapes are given.
const BUILTIN_SHAPES: [&str; 4] = ["tetrahedron", "octahedron", "cube", "icosahedron"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless morph engine runner", long_about = None)]
struct Cli {
    /// OBJ files used as morph targets, in index order
    #[arg(value_name = "SHAPES")]
    shapes: Vec<PathBuf>,

    /// JSON scene description
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of frames to simulate after loading
    #[arg(long, default_value_t = 180)]
    frames: u64,

    /// Frame rate (overrides the scene file)
    #[arg(long)]
    fps: Option<u32>,

    /// Start a morph at a frame, e.g. `30:1`
    #[arg(long = "morph", value_name = "FRAME:INDEX", value_parser = parse_morph)]
    morphs: Vec<MorphEvent>,

    /// Move the pointer at a frame, e.g. `10:640,200`
    #[arg(long = "pointer", value_name = "FRAME:X,Y", value_parser = parse_pointer)]
    pointers: Vec<PointerMove>,

    /// Skip the background field
    #[arg(long)]
    no_background: bool,

    /// Give up if the shapes are not loaded within this many milliseconds
    #[arg(long, default_value_t = 10_000)]
    load_timeout_ms: u64,

    /// Report path (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct MorphEvent {
    frame: u64,
    index: usize,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct PointerMove {
    frame: u64,
    x: f64,
    y: f64,
}

fn split_frame(arg: &str) -> Result<(u64, &str), String> {
    let (frame, rest) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:VALUE, got '{}'", arg))?;
    let frame = frame
        .trim()
        .parse()
        .map_err(|e| format!("bad frame '{}': {}", frame, e))?;
    Ok((frame, rest))
}

fn parse_morph(arg: &str) -> Result<MorphEvent, String> {
    let (frame, index) = split_frame(arg)?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("bad shape index '{}': {}", index, e))?;
    Ok(MorphEvent { frame, index })
}

fn parse_pointer(arg: &str) -> Result<PointerMove, String> {
    let (frame, point) = split_frame(arg)?;
    let (x, y) = point
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", point))?;
    let x = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
    Ok(PointerMove { frame, x, y })
}

#[derive(Serialize, Debug)]
struct Report {
    status: String,
    error: Option<String>,
    shapes: Vec<String>,
    warmup_frames: u64,
    frames: u64,
    time_ms: f64,
    progress: f64,
    animating: bool,
    vertex_count: usize,
    bounds: Option<[[f32; 3]; 2]>,
    group_rotation: [f32; 3],
    camera_rotation: [f32; 3],
    background_meshes: usize,
}

fn status_name(status: &MorpherStatus) -> &'static str {
    match status {
        MorpherStatus::Loading => "loading",
        MorpherStatus::Ready => "ready",
        MorpherStatus::Failed(_) => "failed",
        MorpherStatus::Destroyed => "destroyed",
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(cli.log_level).into())
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut scene = match &cli.config {
        Some(path) => SceneConfig::from_path(path)?,
        None => SceneConfig::default(),
    };
    if let Some(fps) = cli.fps {
        scene.host.fps = fps;
    }
    if cli.no_background {
        scene.background = None;
    }
    if !cli.shapes.is_empty() {
        scene.morpher.sources = cli
            .shapes
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
    }

    let source: Arc<dyn ShapeSource> = if scene.morpher.sources.is_empty() {
        info!("No shapes given, using built-in solids");
        scene.morpher.sources = BUILTIN_SHAPES.iter().map(|s| s.to_string()).collect();
        Arc::new(MemorySource::builtin(1.0))
    } else {
        Arc::new(ObjFileSource)
    };

    info!("Initializing morph engine...");
    info!("Shapes: {:?}", scene.morpher.sources);

    let mut host = RenderHost::new(scene.host.clone());
    let mut background = scene
        .background
        .clone()
        .map(|config| BackgroundField::new(&mut host, config));
    let mut morpher = Morpher::new(&mut host, source, scene.morpher.clone());

    let started = Instant::now();
    let timeout = Duration::from_millis(cli.load_timeout_ms);
    let mut warmup_frames = 0;
    while morpher.is_loading() {
        if started.elapsed() > timeout {
            bail!("Shapes did not load within {} ms", cli.load_timeout_ms);
        }
        host.step();
        warmup_frames += 1;
        thread::sleep(Duration::from_millis(1));
    }

    if let Some(e) = morpher.load_error() {
        return Err(anyhow::Error::new(e).context("Morph engine failed to start"));
    }
    info!(warmup_frames, "Shapes ready, simulating {} frames", cli.frames);

    for frame in 0..cli.frames {
        for pointer in cli.pointers.iter().filter(|p| p.frame == frame) {
            host.dispatch_pointer_move(pointer.x, pointer.y);
        }
        for morph in cli.morphs.iter().filter(|m| m.frame == frame) {
            if morph.index >= morpher.shape_count() {
                warn!(
                    frame,
                    index = morph.index,
                    "Morph target out of range, it will be ignored"
                );
            }
            morpher.morph_to(morph.index);
        }
        host.step();
    }

    let report = build_report(&host, &morpher, background.as_ref(), &scene, warmup_frames, cli.frames);

    morpher.destroy(&mut host);
    if let Some(field) = background.as_mut() {
        field.destroy(&mut host);
    }

    let json = serde_json::to_string_pretty(&report).context("Cannot serialize report")?;
    match &cli.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Cannot write report to '{}'", path.display()))?;
            info!("Report written to {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn build_report(
    host: &RenderHost,
    morpher: &Morpher,
    background: Option<&BackgroundField>,
    scene: &SceneConfig,
    warmup_frames: u64,
    frames: u64,
) -> Report {
    let mesh = morpher
        .mesh_node()
        .and_then(|id| host.scene.get_node(id))
        .and_then(|node| node.mesh());
    let group_rotation = host
        .scene
        .get_node(morpher.group_node())
        .map(|node| node.transform.rotation.to_array())
        .unwrap_or_default();
    let status = morpher.status();

    Report {
        status: status_name(&status).to_string(),
        error: morpher.load_error().map(|e| e.to_string()),
        shapes: scene.morpher.sources.clone(),
        warmup_frames,
        frames,
        time_ms: host.time,
        progress: morpher.progress(),
        animating: morpher.is_animating(),
        vertex_count: mesh.map(|m| m.vertex_count()).unwrap_or(0),
        bounds: mesh
            .and_then(|m| m.bounds())
            .map(|(min, max)| [min.to_array(), max.to_array()]),
        group_rotation,
        camera_rotation: host.camera.transform.rotation.to_array(),
        background_meshes: background.map(|b| b.meshes().len()).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_morph_events() {
        assert_eq!(parse_morph("30:2"), Ok(MorphEvent { frame: 30, index: 2 }));
        assert!(parse_morph("30").is_err());
        assert!(parse_morph("x:1").is_err());
        assert!(parse_morph("3:-1").is_err());
    }

    #[test]
    fn parses_pointer_moves() {
        assert_eq!(
            parse_pointer("10:640.5, 200"),
            Ok(PointerMove {
                frame: 10,
                x: 640.5,
                y: 200.0
            })
        );
        assert!(parse_pointer("10:640").is_err());
    }

    #[test]
    fn cli_collects_repeated_events() {
        let cli = Cli::try_parse_from([
            "morph-engine",
            "--morph",
            "5:1",
            "--morph",
            "60:0",
            "--pointer",
            "0:1,2",
            "--fps",
            "30",
        ])
        .unwrap();
        assert_eq!(cli.morphs.len(), 2);
        assert_eq!(cli.pointers[0], PointerMove { frame: 0, x: 1.0, y: 2.0 });
        assert_eq!(cli.fps, Some(30));
        assert!(cli.shapes.is_empty());
    }

    #[test]
    fn builtin_run_reaches_target() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.json");
        let cli = Cli::try_parse_from([
            "morph-engine",
            "--no-background",
            "--frames",
            "120",
            "--morph",
            "0:2",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        run(cli).unwrap();
        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(report["status"], "ready");
        assert_eq!(report["progress"], 2.0);
        assert_eq!(report["shapes"].as_array().unwrap().len(), 4);
    }
}
