use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kinetica", version)]
struct Cli {
    /// Show configuration JSON (defaults apply to missing fields).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured random seed.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered scenes.
    List,
    /// Print the effective configuration as JSON.
    Config,
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a frame sequence: an MP4 (requires `ffmpeg` on PATH) or a PNG directory.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Scene id (see `kinetica list`).
    #[arg(long)]
    scene: String,

    /// Frame index (0-based). Frames before it are simulated but not rasterized.
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene id (see `kinetica list`).
    #[arg(long)]
    scene: String,

    /// Number of frames to render.
    #[arg(long)]
    frames: u64,

    /// Output path: `*.mp4` encodes with ffmpeg, anything else is a PNG directory.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of replacing an existing MP4.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.seed)?;
    match cli.cmd {
        Command::List => cmd_list(&config),
        Command::Config => cmd_config(&config),
        Command::Frame(args) => cmd_frame(&config, args),
        Command::Render(args) => cmd_render(&config, args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<kinetica::ShowConfig> {
    let mut config = match path {
        Some(p) => kinetica::ShowConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => kinetica::ShowConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_list(config: &kinetica::ShowConfig) -> anyhow::Result<()> {
    let registry = kinetica::SceneRegistry::builtin(config);
    for entry in registry.entries() {
        println!(
            "{:<18} {:<16} {}  {}",
            entry.id, entry.name, entry.accent, entry.description
        );
    }
    Ok(())
}

fn cmd_config(config: &kinetica::ShowConfig) -> anyhow::Result<()> {
    println!("{}", config.to_json_pretty()?);
    Ok(())
}

fn cmd_frame(config: &kinetica::ShowConfig, args: FrameArgs) -> anyhow::Result<()> {
    let mut player = kinetica::Player::new(config)?;
    let frame = player
        .render_frame(&args.scene, kinetica::FrameIndex(args.frame))
        .with_context(|| format!("render '{}' frame {}", args.scene, args.frame))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    kinetica::write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(config: &kinetica::ShowConfig, args: RenderArgs) -> anyhow::Result<()> {
    let mut player = kinetica::Player::new(config)?;
    let is_mp4 = args
        .out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"));

    let stats = if is_mp4 {
        let mut sink = kinetica::FfmpegSink::new(kinetica::FfmpegSinkOpts {
            out_path: args.out.clone(),
            overwrite: !args.no_overwrite,
        });
        player.play(&args.scene, args.frames, &mut sink)?
    } else {
        let mut sink = kinetica::PngSequenceSink::new(&args.out);
        player.play(&args.scene, args.frames, &mut sink)?
    };

    eprintln!(
        "wrote {} ({} frames, {:.0} ms simulated)",
        args.out.display(),
        stats.frames_rendered,
        stats.duration_ms
    );
    Ok(())
}
