use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storyreel::encode::ensure_parent_dir;
use storyreel::{
    Container, ExportConfig, ExportSession, FfmpegSink, FfmpegSinkOpts, Fps, Language,
    ProgressEvent, RandomStyles, Story, load_story,
};

#[derive(Parser, Debug)]
#[command(name = "storyreel", version, about = "Export an illustrated story as a video")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a story manifest to WebM/MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print per-scene frame counts and animation plans as JSON without encoding.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct StoryArgs {
    /// Story manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Export config JSON; CLI flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the per-scene animation style choice.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    fps: Option<u32>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    story: StoryArgs,

    /// Output file, or a directory to place `story-<millis>.<ext>` in.
    #[arg(long)]
    out: PathBuf,

    /// Progress/error language (gu, hi, en). Defaults to the manifest's language.
    #[arg(long)]
    lang: Option<Language>,

    /// Pace frames at wall-clock rate.
    #[arg(long)]
    realtime: bool,

    #[arg(long)]
    container: Option<Container>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[command(flatten)]
    story: StoryArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn load(args: &StoryArgs) -> anyhow::Result<(ExportConfig, Story, Language)> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };
    if let Some(fps) = args.fps {
        config.fps = Fps::new(fps, 1)?;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    config.validate()?;

    let (story, language) = load_story(&args.in_path, config.timeline_opts())
        .with_context(|| format!("load story '{}'", args.in_path.display()))?;
    Ok((config, story, language))
}

fn make_session(config: ExportConfig, seed: Option<u64>) -> anyhow::Result<ExportSession> {
    let styles = match seed {
        Some(seed) => RandomStyles::seeded(seed),
        None => RandomStyles::from_entropy(),
    };
    Ok(ExportSession::new(config)?.with_styles(styles))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut config, story, manifest_language) = load(&args.story)?;
    if let Some(container) = args.container {
        config.container = container;
    }
    config.realtime |= args.realtime;
    let language = args.lang.unwrap_or(manifest_language);

    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        container: config.container,
        bg_rgba: config.background_rgba,
    });
    let mut session = make_session(config, args.story.seed)?
        .with_language(language)
        .with_progress(|ev: ProgressEvent| eprintln!("[{:>3}%] {}", ev.percent, ev.message));

    let outcome = match session.export(&story, &mut sink) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("{}", err.user_message(language));
            return Err(err).context("export failed");
        }
    };

    let out_path = resolve_out_path(&args.out, &outcome.artifact.suggested_file_name());
    ensure_parent_dir(&out_path)?;
    std::fs::write(&out_path, &outcome.artifact.bytes)
        .with_context(|| format!("write video '{}'", out_path.display()))?;

    println!(
        "wrote {} ({}, {} frames, {:.2}s)",
        out_path.display(),
        outcome.artifact.mime_type,
        outcome.report.total_frames,
        outcome.report.video_duration_secs()
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let (config, story, _language) = load(&args.story)?;
    let mut session = make_session(config, args.story.seed)?;
    let report = session.plan(&story)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn resolve_out_path(out: &Path, suggested: &str) -> PathBuf {
    if out.is_dir() {
        out.join(suggested)
    } else {
        out.to_path_buf()
    }
}
