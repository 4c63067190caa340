use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use image::RgbImage;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    /// JSON configuration file (environment variables override it).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the capplet preview as a PNG.
    Preview(PreviewArgs),
    /// Render the desktop on an in-memory display and write the root as a PNG.
    Render(RenderArgs),
    /// Apply preferences to the running X display (requires the `x11` feature).
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Preferences JSON; defaults apply when omitted.
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Preview size as WIDTHxHEIGHT.
    #[arg(long)]
    size: Option<backdrop::Size>,

    /// Screen size the preview stands for, as WIDTHxHEIGHT.
    #[arg(long)]
    screen: Option<backdrop::Size>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Preferences JSON; defaults apply when omitted.
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Screen size as WIDTHxHEIGHT.
    #[arg(long)]
    screen: Option<backdrop::Size>,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Preferences JSON; defaults apply when omitted.
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// X display name, e.g. `:0`.
    #[arg(long)]
    display: Option<String>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = backdrop::AppConfig::load(cli.config.as_deref())?;
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args, cfg),
        Command::Render(args) => cmd_render(args, cfg),
        Command::Apply(args) => cmd_apply(args, cfg),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(backdrop::ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_prefs(path: Option<&Path>) -> anyhow::Result<backdrop::Preferences> {
    let Some(path) = path else {
        return Ok(backdrop::Preferences::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read preferences '{}'", path.display()))?;
    Ok(backdrop::Preferences::from_json_str(&text)?)
}

fn memory_applier(
    cfg: &backdrop::AppConfig,
    screen: backdrop::Size,
) -> anyhow::Result<(backdrop::MemoryDisplay, backdrop::Applier)> {
    let server = backdrop::MemoryDisplay::new(screen);
    let ctx = backdrop::DisplayContext::new(Box::new(server.connect()))?;
    let pipeline = backdrop::RenderPipeline::new(ctx).with_lower_priority(cfg.lower_priority);
    let applier = with_legacy(backdrop::Applier::new(pipeline), cfg)?;
    Ok((server, applier))
}

fn with_legacy(
    applier: backdrop::Applier,
    cfg: &backdrop::AppConfig,
) -> anyhow::Result<backdrop::Applier> {
    Ok(match &cfg.legacy_config {
        Some(path) => applier.with_legacy_store(Box::new(backdrop::KeyFileStore::open(path)?)),
        None => applier,
    })
}

fn write_png(out: &Path, img: &RgbImage) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn report_outcome(outcome: &backdrop::ApplyOutcome) {
    if outcome.wallpaper_load_failed {
        eprintln!("warning: wallpaper could not be loaded; rendered without it");
    }
    if outcome.disabled {
        eprintln!("background is disabled");
    }
    if let Some(id) = outcome.shell_surface {
        eprintln!("desktop shell owns the root (surface {id:#x})");
    }
}

fn cmd_preview(args: PreviewArgs, cfg: backdrop::AppConfig) -> anyhow::Result<()> {
    let prefs = read_prefs(args.prefs.as_deref())?;
    let screen = args.screen.unwrap_or(cfg.screen);
    let (_server, applier) = memory_applier(&cfg, screen)?;
    let mut applier = applier.with_preview_size(args.size.unwrap_or(cfg.preview_size));

    let outcome = applier.apply(&prefs, backdrop::Targets::PREVIEW)?;
    report_outcome(&outcome);

    let pixels = applier
        .preview_renderer()
        .and_then(backdrop::Renderer::preview_pixels)
        .context("preview was not rendered")?;
    write_png(&args.out, pixels)
}

fn cmd_render(args: RenderArgs, cfg: backdrop::AppConfig) -> anyhow::Result<()> {
    let prefs = read_prefs(args.prefs.as_deref())?;
    let screen = args.screen.unwrap_or(cfg.screen);
    let (server, mut applier) = memory_applier(&cfg, screen)?;

    let outcome = applier.apply(&prefs, backdrop::Targets::DESKTOP)?;
    report_outcome(&outcome);

    let root = root_image(&server, screen)?;
    write_png(&args.out, &root)
}

/// What the root window shows: the published surface tiled, or the flat root color.
fn root_image(server: &backdrop::MemoryDisplay, screen: backdrop::Size) -> anyhow::Result<RgbImage> {
    match server.background() {
        backdrop::RootBackground::Color(c) => Ok(RgbImage::from_pixel(
            screen.width,
            screen.height,
            c.into(),
        )),
        backdrop::RootBackground::Surface(id) => {
            let tile = server
                .surface_pixels(id)
                .with_context(|| format!("published surface {id:#x} is gone"))?;
            anyhow::ensure!(
                tile.width() > 0 && tile.height() > 0,
                "published surface {id:#x} is empty"
            );
            Ok(RgbImage::from_fn(screen.width, screen.height, |x, y| {
                *tile.get_pixel(x % tile.width(), y % tile.height())
            }))
        }
        backdrop::RootBackground::None => anyhow::bail!("nothing was published on the root"),
    }
}

#[cfg(feature = "x11")]
fn cmd_apply(args: ApplyArgs, cfg: backdrop::AppConfig) -> anyhow::Result<()> {
    let prefs = read_prefs(args.prefs.as_deref())?;
    let display = backdrop::X11Display::open(args.display.as_deref().or(cfg.display.as_deref()))?;
    let ctx = backdrop::DisplayContext::new(Box::new(display))?;
    let pipeline = backdrop::RenderPipeline::new(ctx).with_lower_priority(cfg.lower_priority);
    let mut applier = with_legacy(backdrop::Applier::new(pipeline), &cfg)?;

    let outcome = applier.apply(&prefs, backdrop::Targets::DESKTOP)?;
    report_outcome(&outcome);
    if let Some(report) = outcome.desktop {
        eprintln!(
            "applied (published: {}, surface created: {})",
            report.published, report.surface_created
        );
    }
    Ok(())
}

#[cfg(not(feature = "x11"))]
fn cmd_apply(args: ApplyArgs, _cfg: backdrop::AppConfig) -> anyhow::Result<()> {
    read_prefs(args.prefs.as_deref())?;
    anyhow::bail!(
        "`apply` to display {:?} needs a build with the `x11` feature",
        args.display.as_deref().unwrap_or("$DISPLAY")
    )
}
