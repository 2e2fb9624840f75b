use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use thumbforge::{
    ArtifactWriter, BackgroundRemover, BorderKeyRemover, ColorPair, CommandRemover, Compositor,
    Rgb8, ThumbnailConfig,
};

#[derive(Parser, Debug)]
#[command(name = "thumbforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render wallpaper, thumbnail and (with --photo) the final image as PNGs.
    Render(RenderArgs),
    /// Print a random color and its complement.
    Colors(ColorsArgs),
    /// Write the default configuration as JSON.
    InitConfig(InitConfigArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Configuration JSON; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Photo (PNG/JPEG) to cut out and paste over the thumbnail.
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Directory receiving the stage PNGs.
    #[arg(long, default_value = "renders")]
    out_dir: PathBuf,

    /// Also copy the downloadable image here (a directory gets `thumbnail_image.png`).
    #[arg(long)]
    download: Option<PathBuf>,

    /// Background remover used for --photo.
    #[arg(long, value_enum, default_value_t = RemoverChoice::BorderKey)]
    remover: RemoverChoice,

    /// Override the title font.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Override the logo asset.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Do not paste the logo.
    #[arg(long)]
    no_logo: bool,

    /// Override the first wallpaper color (#RRGGBB).
    #[arg(long)]
    color1: Option<Rgb8>,

    /// Override the second wallpaper color (#RRGGBB).
    #[arg(long)]
    color2: Option<Rgb8>,
}

#[derive(Parser, Debug)]
struct ColorsArgs {
    /// Seed for the random color; defaults to the current time.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct InitConfigArgs {
    /// Output path; prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RemoverChoice {
    /// Built-in border flood-fill keyer.
    BorderKey,
    /// External `rembg` command.
    Rembg,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Colors(args) => cmd_colors(args),
        Command::InitConfig(args) => cmd_init_config(args),
    }
}

fn load_config(args: &RenderArgs) -> anyhow::Result<ThumbnailConfig> {
    let mut cfg = match &args.config {
        Some(path) => ThumbnailConfig::from_path(path)?,
        None => ThumbnailConfig::default(),
    };
    if let Some(font) = &args.font {
        cfg.font_path = font.clone();
    }
    if let Some(logo) = &args.logo {
        cfg.logo.path = logo.clone();
    }
    if args.no_logo {
        cfg.logo.enabled = false;
    }
    if let Some(c) = args.color1 {
        cfg.colors.first = c;
    }
    if let Some(c) = args.color2 {
        cfg.colors.second = c;
    }
    Ok(cfg)
}

fn make_remover(choice: RemoverChoice) -> Box<dyn BackgroundRemover> {
    match choice {
        RemoverChoice::BorderKey => Box::new(BorderKeyRemover::default()),
        RemoverChoice::Rembg => Box::new(CommandRemover::default()),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    cfg.validate()?;

    let photo = match &args.photo {
        Some(path) => Some(
            image::open(path).with_context(|| format!("open photo '{}'", path.display()))?,
        ),
        None => None,
    };

    let compositor = Compositor::from_config(&cfg)?.with_remover(make_remover(args.remover));
    let composite = compositor.compose(&cfg, photo.as_ref())?;

    let written = ArtifactWriter::new(&args.out_dir).write(&composite)?;
    eprintln!("wrote {}", written.thumbnail.display());
    if let Some(fin) = &written.final_image {
        eprintln!("wrote {}", fin.display());
    }

    if let Some(target) = &args.download {
        let path = download_path(target);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create download dir '{}'", parent.display()))?;
        }
        let bytes = thumbforge::download_bytes(&composite)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("write download '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn download_path(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.join(thumbforge::DOWNLOAD_FILE_NAME)
    } else {
        target.to_path_buf()
    }
}

fn cmd_colors(args: ColorsArgs) -> anyhow::Result<()> {
    let seed = match args.seed {
        Some(seed) => seed,
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .context("system clock before unix epoch")?
            .as_nanos() as u64,
    };
    let pair = ColorPair::random_complementary(seed);
    println!("{} {}", pair.first, pair.second);
    Ok(())
}

fn cmd_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    let json = ThumbnailConfig::default().to_json_pretty()?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("write config '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
