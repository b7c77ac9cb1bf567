use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "deckforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a deck and write its slide plans as JSON.
    Build(BuildArgs),
    /// List the template ids found in a template directory.
    Templates(TemplatesArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Build request JSON.
    #[arg(long)]
    request: PathBuf,

    /// Template directory.
    #[arg(long)]
    templates: PathBuf,

    /// Engine config JSON. Omitted fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the image orientation draw (overrides the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Output plan JSON path. Defaults to a name derived from the deck title.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Comma-separated credit names, replacing the ones in the request.
    #[arg(long)]
    credits: Option<String>,

    /// Also render one PNG per slide into this directory.
    #[arg(long)]
    preview_dir: Option<PathBuf>,

    /// Preview scale relative to the canvas size in points.
    #[arg(long, default_value_t = 1.0)]
    preview_scale: f32,
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// Template directory.
    #[arg(long)]
    templates: PathBuf,
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
        Command::Build(args) => cmd_build(args),
        Command::Templates(args) => cmd_templates(args),
    }
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => deckforge::EngineConfig::from_path(path)?,
        None => deckforge::EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }
    let canvas = config.canvas();

    let mut request = deckforge::BuildRequest::from_path(&args.request)?;
    if let Some(raw) = &args.credits {
        request.credits = deckforge::parse_credit_names(raw, config.max_credit_names);
    }
    let out = args.out.clone().unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}.json",
            deckforge::suggested_file_stem(request.deck_title())
        ))
    });

    let registry = deckforge::TemplateRegistry::scan(&args.templates)?;
    let deck = deckforge::BuildSession::new(registry, config)?.compose(&request)?;

    if let Some(dir) = &args.preview_dir {
        let previews = deckforge::PreviewRenderer::new(canvas, args.preview_scale);
        let written = previews.write_all(&deck, dir)?;
        eprintln!("wrote {} previews to {}", written.len(), dir.display());
    }

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let stem = out
        .file_stem()
        .map_or_else(|| "plan".into(), |s| s.to_string_lossy());
    let plans = deck.export_to(&out.with_file_name(format!("{stem}_assets")))?;

    let f = File::create(&out).with_context(|| format!("create '{}'", out.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, &plans).context("write plan JSON")?;
    w.flush().context("flush plan JSON")?;

    eprintln!("wrote {} slide plans to {}", plans.len(), out.display());
    Ok(())
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<()> {
    let registry = deckforge::TemplateRegistry::scan(&args.templates)?;
    for id in registry.template_ids() {
        let source = registry.resolve(id);
        let (kind, path) = match &source.kind {
            deckforge::BackgroundKind::VectorDeck(p) => ("deck", Some(p)),
            deckforge::BackgroundKind::StaticRaster(p) => ("raster", Some(p)),
            deckforge::BackgroundKind::None => ("none", None),
        };
        match path {
            Some(p) => println!("{id}\t{kind}\t{}", p.display()),
            None => println!("{id}\t{kind}"),
        }
    }
    Ok(())
}
