use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use starfall::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layers {
    Starry,
    Alert,
    /// Red field behind the white one.
    Both,
}

impl Layers {
    fn presets(self) -> Vec<Preset> {
        match self {
            Layers::Starry => vec![Preset::Starry],
            Layers::Alert => vec![Preset::Alert],
            Layers::Both => vec![Preset::Alert, Preset::Starry],
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "starfall", about = "Falling star particle backgrounds")]
struct Args {
    #[arg(long, value_enum, default_value = "both")]
    preset: Layers,

    /// TOML field config; replaces the presets with this single field.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible animation. Layer n uses seed + n.
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window and print a summary.
    #[arg(long)]
    headless: bool,

    #[arg(long, default_value_t = 600)]
    frames: u64,

    #[arg(long, default_value_t = 1024.0)]
    width: f32,

    #[arg(long, default_value_t = 768.0)]
    height: f32,

    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f32,
}

fn build_fields(args: &Args) -> anyhow::Result<Vec<(String, ParticleField)>> {
    let configs = match &args.config {
        Some(path) => {
            let config = FieldConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
            vec![(path.display().to_string(), config)]
        },
        None => args
            .preset
            .presets()
            .into_iter()
            .map(|preset| (preset.name().to_string(), preset.config()))
            .collect(),
    };

    let mut fields = Vec::with_capacity(configs.len());
    for (i, (name, config)) in configs.into_iter().enumerate() {
        let field = match args.seed {
            Some(seed) => ParticleField::seeded(config, seed.wrapping_add(i as u64))?,
            None => ParticleField::from_entropy(config)?,
        };
        fields.push((name, field));
    }
    Ok(fields)
}

fn run_headless(args: &Args, fields: Vec<(String, ParticleField)>) {
    let viewport = SurfaceSize::with_pixel_ratio(args.width, args.height, args.pixel_ratio);
    let mut renderers: Vec<(String, FieldRenderer<HeadlessHost>)> = fields
        .into_iter()
        .map(|(name, field)| (name, FieldRenderer::new(HeadlessHost::new(viewport), field)))
        .collect();

    for (_, renderer) in &mut renderers {
        renderer.start();
    }
    for _ in 0..args.frames {
        for (_, renderer) in &mut renderers {
            if let Some(token) = renderer.host_mut().fire() {
                renderer.on_frame(token);
            }
        }
    }

    for (name, renderer) in &mut renderers {
        let field = renderer.field();
        let (circles, lines) = renderer
            .canvas()
            .map(|canvas| (canvas.circle_count(), canvas.line_count()))
            .unwrap_or_default();
        println!(
            "{name}: {} particles, {} frames, {} respawns, last frame {circles} dots / {lines} sparkle strokes",
            field.particles().len(),
            field.frames(),
            field.resets(),
        );
        renderer.stop();
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let fields = build_fields(&args)?;
    info!(layers = fields.len(), headless = args.headless, "starting");

    if args.headless {
        run_headless(&args, fields);
        return Ok(());
    }
    run_window(fields)
}

#[cfg(feature = "native")]
fn run_window(fields: Vec<(String, ParticleField)>) -> anyhow::Result<()> {
    starfall::native::run(starfall::native::NativeOptions {
        title: "Starfall".to_string(),
        background: Color::from_hex("#0a0a0f")?,
        fields: fields.into_iter().map(|(_, field)| field).collect(),
    })?;
    Ok(())
}

#[cfg(not(feature = "native"))]
fn run_window(_fields: Vec<(String, ParticleField)>) -> anyhow::Result<()> {
    anyhow::bail!("built without the `native` feature; use --headless")
}
