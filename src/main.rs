use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emojify::models::AppConfig;
use emojify::rendering::load_png;
use emojify::services::{AssetStore, MosaicPipeline};

#[derive(Parser)]
#[command(name = "emojify")]
#[command(about = "Render images as emoji mosaics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a PNG image as emoji text
    Render {
        /// Source PNG image
        #[arg(short, long)]
        image: PathBuf,

        /// Feature corpus JSON
        #[arg(short, long)]
        corpus: PathBuf,

        /// PCA embedding corpus JSON (enables the compressed matcher)
        #[arg(long)]
        embeddings: Option<PathBuf>,

        /// Quad codebook JSON (enables 2x2 refinement)
        #[arg(long)]
        codebook: Option<PathBuf>,

        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the mosaic to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Background the mosaic will be shown on
        #[arg(short, long)]
        background: Option<String>,

        /// Mosaic width in glyphs
        #[arg(long)]
        columns: Option<usize>,

        /// Sample among the N closest glyphs
        #[arg(long)]
        diversity: Option<usize>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Skip 2x2 quad refinement
        #[arg(long)]
        no_refine: bool,

        /// Skip annealing diffusion
        #[arg(long)]
        no_diffuse: bool,
    },
    /// Summarise a feature corpus
    Inspect {
        /// Feature corpus JSON
        #[arg(short, long)]
        corpus: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the known background colours
    Backgrounds,
}

#[derive(Serialize)]
struct CorpusSummary {
    version: u32,
    grid_size: usize,
    entries: usize,
    backgrounds: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the mosaic
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emojify=info,emoji_mosaic=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Render {
            image,
            corpus,
            embeddings,
            codebook,
            config,
            output,
            background,
            columns,
            diversity,
            seed,
            no_refine,
            no_diffuse,
        } => {
            let mut config = AppConfig::load(config.as_deref());
            if let Some(background) = background {
                config.matcher.background = background;
            }
            if let Some(columns) = columns {
                config.matcher.columns = columns;
            }
            if let Some(diversity) = diversity {
                config.matcher.diversity = diversity;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if no_refine {
                config.refine.enabled = false;
            }
            if no_diffuse {
                config.diffuse.enabled = false;
            }
            run_render_command(
                &image,
                &corpus,
                embeddings.as_deref(),
                codebook.as_deref(),
                &config,
                output.as_deref(),
            )
        }
        Commands::Inspect { corpus, json } => run_inspect_command(&corpus, json),
        Commands::Backgrounds => {
            run_backgrounds_command();
            Ok(())
        }
    }
}

fn run_render_command(
    image: &Path,
    corpus: &Path,
    embeddings: Option<&Path>,
    codebook: Option<&Path>,
    config: &AppConfig,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let assets = AssetStore::load(corpus, embeddings, codebook)?;
    let source = load_png(image)?;
    let report = MosaicPipeline::new(&assets, config).run(&source)?;

    if let Some((initial, final_score)) = report.diffusion_scores {
        tracing::info!(initial, final_score, "Diffusion scores");
    }

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", report.text))?;
            eprintln!(
                "Wrote {}x{} mosaic to {} in {:.1?}",
                report.cols,
                report.rows,
                path.display(),
                report.elapsed
            );
        }
        None => println!("{}", report.text),
    }
    Ok(())
}

fn run_inspect_command(corpus: &Path, json: bool) -> anyhow::Result<()> {
    let corpus = AssetStore::load_corpus(corpus)?;
    let summary = CorpusSummary {
        version: corpus.version(),
        grid_size: corpus.grid_size(),
        entries: corpus.len(),
        backgrounds: corpus.backgrounds().to_vec(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Version:     {}", summary.version);
    println!("Grid size:   {0}x{0}", summary.grid_size);
    println!("Entries:     {}", summary.entries);
    println!("Backgrounds:");
    for name in &summary.backgrounds {
        match emoji_mosaic::background_color(name) {
            Some(color) => {
                let [r, g, b] = color.to_bytes();
                println!("  {name:<18} #{r:02x}{g:02x}{b:02x}");
            }
            None => println!("  {name:<18} (unknown colour, composited over white)"),
        }
    }
    Ok(())
}

fn run_backgrounds_command() {
    for (name, color) in emoji_mosaic::known_backgrounds() {
        let [r, g, b] = color.to_bytes();
        println!("{name:<18} #{r:02x}{g:02x}{b:02x}");
    }
}
