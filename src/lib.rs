pub mod append;
pub mod causes;
pub mod cli;
pub mod config;
pub mod data;
pub mod dataset;
pub mod derive;
pub mod error;
pub mod filter;
pub mod identity;
pub mod io_utils;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod table;
pub mod transform;
pub mod validate;

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::Cli,
    config::PipelineConfig,
    pipeline::CleaningPipeline,
    store::{CsvSink, CsvSource, OutputHint, OutputStage},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("farm_loss", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    install_interrupt_handler()?;
    let cli = Cli::parse();
    execute(&cli)
}

/// Ctrl-C ends the run with exit code 0; files already written stay as they are.
fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        info!("Interrupted");
        std::process::exit(0);
    })
    .context("Installing interrupt handler")
}

pub fn execute(cli: &Cli) -> Result<()> {
    let config = build_config(cli)?;
    ensure_directories(&config)?;

    let input_dir = cli.root.join(&cli.subdirectory);
    let inputs = discover_inputs(&input_dir)
        .with_context(|| format!("Listing input files in {input_dir:?}"))?;
    info!("Found {} input file(s) in {:?}", inputs.len(), input_dir);

    let sink = CsvSink::new(&config.cleaned_dir, &config.production_dir);
    let mut pipeline = CleaningPipeline::new(config, CsvSource, sink);
    let summary = pipeline.run(&inputs)?;

    print!("{}", table::render_summary(&summary));
    info!(
        "{} processed, {} skipped, {} failed",
        summary.processed(),
        summary.skipped(),
        summary.failed()
    );

    if cli.merge {
        merge_outputs(&summary.production_outputs(), &pipeline.into_sink())?;
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => PipelineConfig::default(),
    };
    if let Some(causes) = &cli.causes {
        config.causes_path = causes.clone();
    }
    if cli.input_encoding.is_some() {
        config.farm_reader.encoding = cli.input_encoding.clone();
    }
    if cli.no_index_column {
        config.farm_reader.skip_unnamed_index = false;
    }
    config.validate()?;
    Ok(config.resolved(&cli.root))
}

fn ensure_directories(config: &PipelineConfig) -> Result<()> {
    for dir in [&config.raw_dir, &config.cleaned_dir, &config.production_dir] {
        if !dir.exists() {
            fs::create_dir_all(dir).with_context(|| format!("Creating directory {dir:?}"))?;
            debug!("Created {:?}", dir);
        }
    }
    Ok(())
}

/// Regular files directly inside `dir`, sorted by name.
pub fn discover_inputs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut inputs = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    inputs.retain(|path| path.is_file());
    inputs.sort();
    Ok(inputs)
}

fn merge_outputs(outputs: &[PathBuf], sink: &CsvSink) -> Result<()> {
    if outputs.is_empty() {
        info!("No production files to merge");
        return Ok(());
    }
    let destination = sink.destination(OutputHint {
        source_name: "combined.csv",
        stage: OutputStage::Combined,
    });
    append::concat_files(outputs, &destination)
        .with_context(|| format!("Merging production files into {destination:?}"))?;
    info!("All files processed. Concatenations complete!");
    Ok(())
}
