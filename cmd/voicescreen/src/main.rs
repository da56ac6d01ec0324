//! voicescreen - Voice screening service and offline featurization tool.

mod config;
mod server;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voicescreen_screening::{dataset, Artifacts, FeaturePipeline, Screener};

use config::Config;

/// Screens voice recordings for acoustic markers of Parkinson's disease.
///
/// This is a research screening tool and not a medical diagnosis.
#[derive(Parser)]
#[command(name = "voicescreen")]
#[command(about = "Voice screening service and featurization tool")]
#[command(version)]
struct Cli {
    /// Config file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Classifier artifact path (overrides config)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Scaler artifact path (overrides config)
    #[arg(long, global = true)]
    scaler: Option<PathBuf>,

    /// Decoder order, comma-separated (e.g. wav,symphonia)
    #[arg(long, global = true, value_delimiter = ',')]
    decoders: Option<Vec<String>>,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP prediction service
    Serve {
        /// Listen address (e.g. :8000)
        #[arg(long)]
        listen: Option<String>,

        /// Maximum upload size in bytes
        #[arg(long)]
        max_upload_bytes: Option<usize>,
    },
    /// Screen a single audio file and print the result as JSON
    Predict {
        /// Audio file
        file: PathBuf,
    },
    /// Extract features for every recording in a metadata CSV
    Featurize {
        /// Metadata CSV with label and filepath (or audio_path) columns
        metadata: PathBuf,

        /// Base directory for relative audio paths (default: the CSV's directory)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Output JSON lines file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Fit a scaler from featurized JSON lines
    FitScaler {
        /// Feature JSON lines written by `featurize`
        features: PathBuf,

        /// Output scaler JSON (default: the configured scaler path)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(model) = &cli.model {
        cfg.model_path = model.clone();
    }
    if let Some(scaler) = &cli.scaler {
        cfg.scaler_path = scaler.clone();
    }
    if let Some(decoders) = &cli.decoders {
        cfg.decoders = decoders.clone();
    }

    match cli.command {
        Commands::Serve {
            listen,
            max_upload_bytes,
        } => {
            if let Some(listen) = listen {
                cfg.listen = listen;
            }
            if let Some(max) = max_upload_bytes {
                cfg.max_upload_bytes = max;
            }
            let screener = load_screener(&cfg)?;
            server::start_server(&cfg.listen, screener, cfg.max_upload_bytes).await
        }
        Commands::Predict { file } => {
            let screener = load_screener(&cfg)?;
            let bytes = std::fs::read(&file).with_context(|| format!("read {}", file.display()))?;
            let result = screener
                .predict(&bytes)
                .with_context(|| format!("screen {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Featurize {
            metadata,
            base_dir,
            output,
        } => featurize(&cfg, &metadata, base_dir, output.as_deref()),
        Commands::FitScaler { features, output } => {
            let output = output.unwrap_or_else(|| cfg.scaler_path.clone());
            fit_scaler(&features, &output)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads artifacts once; the process does not serve without them.
fn load_screener(cfg: &Config) -> Result<Arc<Screener>> {
    let artifacts = Artifacts::load(&cfg.artifact_paths()).context("load artifacts")?;
    let decoders = cfg.decoder_chain()?;
    info!(decoders = ?decoders.names(), "decoder chain ready");
    Ok(Arc::new(Screener::with_decoders(Arc::new(artifacts), decoders)))
}

fn featurize(cfg: &Config, metadata: &Path, base_dir: Option<PathBuf>, output: Option<&Path>) -> Result<()> {
    let file = File::open(metadata).with_context(|| format!("open {}", metadata.display()))?;
    let rows = dataset::read_metadata(file).with_context(|| format!("read {}", metadata.display()))?;
    let base = base_dir.unwrap_or_else(|| metadata.parent().map(Path::to_path_buf).unwrap_or_default());
    let pipeline = FeaturePipeline::new(cfg.decoder_chain()?);

    let written = match output {
        Some(path) => {
            let out = File::create(path).with_context(|| format!("create {}", path.display()))?;
            dataset::featurize(&pipeline, &rows, &base, BufWriter::new(out))?
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            let n = dataset::featurize(&pipeline, &rows, &base, &mut lock)?;
            lock.flush()?;
            n
        }
    };
    info!(records = written, "featurized");
    Ok(())
}

fn fit_scaler(features: &Path, output: &Path) -> Result<()> {
    let file = File::open(features).with_context(|| format!("open {}", features.display()))?;
    let records = dataset::read_records(BufReader::new(file))?;
    let scaler = dataset::fit_scaler(&records)?;
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    std::fs::write(output, serde_json::to_vec_pretty(&scaler)?)
        .with_context(|| format!("write {}", output.display()))?;
    info!(path = %output.display(), records = records.len(), "wrote scaler");
    Ok(())
}
