use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use voice_detector::analysis::scoring::ScorerKind;
use voice_detector::audio::load_wav_file;
use voice_detector::fixtures::{write_wav, SignalPattern, SignalSpec, DEFAULT_SEED};
use voice_detector::{AppConfig, DetectionReport, DetectionResult, VoiceDetector};

#[derive(Parser, Debug)]
#[command(
    name = "voice_cli",
    about = "Classify recordings as AI-generated or human speech"
)]
struct Cli {
    /// JSON configuration file (defaults to assets/detector_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a WAV file
    Detect {
        #[arg(long)]
        input: PathBuf,
        /// Scoring strategy (signal-weighted or baseline)
        #[arg(long)]
        scorer: Option<ScorerKind>,
        /// Include features and category scores in the output
        #[arg(long)]
        report: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the extracted feature vector of a WAV file
    Features {
        #[arg(long)]
        input: PathBuf,
    },
    /// Write a deterministic synthetic recording
    Synth {
        #[arg(long, default_value = "speech-like")]
        pattern: SignalPattern,
        #[arg(long, default_value_t = 3_000)]
        duration_ms: u32,
        #[arg(long, default_value_t = 16_000)]
        sample_rate: u32,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        #[arg(long)]
        output: PathBuf,
    },
    /// Run the REST service
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    voice_detector::init_logging(cli.verbose);
    tracing::debug!(command = ?cli.command, "voice_cli starting");

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli
        .config
        .as_deref()
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load)
        .with_env_overrides();

    match cli.command {
        Commands::Detect {
            input,
            scorer,
            report,
            output,
        } => run_detect(&config, &input, scorer, report, output),
        Commands::Features { input } => run_features(&config, &input),
        Commands::Synth {
            pattern,
            duration_ms,
            sample_rate,
            seed,
            output,
        } => {
            let spec = SignalSpec {
                sample_rate,
                seed,
                ..SignalSpec::new(pattern, duration_ms)
            };
            run_synth(&spec, &output)
        }
        Commands::Serve { host, port } => run_serve(&config, host, port),
    }
}

fn build_detector(config: &AppConfig, scorer: Option<ScorerKind>) -> Result<VoiceDetector> {
    let kind = scorer.unwrap_or(config.detector.scorer);
    VoiceDetector::with_scorer(config, kind).context("invalid detector calibration")
}

fn run_detect(
    config: &AppConfig,
    input: &Path,
    scorer: Option<ScorerKind>,
    report: bool,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let detector = build_detector(config, scorer)?;
    let waveform = load_wav_file(input, &config.detector)
        .with_context(|| format!("loading {}", input.display()))?;

    let json = if report {
        let report: DetectionReport = detector.analyze(&waveform);
        serde_json::to_string_pretty(&report)?
    } else {
        let result: DetectionResult = detector.detect(&waveform);
        serde_json::to_string_pretty(&result)?
    };

    emit(&json, output_path)?;
    Ok(ExitCode::from(0))
}

fn run_features(config: &AppConfig, input: &Path) -> Result<ExitCode> {
    let detector = build_detector(config, None)?;
    let waveform = load_wav_file(input, &config.detector)
        .with_context(|| format!("loading {}", input.display()))?;

    let payload = FeaturesPayload {
        input: input.display().to_string(),
        sample_rate: waveform.sample_rate(),
        duration_secs: waveform.duration_secs(),
        features: detector.features(&waveform),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(ExitCode::from(0))
}

fn run_synth(spec: &SignalSpec, output: &Path) -> Result<ExitCode> {
    let samples = spec.generate();
    write_wav(output, &samples, spec.sample_rate)
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "Wrote {} ({} samples, {} Hz, {})",
        output.display(),
        samples.len(),
        spec.sample_rate,
        spec.pattern
    );
    Ok(ExitCode::from(0))
}

#[cfg(feature = "http")]
fn run_serve(config: &AppConfig, host: Option<String>, port: Option<u16>) -> Result<ExitCode> {
    let host = host.unwrap_or_else(|| config.http.host.clone());
    let port = port.unwrap_or(config.http.port);
    let addr: std::net::SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))?;
    voice_detector::http::serve_blocking(config, addr)?;
    Ok(ExitCode::from(0))
}

#[cfg(not(feature = "http"))]
fn run_serve(_config: &AppConfig, _host: Option<String>, _port: Option<u16>) -> Result<ExitCode> {
    anyhow::bail!("voice_cli was built without the `http` feature")
}

fn emit(json: &str, output_path: Option<PathBuf>) -> Result<()> {
    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(())
}

#[derive(Serialize)]
struct FeaturesPayload {
    input: String,
    sample_rate: u32,
    duration_secs: f32,
    features: voice_detector::analysis::features::FeatureVector,
}
