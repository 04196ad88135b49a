//! Diagnostics harness for the feature extraction engine.
//!
//! Streams deterministic synthetic capture ticks through a full engine
//! session and prints the published signals, so tuning changes can be
//! sanity-checked without a device capture pipeline.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use lightshow_audio::engine::source::{ManualTimeSource, StubCaptureSource};
use lightshow_audio::{fixtures, CaptureSource, EngineConfig, FeatureEngine, SessionHandle, TimeSource};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lsa-diag error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lsa-diag", about = "Synthetic session harness for the feature engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        match self.command {
            Command::Run(args) => run_command(args),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a synthetic tick pattern through the engine and print signals.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Synthetic pattern to generate.
    #[arg(long, value_enum, default_value_t = Pattern::Beats)]
    pattern: Pattern,
    /// Number of capture ticks to stream.
    #[arg(long, default_value_t = 100)]
    ticks: u64,
    /// Simulated milliseconds between ticks.
    #[arg(long, default_value_t = 20)]
    tick_ms: u64,
    /// Capture size in waveform samples (spectrum uses half as many bins).
    #[arg(long, default_value_t = 256)]
    capture_size: usize,
    /// Optional tuning config JSON (falls back to defaults).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print a signal line every N ticks.
    #[arg(long, default_value_t = 10)]
    report_every: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Pattern {
    /// Broadband noise spectra, music-like.
    Music,
    /// Single dominant wobbling bin, speech-like.
    Speech,
    /// Pure tone pushed through a real FFT.
    Tone,
    /// Alternating quiet/loud flux, exercises beat detection.
    Beats,
}

fn run_command(args: RunArgs) -> Result<()> {
    if args.ticks == 0 {
        bail!("--ticks must be at least 1");
    }
    if args.capture_size < 2 {
        bail!("--capture-size must be at least 2");
    }
    if args.report_every == 0 {
        bail!("--report-every must be at least 1");
    }

    let config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path),
        None => EngineConfig::default(),
    };

    let source = Arc::new(StubCaptureSource::new());
    let time = Arc::new(ManualTimeSource::new());
    let engine = FeatureEngine::new(
        config,
        Arc::clone(&source) as Arc<dyn CaptureSource>,
        Arc::clone(&time) as Arc<dyn TimeSource>,
    );
    let mut beats = engine.subscribe_beats();

    engine.attach(SessionHandle::new(1))?;

    let bins = args.capture_size / 2;
    let mut total_beats = 0u64;

    for tick in 0..args.ticks {
        let (waveform, spectrum) = generate_tick(args.pattern, tick, args.capture_size, bins);
        engine.ingest_waveform(&waveform, 44_100);
        engine.ingest_spectrum(&spectrum, 44_100);

        let mut fired = false;
        while beats.try_recv().is_ok() {
            total_beats += 1;
            fired = true;
        }

        if tick % args.report_every == 0 || fired {
            let snapshot = engine.snapshot();
            println!(
                "t={:>6}ms amplitude={:.3} speech={:.3}{}",
                tick * args.tick_ms,
                snapshot.amplitude,
                snapshot.speech_probability,
                if fired { "  BEAT" } else { "" }
            );
        }

        time.advance_ms(args.tick_ms);
    }

    engine.detach();

    let span_ms = args.ticks * args.tick_ms;
    println!(
        "{} ticks over {}ms: {} beats ({:.1} per second)",
        args.ticks,
        span_ms,
        total_beats,
        total_beats as f64 * 1000.0 / span_ms as f64
    );
    Ok(())
}

fn generate_tick(
    pattern: Pattern,
    tick: u64,
    capture_size: usize,
    bins: usize,
) -> (Vec<u8>, Vec<u8>) {
    match pattern {
        Pattern::Music => (
            fixtures::waveform_noise(capture_size, tick),
            fixtures::spectrum_noise(bins, tick),
        ),
        Pattern::Speech => {
            // Wobble the dominant bin to mimic a moving pitch
            let peak_bin = 2 + (tick as usize % 6);
            (
                fixtures::waveform_sine(capture_size, 3.0 + (tick % 4) as f32, 0.4),
                fixtures::spectrum_peaked(bins, peak_bin, 110),
            )
        }
        Pattern::Tone => {
            let waveform = fixtures::waveform_sine(capture_size, 8.0, 0.9);
            let spectrum = fixtures::spectrum_from_waveform(&waveform);
            (waveform, spectrum)
        }
        Pattern::Beats => {
            // Loud tick every 8th tick, quiet floor in between
            let loud = tick % 8 == 0;
            let level = if loud { 90 } else { 25 };
            let amplitude = if loud { 0.9 } else { 0.2 };
            (
                fixtures::waveform_sine(capture_size, 4.0, amplitude),
                fixtures::spectrum_uniform(bins, level),
            )
        }
    }
}
