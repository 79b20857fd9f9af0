//! Reprise - time-range repeat-loop controller
//!
//! Command-line front end: drives a simulated player through the repeat
//! controller, or replays a sample sequence through boundary detection.

use clap::{Parser, Subcommand};
use colored::Colorize;
use reprise::playback::{ProgressEvent, RepeatParameters};
use reprise::{
    BoundaryDetector, RepeatLoopController, RepriseConfig, RepriseError, SessionState, Severity,
    SimulatedPlayer, Timecode,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

#[derive(Parser)]
#[command(name = "reprise")]
#[command(version = "0.1.0")]
#[command(about = "Replay a time window on a media player a set number of times", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to .reprise/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Repeat a window on a simulated player
    Run {
        /// Window start (seconds, m:ss or h:mm:ss)
        #[arg(long)]
        start: Timecode,

        /// Window end (seconds, m:ss or h:mm:ss)
        #[arg(long)]
        end: Timecode,

        /// Number of repeats (0 loops until Ctrl-C)
        #[arg(short, long, default_value = "0")]
        repeats: u32,

        /// Simulated media length in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Simulated playback speed multiplier
        #[arg(long)]
        rate: Option<f64>,

        /// Interval between simulated position samples
        #[arg(long, value_name = "MS")]
        sample_interval_ms: Option<u64>,

        /// Interval between supervisor ticks
        #[arg(long, value_name = "MS")]
        poll_interval_ms: Option<u64>,

        /// Print the final repeat parameters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count boundary crossings in a sequence of position samples
    Classify {
        /// Window start (seconds, m:ss or h:mm:ss)
        #[arg(long)]
        start: Timecode,

        /// Window end (seconds, m:ss or h:mm:ss)
        #[arg(long)]
        end: Timecode,

        /// Hysteresis margin in seconds (defaults to the configured margin)
        #[arg(long)]
        margin: Option<f64>,

        /// Position samples in seconds, in arrival order
        #[arg(required = true, allow_negative_numbers = true)]
        samples: Vec<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "reprise=debug,info"
    } else {
        "reprise=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => RepriseConfig::default_path(&std::env::current_dir()?),
    };
    let mut config = match RepriseConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    match cli.command {
        Commands::Run {
            start,
            end,
            repeats,
            duration,
            rate,
            sample_interval_ms,
            poll_interval_ms,
            json,
        } => {
            if let Some(duration) = duration {
                config.simulation.duration = Some(duration);
            }
            if let Some(rate) = rate {
                config.simulation.rate = rate;
            }
            if let Some(ms) = sample_interval_ms {
                config.simulation.sample_interval_ms = ms;
            }
            if let Some(ms) = poll_interval_ms {
                config.controller.poll_interval_ms = ms;
            }
            if let Err(e) = config.validate() {
                fail(e);
            }

            let parameters = RepeatParameters::new(start.seconds(), end.seconds(), repeats);
            let last = run_repeat(&config, parameters).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&last)?);
            }
        }

        Commands::Classify {
            start,
            end,
            margin,
            samples,
        } => {
            let parameters = RepeatParameters::new(start.seconds(), end.seconds(), 0);
            if let Err(e) = parameters.validate() {
                fail(e.into());
            }

            let margin = margin.unwrap_or(config.controller.hysteresis_margin);
            if !margin.is_finite() || margin < 0.0 {
                fail(RepriseError::InvalidConfig {
                    field: "margin".to_string(),
                    reason: format!("must be a non-negative number: {}", margin),
                });
            }

            let detector = BoundaryDetector::new(margin);
            let count = detector.count_crossings(&samples, parameters.window());
            println!(
                "{} {} samples, window {} to {}",
                "Classified".bold(),
                samples.len(),
                start,
                end
            );
            println!("crossings: {}", count);
        }
    }

    Ok(())
}

/// Drive a simulated player until the run completes or Ctrl-C is pressed.
///
/// Returns the parameters a save request would receive.
async fn run_repeat(
    config: &RepriseConfig,
    parameters: RepeatParameters,
) -> anyhow::Result<Option<RepeatParameters>> {
    let player = Arc::new(SimulatedPlayer::new(&config.simulation));
    let controller = RepeatLoopController::new(player.clone(), config.controller.clone())?;
    let mut events = controller.events();
    let feed = player.spawn_feed(controller.clone(), config.simulation.sample_interval());

    if let Err(e) = controller.start(
        parameters.start_time,
        parameters.end_time,
        parameters.planned_repeats,
    ) {
        feed.abort();
        fail(e.into());
    }

    follow_events(&controller, &mut events, tokio::signal::ctrl_c()).await;

    feed.abort();
    Ok(controller.last_parameters())
}

/// Print events until the run completes or `shutdown` resolves.
///
/// On shutdown the session is stopped and the resulting events are drained.
/// Returns the number of events printed.
async fn follow_events<F>(
    controller: &RepeatLoopController,
    events: &mut broadcast::Receiver<ProgressEvent>,
    shutdown: F,
) -> usize
where
    F: Future,
{
    tokio::pin!(shutdown);
    let mut printed = 0;

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    print_event(&event);
                    printed += 1;
                    if event.state == SessionState::Completed {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed progress events");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown => {
                controller.stop();
                while let Ok(event) = events.try_recv() {
                    print_event(&event);
                    printed += 1;
                }
                break;
            }
        }
    }

    printed
}

fn print_event(event: &ProgressEvent) {
    let status = &event.report.status;
    let text = match status.severity {
        Severity::Success => status.text.green(),
        Severity::Error => status.text.red(),
        Severity::Warning => status.text.yellow(),
        Severity::Info => status.text.normal(),
    };
    println!("{}", text);

    if event.report.completion_signal {
        println!("\n{} All repeats done!", "OK".green().bold());
    }
}

fn fail(error: RepriseError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), error);
    std::process::exit(error.exit_code());
}
