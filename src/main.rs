//! facecap CLI
//!
//! Usage:
//!   facecap                                 # Interactive mode
//!   facecap --auto                          # Run capture → verify → save once
//!   facecap --serve                         # HTTP API server
//!   facecap --config facecap.toml --json    # Config file, JSON output

use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use facecap::config::AppConfig;
use facecap::core::{run_server, settle, RandomSampler, ScreenNavigator, Sequencer, SystemClock};
use facecap::types::{IdCard, Screen, SequencerError, SequencerOutput, WorkflowState};
use facecap::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "facecap",
    version = VERSION,
    about = "Simulated facial biometric capture → verify → save flow",
    long_about = "facecap drives the capture-verify-save sequencer of a simulated\n\
                  facial biometric flow. Nothing is captured, matched or stored:\n\
                  latency is simulated with timers and outcomes with random draws.\n\n\
                  Modes:\n  \
                  (default)      Type capture / verify / save / cancel / status / card\n  \
                  --auto         Run the whole flow once\n  \
                  --serve        HTTP API server mode\n\n\
                  States:\n  \
                  IDLE -> CAPTURING -> CAPTURED -> VERIFYING -> VERIFIED -> SAVING -> SAVED\n  \
                  VERIFYING -> VERIFICATION_FAILED (verify again to retry)"
)]
struct Args {
    /// Run capture, verify and save once
    #[arg(short, long)]
    auto: bool,

    /// Verify attempts in auto mode before giving up
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(if args.serve { "info" } else { "error" });

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match &args.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    let result = if args.serve {
        run_serve(&args, config).await
    } else if args.auto {
        run_auto(&args, config).await
    } else {
        run_interactive(&args, config).await
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn new_session(config: &AppConfig) -> (Sequencer, ScreenNavigator) {
    let navigator = ScreenNavigator::new();
    let sequencer = Sequencer::simulated(
        config.sequencer.clone(),
        SystemClock::new(),
        RandomSampler,
        navigator.clone(),
    );
    (sequencer, navigator)
}

/// Run interactive mode (default when no other mode is given)
async fn run_interactive(args: &Args, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (mut sequencer, navigator) = new_session(&config);
    let mut card_shown = false;

    print_header(Screen::FaceCapture);
    println!("Commands: capture | verify | save | cancel | status | card | quit");
    println!("Goal: capture, verify and save to reach the credential card");
    println!();
    print_prompt(&sequencer);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let wait = sequencer.time_until_next();
        tokio::select! {
            _ = sleep_until_due(wait) => {
                for output in sequencer.poll() {
                    print_output(&output, args);
                }
                if navigator.current() == Screen::IdInfo && !card_shown {
                    card_shown = true;
                    print_card(&config.card);
                }
                print_prompt(&sequencer);
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                let command = line.trim().to_ascii_lowercase();
                if command.is_empty() {
                    print_prompt(&sequencer);
                    continue;
                }
                if command == "quit" || command == "exit" {
                    println!("\nSession ended. Transitions: {}", sequencer.transition_count());
                    break;
                }

                let result = match command.as_str() {
                    "capture" | "c" => sequencer.begin_capture(),
                    "verify" | "v" => sequencer.verify(),
                    "save" | "s" => sequencer.save(),
                    "cancel" | "x" => sequencer.cancel(),
                    "status" => Ok(sequencer.current_output()),
                    "card" => {
                        if navigator.current() == Screen::IdInfo {
                            print_card(&config.card);
                        } else {
                            println!("{}", "Save face data first to view the card.".yellow());
                        }
                        print_prompt(&sequencer);
                        continue;
                    }
                    other => {
                        println!("{}", format!("Unknown command '{}'", other).yellow());
                        print_prompt(&sequencer);
                        continue;
                    }
                };
                match result {
                    Ok(output) => print_output(&output, args),
                    Err(err) => print_rejection(&err, args),
                }
                print_prompt(&sequencer);
            }
        }
    }
    Ok(())
}

/// Run the whole flow once, re-verifying up to `max_attempts` times
async fn run_auto(args: &Args, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (mut sequencer, navigator) = new_session(&config);

    if !args.json {
        print_header(Screen::FaceCapture);
    }

    print_output(&sequencer.begin_capture()?, args);
    settle(&mut sequencer, |output| print_output(output, args)).await;

    let mut attempts = 0;
    while sequencer.state() != WorkflowState::Verified && attempts < args.max_attempts {
        attempts += 1;
        print_output(&sequencer.verify()?, args);
        settle(&mut sequencer, |output| print_output(output, args)).await;
    }

    if sequencer.state() != WorkflowState::Verified {
        return Err(format!("verification failed after {} attempts", attempts).into());
    }

    print_output(&sequencer.save()?, args);
    settle(&mut sequencer, |output| print_output(output, args)).await;

    if navigator.current() == Screen::IdInfo {
        if args.json {
            println!("{}", serde_json::to_string(&config.card)?);
        } else {
            print_card(&config.card);
        }
    }
    Ok(())
}

/// Run HTTP API server
async fn run_serve(args: &Args, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("{}", format!("facecap API Server v{}", VERSION).bold());
    println!();
    run_server(&args.addr, config).await
}

async fn sleep_until_due(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending::<()>().await,
    }
}

fn print_header(screen: Screen) {
    println!("{}", "========================================".bold());
    println!("{}", format!("  facecap v{} - {}", VERSION, screen.title()).bold());
    println!("{}", "========================================".bold());
    println!();
}

fn print_prompt(sequencer: &Sequencer) {
    use std::io::Write;
    let state = sequencer.state();
    let label = format!("{} [{}]", state.emoji(), state).color(state.color());
    print!("{} > ", label);
    let _ = std::io::stdout().flush();
}

fn print_output(output: &SequencerOutput, args: &Args) {
    if args.json {
        match serde_json::to_string(output) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to encode output: {}", e),
        }
        return;
    }

    if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }

    if let Some(record) = &output.record {
        if output.state == WorkflowState::Captured {
            println!("  Biometric Data:");
            println!("    Confidence: {}%", record.confidence_score);
            println!("    Features:   {}", record.feature_summary);
            println!("    Liveness:   {}", record.liveness);
        }
    }
    if let Some(alert) = &output.alert {
        println!("{}", format!("  [{}] {}", alert.title, alert.message).bold());
    }
}

fn print_rejection(err: &SequencerError, args: &Args) {
    if args.json {
        let body = serde_json::json!({
            "code": err.reason().code(),
            "message": err.to_string(),
            "alert": err.alert(),
        });
        println!("{}", body);
        return;
    }
    let alert = err.alert();
    println!("{}", format!("  ⚠ [{}] {}", alert.title, alert.message).yellow());
}

fn print_card(card: &IdCard) {
    println!();
    print_header(Screen::IdInfo);
    for line in card.to_text().lines() {
        println!("  {}", line);
    }
    println!();
}
