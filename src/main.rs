//! RustInterval - Interval Workout Timer
//!
//! Interactive command-line front end. Reads commands from stdin while the
//! timer runs in the background and prints a status line every second.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rustinterval::audio::{AudioEvent, CueSink, NullCueSink, ToneCueSink};
use rustinterval::storage::config::{load_config, load_config_from, AppConfig};
use rustinterval::ui::terminal::status_line;
use rustinterval::ui::{format_duration, Renderer, TerminalRenderer};
use rustinterval::workouts::{IntervalTimer, PlanStore, SetUpdate, TimerSession};

#[derive(Parser)]
#[command(version, about = "Interval workout timer with audio cues")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Work interval in seconds
    #[arg(long)]
    workout: Option<u32>,

    /// Rest interval in seconds
    #[arg(long)]
    rest: Option<u32>,

    /// Rounds per set
    #[arg(long)]
    rounds: Option<u32>,

    /// Countdown before each set in seconds
    #[arg(long)]
    countdown: Option<u32>,

    /// Number of identical sets to start with
    #[arg(long, default_value_t = 1)]
    sets: usize,

    /// Disable audio cues
    #[arg(long)]
    no_sound: bool,

    /// Print status as JSON lines
    #[arg(long)]
    json: bool,

    /// Start immediately instead of waiting for `start`
    #[arg(long)]
    autostart: bool,
}

#[derive(Parser)]
#[command(no_binary_name = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the plan from the first set
    Start,
    /// Pause the running timer
    Pause,
    /// Resume a paused timer
    Resume,
    /// Stop and restore a single default set
    Reset,
    /// Append a default set and select it
    Add,
    /// Remove a set (1-based)
    Remove { set: usize },
    /// Select a set (1-based)
    Select { set: usize },
    /// Edit a set (1-based)
    Edit {
        set: usize,
        #[arg(long)]
        workout: Option<u32>,
        #[arg(long)]
        rest: Option<u32>,
        #[arg(long)]
        rounds: Option<u32>,
        #[arg(long)]
        countdown: Option<u32>,
        #[arg(long)]
        details: Option<String>,
    },
    /// Show the current status
    Status,
    /// List the sets in the plan
    Plan,
    /// Set cue volume (0.0 - 1.0)
    Volume { level: f32 },
    /// Toggle cue mute
    Mute,
    /// Exit
    Quit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting RustInterval v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("loading configuration")?;

    let plan = build_plan(&args, &config)?;

    let tone_sink = if args.no_sound || !config.audio.enabled {
        None
    } else {
        match ToneCueSink::new(config.audio.clone()) {
            Ok(sink) => Some(Arc::new(sink)),
            Err(e) => {
                tracing::warn!("Audio cues disabled: {}", e);
                None
            }
        }
    };

    if let Some(sink) = &tone_sink {
        let mut events = sink.subscribe_events();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AudioEvent::Error { message }) => tracing::warn!("Audio: {}", message),
                    Ok(AudioEvent::CuePlayed { cue }) => tracing::trace!("Played {} cue", cue),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    let cue_sink: Arc<dyn CueSink> = match &tone_sink {
        Some(sink) => sink.clone(),
        None => Arc::new(NullCueSink),
    };

    let timer = IntervalTimer::new(plan, cue_sink).with_settings(config.timer.engine);
    let mut session = TimerSession::new(timer, config.timer.driver_settings());

    let mut failures = session.subscribe_cue_failures();
    tokio::spawn(async move {
        let mut reported = false;
        loop {
            match failures.recv().await {
                Ok(failure) if !reported => {
                    println!("audio cue failed: {} (further failures are logged)", failure.message);
                    reported = true;
                }
                Ok(_) | Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut rx = session.subscribe();
    let json = args.json;
    tokio::spawn(async move {
        let mut renderer = TerminalRenderer::new(std::io::stdout(), json);
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if let Err(e) = renderer.render(&snapshot) {
                tracing::warn!("Render failed: {}", e);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    });

    if args.autostart {
        session.start()?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut session, tone_sink.as_deref()) {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => println!("error: {}", e),
        }
    }

    session.reset();
    tracing::info!("Goodbye");
    Ok(())
}

/// Build the starting plan from config defaults and command-line overrides.
fn build_plan(args: &Args, config: &AppConfig) -> anyhow::Result<PlanStore> {
    let mut template = config.default_set.clone();
    if let Some(seconds) = args.workout {
        template.workout_duration = seconds;
    }
    if let Some(seconds) = args.rest {
        template.rest_duration = seconds;
    }
    if let Some(rounds) = args.rounds {
        template.rounds = rounds;
    }
    if let Some(seconds) = args.countdown {
        template.initial_countdown = seconds;
    }

    let sets = vec![template; args.sets.max(1)];
    let plan = PlanStore::from_sets(sets)
        .context("invalid set on the command line")?
        .with_default_set(config.default_set.clone())?
        .with_limits(config.limits);
    Ok(plan)
}

/// Run one command line. Returns true when the user asked to quit.
fn respond(
    line: &str,
    session: &mut TimerSession,
    audio: Option<&ToneCueSink>,
) -> anyhow::Result<bool> {
    let args = shlex::split(line).context("invalid quoting")?;
    let command = match CommandLine::try_parse_from(args) {
        Ok(line) => line.command,
        Err(e) => {
            // Usage errors and `help` both land here
            e.print()?;
            return Ok(false);
        }
    };

    match command {
        Command::Start => session.start()?,
        Command::Pause => session.pause()?,
        Command::Resume => session.resume()?,
        Command::Reset => session.reset(),
        Command::Add => {
            let index = session.add_set()?;
            println!("added set {}", index + 1);
        }
        Command::Remove { set } => {
            session.remove_set(to_index(set)?)?;
        }
        Command::Select { set } => session.select_set(to_index(set)?)?,
        Command::Edit {
            set,
            workout,
            rest,
            rounds,
            countdown,
            details,
        } => {
            let update = SetUpdate {
                workout_duration: workout,
                rest_duration: rest,
                rounds,
                initial_countdown: countdown,
                details,
            };
            if update.is_empty() {
                anyhow::bail!("nothing to change");
            }
            session.update_set(to_index(set)?, update)?;
        }
        Command::Status => println!("{}", status_line(&session.snapshot())),
        Command::Plan => print_plan(session),
        Command::Volume { level } => match audio {
            Some(sink) => {
                sink.set_volume(level);
                println!("volume {:.1}", sink.volume());
            }
            None => println!("audio is disabled"),
        },
        Command::Mute => match audio {
            Some(sink) => {
                let muted = sink.toggle_mute();
                println!("{}", if muted { "muted" } else { "unmuted" });
            }
            None => println!("audio is disabled"),
        },
        Command::Quit => return Ok(true),
    }

    Ok(false)
}

fn print_plan(session: &TimerSession) {
    session.inspect(|timer| {
        let current = timer.state().current_set_index;
        for (i, set) in timer.plan().sets().iter().enumerate() {
            let marker = if i == current { '>' } else { ' ' };
            println!(
                "{} {}. {} x ({}s work / {}s rest), {}s countdown{}{}",
                marker,
                i + 1,
                set.rounds,
                set.workout_duration,
                set.rest_duration,
                set.initial_countdown,
                if set.details.is_empty() { "" } else { " - " },
                set.details
            );
        }
        println!(
            "  total {}",
            format_duration(timer.plan().total_planned_seconds())
        );
    });
}

fn to_index(set: usize) -> anyhow::Result<usize> {
    set.checked_sub(1)
        .context("sets are numbered from 1")
}
