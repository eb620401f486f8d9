use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use focusday_core::timer::{next_mode, DriverOptions, TimerController, TimerMode};
use focusday_core::{Config, CueService, Event, SilentCue, TerminalBell};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::CliResult;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer, reading commands from stdin and printing events as JSON lines
    ///
    /// Commands: start, stop, toggle, reset, mode <mode>, set <mode> <minutes>,
    /// status, quit.
    Run {
        /// Mode to begin in (work, short-break, long-break, stopwatch)
        #[arg(long, default_value = "work")]
        mode: TimerMode,
        /// Start counting immediately
        #[arg(long)]
        start: bool,
        /// Redraw the countdown on stderr every second
        #[arg(long)]
        progress: bool,
    },
    /// Print the mode that follows MODE at CYCLE
    Next {
        mode: TimerMode,
        /// Cycle count, 1-based
        #[arg(default_value_t = 1)]
        cycle: u32,
        /// Work intervals before a long break (defaults to the config value)
        #[arg(long)]
        cycles: Option<u32>,
    },
    /// Print the configured durations as JSON
    Durations,
}

pub fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Run {
            mode,
            start,
            progress,
        } => {
            let config = Config::load()?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run_interactive(config, mode, start, progress))
        }
        TimerAction::Next {
            mode,
            cycle,
            cycles,
        } => {
            let threshold = match cycles {
                Some(n) => n,
                None => Config::load()?.timer_settings().cycles_before_long_break,
            };
            let (next, next_cycle) = next_mode(mode, cycle, threshold.max(1));
            let out = serde_json::json!({
                "from": mode,
                "to": next,
                "cycle_count": next_cycle,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
        TimerAction::Durations => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config.durations())?);
            Ok(())
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

async fn run_interactive(
    config: Config,
    mode: TimerMode,
    start: bool,
    progress: bool,
) -> CliResult {
    let cue: Arc<dyn CueService> = if config.cues.sound {
        Arc::new(TerminalBell { sound: true })
    } else {
        Arc::new(SilentCue)
    };
    let mut options = DriverOptions::new(config.durations(), config.timer_settings(), cue);
    options.haptic = config.cues.haptic;

    let mut timer = TimerController::new(options);
    let mut events = timer.subscribe();
    let mut state = timer.watch();
    timer.select_mode(mode);
    // Drop the mode event; the snapshot below already describes it.
    let _ = events.try_recv();
    print_event(&timer.snapshot())?;
    if start {
        timer.start();
    }
    info!(%mode, "timer session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        // Pending events print before the next command is read.
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Ok(event) => print_event(&event)?,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event output lagged"),
                Err(RecvError::Closed) => break,
            },
            changed = state.changed(), if progress => {
                if changed.is_err() {
                    break;
                }
                let display = state.borrow_and_update().display();
                eprint!("\r{display} ");
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(&mut timer, &line)? {
                    Flow::Continue => {}
                    Flow::Quit => break,
                }
            }
        }
    }

    timer.stop();
    while let Ok(event) = events.try_recv() {
        print_event(&event)?;
    }
    info!("timer session ended");
    Ok(())
}

/// Apply one stdin command. Bad input is reported and the session goes on.
/// Durations edited with `set` last for this session only.
fn handle_line(timer: &mut TimerController, line: &str) -> Result<Flow, Box<dyn std::error::Error>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Flow::Continue);
    };

    match command {
        "start" => {
            timer.start();
        }
        "stop" | "pause" => {
            timer.stop();
        }
        "toggle" => {
            timer.toggle();
        }
        "reset" => {
            timer.reset();
        }
        "mode" => match words.next().map(str::parse::<TimerMode>) {
            Some(Ok(mode)) => {
                timer.select_mode(mode);
            }
            Some(Err(e)) => eprintln!("error: {e}"),
            None => eprintln!("error: usage: mode <mode>"),
        },
        "set" => {
            let (Some(mode), Some(input)) = (words.next(), words.next()) else {
                eprintln!("error: usage: set <mode> <minutes>");
                return Ok(Flow::Continue);
            };
            let mode = match mode.parse::<TimerMode>() {
                Ok(mode) => mode,
                Err(e) => {
                    eprintln!("error: {e}");
                    return Ok(Flow::Continue);
                }
            };
            if !mode.is_countdown() {
                eprintln!("error: stopwatch has no duration");
                return Ok(Flow::Continue);
            }
            let durations = timer.durations().with_input(mode, input);
            timer.apply_durations(durations);
        }
        "status" => print_event(&timer.snapshot())?,
        "quit" | "exit" => return Ok(Flow::Quit),
        other => eprintln!("error: unknown command: {other}"),
    }
    Ok(Flow::Continue)
}

fn print_event(event: &Event) -> CliResult {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string(event)?)?;
    stdout.flush()?;
    Ok(())
}
