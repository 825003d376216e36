use std::io::Write;
use std::sync::Mutex;

use clap::{Args, Subcommand};
use medita_core::timer::display::{format_remaining, state_label};
use medita_core::timer::{driver, SystemClock};
use medita_core::{
    Command, Config, Event, Preset, TimerEngine, TimerSession, TimerState, TransitionPolicy,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

type BoxError = Box<dyn std::error::Error>;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run an interactive countdown (auto-starts)
    ///
    /// Stdin commands: s=start, p=pause, t or space=toggle, r=reset,
    /// bg=suspend, fg=resume, preset N, custom M S, q=quit
    Run {
        #[command(flatten)]
        duration: DurationArgs,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
        /// Treat no-op commands as errors
        #[arg(long)]
        strict: bool,
        /// Keep running after completion until `q`
        #[arg(long)]
        stay: bool,
    },
    /// Print the idle state for a duration as JSON
    Status {
        #[command(flatten)]
        duration: DurationArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct DurationArgs {
    /// Quick-select preset in minutes (1, 3, 5, 10, 15)
    #[arg(long, conflicts_with_all = ["minutes", "seconds"])]
    preset: Option<u32>,
    /// Custom duration minutes
    #[arg(long)]
    minutes: Option<u32>,
    /// Custom duration seconds (0-59)
    #[arg(long)]
    seconds: Option<u32>,
}

impl DurationArgs {
    fn engine(&self, config: &Config) -> Result<TimerEngine, medita_core::TimerError> {
        if let Some(minutes) = self.preset {
            return Ok(TimerEngine::from_preset(Preset::from_minutes(minutes)?));
        }
        if self.minutes.is_some() || self.seconds.is_some() {
            return TimerEngine::from_custom(
                self.minutes.unwrap_or(0),
                self.seconds.unwrap_or(0),
            );
        }
        Ok(config.engine())
    }
}

/// A line typed while the countdown is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Command(Command),
    Suspend,
    Resume,
    Status,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        // A bare space/enter toggles, like tapping the big button.
        return Ok(Input::Command(Command::Toggle));
    };
    let number = |w: Option<&str>| -> Result<u32, String> {
        let w = w.ok_or_else(|| format!("'{head}' needs a number"))?;
        w.parse().map_err(|_| format!("not a number: {w}"))
    };
    let input = match head.to_ascii_lowercase().as_str() {
        "s" | "start" => Input::Command(Command::Start),
        "p" | "pause" => Input::Command(Command::Pause),
        "t" | "toggle" => Input::Command(Command::Toggle),
        "r" | "reset" => Input::Command(Command::Reset),
        "bg" | "suspend" => Input::Suspend,
        "fg" | "resume" => Input::Resume,
        "?" | "status" => Input::Status,
        "q" | "quit" | "exit" => Input::Quit,
        "preset" => {
            let preset = Preset::from_minutes(number(words.next())?).map_err(|e| e.to_string())?;
            Input::Command(Command::SelectPreset(preset))
        }
        "custom" => {
            let minutes = number(words.next())?;
            let seconds = match words.next() {
                Some(w) => number(Some(w))?,
                None => 0,
            };
            Input::Command(Command::SelectCustom { minutes, seconds })
        }
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(input)
}

/// Writes the countdown to stdout: a `MM:SS  label` line whenever it
/// changes, or one JSON object per event.
struct Renderer {
    json: bool,
    last_line: String,
}

impl Renderer {
    fn new(json: bool) -> Self {
        Self {
            json,
            last_line: String::new(),
        }
    }

    fn line(&mut self, session: &TimerSession) {
        if self.json {
            return;
        }
        let engine = session.engine();
        let line = format!(
            "{}  {}",
            format_remaining(engine.remaining_ms()),
            state_label(engine.state())
        );
        if line != self.last_line {
            println!("{line}");
            self.last_line = line;
        }
    }

    fn event(&mut self, session: &TimerSession, event: Option<&Event>) {
        match (self.json, event) {
            (true, Some(event)) => match serde_json::to_string(event) {
                Ok(s) => println!("{s}"),
                Err(e) => eprintln!("error: {e}"),
            },
            (true, None) => {}
            (false, _) => self.line(session),
        }
        let _ = std::io::stdout().flush();
    }

    fn snapshot(&mut self, session: &TimerSession) {
        if self.json {
            self.event(session, Some(&session.snapshot()));
        } else {
            self.last_line.clear();
            self.line(session);
        }
    }
}

pub fn run(action: TimerAction) -> Result<(), BoxError> {
    let config = Config::load()?;

    match action {
        TimerAction::Status { duration } => {
            let engine = duration.engine(&config)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Run {
            duration,
            json,
            strict,
            stay,
        } => {
            let engine = duration.engine(&config)?;
            // The bell must not corrupt JSON output.
            let sound = if json {
                config.sound(std::io::stderr())
            } else {
                config.sound(std::io::stdout())
            };
            let policy = if strict {
                TransitionPolicy::Strict
            } else {
                config.transition_policy()
            };
            let session = TimerSession::new(engine, Box::new(SystemClock), sound).with_policy(policy);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(interactive(session, &config, Renderer::new(json), stay));
            // A pending stdin read would otherwise keep the runtime alive.
            runtime.shutdown_background();
            result?;
        }
    }
    Ok(())
}

async fn interactive(
    session: TimerSession,
    config: &Config,
    mut renderer: Renderer,
    stay: bool,
) -> Result<(), BoxError> {
    let session = Mutex::new(session);
    let interval = config.tick_interval();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    {
        let mut guard = lock(&session);
        renderer.snapshot(&guard);
        let started = guard.apply(Command::Start)?;
        renderer.event(&guard, started.as_ref());
    }

    loop {
        let ticking = {
            let guard = lock(&session);
            guard.state() == TimerState::Running && !guard.engine().is_suspended()
        };
        if !ticking && !stdin_open {
            debug!("stdin closed and timer not ticking");
            return Ok(());
        }

        tokio::select! {
            end = driver::run_ticks(&session, interval, |s, ev| renderer.event(s, ev)), if ticking => {
                if end == TimerState::Completed && !stay {
                    return Ok(());
                }
            }
            line = stdin.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                let input = match parse_input(&line) {
                    Ok(input) => input,
                    Err(e) => {
                        eprintln!("error: {e}");
                        continue;
                    }
                };
                let mut guard = lock(&session);
                let event = match input {
                    Input::Command(command) => match guard.apply(command) {
                        Ok(event) => event,
                        Err(e) => {
                            eprintln!("error: {e}");
                            continue;
                        }
                    },
                    Input::Suspend => guard.suspend(),
                    Input::Resume => guard.resume(),
                    Input::Status => {
                        renderer.snapshot(&guard);
                        continue;
                    }
                    Input::Quit => return Ok(()),
                };
                renderer.event(&guard, event.as_ref());
                if event.as_ref().is_some_and(Event::is_completion) && !stay {
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                return Ok(());
            }
        }
    }
}

fn lock(session: &Mutex<TimerSession>) -> std::sync::MutexGuard<'_, TimerSession> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}
