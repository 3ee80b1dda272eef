use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use pomoplan_core::timer::{format_clock_face, format_countdown};
use pomoplan_core::{Config, CountdownEngine, Event};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::resolve_choice;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a plan in the foreground, reading commands from stdin
    ///
    /// Commands: p (start/pause/resume), s (skip), r (reset and exit),
    /// t (status), q (quit), ? (help).
    Run {
        /// Pomodoro format: short, long or custom (defaults to config)
        #[arg(long)]
        format: Option<String>,
        /// Total minutes (see `plan options`)
        #[arg(long)]
        total: u32,
        /// Do not ring the terminal bell on completion
        #[arg(long)]
        no_bell: bool,
        /// Wait for `p` instead of starting immediately
        #[arg(long)]
        paused: bool,
        /// Print events as JSON lines instead of a status line
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Toggle,
    Skip,
    Reset,
    Status,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "p" | "toggle" | "start" | "pause" | "resume" => Some(Command::Toggle),
        "s" | "skip" => Some(Command::Skip),
        "r" | "reset" => Some(Command::Reset),
        "t" | "status" => Some(Command::Status),
        "q" | "quit" | "exit" => Some(Command::Quit),
        "?" | "h" | "help" => Some(Command::Help),
        _ => None,
    }
}

struct Output {
    bell: bool,
    json: bool,
}

impl Output {
    fn event(&self, event: &Event) -> Result<(), Box<dyn std::error::Error>> {
        if self.bell && event.is_completion() {
            // Fire and forget; a failed bell never blocks the transition.
            let _ = std::io::stderr().write_all(b"\x07");
        }
        if self.json {
            println!("{}", serde_json::to_string(event)?);
            return Ok(());
        }
        match event {
            Event::IntervalCompleted {
                label,
                credited_min,
                plan_finished,
                ..
            } => {
                println!("\n{label} done (+{credited_min} min focus)");
                if *plan_finished {
                    println!("All sessions complete.");
                }
            }
            Event::TimerReset { .. } => println!("\nreset"),
            _ => {}
        }
        Ok(())
    }

    fn status(&self, engine: &CountdownEngine) {
        if self.json {
            return;
        }
        let label = engine.active().map(|i| i.label.as_str()).unwrap_or("");
        print!(
            "\r{}  {:<20}  focus {:>3} min  {:<28}",
            format_countdown(engine.seconds_remaining()),
            label,
            engine.work_min_accumulated(),
            engine.message()
        );
        let _ = std::io::stdout().flush();
    }

    fn schedule(&self, engine: &CountdownEngine) {
        if self.json {
            return;
        }
        println!();
        for interval in engine.queue() {
            println!(
                "  {}  {}",
                format_clock_face(interval.scheduled_start),
                interval.label
            );
        }
    }
}

fn emit(out: &Output, event: Option<Event>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(event) = event {
        out.event(&event)?;
    }
    Ok(())
}

async fn sleep_or_pending(wake: Option<Duration>) {
    match wake {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

async fn drive(
    mut engine: CountdownEngine,
    out: Output,
    max_wait: Duration,
    start_paused: bool,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut focus_min = 0;

    out.schedule(&engine);
    if !start_paused {
        emit(&out, engine.start())?;
    }
    out.status(&engine);

    // Registered once so a Ctrl-C between two selects is not lost.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while !engine.queue().is_empty() {
        let wake = engine.next_wake().map(|d| d.min(max_wait));
        tokio::select! {
            _ = sleep_or_pending(wake) => {
                if let Some(event) = engine.tick() {
                    if let Event::IntervalCompleted { work_min_accumulated, .. } = &event {
                        focus_min = *work_min_accumulated;
                    }
                    out.event(&event)?;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    stdin_open = false;
                    continue;
                };
                match parse_command(&line) {
                    Some(Command::Toggle) => emit(&out, engine.toggle())?,
                    Some(Command::Skip) => {
                        if let Some(event) = engine.skip() {
                            if let Event::IntervalCompleted { work_min_accumulated, .. } = &event {
                                focus_min = *work_min_accumulated;
                            }
                            out.event(&event)?;
                        }
                    }
                    Some(Command::Reset) => {
                        focus_min = engine.work_min_accumulated();
                        emit(&out, engine.reset())?;
                    }
                    Some(Command::Status) => out.schedule(&engine),
                    Some(Command::Quit) => {
                        focus_min = engine.work_min_accumulated();
                        break;
                    }
                    Some(Command::Help) => {
                        println!("\np: start/pause/resume  s: skip  r: reset  t: schedule  q: quit");
                    }
                    None => println!("\nunknown command: {}", line.trim()),
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                focus_min = engine.work_min_accumulated();
                break;
            }
        }
        if !engine.queue().is_empty() {
            out.status(&engine);
        }
    }

    Ok(focus_min)
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        TimerAction::Run {
            format,
            total,
            no_bell,
            paused,
            json,
        } => {
            let (format, total) = resolve_choice(&config, format.as_deref(), total)?;
            let mut engine = CountdownEngine::new();
            let generated = engine.generate(format, total);

            let out = Output {
                bell: config.notifications.bell && !no_bell,
                json,
            };
            emit(&out, generated)?;
            let max_wait = Duration::from_millis(config.timer.tick_interval_ms.max(1));

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(drive(engine, out, max_wait, paused));
            // A pending stdin read must not keep the process alive.
            runtime.shutdown_background();

            let focus_min = result?;
            if !json {
                println!("\nFocus time: {focus_min} min");
            }
        }
    }
    Ok(())
}
