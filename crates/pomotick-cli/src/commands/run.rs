use std::io::Write;
use std::time::Duration;

use clap::Args;
use pomotick_core::{
    AppConfig, Event, KeyValueStore, Notifier, Scheduler, Session, SilentNotifier, TerminalBell,
    TokioScheduler,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use pomotick_core::open_store;

#[derive(Args)]
pub struct RunArgs {
    /// Continue from the state saved when the last run exited mid-period
    #[arg(long)]
    resume: bool,
    /// Keep settings and state in memory only
    #[arg(long)]
    ephemeral: bool,
    /// Start counting down immediately
    #[arg(long)]
    start: bool,
}

/// A line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Toggle,
    Start,
    Pause,
    Reset,
    Skip,
    Adjust(String),
    Status,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" | "s" | "toggle" => Input::Toggle,
        "start" => Input::Start,
        "p" | "pause" => Input::Pause,
        "r" | "reset" => Input::Reset,
        "k" | "skip" => Input::Skip,
        "+" => Input::Adjust("60".into()),
        "-" => Input::Adjust("-60".into()),
        "status" => Input::Status,
        "h" | "?" | "help" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => match line.strip_prefix("adjust") {
            Some(rest) if rest.starts_with(char::is_whitespace) => Input::Adjust(rest.trim().into()),
            _ => Input::Unknown(line.into()),
        },
    }
}

const HELP: &str = "\
commands:
  <enter> | s | toggle   start or pause
  start / p | pause      start / pause
  r | reset              reload the current period
  k | skip               end the current period now
  + / -                  add / remove one minute
  adjust <secs>          add (or remove, if negative) seconds
  status                 print the timer state as JSON
  q | quit               save and exit";

pub fn run(args: RunArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(run_loop(args, config));
    // A pending stdin read would otherwise keep the runtime alive.
    rt.shutdown_background();
    result
}

async fn run_loop(args: RunArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config, args.ephemeral)?;
    let notifier: Box<dyn Notifier> = if config.bell {
        Box::new(TerminalBell)
    } else {
        Box::new(SilentNotifier)
    };
    let (scheduler, mut wakeups) = TokioScheduler::new();
    let mut session = Session::new(scheduler, notifier, store)
        .with_auto_start_delay(Duration::from_millis(config.auto_start_delay_ms));

    if args.resume && !session.restore() {
        tracing::info!("No saved session to resume");
    }
    if args.start {
        session.start();
    }

    println!("{HELP}");
    report_events(&mut session);
    render(&session)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            Some(wakeup) = wakeups.recv() => {
                session.handle_wakeup(wakeup);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Quit => break,
                    input => apply(&mut session, input)?,
                }
            }
            _ = &mut ctrl_c => break,
        }
        report_events(&mut session);
        render(&session)?;
    }

    println!();
    session.shutdown();
    Ok(())
}

fn apply<S, N, K>(
    session: &mut Session<S, N, K>,
    input: Input,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: Scheduler,
    N: Notifier,
    K: KeyValueStore,
{
    match input {
        Input::Toggle => session.toggle(),
        Input::Start => session.start(),
        Input::Pause => session.pause(),
        Input::Reset => session.reset(),
        Input::Skip => session.skip(),
        Input::Adjust(raw) => {
            if !session.adjust_time_input(&raw) {
                println!("\nnot a number of seconds: {raw}");
            }
        }
        Input::Status => {
            println!("\n{}", serde_json::to_string_pretty(&session.snapshot())?);
        }
        Input::Help => println!("\n{HELP}"),
        Input::Unknown(line) => println!("\nunknown command: {line} (try 'help')"),
        Input::Quit => {}
    }
    Ok(())
}

/// Print period transitions on their own line; other events only go to the log.
fn report_events<S, N, K>(session: &mut Session<S, N, K>)
where
    S: Scheduler,
    N: Notifier,
    K: KeyValueStore,
{
    for event in session.drain_events() {
        match event {
            Event::PeriodCompleted { from, to, .. } => {
                println!("\n{from} finished. Next up: {to}");
            }
            Event::SessionRestored { mode, .. } => println!("Resumed {mode}"),
            other => tracing::debug!(?other, "event"),
        }
    }
}

/// Redraw the status line in place.
fn render<S, N, K>(session: &Session<S, N, K>) -> std::io::Result<()>
where
    S: Scheduler,
    N: Notifier,
    K: KeyValueStore,
{
    let projection = session.projection();
    let state = if projection.running {
        "running"
    } else if session.is_auto_start_pending() {
        "starting"
    } else {
        "paused"
    };
    let mut stdout = std::io::stdout().lock();
    write!(
        stdout,
        "\r\x1b[2K{} {} cycles: {} ({})",
        projection.title(),
        projection.progress_bar(20),
        projection.cycles_completed,
        state
    )?;
    stdout.flush()
}
