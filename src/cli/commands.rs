use crate::cli::args::{ListArgs, OutputFormat, RunArgs};
use crate::config::RuntimeConfig;
use crate::console::ConsoleIo;
use crate::debugger::{DebugMode, ExecutionObserver};
use crate::demos::Demo;
use crate::inspector::InspectionSnapshot;
use crate::protocol::{ControlCommand, RunEvent};
use crate::runtime::parser::parse_line_list;
use crate::runtime::{ExecutionResult, TerminationMode, WorkerPool};
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::io::{self, Write};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use tracing::{debug, warn};

/// Exit status for a finished run.
pub fn exit_code(termination: TerminationMode) -> i32 {
    match termination {
        TerminationMode::Normal => 0,
        TerminationMode::Error => 1,
        TerminationMode::Interrupted => 130,
    }
}

/// Forwards run notifications to the command loop.
struct ChannelObserver {
    events: Sender<RunEvent>,
}

impl ChannelObserver {
    fn send(&self, event: RunEvent) {
        if self.events.send(event).is_err() {
            debug!("Command loop gone, dropping run event");
        }
    }
}

impl ExecutionObserver for ChannelObserver {
    fn started(&self) {
        self.send(RunEvent::Started);
    }

    fn paused(&self) {
        self.send(RunEvent::Paused);
    }

    fn resumed(&self) {
        self.send(RunEvent::Resumed);
    }

    fn line_highlighted(&self, line: u32) {
        self.send(RunEvent::LineHighlighted { line });
    }

    fn ended(&self, result: &ExecutionResult) {
        self.send(RunEvent::Ended {
            result: result.clone(),
        });
    }
}

/// Where status text goes: stdout normally, stderr when stdout carries JSON.
#[derive(Clone, Copy)]
struct Reporter {
    json: bool,
}

impl Reporter {
    fn say(&self, text: impl std::fmt::Display) {
        if self.json {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }

    fn prompt(&self, text: &str) -> io::Result<()> {
        if self.json {
            let mut err = io::stderr().lock();
            write!(err, "{}", text)?;
            err.flush()
        } else {
            let mut out = io::stdout().lock();
            write!(out, "{}", text)?;
            out.flush()
        }
    }
}

/// Execute the run command. Returns how the run terminated.
pub fn run(args: RunArgs, config: &RuntimeConfig) -> Result<TerminationMode> {
    let demo = Demo::from_name(&args.demo).ok_or_else(|| {
        anyhow!(
            "Unknown demo '{}'. Run `stepwise list` to see the available demos",
            args.demo
        )
    })?;
    let breakpoints = match args.breakpoints.as_deref() {
        Some(list) => parse_line_list(list).context("Invalid --breakpoints value")?,
        None => Vec::new(),
    };

    let json = args.output == OutputFormat::Json;
    let reporter = Reporter { json };
    let console = Arc::new(if json {
        ConsoleIo::stderr()
    } else {
        ConsoleIo::new()
    });
    let pool = Arc::new(WorkerPool::new(&config.pool).context("Failed to start worker pool")?);

    let mut builder = demo
        .builder()
        .pool(pool)
        .input(console.clone())
        .output(console);
    if let Some(dir) = &args.working_dir {
        builder = builder.working_directory(dir);
    }
    let supervisor = builder.build()?;

    let (scalars, vectors, matrices) = demo.inspection_layout();
    supervisor.configure_inspection(scalars, vectors, matrices);
    supervisor.activate_breakpoints(breakpoints.iter().copied());
    let ignored: Vec<u32> = breakpoints
        .iter()
        .copied()
        .filter(|line| !supervisor.breakpoints().contains(line))
        .collect();
    if !ignored.is_empty() {
        warn!(?ignored, "Breakpoints outside the program were ignored");
    }

    let (tx, rx) = mpsc::channel();
    supervisor.add_observer(Arc::new(ChannelObserver { events: tx }));

    let mode = if args.step {
        DebugMode::StepOver
    } else if !breakpoints.is_empty() {
        DebugMode::Breakpoint
    } else {
        config.debugger.default_mode
    };
    supervisor.start(&args.args, mode);

    loop {
        let event = rx
            .recv()
            .context("Run ended without reporting a result")?;
        match event {
            RunEvent::LineHighlighted { line } => {
                show_pause(&reporter, demo, line, supervisor.inspection(), scalars);
                let command = loop {
                    reporter.prompt("(c)ontinue, (s)tep, (q)uit > ")?;
                    match read_stdin_line()? {
                        None => break ControlCommand::Quit,
                        Some(input) => match input.parse::<ControlCommand>() {
                            Ok(command) => break command,
                            Err(e) => reporter.say(e.yellow()),
                        },
                    }
                };
                match command.resume_mode() {
                    Some(mode) => {
                        if let Err(e) = supervisor.resume(mode) {
                            warn!(error = %e, "Resume ignored");
                        }
                    }
                    None => supervisor.interrupt(),
                }
            }
            RunEvent::Ended { result } => {
                report_result(&reporter, demo, &result)?;
                return Ok(result.termination);
            }
            RunEvent::Started | RunEvent::Paused | RunEvent::Resumed => {
                debug!(?event, "Run event");
            }
        }
    }
}

/// Execute the list command.
pub fn list(args: ListArgs) -> Result<()> {
    if args.output == OutputFormat::Json {
        let demos: Vec<_> = Demo::ALL
            .iter()
            .map(|demo| {
                serde_json::json!({
                    "name": demo.name(),
                    "description": demo.description(),
                    "lines": demo.info().line_count - 1,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&demos)?);
        return Ok(());
    }

    println!("{}", "Available demos:".bold());
    for demo in Demo::ALL {
        println!("  {:<10} {}", demo.name().cyan(), demo.description());
    }
    Ok(())
}

fn show_pause(
    reporter: &Reporter,
    demo: Demo,
    line: u32,
    inspection: &InspectionSnapshot,
    scalars: usize,
) {
    let text = source_line(demo, line).unwrap_or("");
    reporter.say(format!(
        "{} {:>3} | {}",
        "=>".green().bold(),
        line,
        text.trim_end()
    ));
    for id in 0..scalars {
        if let Some(value) = inspection.scalar(id).value() {
            reporter.say(format!("       {}{} = {}", "s".dimmed(), id, value));
        }
    }
}

fn report_result(reporter: &Reporter, demo: Demo, result: &ExecutionResult) -> Result<()> {
    if reporter.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    match (&result.termination, &result.error) {
        (TerminationMode::Error, Some(error)) => {
            println!("{} {}", "Error:".red().bold(), error.message);
            if error.line > 0 {
                println!(
                    "  at line {}, column {}: {}",
                    error.line,
                    error.column,
                    source_line(demo, error.line).unwrap_or("").trim()
                );
            }
        }
        (TerminationMode::Interrupted, _) => println!("{}", "Program interrupted".yellow()),
        _ => println!(
            "{} ({} ms)",
            "Program finished".green(),
            result.elapsed.as_millis()
        ),
    }
    Ok(())
}

// Locks stdin per line only; the console input provider reads it too.
fn read_stdin_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    match io::stdin().read_line(&mut line)? {
        0 => Ok(None),
        _ => Ok(Some(line)),
    }
}

fn source_line(demo: Demo, line: u32) -> Option<&'static str> {
    let index = usize::try_from(line).ok()?.checked_sub(1)?;
    demo.source().lines().nth(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(TerminationMode::Normal), 0);
        assert_eq!(exit_code(TerminationMode::Error), 1);
        assert_eq!(exit_code(TerminationMode::Interrupted), 130);
    }

    #[test]
    fn test_source_line_is_one_based() {
        assert_eq!(source_line(Demo::Sum, 1), Some("program sum"));
        assert_eq!(source_line(Demo::Sum, 0), None);
        assert_eq!(source_line(Demo::Sum, 99), None);
    }
}
