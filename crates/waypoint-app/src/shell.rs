//! Interactive shell.
//!
//! Reads commands from stdin and applies queued navigator commands as they
//! arrive, printing the view after every change.

use crate::metrics;
use anyhow::{Context, Result};
use std::io::Write;
use std::time::Instant;
use tenvis_waypoint_core::{Browser, Command, Commands, NavigateOptions, NavigationOutcome, RouterError};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

const HELP: &str = "\
Commands:
  go <href>       navigate (relative hrefs resolve against the current path)
  click <label>   follow a link or press a button in the current view
  back            go back one entry
  forward         go forward one entry
  show            print the current view
  markup          print the current view as markup
  state           print the current route state as JSON
  help            print this help
  quit            exit";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Go(String),
    Click(String),
    Back,
    Forward,
    Show,
    Markup,
    State,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown command {0:?}, try `help`")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
}

/// Parse one line of input.
///
/// # Errors
///
/// Returns an error for unknown commands or missing arguments.
pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let argument = |name: &'static str| {
        if rest.is_empty() {
            Err(InputError::MissingArgument(name))
        } else {
            Ok(rest.to_string())
        }
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Ok(Input::Empty),
        "go" => argument("go").map(Input::Go),
        "click" => argument("click").map(Input::Click),
        "back" => Ok(Input::Back),
        "forward" => Ok(Input::Forward),
        "show" => Ok(Input::Show),
        "markup" => Ok(Input::Markup),
        "state" => Ok(Input::State),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" => Ok(Input::Quit),
        _ => Err(InputError::Unknown(word.to_string())),
    }
}

/// Run the shell until stdin closes or `quit`.
///
/// # Errors
///
/// Returns an error if stdin or stdout fail.
pub async fn run(mut browser: Browser, mut commands: Commands) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();

    writeln!(out, "{}", browser.view())?;
    writeln!(out, "Type `help` for commands.")?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    debug!("Stdin closed");
                    break;
                };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => handle_input(&mut browser, input, &mut out)?,
                    Err(err) => writeln!(out, "{err}")?,
                }
            }
            Some(command) = commands.next() => {
                info!(?command, "Applying queued command");
                apply_command(&mut browser, command, &mut out)?;
            }
        }
        out.flush()?;
    }

    info!("Shell closed");
    Ok(())
}

/// Apply one line of input, writing its result to `out`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn handle_input(browser: &mut Browser, input: Input, out: &mut impl Write) -> Result<()> {
    let started = Instant::now();
    let outcome = match input {
        Input::Go(href) => browser.navigate(&href, NavigateOptions::default()),
        Input::Click(label) => browser.click(&label),
        Input::Back => Ok(browser.back()),
        Input::Forward => Ok(browser.forward()),
        Input::Show => {
            writeln!(out, "{}", browser.view())?;
            return Ok(());
        }
        Input::Markup => {
            writeln!(out, "{}", browser.view().to_markup())?;
            return Ok(());
        }
        Input::State => {
            let state = browser.state();
            let json = serde_json::to_string_pretty(&*state).context("Failed to encode state")?;
            writeln!(out, "{json}")?;
            return Ok(());
        }
        Input::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(());
        }
        Input::Quit | Input::Empty => return Ok(()),
    };
    report(outcome, started, out)
}

/// Apply a queued navigator command, writing its result to `out`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn apply_command(browser: &mut Browser, command: Command, out: &mut impl Write) -> Result<()> {
    let started = Instant::now();
    let outcome = browser.apply(command);
    report(outcome, started, out)
}

fn report(
    outcome: Result<NavigationOutcome, RouterError>,
    started: Instant,
    out: &mut impl Write,
) -> Result<()> {
    match outcome {
        Ok(outcome) => {
            metrics::record_outcome(&outcome, started.elapsed().as_secs_f64());
            match outcome.state() {
                Some(state) => {
                    writeln!(out, "-- {} --", state.location)?;
                    writeln!(out, "{}", state.view)?;
                }
                None => writeln!(out, "(no change)")?,
            }
        }
        Err(err) => {
            warn!(error = %err, "Navigation failed");
            writeln!(out, "error: {err}")?;
        }
    }
    Ok(())
}
