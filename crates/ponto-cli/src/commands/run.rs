//! Run command: drive the time clock from console interactions.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use ponto_core::{DisplayNames, RecordSink, Timeclock, TimeclockError, Transition};

use crate::Config;
use crate::console::{CommandSet, ConsolePresenter, RosterNicknames, RosterUsernames};

/// What happened during a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines that parsed into an interaction.
    pub interactions: usize,
    /// Interactions refused (foreign control, invalid transition, failed save).
    pub rejected: usize,
    /// Sessions finished and recorded.
    pub finished: usize,
    /// Sessions still open at end of input; they are not kept anywhere.
    pub left_open: usize,
}

/// Processes interactions from `input` against the configured record store.
pub fn run<R: BufRead, W: Write>(input: R, out: W, config: &Config) -> Result<RunSummary> {
    let store = crate::open_store(config)?;
    run_with(input, out, store, config, Local::now)
}

/// Processes interactions from `input`, timestamping each with `now()`.
pub fn run_with<R, W, S, F>(
    input: R,
    out: W,
    sink: S,
    config: &Config,
    mut now: F,
) -> Result<RunSummary>
where
    R: BufRead,
    W: Write,
    S: RecordSink,
    F: FnMut() -> DateTime<Local>,
{
    let commands = CommandSet::new(config.command_prefix.as_str(), &config.start_aliases);
    let names = DisplayNames::new()
        .with(RosterNicknames(config.nicknames.clone()))
        .with(RosterUsernames(config.usernames.clone()));
    let mut clock = Timeclock::new(sink, ConsolePresenter::new(out), names);
    let mut summary = RunSummary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let (actor, action) = match commands.parse_line(&line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(error) => {
                tracing::warn!(line = index + 1, %error, "skipping unreadable line");
                clock
                    .presenter_mut()
                    .notice(&format!("line {}: {error}", index + 1))?;
                continue;
            }
        };

        summary.interactions += 1;
        match clock.apply(&actor, action, now()) {
            Ok(Transition::Finished(_)) => summary.finished += 1,
            Ok(_) => {}
            Err(error) => {
                summary.rejected += 1;
                clock.presenter_mut().reply(&actor, &reply_text(&error))?;
            }
        }
    }

    summary.left_open = clock.registry().len();
    if summary.left_open > 0 {
        tracing::warn!(
            open = summary.left_open,
            "input ended with open sessions; they are not saved"
        );
    }
    tracing::info!(?summary, "run complete");
    Ok(summary)
}

fn reply_text(error: &TimeclockError) -> String {
    let text = match error {
        TimeclockError::Unauthorized { .. } => {
            "you cannot interact with another user's session".to_string()
        }
        TimeclockError::Rejected(rejection) => rejection.to_string(),
        TimeclockError::Persistence { .. } => error.to_string(),
    };
    if error.is_retryable() {
        format!("{text}; make sure the record store is not open in another program")
    } else {
        text
    }
}
