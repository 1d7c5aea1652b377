//! The `ask` command — one query, one typed answer.
//!
//! Hosts the full session pipeline in the terminal: read a query (from the
//! argument or an interactive prompt with a typed placeholder hint), record
//! it in the recent-queries log, submit it through the session controller,
//! and stream the reveal to stdout. When stdout is not a TTY (or `--plain`
//! is passed) the answer is printed in one piece with no typing delay.

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::history;
use crate::relay::{create_relay, CompletionRelay};
use crate::reveal::PlaceholderCycle;
use crate::session::{AnswerSink, Session};

/// Sink that types the answer to stdout one character per reveal tick.
#[derive(Default)]
struct TypedSink {
    printed: Mutex<usize>,
}

impl AnswerSink for TypedSink {
    fn reveal(&self, visible: &str, done: bool) {
        let mut printed = self.printed.lock().unwrap_or_else(|e| e.into_inner());
        let delta: String = visible.chars().skip(*printed).collect();
        *printed = visible.chars().count();

        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{}", delta);
        if done {
            let _ = writeln!(out);
        }
        let _ = out.flush();
    }

    fn failed(&self, message: &str) {
        report_failure(message);
    }
}

/// Sink that prints the answer in one piece on the final tick.
struct PlainSink;

impl AnswerSink for PlainSink {
    fn reveal(&self, visible: &str, done: bool) {
        if done {
            println!("{}", visible);
        }
    }

    fn failed(&self, message: &str) {
        report_failure(message);
    }
}

/// The user sees the generic placeholder; the underlying relay error goes
/// to stderr for diagnostics.
fn report_failure(message: &str) {
    println!("{}", crate::session::ERROR_PLACEHOLDER);
    eprintln!("Error: {}", message);
}

/// CLI entry point for `askbar ask`.
///
/// Relay failures degrade to the error placeholder and exit 0 — the
/// session ends idle and re-submittable, never crashed.
pub async fn run_ask(config: &Config, query: Option<String>, plain: bool) -> Result<()> {
    let query = match query {
        Some(q) => q,
        None => match read_query(config).await? {
            Some(q) => q,
            None => return Ok(()), // EOF before any input
        },
    };

    let query = query.trim().to_string();
    if query.is_empty() {
        return Ok(());
    }

    if let Err(e) = history::record(config, &query) {
        eprintln!("warning: could not record history: {}", e);
    }

    let relay: Arc<dyn CompletionRelay> = Arc::from(create_relay(&config.completion)?);
    let typed = !plain && atty::is(atty::Stream::Stdout);
    let (sink, interval): (Arc<dyn AnswerSink>, Duration) = if typed {
        (Arc::new(TypedSink::default()), config.reveal.interval())
    } else {
        (Arc::new(PlainSink), Duration::ZERO)
    };

    let session = Session::new(relay, sink, interval);
    session.submit(&query).await;

    Ok(())
}

/// Read one query line from stdin.
///
/// On a TTY, a rotating placeholder hint is typed on stderr while waiting,
/// exactly like the search bar this tool grew out of. The hint is redrawn
/// in place and erased once input arrives; stdout stays clean for scripts.
async fn read_query(config: &Config) -> Result<Option<String>> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    if !atty::is(atty::Stream::Stderr) {
        return Ok(lines.next_line().await?);
    }

    let hold_ticks =
        (config.reveal.placeholder_hold_ms / config.reveal.placeholder_interval_ms) as u32;
    let mut cycle = PlaceholderCycle::with_defaults(hold_ticks);
    let width = cycle.max_width();
    let mut ticker = tokio::time::interval(Duration::from_millis(
        config.reveal.placeholder_interval_ms,
    ));

    let read = lines.next_line();
    tokio::pin!(read);

    let line = loop {
        tokio::select! {
            line = &mut read => break line?,
            _ = ticker.tick() => {
                let frame = cycle.tick().to_string();
                let mut err = std::io::stderr().lock();
                let _ = write!(err, "\r{:<width$}", frame, width = width);
                let _ = err.flush();
            }
        }
    };

    // Erase the hint line.
    let mut err = std::io::stderr().lock();
    let _ = write!(err, "\r{:<width$}\r", "", width = width);
    let _ = err.flush();

    Ok(line)
}
