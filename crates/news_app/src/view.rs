//! Terminal view: renders view states as text and turns user input into
//! intents.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use engine_logging::{engine_debug, engine_warn};
use news_core::{Article, Intent, PopulateResult, ViewState};
use news_engine::NewsSession;
use tokio::sync::broadcast::error::TryRecvError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub fn render(state: &ViewState) -> Vec<String> {
    let mut lines = Vec::new();

    if state.is_loaded {
        lines.push(format!("Top headlines ({} articles)", state.articles.len()));
    } else {
        lines.push("No headlines loaded yet.".to_string());
    }

    if let Some(error) = &state.error {
        lines.push(format!("! Could not load news: {error}"));
    }

    for (index, article) in state.articles.iter().enumerate() {
        lines.push(format!("{:>3}. {}", index + 1, article_line(article)));
        if let Some(url) = &article.url {
            lines.push(format!("     {url}"));
        }
    }

    lines
}

fn article_line(article: &Article) -> String {
    let mut line = if article.title.trim().is_empty() {
        "(untitled)".to_string()
    } else {
        article.title.clone()
    };
    let source = article.source.as_ref().and_then(|s| s.name.as_deref());
    let published = article.published_at.as_deref().map(format_published);
    match (source, published) {
        (Some(source), Some(published)) => line.push_str(&format!(" [{source}, {published}]")),
        (Some(source), None) => line.push_str(&format!(" [{source}]")),
        (None, Some(published)) => line.push_str(&format!(" [{published}]")),
        (None, None) => {}
    }
    line
}

/// Formats an RFC 3339 timestamp as UTC minutes; other text is shown as is.
fn format_published(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|published| {
            published
                .with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M UTC")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    More,
    Reattach,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "m" | "more" => Some(Command::More),
            "r" | "reattach" => Some(Command::Reattach),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

fn write_state(out: &mut impl Write, state: &ViewState) -> io::Result<()> {
    for line in render(state) {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

/// Requests `pages` pages, waits for all of them and prints the final state.
pub fn run_batch(session: &NewsSession, pages: u32, mut out: impl Write) -> Result<()> {
    let target = session.settled_actions() + u64::from(pages);
    let intents =
        std::iter::once(Intent::Initial).chain((2..=pages).map(|page| Intent::LoadMore { page }));
    session
        .submit_intents(intents)
        .context("submitting intents")?;

    while session.settled_actions() < target {
        if !session.is_running() {
            engine_warn!("Session stopped before all {} pages settled", pages);
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    write_state(&mut out, &session.states().latest()).context("writing output")
}

/// Interactive loop over stdin commands until `quit` or end of input.
pub fn run_interactive(session: &NewsSession, mut out: impl Write) -> Result<()> {
    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let intents = session.intent_sender();
    let mut states = session.states();
    let mut results = session.results();
    let mut page = 1;

    intents
        .send(Intent::Initial)
        .context("submitting initial intent")?;
    writeln!(out, "Commands: more (or Enter), reattach, quit")?;

    while session.is_running() {
        loop {
            match results.try_recv() {
                Ok(PopulateResult::InFlight) => writeln!(out, "Loading...")?,
                Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if let Some(state) = states.try_next() {
            write_state(&mut out, &state)?;
        }

        match line_rx.try_recv() {
            Ok(line) => match Command::parse(&line) {
                Some(Command::More) => {
                    page += 1;
                    intents.send(Intent::LoadMore { page })?;
                }
                Some(Command::Reattach) => {
                    engine_debug!("Re-attaching view");
                    // A recreated view subscribes afresh and announces itself again.
                    states = session.states();
                    intents.send(Intent::Initial)?;
                }
                Some(Command::Quit) => break,
                None => writeln!(out, "Unknown command {:?}", line.trim())?,
            },
            Err(mpsc::TryRecvError::Empty) => thread::sleep(POLL_INTERVAL),
            Err(mpsc::TryRecvError::Disconnected) => break,
        }
    }

    Ok(())
}
