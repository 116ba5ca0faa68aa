//! Interactive REPL loop: read a line, run one turn, print reply and map, repeat until EOF or quit.
//!
//! Used when `-i/--interactive` is passed. The session keeps the conversation, so each
//! prompt is sent with the full history.

use std::io::Write;

use safora::{MapController, MapRenderer, SessionError, TurnOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::Instrument;

use cli::{format_reply, render_json, turn_json, CliSession};

/// How replies are printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub pretty: bool,
    /// 0 means no truncation.
    pub max_reply_len: usize,
}

/// One parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Skip,
    Quit,
    Locate(usize),
    BadLocate(String),
    Prompt(String),
}

fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Skip;
    }
    if is_quit_command(trimmed) {
        return ReplCommand::Quit;
    }
    if let Some(arg) = trimmed.strip_prefix("/locate") {
        return match arg.trim().parse::<usize>() {
            Ok(n) if n > 0 => ReplCommand::Locate(n),
            _ => ReplCommand::BadLocate(arg.trim().to_string()),
        };
    }
    ReplCommand::Prompt(trimmed.to_string())
}

fn is_quit_command(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    matches!(lower.as_str(), "quit" | "exit" | "/quit")
}

/// Writes the reply as text or as one JSON object.
pub fn print_outcome<W: Write>(
    out: &mut W,
    outcome: &TurnOutcome,
    opts: &OutputOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if opts.json {
        writeln!(out, "{}", render_json(&turn_json(outcome), opts.pretty)?)?;
    } else {
        writeln!(out, "{}", format_reply(outcome, opts.max_reply_len))?;
    }
    out.flush()?;
    Ok(())
}

/// Submits `prompt` inside a `turn` span, prints the reply, then pushes the new focus and
/// markers to `map`.
pub async fn run_one_turn<R: MapRenderer, W: Write>(
    session: &CliSession,
    map: &mut MapController<R>,
    prompt: &str,
    out: &mut W,
    opts: &OutputOptions,
) -> Result<TurnOutcome, Box<dyn std::error::Error>> {
    let span = tracing::info_span!("turn", prompt_len = prompt.len());
    let outcome = session.submit(prompt).instrument(span).await?;
    print_outcome(out, &outcome, opts)?;
    session.sync_map(map);
    Ok(outcome)
}

/// Recenters on link `n` (1-based) of the last assistant reply.
fn locate_link<R: MapRenderer>(
    session: &CliSession,
    map: &mut MapController<R>,
    n: usize,
) -> Result<(), String> {
    let reply = session
        .last_reply()
        .ok_or_else(|| "no reply yet".to_string())?;
    let link = reply
        .grounding_links
        .get(n - 1)
        .ok_or_else(|| format!("no link [{}] in the last reply", n))?;
    let coordinates = link
        .coordinates
        .ok_or_else(|| format!("link [{}] has no coordinates", n))?;
    session.locate(coordinates);
    map.set_center(session.focus());
    Ok(())
}

/// Runs the REPL loop over `input`: prompt, read line, run turn, print, repeat.
///
/// Exits on EOF (Ctrl+D) or `quit`/`exit`/`/quit`; blank lines are ignored.
/// Rejected submissions are reported on stderr and the loop continues.
pub async fn run_repl_loop<I, R, W>(
    session: &CliSession,
    map: &mut MapController<R>,
    input: I,
    out: &mut W,
    opts: &OutputOptions,
) -> Result<(), Box<dyn std::error::Error>>
where
    I: AsyncBufRead + Unpin,
    R: MapRenderer,
    W: Write,
{
    let mut reader = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = reader.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            ReplCommand::Skip => continue,
            ReplCommand::Quit => break,
            ReplCommand::Locate(n) => {
                if let Err(e) = locate_link(session, map, n) {
                    eprintln!("error: {}", e);
                }
            }
            ReplCommand::BadLocate(arg) => {
                eprintln!("error: usage: /locate N (got {:?})", arg);
            }
            ReplCommand::Prompt(prompt) => {
                if let Err(e) = run_one_turn(session, map, &prompt, out, opts).await {
                    if let Some(SessionError::Busy) = e.downcast_ref::<SessionError>() {
                        tracing::warn!("turn rejected while pending");
                    }
                    eprintln!("error: {}", e);
                }
            }
        }
    }

    writeln!(out, "Bye.")?;
    Ok(())
}
