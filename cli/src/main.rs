//! Safora CLI binary: ask the travel assistant, see sources and a text map of the places it cites.
//!
//! One-shot by default; `-i` starts a REPL that keeps the conversation.

mod log_format;
mod logging;
mod repl;

use std::io::Write;

use clap::Parser;
use cli::{build_session, SessionOptions, TextMapRenderer};
use repl::{run_one_turn, run_repl_loop, OutputOptions};
use safora::{Coordinates, FixedLocation, GeolocationSource, MapController};

#[derive(Parser, Debug)]
#[command(name = "safora")]
#[command(about = "Safora: travel assistant with map-grounded answers")]
struct Args {
    /// User message (or pass as positional arguments)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Positional args: user message when -m/--message is not used
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,

    /// Interactive REPL: after the first reply, keep reading prompts from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Print each turn as one JSON object {reply, links, destinations, focus, failed}
    #[arg(long)]
    json: bool,

    /// With --json, pretty-print (multi-line)
    #[arg(long)]
    pretty: bool,

    /// Your latitude; biases results toward your position
    #[arg(long, value_name = "DEG", allow_negative_numbers = true, requires = "lng")]
    lat: Option<f64>,

    /// Your longitude
    #[arg(long, value_name = "DEG", allow_negative_numbers = true, requires = "lat")]
    lng: Option<f64>,

    /// Model request timeout in seconds; 0 waits forever (default: SAFORA_REQUEST_TIMEOUT_SECS or 60)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Model name (default: SAFORA_MODEL or gemini-3-pro-preview)
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Offline demo: canned Santorini answer, no API key needed
    #[arg(long)]
    mock: bool,
}

/// Default max length for the reply printed to stdout. 0 means no truncation.
const DEFAULT_MAX_REPLY_LEN: usize = 0;

/// Reads max reply length from `SAFORA_MAX_REPLY_LEN`. Returns default on missing/invalid.
fn max_reply_len() -> usize {
    std::env::var("SAFORA_MAX_REPLY_LEN")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_REPLY_LEN)
}

fn cli_location(args: &Args) -> Option<Coordinates> {
    match (args.lat, args.lng) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
            Some(Coordinates::new(lat, lng))
        }
        _ => None,
    }
}

fn message_from(args: &Args) -> Option<String> {
    args.message.clone().or_else(|| {
        if args.rest.is_empty() {
            None
        } else {
            Some(args.rest.join(" "))
        }
    })
}

/// Map output goes to stdout in text mode and is dropped with `--json`.
fn map_writer(json: bool) -> Box<dyn Write + Send> {
    if json {
        Box::new(std::io::sink())
    } else {
        Box::new(std::io::stdout())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match config::load_settings("safora", None) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("safora: config: {}", e);
            std::process::exit(1);
        }
    };
    let log_guard = logging::init()?;

    let args = Args::parse();

    let message = message_from(&args);
    if !args.interactive && message.is_none() {
        eprintln!("safora: provide a message via -m/--message or positional args");
        std::process::exit(1);
    }

    let opts = SessionOptions {
        mock: args.mock,
        model: args.model.clone(),
        timeout_secs: args.timeout,
        location: cli_location(&args),
    };
    let session = match build_session(&settings, &opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let geolocation = FixedLocation(opts.location(&settings));
    session.apply_geolocation(geolocation.current_position().await);

    let mut map = MapController::new(TextMapRenderer::new(map_writer(args.json)), session.focus());
    let output = OutputOptions {
        json: args.json,
        pretty: args.pretty,
        max_reply_len: max_reply_len(),
    };
    let mut stdout = std::io::stdout();

    if let Some(ref msg) = message {
        if !msg.trim().is_empty() || !args.interactive {
            if let Err(e) = run_one_turn(&session, &mut map, msg, &mut stdout, &output).await {
                eprintln!("error: {}", e);
                if !args.interactive {
                    std::process::exit(1);
                }
            }
        }
    }

    if args.interactive {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        run_repl_loop(&session, &mut map, stdin, &mut stdout, &output).await?;
    }

    let failed = session.state() == safora::SubmitState::Failed;
    map.dispose();
    if failed && !args.interactive {
        drop(log_guard);
        std::process::exit(2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_args_form_the_message() {
        let args = Args::parse_from(["safora", "Plan", "a", "trip"]);
        assert_eq!(message_from(&args).as_deref(), Some("Plan a trip"));
        let args = Args::parse_from(["safora", "-m", "Lisbon", "ignored"]);
        assert_eq!(message_from(&args).as_deref(), Some("Lisbon"));
        let args = Args::parse_from(["safora", "-i"]);
        assert_eq!(message_from(&args), None);
    }

    #[test]
    fn lat_and_lng_go_together() {
        let args = Args::parse_from(["safora", "--lat", "-33.8688", "--lng", "151.2093", "hi"]);
        assert_eq!(
            cli_location(&args),
            Some(Coordinates::new(-33.8688, 151.2093))
        );
        assert!(Args::try_parse_from(["safora", "--lat", "1.0", "hi"]).is_err());
    }

    #[test]
    fn flags_parse() {
        let args = Args::parse_from([
            "safora", "--json", "--pretty", "--mock", "--timeout", "0", "--model", "m", "hi",
        ]);
        assert!(args.json && args.pretty && args.mock);
        assert_eq!(args.timeout, Some(0));
        assert_eq!(args.model.as_deref(), Some("m"));
    }
}
