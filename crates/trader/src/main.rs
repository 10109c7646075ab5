mod config;
mod reporter;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use runtime::{Session, TracingEventSink};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::config::{parse_capital, validate_capital, CapitalError, Config, SummaryFormat};
use crate::reporter::{format_banner, format_summary, ConsoleReporter};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    runtime::init_tracing("trader");
    let config = Config::from_env()?;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    println!("============================================================");
    println!("          HIGH-FREQUENCY TRADING SIMULATOR");
    println!("============================================================");

    let capital = match read_capital(&config, &mut stdin).await? {
        Ok(capital) => capital,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::from(1));
        }
    };

    let session_config = config.session_config();
    let symbols = session_config.symbols.len();
    let warmup = session_config.warmup;
    let session = Session::start(session_config, capital, ConsoleReporter, TracingEventSink)
        .context("failed to start session")?;
    info!(
        summary_format = config.summary_format.as_str(),
        warmup_ms = u64::try_from(warmup.as_millis()).unwrap_or(u64::MAX),
        stop_loss_pct = config.exit_rule.stop_loss_pct(),
        take_profit_pct = config.exit_rule.take_profit_pct(),
        max_open_positions = config.sizing.max_open_positions(),
        "warming up"
    );
    println!("{}\n", format_banner(capital, symbols, session.strategies()));

    wait_for_stop(&mut stdin).await;
    println!("\n\n[STOP] Shutting down trading engine...");

    let report = session.stop().await;
    match config.summary_format {
        SummaryFormat::Text => println!("\n{}", format_summary(&report)),
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    println!("\n[COMPLETE] Session ended successfully!");

    Ok(ExitCode::SUCCESS)
}

/// The outer `Result` carries I/O failures; the inner one a capital the
/// session must not start with.
async fn read_capital(
    config: &Config,
    stdin: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<Result<f64, CapitalError>> {
    if let Some(capital) = config.capital {
        return Ok(validate_capital(capital));
    }

    print!("Enter starting capital (e.g., 100000): $");
    std::io::stdout().flush()?;
    let line = stdin
        .next_line()
        .await
        .context("failed to read capital")?
        .unwrap_or_default();
    Ok(parse_capital(&line))
}

/// Any input line, end of input, or Ctrl-C stops the session.
async fn wait_for_stop(stdin: &mut Lines<BufReader<Stdin>>) {
    tokio::select! {
        line = stdin.next_line() => {
            if let Err(err) = line {
                warn!(%err, "stdin closed with error");
            }
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                warn!(%err, "failed to listen for ctrl-c");
            }
        }
    }
}
