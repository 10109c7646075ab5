use std::fmt::Write as _;
use std::io::{self, Write};

use core_sim::StatusSnapshot;
use runtime::{SessionReport, StatusReporter};

const RULE: &str = "============================================================";

/// Rewrites one status line on stdout every report interval.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn report(&mut self, status: &StatusSnapshot) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\r{}     ", format_status(status));
        let _ = stdout.flush();
    }
}

pub fn format_status(status: &StatusSnapshot) -> String {
    format!(
        "Portfolio: ${:.2} | P&L: {} ({}) | Trades: {} | Open: {}",
        status.portfolio_value,
        signed_money(status.pnl),
        signed_pct(status.return_pct, 1),
        status.trade_count,
        status.open_positions
    )
}

pub fn format_banner(capital: f64, symbols: usize, strategies: &[&str]) -> String {
    let mut banner = String::new();
    let _ = writeln!(banner, "[INIT] Starting with ${capital:.2} capital");
    let _ = writeln!(banner, "[INIT] Simulating market data for {symbols} stocks");
    let _ = writeln!(banner, "\nActive Strategies:");
    for strategy in strategies {
        let _ = writeln!(banner, "  - {strategy}");
    }
    let _ = write!(banner, "\nPress ENTER to stop...");
    banner
}

pub fn format_summary(report: &SessionReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "                   TRADING SUMMARY");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Initial Capital:       ${:.2}", summary.initial_capital);
    let _ = writeln!(out, "Final Portfolio Value: ${:.2}", summary.portfolio_value);
    let _ = writeln!(out, "Cash Remaining:        ${:.2}", summary.cash);
    let _ = writeln!(out);
    let _ = writeln!(out, "Realized P&L:          {}", signed_money(summary.realized_pnl));
    let _ = writeln!(out, "Unrealized P&L:        {}", signed_money(summary.unrealized_pnl));
    let _ = writeln!(
        out,
        "Total P&L:             {} ({})",
        signed_money(summary.total_pnl),
        signed_pct(summary.return_pct, 2)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Trades:          {}", summary.trade_count);
    let _ = writeln!(out, "Winning Trades:        {}", summary.winning_trades);
    let _ = writeln!(out, "Losing Trades:         {}", summary.losing_trades);
    if let Some(win_rate) = summary.win_rate_pct {
        let _ = writeln!(out, "Win Rate:              {win_rate:.1}%");
    }

    if !summary.open_positions.is_empty() {
        let _ = writeln!(out, "\nOpen Positions: {}", summary.open_positions.len());
        for mark in &summary.open_positions {
            let _ = writeln!(
                out,
                "  {}: {} @ ${:.2} (Current: ${:.2}) {}",
                mark.symbol,
                mark.quantity,
                mark.avg_entry_price,
                mark.current_price,
                signed_money(mark.unrealized_pnl)
            );
        }
    }

    let _ = writeln!(out);
    match &report.decision_latency {
        Some(latency) => {
            let _ = write!(
                out,
                "Decision cycles: {} (p50 {}us, p99 {}us, max {}us)",
                report.decision_cycles,
                latency.p50_micros,
                latency.p99_micros,
                latency.max_micros
            );
        }
        None => {
            let _ = write!(out, "Decision cycles: 0");
        }
    }

    out
}

fn signed_money(value: f64) -> String {
    if value >= 0.0 {
        format!("+${value:.2}")
    } else {
        format!("-${:.2}", value.abs())
    }
}

fn signed_pct(value: f64, precision: usize) -> String {
    if value >= 0.0 {
        format!("+{value:.precision$}%")
    } else {
        format!("{value:.precision$}%")
    }
}
