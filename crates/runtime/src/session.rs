use std::sync::Arc;
use std::time::{Duration, Instant};

use core_sim::universe::default_universe;
use core_sim::{
    now_ms, ExecutionLedger, LedgerError, LedgerSummary, MarketSimulator, PriceFeed, SimConfig,
    StatusSnapshot,
};
use parking_lot::Mutex;
use serde::Serialize;
use strategy::{ExitRule, SizingConfig, StrategyKind};
use tokio::time::{interval, sleep, Interval, MissedTickBehavior};
use tracing::info;

use crate::engine::DecisionLoop;
use crate::logging::EventSink;
use crate::metrics::{CycleLatency, LatencyPercentiles};
use crate::shutdown::{shutdown_channel, ShutdownSignal, ShutdownTrigger};
use crate::supervisor::{Activity, SupervisedActivity, Supervisor};

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub symbols: Vec<String>,
    pub sim: SimConfig,
    /// `None` seeds the feed from OS entropy.
    pub seed: Option<u64>,
    pub feed_interval: Duration,
    pub decision_interval: Duration,
    pub report_interval: Duration,
    /// Delay between feed start and the first decision cycle.
    pub warmup: Duration,
    pub exit_rule: ExitRule,
    pub sizing: SizingConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            symbols: default_universe(),
            sim: SimConfig::default(),
            seed: None,
            feed_interval: Duration::from_millis(50),
            decision_interval: Duration::from_millis(150),
            report_interval: Duration::from_millis(1_000),
            warmup: Duration::from_millis(3_000),
            exit_rule: ExitRule::default(),
            sizing: SizingConfig::default(),
        }
    }
}

/// Receives a read-only status snapshot every report interval.
pub trait StatusReporter: Send + 'static {
    fn report(&mut self, status: &StatusSnapshot);
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub strategies: Vec<&'static str>,
    pub summary: LedgerSummary,
    pub feed_rounds: u64,
    pub decision_cycles: u64,
    pub decision_latency: Option<LatencyPercentiles>,
    pub activities: Vec<SupervisedActivity>,
    pub elapsed_ms: u64,
}

/// A running simulation: feed, decision loop and reporting on their own
/// tasks, sharing one feed and one ledger.
#[derive(Debug)]
pub struct Session {
    feed: Arc<PriceFeed>,
    ledger: Arc<ExecutionLedger>,
    strategies: Vec<&'static str>,
    metrics: Arc<Mutex<CycleLatency>>,
    trigger: ShutdownTrigger,
    supervisor: Supervisor,
    started_at: Instant,
}

impl Session {
    /// Must be called from within a tokio runtime. Fails before spawning
    /// anything if the ledger rejects `initial_capital`.
    pub fn start<R, S>(
        config: SessionConfig,
        initial_capital: f64,
        reporter: R,
        sink: S,
    ) -> Result<Self, LedgerError>
    where
        R: StatusReporter,
        S: EventSink,
    {
        let ledger = Arc::new(ExecutionLedger::with_config(initial_capital, &config.sim)?);
        let feed = Arc::new(PriceFeed::new(config.sim.history_capacity));
        let simulator = match config.seed {
            Some(seed) => MarketSimulator::new(config.symbols.clone(), config.sim.clone(), seed),
            None => MarketSimulator::from_entropy(config.symbols.clone(), config.sim.clone()),
        };
        let decisions = DecisionLoop::new(
            Arc::clone(&feed),
            Arc::clone(&ledger),
            config.symbols.clone(),
        )
        .with_exit_rule(config.exit_rule)
        .with_sizing(config.sizing);
        let strategies = decisions
            .strategies()
            .iter()
            .map(StrategyKind::name)
            .collect();
        let metrics = Arc::new(Mutex::new(CycleLatency::new()));
        let (trigger, signal) = shutdown_channel();

        let mut supervisor = Supervisor::new();
        supervisor.spawn(
            Activity::Feed,
            run_feed(
                simulator,
                Arc::clone(&feed),
                config.feed_interval,
                signal.clone(),
            ),
        );
        supervisor.spawn(
            Activity::Decision,
            run_decisions(
                decisions,
                sink,
                Arc::clone(&metrics),
                config.warmup,
                config.decision_interval,
                signal.clone(),
            ),
        );
        supervisor.spawn(
            Activity::Reporting,
            run_reporting(
                reporter,
                Arc::clone(&feed),
                Arc::clone(&ledger),
                config.report_interval,
                signal,
            ),
        );

        info!(
            symbols = config.symbols.len(),
            initial_capital,
            seed = ?config.seed,
            "session started"
        );

        Ok(Self {
            feed,
            ledger,
            strategies,
            metrics,
            trigger,
            supervisor,
            started_at: Instant::now(),
        })
    }

    pub fn feed(&self) -> &Arc<PriceFeed> {
        &self.feed
    }

    pub fn ledger(&self) -> &Arc<ExecutionLedger> {
        &self.ledger
    }

    pub fn strategies(&self) -> &[&'static str] {
        &self.strategies
    }

    /// Signals shutdown, waits for every activity to exit, then reads the
    /// final state.
    pub async fn stop(mut self) -> SessionReport {
        self.trigger.trigger();
        let activities = self.supervisor.join_all().await;

        let summary = self.ledger.summary(&self.feed.mid_prices());
        let (decision_cycles, decision_latency) = {
            let metrics = self.metrics.lock();
            (metrics.recorded(), metrics.percentiles())
        };
        let elapsed_ms = u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            decision_cycles,
            trades = summary.trade_count,
            total_pnl = summary.total_pnl,
            "session stopped"
        );

        SessionReport {
            strategies: self.strategies,
            summary,
            feed_rounds: self.feed.rounds_published(),
            decision_cycles,
            decision_latency,
            activities,
            elapsed_ms,
        }
    }
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period.max(MIN_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_feed(
    mut simulator: MarketSimulator,
    feed: Arc<PriceFeed>,
    period: Duration,
    mut shutdown: ShutdownSignal,
) {
    let mut ticker = ticker(period);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            _ = ticker.tick() => feed.publish_round(simulator.next_round(now_ms())),
        }
    }
}

async fn run_decisions<S: EventSink>(
    mut decisions: DecisionLoop,
    mut sink: S,
    metrics: Arc<Mutex<CycleLatency>>,
    warmup: Duration,
    period: Duration,
    mut shutdown: ShutdownSignal,
) {
    tokio::select! {
        biased;
        _ = shutdown.triggered() => return,
        _ = sleep(warmup) => {}
    }

    let mut ticker = ticker(period);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            _ = ticker.tick() => {
                let started = Instant::now();
                let events = decisions.run_cycle();
                metrics.lock().record(started.elapsed());
                for event in &events {
                    sink.write(event);
                }
            }
        }
    }
}

async fn run_reporting<R: StatusReporter>(
    mut reporter: R,
    feed: Arc<PriceFeed>,
    ledger: Arc<ExecutionLedger>,
    period: Duration,
    mut shutdown: ShutdownSignal,
) {
    let mut ticker = ticker(period);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            _ = ticker.tick() => reporter.report(&ledger.status(&feed.mid_prices())),
        }
    }
}
