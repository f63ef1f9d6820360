//! Drives a [`Dashboard`]: executes its commands, feeds results back and
//! reports what happened.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use alertchart_analysis::AnalysisService;
use alertchart_core::{Candle, Timeframe};
use alertchart_data::{FetchRange, HistoricalSource, LiveDataEvent, LiveDataManager};
use alertchart_trigger::{
    process_alerts, AlertStore, HistoryStore, MemoryStore, MonitorOutcome, NotificationStore,
    StoreError,
};
use binance_api::WsConfig;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::{Command, DashboardEvent};
use crate::overlay::ChartSurface;
use crate::session::{unix_now, BackgroundMessage, Dashboard, Envelope, SessionHandle};

/// Where the runner gets candles and analyses from.
#[derive(Clone)]
pub struct Services {
    pub history: Arc<dyn HistoricalSource>,
    pub analyzer: Arc<dyn AnalysisService>,
    /// Candles fetched when a session opens.
    pub history_limit: u32,
}

/// Log one dashboard event.
pub fn report(event: &DashboardEvent) {
    match event {
        DashboardEvent::NoData { .. } => log::warn!("{}", event.describe()),
        _ => log::info!("{}", event.describe()),
    }
}

/// Runs one live session until Ctrl-C.
pub struct LiveRunner<S, C> {
    dashboard: Dashboard<S, C>,
    services: Services,
    live: LiveDataManager,
    forwarder: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl<S, C> LiveRunner<S, C>
where
    S: AlertStore + NotificationStore + HistoryStore,
    C: ChartSurface,
{
    pub fn new(dashboard: Dashboard<S, C>, services: Services, ws_config: WsConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            dashboard,
            services,
            live: LiveDataManager::with_config(ws_config),
            forwarder: None,
            tx,
            rx,
        }
    }

    /// Open a session for `symbol` and process messages until interrupted.
    /// Returns the dashboard so its store can be saved.
    pub async fn run(mut self, symbol: &str, interval: Timeframe) -> Dashboard<S, C> {
        let handle = self.dashboard.open_session(symbol, interval);
        self.pump().await;

        loop {
            tokio::select! {
                Some(envelope) = self.rx.recv() => {
                    self.dashboard.handle_message(envelope);
                    self.pump().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Interrupted, closing {}", handle);
                    break;
                }
            }
        }

        self.dashboard.close_session(&handle);
        self.pump().await;
        self.dashboard
    }

    async fn pump(&mut self) {
        for event in self.dashboard.drain_events() {
            report(&event);
        }
        for command in self.dashboard.take_commands() {
            self.execute(command).await;
        }
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::FetchHistory(handle) => {
                let source = Arc::clone(&self.services.history);
                let range = FetchRange::latest(self.services.history_limit);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let message = match source.fetch(handle.symbol(), handle.interval(), range).await {
                        Ok(candles) => BackgroundMessage::HistoryLoaded(candles),
                        Err(e) => BackgroundMessage::HistoryFailed(e.to_string()),
                    };
                    let _ = tx.send(handle.tag(message));
                });
            }
            Command::Subscribe(handle) => self.subscribe(handle).await,
            Command::Unsubscribe => {
                if let Some(task) = self.forwarder.take() {
                    task.abort();
                }
                if let Err(e) = self.live.unsubscribe().await {
                    log::warn!("Failed to close live stream: {}", e);
                }
            }
            Command::Analyze { handle, request } => {
                let analyzer = Arc::clone(&self.services.analyzer);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    log::info!("Requesting {} analysis for {}", analyzer.name(), handle);
                    let message = match analyzer.analyze(&request).await {
                        Ok(result) => BackgroundMessage::AnalysisReady(result),
                        Err(e) => BackgroundMessage::AnalysisFailed(e.to_string()),
                    };
                    let _ = tx.send(handle.tag(message));
                });
            }
        }
    }

    async fn subscribe(&mut self, handle: SessionHandle) {
        if let Some(task) = self.forwarder.take() {
            task.abort();
        }
        let mut events = match self.live.subscribe(handle.symbol(), handle.interval()).await {
            Ok(rx) => rx,
            Err(e) => {
                let _ = self.tx.send(handle.tag(BackgroundMessage::StreamError(e.to_string())));
                return;
            }
        };

        let tx = self.tx.clone();
        self.forwarder = Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let message = match event {
                    LiveDataEvent::CandleUpdate { candle, is_closed } => {
                        BackgroundMessage::LiveCandle { candle, is_closed }
                    }
                    LiveDataEvent::Connected => BackgroundMessage::ConnectionStatus(true),
                    LiveDataEvent::Disconnected => BackgroundMessage::ConnectionStatus(false),
                    LiveDataEvent::Error(e) => BackgroundMessage::StreamError(e),
                };
                if tx.send(handle.tag(message)).is_err() {
                    break;
                }
            }
        }));
    }
}

/// What an offline replay produced.
#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    pub history: usize,
    pub ticks: usize,
    /// Every toast shown, in order.
    pub messages: Vec<String>,
}

/// Run a session offline: the first `history_len` candles load as history,
/// the rest arrive one by one as live ticks.
pub async fn replay<S, C>(
    dashboard: &mut Dashboard<S, C>,
    symbol: &str,
    interval: Timeframe,
    candles: Vec<Candle>,
    history_len: usize,
    analyzer: &dyn AnalysisService,
) -> ReplaySummary
where
    S: AlertStore + NotificationStore + HistoryStore,
    C: ChartSurface,
{
    let split = history_len.min(candles.len());
    let (history, ticks) = candles.split_at(split);
    let mut summary = ReplaySummary {
        history: history.len(),
        ticks: ticks.len(),
        messages: Vec::new(),
    };

    let handle = dashboard.open_session(symbol, interval);
    drive(dashboard, history, analyzer, &mut summary).await;

    for tick in ticks {
        dashboard.handle_message(handle.tag(BackgroundMessage::LiveCandle {
            candle: *tick,
            is_closed: true,
        }));
        drive(dashboard, history, analyzer, &mut summary).await;
    }

    dashboard.close_session(&handle);
    drive(dashboard, history, analyzer, &mut summary).await;
    summary
}

/// Execute queued commands in place until none are left.
async fn drive<S, C>(
    dashboard: &mut Dashboard<S, C>,
    history: &[Candle],
    analyzer: &dyn AnalysisService,
    summary: &mut ReplaySummary,
) where
    S: AlertStore + NotificationStore + HistoryStore,
    C: ChartSurface,
{
    let mut queue: VecDeque<Command> = dashboard.take_commands().into();
    loop {
        for event in dashboard.drain_events() {
            report(&event);
            if let DashboardEvent::Toast(message) = event {
                summary.messages.push(message);
            }
        }
        let Some(command) = queue.pop_front() else {
            break;
        };

        let envelope = match command {
            Command::FetchHistory(handle) => {
                handle.tag(BackgroundMessage::HistoryLoaded(history.to_vec()))
            }
            Command::Subscribe(handle) => handle.tag(BackgroundMessage::ConnectionStatus(true)),
            Command::Unsubscribe => continue,
            Command::Analyze { handle, request } => match analyzer.analyze(&request).await {
                Ok(result) => handle.tag(BackgroundMessage::AnalysisReady(result)),
                Err(e) => handle.tag(BackgroundMessage::AnalysisFailed(e.to_string())),
            },
        };
        dashboard.handle_message(envelope);
        queue.extend(dashboard.take_commands());
    }
}

/// One batch monitor pass over `store` with the given prices. Entered and
/// closed alerts and new notifications are written back to the store.
pub fn monitor_pass(
    store: &mut MemoryStore,
    prices: &HashMap<String, f64>,
) -> Result<MonitorOutcome, StoreError> {
    let alerts = store.active_alerts()?;
    let outcome = process_alerts(&alerts, prices);
    for n in &outcome.notifications {
        log::info!("[{}] {}", n.user_id, n.message);
    }
    outcome.apply(&alerts, store, unix_now())?;
    Ok(outcome)
}

/// Symbols with at least one active alert, sorted and de-duplicated.
pub fn active_symbols(store: &MemoryStore) -> Result<Vec<String>, StoreError> {
    let mut symbols: Vec<String> = store
        .active_alerts()?
        .into_iter()
        .map(|a| a.symbol)
        .collect();
    symbols.sort();
    symbols.dedup();
    Ok(symbols)
}

/// Load alerts from `path`, run one pass against `prices_for` and save the
/// updated records.
pub async fn monitor_file<F, Fut>(path: &Path, prices_for: F) -> anyhow::Result<MonitorOutcome>
where
    F: FnOnce(Vec<String>) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<HashMap<String, f64>>>,
{
    let mut store = MemoryStore::load(path)?;
    let symbols = active_symbols(&store)?;
    if symbols.is_empty() {
        log::info!("No active alerts in {}", path.display());
        return Ok(MonitorOutcome::default());
    }

    let prices = prices_for(symbols).await?;
    let outcome = monitor_pass(&mut store, &prices)?;
    store.save(path)?;
    log::info!(
        "Monitor pass done: {} entered, {} closed",
        outcome.entered.len(),
        outcome.deactivated.len()
    );
    Ok(outcome)
}
