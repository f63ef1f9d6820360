//! Session lifecycle and per-tick orchestration.

use alertchart_analysis::{AnalysisMode, AnalysisRequest, AnalysisResult};
use alertchart_config::Config;
use alertchart_core::{sanitize_symbol, Candle, LevelKind, Timeframe, TradeHypothesis};
use alertchart_data::CandleStore;
use alertchart_trigger::{
    AlertNotification, AlertRecord, AlertStore, ArmError, ArmRequest, HistoryEntry,
    HistoryStore, NotificationSink, NotificationStore, SignalRegistry, TriggerState,
};

use super::sink::{unix_now, StoreSink};
use super::{BackgroundMessage, Envelope, SessionHandle, SessionStatus};
use crate::events::{Command, DashboardEvent, EventBus};
use crate::overlay::{ChartSurface, OverlayRenderer, OverlayStyle};

/// Dashboard behaviour taken from the config file.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    /// Owner of persisted alerts, notifications and history.
    pub user_id: String,
    pub mode: AnalysisMode,
    /// Candles sent with an analysis request.
    pub window: usize,
    /// Arm the engine as soon as an analysis arrives.
    pub auto_arm: bool,
}

impl From<&Config> for DashboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            user_id: config.general.user_id.clone(),
            mode: config.analysis.mode,
            window: config.analysis.window,
            auto_arm: config.analysis.auto_arm,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Everything owned by one open session.
#[derive(Debug)]
struct Session {
    handle: SessionHandle,
    candles: CandleStore,
    registry: SignalRegistry,
    /// Latest tick received while history is still loading.
    pending_tick: Option<Candle>,
    status: SessionStatus,
    stream_connected: bool,
    /// Persisted record mirroring the armed hypothesis.
    alert: Option<AlertRecord>,
}

impl Session {
    fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            candles: CandleStore::new(),
            registry: SignalRegistry::new(),
            pending_tick: None,
            status: SessionStatus::Loading,
            stream_connected: false,
            alert: None,
        }
    }
}

/// Single-threaded controller for one chart session at a time.
///
/// The dashboard never does I/O itself. It consumes [`Envelope`]s from
/// background tasks, and emits [`Command`]s for the runner to execute and
/// [`DashboardEvent`]s to report.
pub struct Dashboard<S, C> {
    settings: DashboardSettings,
    store: S,
    surface: C,
    overlay: OverlayRenderer,
    bus: EventBus,
    generation: u64,
    session: Option<Session>,
}

impl<S, C> Dashboard<S, C>
where
    S: AlertStore + NotificationStore + HistoryStore,
    C: ChartSurface,
{
    pub fn new(settings: DashboardSettings, style: OverlayStyle, store: S, surface: C) -> Self {
        Self {
            settings,
            store,
            surface,
            overlay: OverlayRenderer::new(style),
            bus: EventBus::new(),
            generation: 0,
            session: None,
        }
    }

    pub fn from_config(config: &Config, store: S, surface: C) -> Self {
        Self::new(
            DashboardSettings::from(config),
            OverlayStyle::from(&config.overlay),
            store,
            surface,
        )
    }

    /// Replace the current session with a new one for `symbol` and
    /// `interval`. Asks the runner to fetch history and subscribe.
    pub fn open_session(&mut self, symbol: &str, interval: Timeframe) -> SessionHandle {
        if let Some(old) = self.session.take() {
            self.teardown(old);
        }

        self.generation += 1;
        let handle = SessionHandle::new(self.generation, sanitize_symbol(symbol), interval);
        self.overlay.load_candles(&mut self.surface, &[]);
        self.session = Some(Session::new(handle.clone()));

        log::info!("Opened session {}", handle);
        self.bus.emit(DashboardEvent::SessionOpened(handle.clone()));
        self.bus.dispatch(Command::FetchHistory(handle.clone()));
        self.bus.dispatch(Command::Subscribe(handle.clone()));
        handle
    }

    /// Close the session if `handle` is still the current one.
    pub fn close_session(&mut self, handle: &SessionHandle) -> bool {
        match &self.session {
            Some(session) if &session.handle == handle => {}
            _ => return false,
        }
        if let Some(session) = self.session.take() {
            self.teardown(session);
        }
        true
    }

    fn teardown(&mut self, session: Session) {
        self.overlay.clear(&mut self.surface);
        self.bus.dispatch(Command::Unsubscribe);
        log::info!("Closed session {}", session.handle);
        self.bus.emit(DashboardEvent::SessionClosed(session.handle));
    }

    /// Apply one background result. Returns `false` when it belonged to a
    /// session that is no longer current.
    pub fn handle_message(&mut self, envelope: Envelope) -> bool {
        let Some((session, mut parts)) = self.split() else {
            log::debug!("Dropping message for #{}: no open session", envelope.generation);
            return false;
        };
        if session.handle.generation() != envelope.generation {
            log::debug!(
                "Dropping message for stale session #{} (current {})",
                envelope.generation,
                session.handle
            );
            return false;
        }

        match envelope.message {
            BackgroundMessage::HistoryLoaded(candles) => parts.history(session, candles),
            BackgroundMessage::HistoryFailed(reason) => parts.no_data(session, reason),
            BackgroundMessage::LiveCandle { candle, is_closed } => {
                parts.live_candle(session, candle, is_closed)
            }
            BackgroundMessage::ConnectionStatus(connected) => parts.set_connected(session, connected),
            BackgroundMessage::StreamError(err) => {
                log::warn!("Live stream error on {}: {}", session.handle, err);
                parts.set_connected(session, false);
            }
            BackgroundMessage::AnalysisReady(result) => parts.analysis(session, result),
            BackgroundMessage::AnalysisFailed(err) => parts.analysis_failed(session, &err),
        }
        true
    }

    /// Arm the current session with raw signal fields.
    ///
    /// On refusal the previous hypothesis stays armed and the reason is
    /// shown. Without an open session there is no symbol to arm.
    pub fn arm(&mut self, request: ArmRequest) -> Result<(), ArmError> {
        let Some((session, mut parts)) = self.split() else {
            return Err(ArmError::MissingSymbol);
        };
        parts.arm(session, request)
    }

    /// Drop the armed hypothesis and its overlay.
    pub fn disarm(&mut self) {
        if let Some((session, mut parts)) = self.split() {
            parts.disarm(session);
        }
    }

    /// Ask for a fresh analysis of the current candles. Returns `false`
    /// when there is nothing to analyze.
    pub fn request_analysis(&mut self) -> bool {
        match self.split() {
            Some((session, mut parts)) => parts.request_analysis(session),
            None => false,
        }
    }

    pub fn drain_events(&mut self) -> Vec<DashboardEvent> {
        self.bus.drain_events().collect()
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        self.bus.take_commands()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn handle(&self) -> Option<&SessionHandle> {
        self.session.as_ref().map(|s| &s.handle)
    }

    pub fn status(&self) -> Option<&SessionStatus> {
        self.session.as_ref().map(|s| &s.status)
    }

    pub fn stream_connected(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.stream_connected)
    }

    pub fn candles(&self) -> &[Candle] {
        self.session.as_ref().map_or(&[], |s| s.candles.candles())
    }

    pub fn pending_tick(&self) -> Option<&Candle> {
        self.session.as_ref().and_then(|s| s.pending_tick.as_ref())
    }

    pub fn hypothesis(&self) -> Option<&TradeHypothesis> {
        self.session.as_ref().and_then(|s| s.registry.hypothesis())
    }

    pub fn trigger_state(&self) -> Option<TriggerState> {
        self.session
            .as_ref()
            .and_then(|s| s.registry.engine())
            .map(|e| e.state())
    }

    /// Id of the persisted alert record for the armed hypothesis.
    pub fn alert_id(&self) -> Option<u64> {
        self.session.as_ref().and_then(|s| s.alert.as_ref()).map(|a| a.id)
    }

    pub fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }

    pub fn surface(&self) -> &C {
        &self.surface
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn split(&mut self) -> Option<(&mut Session, Parts<'_, S, C>)> {
        let session = self.session.as_mut()?;
        Some((
            session,
            Parts {
                settings: &self.settings,
                store: &mut self.store,
                surface: &mut self.surface,
                overlay: &mut self.overlay,
                bus: &mut self.bus,
            },
        ))
    }
}

/// Borrowed dashboard state, split off the session so both can be
/// mutated together.
struct Parts<'a, S, C> {
    settings: &'a DashboardSettings,
    store: &'a mut S,
    surface: &'a mut C,
    overlay: &'a mut OverlayRenderer,
    bus: &'a mut EventBus,
}

impl<S, C> Parts<'_, S, C>
where
    S: AlertStore + NotificationStore + HistoryStore,
    C: ChartSurface,
{
    fn sink(&mut self) -> StoreSink<'_, S> {
        StoreSink::new(&mut *self.store, &mut *self.bus)
    }

    fn history(&mut self, session: &mut Session, candles: Vec<Candle>) {
        let count = match session.candles.merge(candles).map(|merged| merged.len()) {
            Ok(count) => count,
            Err(e) => {
                self.no_data(session, e.to_string());
                return;
            }
        };
        self.overlay.load_candles(&mut *self.surface, session.candles.candles());

        session.status = SessionStatus::Ready;
        log::info!("{}: loaded {} candles", session.handle, count);
        self.bus.emit(DashboardEvent::HistoryLoaded {
            handle: session.handle.clone(),
            candles: count,
        });

        if let Some(tick) = session.pending_tick.take() {
            log::debug!("{}: applying buffered tick at {}", session.handle, tick.time);
            self.tick(session, tick);
        }

        self.request_analysis(session);
    }

    fn no_data(&mut self, session: &mut Session, reason: String) {
        log::warn!("{}: no data ({})", session.handle, reason);
        session.status = SessionStatus::NoData(reason.clone());
        self.bus.emit(DashboardEvent::NoData {
            handle: session.handle.clone(),
            reason,
        });

        // Fetch resolved without history: apply the buffered tick anyway
        if let Some(tick) = session.pending_tick.take() {
            log::debug!("{}: applying buffered tick at {}", session.handle, tick.time);
            self.tick(session, tick);
        }
    }

    fn live_candle(&mut self, session: &mut Session, candle: Candle, is_closed: bool) {
        log::trace!(
            "{}: {} candle at {} close {}",
            session.handle,
            if is_closed { "closed" } else { "open" },
            candle.time,
            candle.close
        );
        if session.status == SessionStatus::Loading {
            if session.pending_tick.replace(candle).is_some() {
                log::debug!("{}: replaced buffered tick", session.handle);
            } else {
                log::debug!("{}: buffering tick until history loads", session.handle);
            }
            return;
        }
        self.tick(session, candle);
    }

    /// Store update, then trigger evaluation, then notification, then
    /// overlay.
    fn tick(&mut self, session: &mut Session, candle: Candle) {
        if session.candles.apply_tick(candle).is_err() {
            return;
        }
        if matches!(session.status, SessionStatus::NoData(_)) {
            session.status = SessionStatus::Ready;
        }
        self.overlay.push_candle(&mut *self.surface, &candle);

        if let Some(event) = session.registry.on_tick(&candle) {
            if let Some(hypothesis) = session.registry.hypothesis() {
                let notification = AlertNotification::new(&event, hypothesis);
                let settings = self.settings;
                notification.deliver(&mut self.sink(), &settings.user_id);
            }
            self.record_event(session, event.kind);
        }

        if let Some(engine) = session.registry.engine() {
            let latest = session.candles.last().map(|c| c.time);
            self.overlay.extend(
                &mut *self.surface,
                engine.hypothesis(),
                engine.state(),
                latest,
                session.handle.interval().seconds(),
            );
        }
    }

    fn record_event(&mut self, session: &mut Session, kind: LevelKind) {
        let Some(alert) = session.alert.as_mut() else {
            return;
        };
        match kind {
            LevelKind::Entry => alert.is_entered = true,
            LevelKind::TakeProfit | LevelKind::StopLoss => alert.is_active = false,
        }
        if let Err(e) = self.store.update_alert(alert) {
            log::warn!("Failed to update alert {}: {}", alert.id, e);
        }
    }

    fn request_analysis(&mut self, session: &Session) -> bool {
        let window = session.candles.window(self.settings.window);
        if window.is_empty() {
            return false;
        }
        let request = AnalysisRequest::new(session.handle.symbol(), self.settings.mode, window.to_vec());
        self.bus.dispatch(Command::Analyze {
            handle: session.handle.clone(),
            request,
        });
        true
    }

    fn analysis(&mut self, session: &mut Session, result: AnalysisResult) {
        let entry = HistoryEntry {
            id: 0,
            user_id: self.settings.user_id.clone(),
            symbol: session.handle.symbol().to_string(),
            mode: mode_label(self.settings.mode).to_string(),
            result: result.to_json(),
            created_at: unix_now(),
        };
        if let Err(e) = self.store.save_history(entry) {
            log::warn!("Failed to save analysis history: {}", e);
        }

        self.disarm(session);
        if self.settings.auto_arm {
            let anchor = session.candles.last().map_or(0, |c| c.time);
            let request = result.arm_request(session.handle.symbol(), anchor);
            // Refusal is already shown through the sink
            let _ = self.arm(session, request);
        }
    }

    fn analysis_failed(&mut self, session: &Session, err: &str) {
        log::warn!("{}: analysis failed: {}", session.handle, err);
        self.sink().show(&format!("Analysis failed: {err}"));
    }

    fn arm(&mut self, session: &mut Session, request: ArmRequest) -> Result<(), ArmError> {
        let hypothesis = match session.registry.arm(request) {
            Ok(h) => h,
            Err(e) => {
                self.sink().show(&e.to_string());
                return Err(e);
            }
        };

        let latest = session.candles.last().map(|c| c.time);
        self.overlay.draw(
            &mut *self.surface,
            hypothesis,
            TriggerState::WaitingEntry,
            latest,
            session.handle.interval().seconds(),
        );

        if let Some(mut previous) = session.alert.take() {
            if previous.is_active {
                previous.is_active = false;
                if let Err(e) = self.store.update_alert(&previous) {
                    log::warn!("Failed to retire alert {}: {}", previous.id, e);
                }
            }
        }
        let mut record = AlertRecord::from_hypothesis(&self.settings.user_id, hypothesis);
        match self.store.save_alert(record.clone()) {
            Ok(id) => {
                record.id = id;
                session.alert = Some(record);
            }
            Err(e) => log::warn!("Failed to save alert: {}", e),
        }

        log::info!(
            "Armed {} {} (entry {:?}, tp {:?}, sl {:?})",
            hypothesis.direction,
            hypothesis.symbol,
            hypothesis.entry_price,
            hypothesis.take_profit,
            hypothesis.stop_loss
        );
        self.bus.emit(DashboardEvent::Armed {
            symbol: hypothesis.symbol.clone(),
            direction: hypothesis.direction,
        });
        Ok(())
    }

    fn disarm(&mut self, session: &mut Session) {
        session.registry.clear();
        self.overlay.clear(&mut *self.surface);
        if let Some(mut alert) = session.alert.take() {
            if alert.is_active {
                alert.is_active = false;
                if let Err(e) = self.store.update_alert(&alert) {
                    log::warn!("Failed to retire alert {}: {}", alert.id, e);
                }
            }
        }
    }

    fn set_connected(&mut self, session: &mut Session, connected: bool) {
        if session.stream_connected != connected {
            session.stream_connected = connected;
            self.bus.emit(DashboardEvent::ConnectionChanged(connected));
        }
    }
}

fn mode_label(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::Normal => "normal",
        AnalysisMode::Ultra => "ultra",
    }
}
