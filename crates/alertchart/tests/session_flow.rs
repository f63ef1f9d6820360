//! End-to-end dashboard flows without network access.

use std::collections::HashMap;

use alertchart::overlay::{LayerName, OverlayStyle, RecordingSurface};
use alertchart::runner::{self, monitor_file};
use alertchart::{
    BackgroundMessage, Command, Dashboard, DashboardEvent, DashboardSettings, SessionHandle,
    SessionStatus,
};
use alertchart_analysis::{AnalysisResult, HeuristicAnalyzer};
use alertchart_core::{Candle, Direction, LevelKind, Timeframe};
use alertchart_trigger::{
    AlertRecord, AlertStore, HistoryStore, MemoryStore, NotificationStore, TriggerState,
};

const DAY: i64 = 86_400;

type TestDashboard = Dashboard<MemoryStore, RecordingSurface>;

fn dashboard() -> TestDashboard {
    Dashboard::new(
        DashboardSettings::default(),
        OverlayStyle::default(),
        MemoryStore::new(),
        RecordingSurface::new(),
    )
}

fn history(last_close: f64) -> Vec<Candle> {
    (0..10)
        .map(|i| {
            let close = last_close - (9 - i) as f64 * 0.5;
            Candle::new(i * DAY, close - 0.25, close + 1.0, close - 1.0, close, 10.0)
        })
        .collect()
}

fn tick(day: i64, close: f64) -> BackgroundMessage {
    BackgroundMessage::LiveCandle {
        candle: Candle::new(day * DAY, close, close, close, close, 1.0),
        is_closed: false,
    }
}

fn long_signal() -> AnalysisResult {
    AnalysisResult {
        description: "Breakout above resistance".to_string(),
        entry_price: "$100.00".to_string(),
        take_profit: "$110.00".to_string(),
        stop_loss: "$95.00".to_string(),
        sentiment: Some("Bullish".to_string()),
        ..AnalysisResult::default()
    }
}

fn toasts(events: &[DashboardEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DashboardEvent::Toast(m) => Some(m.clone()),
            _ => None,
        })
        .collect()
}

/// Open a session and load history, returning the handle.
fn loaded(dash: &mut TestDashboard) -> SessionHandle {
    let handle = dash.open_session("btcusdt", Timeframe::Day1);
    dash.take_commands();
    assert!(dash.handle_message(handle.tag(BackgroundMessage::HistoryLoaded(history(97.0)))));
    handle
}

#[test]
fn test_open_session_requests_history_and_stream() {
    let mut dash = dashboard();
    let handle = dash.open_session("btc-usdt", Timeframe::Hour1);

    assert_eq!(handle.symbol(), "BTCUSDT");
    assert_eq!(dash.status(), Some(&SessionStatus::Loading));
    let commands = dash.take_commands();
    assert!(matches!(&commands[0], Command::FetchHistory(h) if h == &handle));
    assert!(matches!(&commands[1], Command::Subscribe(h) if h == &handle));
}

#[test]
fn test_ticks_before_history_keep_only_latest() {
    let mut dash = dashboard();
    let handle = dash.open_session("BTCUSDT", Timeframe::Day1);

    dash.handle_message(handle.tag(tick(9, 96.0)));
    dash.handle_message(handle.tag(tick(9, 98.5)));
    assert_eq!(dash.pending_tick().map(|c| c.close), Some(98.5));
    assert!(dash.candles().is_empty());

    dash.handle_message(handle.tag(BackgroundMessage::HistoryLoaded(history(97.0))));
    assert!(dash.pending_tick().is_none());
    assert_eq!(dash.candles().len(), 10);
    assert_eq!(dash.candles().last().map(|c| c.close), Some(98.5));
    assert_eq!(dash.surface().candles().last().map(|c| c.close), Some(98.5));

    // History done: an analysis of the loaded window is requested
    let commands = dash.take_commands();
    assert!(commands.iter().any(|c| matches!(c,
        Command::Analyze { request, .. } if request.candles.len() == 10 && request.symbol == "BTCUSDT")));
}

#[test]
fn test_long_trade_fires_entry_then_take_profit() {
    let mut dash = dashboard();
    let handle = loaded(&mut dash);

    dash.handle_message(handle.tag(BackgroundMessage::AnalysisReady(long_signal())));
    let hypothesis = dash.hypothesis().unwrap();
    assert_eq!(hypothesis.direction, Direction::Long);
    assert_eq!(hypothesis.anchor_time, 9 * DAY);
    assert_eq!(dash.overlay().layers().len(), 7);
    assert_eq!(dash.store().history("local", 10).unwrap().len(), 1);
    dash.drain_events();

    for (day, close) in [(10, 98.0), (11, 101.0), (12, 103.0), (13, 111.0)] {
        dash.handle_message(handle.tag(tick(day, close)));
    }

    let shown = toasts(&dash.drain_events());
    assert_eq!(
        shown,
        vec![
            "BTC/USDT has crossed the Entry Price at 100.".to_string(),
            "BTC/USDT has reached the Take Profit level at 110.".to_string(),
        ]
    );
    assert!(matches!(
        dash.trigger_state(),
        Some(TriggerState::Closed { exit: LevelKind::TakeProfit, trade_end_time, .. }) if trade_end_time == 13 * DAY
    ));

    let persisted = dash.store().notifications("local", 20).unwrap();
    assert_eq!(persisted.len(), 2);
    let alert = &dash.store().alerts()[0];
    assert!(alert.is_entered);
    assert!(!alert.is_active);

    // Lines stop at the closing tick even as more ticks arrive
    dash.handle_message(handle.tag(tick(14, 120.0)));
    let tp_line = dash.overlay().layers().get(LayerName::TpLine).unwrap();
    let points = &dash.surface().series(tp_line).unwrap().points;
    assert_eq!(points.first().map(|p| p.time), Some(9 * DAY));
    assert_eq!(points.last().map(|p| p.time), Some(13 * DAY));
    assert!(toasts(&dash.drain_events()).is_empty());
}

#[test]
fn test_open_trade_extends_past_latest_tick() {
    let mut dash = dashboard();
    let handle = loaded(&mut dash);
    dash.handle_message(handle.tag(BackgroundMessage::AnalysisReady(long_signal())));

    dash.handle_message(handle.tag(tick(10, 98.0)));
    dash.handle_message(handle.tag(tick(11, 101.0)));

    let entry_line = dash.overlay().layers().get(LayerName::EntryLine).unwrap();
    let points = &dash.surface().series(entry_line).unwrap().points;
    assert_eq!(points.last().map(|p| p.time), Some(21 * DAY));
}

#[test]
fn test_stale_messages_are_dropped() {
    let mut dash = dashboard();
    let old = dash.open_session("BTCUSDT", Timeframe::Day1);
    let new = dash.open_session("ETHUSDT", Timeframe::Day1);
    assert!(new.generation() > old.generation());

    let commands = dash.take_commands();
    assert!(commands.iter().any(|c| matches!(c, Command::Unsubscribe)));

    assert!(!dash.handle_message(old.tag(BackgroundMessage::HistoryLoaded(history(97.0)))));
    assert!(!dash.handle_message(old.tag(BackgroundMessage::AnalysisReady(long_signal()))));
    assert!(dash.candles().is_empty());
    assert!(dash.hypothesis().is_none());
    assert_eq!(dash.status(), Some(&SessionStatus::Loading));

    assert!(!dash.close_session(&old));
    assert!(dash.close_session(&new));
    assert!(dash.handle().is_none());
}

#[test]
fn test_switching_symbol_drops_armed_overlay() {
    let mut dash = dashboard();
    let old = loaded(&mut dash);
    dash.handle_message(old.tag(BackgroundMessage::AnalysisReady(long_signal())));
    assert_eq!(dash.surface().series_count(), 7);

    let new = dash.open_session("ETHUSDT", Timeframe::Day1);
    assert_eq!(dash.surface().series_count(), 0);
    assert!(dash.hypothesis().is_none());
    dash.drain_events();

    // A late tick from the old stream must not reach the new session
    assert!(!dash.handle_message(old.tag(tick(10, 101.0))));
    assert!(dash.pending_tick().is_none());

    dash.handle_message(new.tag(BackgroundMessage::HistoryLoaded(history(97.0))));
    assert!(dash.hypothesis().is_none());
    assert!(dash.trigger_state().is_none());
    assert_eq!(dash.surface().series_count(), 0);
    assert!(toasts(&dash.drain_events()).is_empty());
}

#[test]
fn test_switching_interval_drops_armed_overlay() {
    let mut dash = dashboard();
    let old = loaded(&mut dash);
    dash.handle_message(old.tag(BackgroundMessage::AnalysisReady(long_signal())));

    let new = dash.open_session("BTCUSDT", Timeframe::Hour1);
    assert_eq!(new.symbol(), old.symbol());
    assert_eq!(dash.surface().series_count(), 0);
    assert!(!dash.handle_message(old.tag(tick(10, 101.0))));
    assert!(dash.hypothesis().is_none());
}

#[test]
fn test_failed_history_applies_buffered_tick() {
    let mut dash = dashboard();
    let handle = dash.open_session("BTCUSDT", Timeframe::Day1);
    dash.take_commands();

    dash.handle_message(handle.tag(tick(9, 98.0)));
    assert!(dash.pending_tick().is_some());

    dash.handle_message(handle.tag(BackgroundMessage::HistoryFailed("down".to_string())));
    assert!(dash.pending_tick().is_none());
    assert_eq!(dash.candles().len(), 1);
    assert_eq!(dash.candles()[0].close, 98.0);
    assert_eq!(dash.status(), Some(&SessionStatus::Ready));
    assert_eq!(dash.surface().candles().last().map(|c| c.close), Some(98.0));
}

#[test]
fn test_empty_history_enters_no_data() {
    let mut dash = dashboard();
    let handle = dash.open_session("BTCUSDT", Timeframe::Day1);
    dash.take_commands();

    dash.handle_message(handle.tag(BackgroundMessage::HistoryLoaded(Vec::new())));
    assert!(matches!(dash.status(), Some(SessionStatus::NoData(_))));
    assert!(dash.take_commands().is_empty());
    assert_eq!(dash.surface().series_count(), 0);
    assert!(dash
        .drain_events()
        .iter()
        .any(|e| matches!(e, DashboardEvent::NoData { .. })));
}

#[test]
fn test_failed_analysis_keeps_armed_signal() {
    let mut dash = dashboard();
    let handle = loaded(&mut dash);
    dash.handle_message(handle.tag(BackgroundMessage::AnalysisReady(long_signal())));
    dash.drain_events();

    dash.handle_message(handle.tag(BackgroundMessage::AnalysisFailed("HTTP 500".to_string())));
    assert!(dash.hypothesis().is_some());
    assert_eq!(dash.overlay().layers().len(), 7);
    assert_eq!(toasts(&dash.drain_events()), vec!["Analysis failed: HTTP 500".to_string()]);
}

#[test]
fn test_new_analysis_replaces_signal_and_retires_alert() {
    let mut dash = dashboard();
    let handle = loaded(&mut dash);
    dash.handle_message(handle.tag(BackgroundMessage::AnalysisReady(long_signal())));
    let first = dash.alert_id().unwrap();

    let short = AnalysisResult {
        entry_price: "$95.00".to_string(),
        take_profit: "$85.00".to_string(),
        stop_loss: "$99.00".to_string(),
        sentiment: Some("Bearish".to_string()),
        ..AnalysisResult::default()
    };
    dash.handle_message(handle.tag(BackgroundMessage::AnalysisReady(short)));

    assert_eq!(dash.hypothesis().map(|h| h.direction), Some(Direction::Short));
    assert_ne!(dash.alert_id(), Some(first));
    let active = dash.store().active_alerts().unwrap();
    assert_eq!(active.len(), 1);
    assert!(!active[0].is_long);
    assert_eq!(dash.surface().series_count(), 7);
}

#[test]
fn test_ambiguous_signal_is_refused() {
    let mut dash = dashboard();
    let handle = loaded(&mut dash);
    dash.drain_events();

    let ambiguous = AnalysisResult {
        entry_price: "$100.00".to_string(),
        take_profit: "$90.00".to_string(),
        stop_loss: "$95.00".to_string(),
        sentiment: Some("Ranging/Neutral".to_string()),
        ..AnalysisResult::default()
    };
    dash.handle_message(handle.tag(BackgroundMessage::AnalysisReady(ambiguous)));

    assert!(dash.hypothesis().is_none());
    assert_eq!(dash.surface().series_count(), 0);
    let shown = toasts(&dash.drain_events());
    assert_eq!(shown.len(), 1);
    assert!(shown[0].contains("long or short"));
}

#[test]
fn test_malformed_stop_loss_only_disables_its_branch() {
    let mut dash = dashboard();
    let handle = loaded(&mut dash);
    let signal = AnalysisResult {
        stop_loss: "N/A".to_string(),
        ..long_signal()
    };
    dash.handle_message(handle.tag(BackgroundMessage::AnalysisReady(signal)));
    assert!(!dash.overlay().layers().contains(LayerName::SlLine));
    dash.drain_events();

    for (day, close) in [(10, 98.0), (11, 101.0), (12, 50.0)] {
        dash.handle_message(handle.tag(tick(day, close)));
    }
    assert!(matches!(dash.trigger_state(), Some(TriggerState::InTrade { .. })));
    assert_eq!(toasts(&dash.drain_events()).len(), 1);
}

#[test]
fn test_connection_status_tracking() {
    let mut dash = dashboard();
    let handle = loaded(&mut dash);
    dash.drain_events();

    dash.handle_message(handle.tag(BackgroundMessage::ConnectionStatus(true)));
    assert!(dash.stream_connected());
    dash.handle_message(handle.tag(BackgroundMessage::StreamError("reset".to_string())));
    assert!(!dash.stream_connected());

    let events = dash.drain_events();
    assert_eq!(
        events,
        vec![
            DashboardEvent::ConnectionChanged(true),
            DashboardEvent::ConnectionChanged(false)
        ]
    );
}

#[tokio::test]
async fn test_replay_with_heuristic_analyzer() {
    let mut candles: Vec<Candle> = (0..5)
        .map(|i| {
            let close = 98.0 + i as f64 * 0.5;
            Candle::new(i * DAY, close - 0.5, close + 0.5, close - 1.0, close, 1.0)
        })
        .collect();
    for (i, close) in [99.9, 100.5, 102.5].into_iter().enumerate() {
        candles.push(Candle::new((5 + i as i64) * DAY, close, close, close, close, 1.0));
    }

    let mut dash = dashboard();
    let summary = runner::replay(
        &mut dash,
        "BTCUSDT",
        Timeframe::Day1,
        candles,
        5,
        &HeuristicAnalyzer::new(),
    )
    .await;

    assert_eq!(summary.history, 5);
    assert_eq!(summary.ticks, 3);
    assert_eq!(
        summary.messages,
        vec![
            "BTC/USDT has crossed the Entry Price at 100.1.".to_string(),
            "BTC/USDT has reached the Take Profit level at 102.".to_string(),
        ]
    );
    assert!(dash.handle().is_none());
    assert_eq!(dash.store().notifications("local", 20).unwrap().len(), 2);
}

#[tokio::test]
async fn test_monitor_file_updates_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.json");

    let mut store = MemoryStore::new();
    store
        .save_alert(AlertRecord {
            id: 0,
            user_id: "u1".to_string(),
            symbol: "BTCUSDT".to_string(),
            entry_price: Some(100.0),
            take_profit: Some(110.0),
            stop_loss: Some(95.0),
            is_long: true,
            is_entered: false,
            is_active: true,
        })
        .unwrap();
    store.save(&path).unwrap();

    let outcome = monitor_file(&path, |symbols| async move {
        assert_eq!(symbols, vec!["BTCUSDT".to_string()]);
        Ok(HashMap::from([("BTCUSDT".to_string(), 100.5)]))
    })
    .await
    .unwrap();
    assert_eq!(outcome.entered.len(), 1);

    let reloaded = MemoryStore::load(&path).unwrap();
    assert!(reloaded.alerts()[0].is_entered);
    assert_eq!(reloaded.unread_count("u1").unwrap(), 1);
}
