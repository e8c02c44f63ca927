//! Voice-room connection hook.
//!
//! Wraps one connection to an external real-time audio service, mirrors its
//! events into a [`RoomStatus`] watch channel and a capped [`LogEntry`] ring,
//! and owns the local microphone publish state. The media transport itself is
//! injected through [`MediaConnector`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub const MAX_LOG_ENTRIES: usize = 50;

/// How long teardown waits for the service's final events before the pump is
/// aborted.
const TEARDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MediaError(pub String);

/// Connection states reported by the media service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Reconnecting,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Disconnected => "disconnected",
        })
    }
}

/// What the page shows. `Reconnecting` collapses into `Connecting`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl From<ConnectionState> for RoomStatus {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Connecting | ConnectionState::Reconnecting => RoomStatus::Connecting,
            ConnectionState::Connected => RoomStatus::Connected,
            ConnectionState::Disconnected => RoomStatus::Disconnected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    ConnectionStateChanged(ConnectionState),
    TrackSubscribed { kind: TrackKind, participant: String },
    TrackUnsubscribed { kind: TrackKind, participant: String },
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: u64,
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

/// An open room connection.
#[async_trait]
pub trait MediaConnection: Send + Sync {
    fn room_name(&self) -> String;

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), MediaError>;

    async fn disconnect(&self);
}

pub struct MediaSession {
    pub connection: Arc<dyn MediaConnection>,
    /// Room events in arrival order, including those raised while joining.
    pub events: mpsc::UnboundedReceiver<RoomEvent>,
}

#[async_trait]
pub trait MediaConnector: Send + Sync {
    async fn connect(&self, url: &str, token: &str) -> Result<MediaSession, MediaError>;
}

#[derive(Default)]
struct EventLog {
    next_id: AtomicU64,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl EventLog {
    fn push(&self, message: String, kind: LogKind) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = LogEntry {
            id,
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
            message,
            kind,
        };

        match kind {
            LogKind::Error => tracing::warn!(id, message = %entry.message, "voice room"),
            _ => tracing::debug!(id, message = %entry.message, "voice room"),
        }

        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.len() == MAX_LOG_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    fn snapshot(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

struct ActiveRoom {
    connection: Arc<dyn MediaConnection>,
    pump: JoinHandle<()>,
}

impl ActiveRoom {
    /// Disconnects, then lets the pump record the service's closing events.
    async fn close(mut self) {
        self.connection.disconnect().await;
        if tokio::time::timeout(TEARDOWN_GRACE, &mut self.pump).await.is_err() {
            tracing::debug!("event pump still running after disconnect; aborting");
            self.pump.abort();
        }
    }
}

pub struct VoiceRoom {
    connector: Arc<dyn MediaConnector>,
    status: Arc<watch::Sender<RoomStatus>>,
    log: Arc<EventLog>,
    mic_enabled: AtomicBool,
    active: tokio::sync::Mutex<Option<ActiveRoom>>,
}

impl VoiceRoom {
    pub fn new(connector: Arc<dyn MediaConnector>) -> Self {
        let (status, _) = watch::channel(RoomStatus::Disconnected);
        Self {
            connector,
            status: Arc::new(status),
            log: Arc::new(EventLog::default()),
            mic_enabled: AtomicBool::new(true),
            active: tokio::sync::Mutex::new(None),
        }
    }

    pub fn status(&self) -> RoomStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RoomStatus> {
        self.status.subscribe()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.log.snapshot()
    }

    pub fn mic_enabled(&self) -> bool {
        self.mic_enabled.load(Ordering::SeqCst)
    }

    pub fn log(&self, message: impl Into<String>, kind: LogKind) {
        self.log.push(message.into(), kind);
    }

    /// Replaces any open connection with a new one to `url`.
    pub async fn connect(&self, url: &str, token: &str) -> Result<(), MediaError> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            previous.close().await;
        }

        self.status.send_replace(RoomStatus::Connecting);
        self.log("Connecting...", LogKind::Info);

        match self.join(url, token).await {
            Ok(room) => {
                *active = Some(room);
                Ok(())
            }
            Err(e) => {
                self.log(format!("Connection failed: {e}"), LogKind::Error);
                self.status.send_replace(RoomStatus::Disconnected);
                Err(e)
            }
        }
    }

    async fn join(&self, url: &str, token: &str) -> Result<ActiveRoom, MediaError> {
        let MediaSession { connection, events } = self.connector.connect(url, token).await?;
        let pump = tokio::spawn(pump_events(events, self.status.clone(), self.log.clone()));
        let room = ActiveRoom { connection, pump };

        self.log(format!("Joined room: {}", room.connection.room_name()), LogKind::Success);

        if let Err(e) = room.connection.set_microphone_enabled(true).await {
            room.close().await;
            return Err(e);
        }
        self.mic_enabled.store(true, Ordering::SeqCst);
        self.log("Microphone published", LogKind::Success);

        Ok(room)
    }

    pub async fn disconnect(&self) {
        if let Some(room) = self.active.lock().await.take() {
            room.close().await;
        }
        self.status.send_replace(RoomStatus::Disconnected);
    }

    /// Flips the microphone. Does nothing without an open connection.
    pub async fn toggle_mic(&self) -> Result<(), MediaError> {
        let active = self.active.lock().await;
        let Some(room) = active.as_ref() else {
            return Ok(());
        };

        let next = !self.mic_enabled();
        room.connection.set_microphone_enabled(next).await?;
        self.mic_enabled.store(next, Ordering::SeqCst);
        self.log(
            if next { "Microphone enabled" } else { "Microphone muted" },
            LogKind::Info,
        );
        Ok(())
    }
}

impl Drop for VoiceRoom {
    fn drop(&mut self) {
        let Some(room) = self.active.get_mut().take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(room.close());
            }
            Err(_) => {
                room.pump.abort();
                tracing::warn!("voice room dropped outside a runtime; connection left open");
            }
        }
    }
}

async fn pump_events(
    mut events: mpsc::UnboundedReceiver<RoomEvent>,
    status: Arc<watch::Sender<RoomStatus>>,
    log: Arc<EventLog>,
) {
    while let Some(event) = events.recv().await {
        match event {
            RoomEvent::ConnectionStateChanged(state) => {
                let mapped = RoomStatus::from(state);
                let kind = if mapped == RoomStatus::Connected {
                    LogKind::Success
                } else {
                    LogKind::Info
                };
                log.push(format!("Connection state: {state}"), kind);
                status.send_replace(mapped);
            }
            RoomEvent::TrackSubscribed { kind: TrackKind::Audio, participant } => {
                log.push(format!("Subscribed to audio from {participant}"), LogKind::Success);
            }
            RoomEvent::TrackSubscribed { .. } => {}
            RoomEvent::TrackUnsubscribed { kind, participant } => {
                tracing::debug!(?kind, participant = %participant, "track unsubscribed");
            }
            RoomEvent::Disconnected => {
                log.push("Disconnected from room".into(), LogKind::Info);
                status.send_replace(RoomStatus::Disconnected);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeConnection {
        mic_calls: Mutex<Vec<bool>>,
        disconnected: AtomicBool,
        fail_mic: bool,
        events: Mutex<Option<mpsc::UnboundedSender<RoomEvent>>>,
    }

    #[async_trait]
    impl MediaConnection for FakeConnection {
        fn room_name(&self) -> String {
            "voice-room".into()
        }

        async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), MediaError> {
            if self.fail_mic {
                return Err(MediaError("permission denied".into()));
            }
            self.mic_calls.lock().unwrap().push(enabled);
            Ok(())
        }

        /// Like the real service: report the disconnect, then close the stream.
        async fn disconnect(&self) {
            self.disconnected.store(true, Ordering::SeqCst);
            if let Some(tx) = self.events.lock().unwrap().take() {
                let _ = tx.send(RoomEvent::Disconnected);
            }
        }
    }

    #[derive(Default)]
    struct FakeConnector {
        fail: Option<String>,
        fail_mic: bool,
        opened: Mutex<Vec<Arc<FakeConnection>>>,
    }

    impl FakeConnector {
        fn last(&self) -> Arc<FakeConnection> {
            self.opened.lock().unwrap().last().cloned().unwrap()
        }

        fn emit(&self, event: RoomEvent) {
            let connection = self.last();
            let events = connection.events.lock().unwrap();
            events.as_ref().unwrap().send(event).unwrap();
        }
    }

    #[async_trait]
    impl MediaConnector for FakeConnector {
        async fn connect(&self, _url: &str, _token: &str) -> Result<MediaSession, MediaError> {
            if let Some(msg) = &self.fail {
                return Err(MediaError(msg.clone()));
            }
            let (tx, rx) = mpsc::unbounded_channel();
            let connection = Arc::new(FakeConnection {
                fail_mic: self.fail_mic,
                events: Mutex::new(Some(tx)),
                ..Default::default()
            });
            self.opened.lock().unwrap().push(connection.clone());
            Ok(MediaSession { connection, events: rx })
        }
    }

    fn messages(room: &VoiceRoom) -> Vec<String> {
        room.logs().into_iter().map(|e| e.message).collect()
    }

    async fn wait_for(rx: &mut watch::Receiver<RoomStatus>, want: RoomStatus) {
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| *s == want))
            .await
            .expect("status change timed out")
            .unwrap();
    }

    #[tokio::test]
    async fn connect_joins_and_publishes_microphone() {
        let connector = Arc::new(FakeConnector::default());
        let room = VoiceRoom::new(connector.clone());

        room.connect("wss://voice.example.com", "jwt").await.unwrap();

        assert_eq!(
            messages(&room),
            vec!["Connecting...", "Joined room: voice-room", "Microphone published"]
        );
        assert!(room.mic_enabled());
        assert_eq!(*connector.last().mic_calls.lock().unwrap(), vec![true]);
        assert_eq!(room.status(), RoomStatus::Connecting);
    }

    #[tokio::test]
    async fn events_drive_status_and_log() {
        let connector = Arc::new(FakeConnector::default());
        let room = VoiceRoom::new(connector.clone());
        let mut rx = room.subscribe_status();
        room.connect("wss://x", "t").await.unwrap();

        connector.emit(RoomEvent::ConnectionStateChanged(ConnectionState::Connected));
        wait_for(&mut rx, RoomStatus::Connected).await;

        connector.emit(RoomEvent::ConnectionStateChanged(ConnectionState::Reconnecting));
        wait_for(&mut rx, RoomStatus::Connecting).await;

        connector.emit(RoomEvent::TrackSubscribed {
            kind: TrackKind::Audio,
            participant: "agent-7".into(),
        });
        connector.emit(RoomEvent::TrackSubscribed {
            kind: TrackKind::Video,
            participant: "agent-7".into(),
        });
        connector.emit(RoomEvent::Disconnected);
        wait_for(&mut rx, RoomStatus::Disconnected).await;

        let logs = room.logs();
        let tail: Vec<_> = logs[3..].iter().map(|e| (e.message.as_str(), e.kind)).collect();
        assert_eq!(
            tail,
            vec![
                ("Connection state: connected", LogKind::Success),
                ("Connection state: reconnecting", LogKind::Info),
                ("Subscribed to audio from agent-7", LogKind::Success),
                ("Disconnected from room", LogKind::Info),
            ]
        );
    }

    #[tokio::test]
    async fn failed_connect_logs_error_and_stays_disconnected() {
        let connector = Arc::new(FakeConnector {
            fail: Some("bad token".into()),
            ..Default::default()
        });
        let room = VoiceRoom::new(connector);

        let err = room.connect("wss://x", "t").await.unwrap_err();
        assert_eq!(err, MediaError("bad token".into()));

        let last = room.logs().pop().unwrap();
        assert_eq!(last.message, "Connection failed: bad token");
        assert_eq!(last.kind, LogKind::Error);
        assert_eq!(room.status(), RoomStatus::Disconnected);

        // No connection, so the mic toggle is a no-op.
        room.toggle_mic().await.unwrap();
        assert!(room.mic_enabled());
    }

    #[tokio::test]
    async fn failed_mic_publish_drops_connection() {
        let connector = Arc::new(FakeConnector { fail_mic: true, ..Default::default() });
        let room = VoiceRoom::new(connector.clone());

        room.connect("wss://x", "t").await.unwrap_err();

        assert!(connector.last().disconnected.load(Ordering::SeqCst));
        assert_eq!(room.status(), RoomStatus::Disconnected);
        assert_eq!(
            messages(&room).last().map(String::as_str),
            Some("Connection failed: permission denied")
        );
    }

    #[tokio::test]
    async fn toggle_mic_flips_and_logs() {
        let connector = Arc::new(FakeConnector::default());
        let room = VoiceRoom::new(connector.clone());
        room.connect("wss://x", "t").await.unwrap();

        room.toggle_mic().await.unwrap();
        assert!(!room.mic_enabled());
        room.toggle_mic().await.unwrap();
        assert!(room.mic_enabled());

        assert_eq!(*connector.last().mic_calls.lock().unwrap(), vec![true, false, true]);
        let logs = messages(&room);
        assert_eq!(&logs[logs.len() - 2..], ["Microphone muted", "Microphone enabled"]);
    }

    #[tokio::test]
    async fn reconnect_closes_previous_connection() {
        let connector = Arc::new(FakeConnector::default());
        let room = VoiceRoom::new(connector.clone());

        room.connect("wss://x", "a").await.unwrap();
        let first = connector.last();
        room.connect("wss://x", "b").await.unwrap();

        assert!(first.disconnected.load(Ordering::SeqCst));
        assert!(!connector.last().disconnected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn disconnect_closes_and_resets_status() {
        let connector = Arc::new(FakeConnector::default());
        let room = VoiceRoom::new(connector.clone());
        room.connect("wss://x", "t").await.unwrap();

        room.disconnect().await;

        assert!(connector.last().disconnected.load(Ordering::SeqCst));
        assert_eq!(room.status(), RoomStatus::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_records_the_services_final_event() {
        let connector = Arc::new(FakeConnector::default());
        let room = VoiceRoom::new(connector.clone());
        room.connect("wss://x", "t").await.unwrap();

        room.disconnect().await;

        assert_eq!(
            messages(&room),
            vec![
                "Connecting...",
                "Joined room: voice-room",
                "Microphone published",
                "Disconnected from room",
            ]
        );
    }

    #[tokio::test]
    async fn silent_service_does_not_stall_disconnect() {
        let connector = Arc::new(FakeConnector::default());
        let room = VoiceRoom::new(connector.clone());
        room.connect("wss://x", "t").await.unwrap();
        // Keep the stream open and never report the disconnect.
        let _held = connector.last().events.lock().unwrap().take();

        tokio::time::timeout(TEARDOWN_GRACE * 4, room.disconnect())
            .await
            .expect("disconnect should give up on a silent service");

        assert_eq!(room.status(), RoomStatus::Disconnected);
        assert_eq!(messages(&room).last().map(String::as_str), Some("Microphone published"));
    }

    #[tokio::test]
    async fn drop_closes_active_connection() {
        let connector = Arc::new(FakeConnector::default());
        let room = VoiceRoom::new(connector.clone());
        room.connect("wss://x", "t").await.unwrap();
        let conn = connector.last();

        drop(room);
        for _ in 0..10 {
            if conn.disconnected.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(conn.disconnected.load(Ordering::SeqCst));
    }

    #[test]
    fn log_keeps_last_fifty_entries() {
        let room = VoiceRoom::new(Arc::new(FakeConnector::default()));
        for i in 0..60 {
            room.log(format!("entry {i}"), LogKind::Info);
        }

        let logs = room.logs();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].id, 11);
        assert_eq!(logs[0].message, "entry 10");
        assert_eq!(logs[49].id, 60);
        assert!(logs.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(logs[0].time.len(), 8);
    }

    #[test]
    fn reconnecting_maps_to_connecting() {
        assert_eq!(RoomStatus::from(ConnectionState::Reconnecting), RoomStatus::Connecting);
        assert_eq!(RoomStatus::from(ConnectionState::Connected), RoomStatus::Connected);
    }
}
