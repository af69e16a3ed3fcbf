use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use super::config::{SessionOptions, TranscriptPolicy};
use super::error::SessionError;
use super::state::ConnectionState;
use super::transcript::{append_fragment, TranscriptFragment};
use crate::audio::{AudioCapture, AudioChunk, CaptureConfig, CaptureFactory};
use crate::token::TokenProvider;
use crate::transport::{self, RecognitionEvent, WsStream};

type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Point-in-time view of the session for the control API
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Option<String>,
    pub state: ConnectionState,
    pub transcript: String,
    pub fragment_count: usize,
    pub last_error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Live transcription session manager
///
/// Owns at most one session at a time: one audio capture, one streaming
/// transport, one accumulating transcript. Connection state, transcript, and
/// last error are exposed through watch channels so callers read them
/// synchronously and get notified on change.
///
/// Each connect starts a new generation. Every asynchronous completion checks
/// that it still belongs to the current generation before touching state, so a
/// disconnect can never be undone by a stale callback.
pub struct TranscriptionSession {
    options: SessionOptions,
    tokens: Arc<dyn TokenProvider>,
    captures: Arc<dyn CaptureFactory>,
    shared: Arc<Shared>,
    active: Arc<Mutex<Option<ActiveSession>>>,
}

struct Shared {
    generation: AtomicU64,
    state_tx: watch::Sender<ConnectionState>,
    transcript_tx: watch::Sender<String>,
    error_tx: watch::Sender<Option<SessionError>>,
    fragments: StdMutex<Vec<TranscriptFragment>>,
    session_id: StdMutex<Option<String>>,
    started_at: StdMutex<Option<DateTime<Utc>>>,
}

/// Resources owned by the current generation
struct ActiveSession {
    generation: u64,
    capture: Box<dyn AudioCapture>,
    shutdown_tx: watch::Sender<bool>,
    send_task: JoinHandle<()>,
    recv_task: JoinHandle<()>,
}

impl TranscriptionSession {
    pub fn new(
        options: SessionOptions,
        tokens: Arc<dyn TokenProvider>,
        captures: Arc<dyn CaptureFactory>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Closed);
        let (transcript_tx, _) = watch::channel(String::new());
        let (error_tx, _) = watch::channel(None);

        Self {
            options,
            tokens,
            captures,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                state_tx,
                transcript_tx,
                error_tx,
                fragments: StdMutex::new(Vec::new()),
                session_id: StdMutex::new(None),
                started_at: StdMutex::new(None),
            }),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Start a new session: acquire the audio source, fetch a token, open the
    /// transport, and begin streaming
    ///
    /// Rejects with [`SessionError::AlreadyActive`] while a session is
    /// connecting, open, or closing. On every failure path the capture device
    /// is stopped before the error is surfaced.
    pub async fn connect(&self) -> Result<(), SessionError> {
        let generation = {
            let mut active = self.active.lock().await;
            if self.shared.state() != ConnectionState::Closed {
                return Err(SessionError::AlreadyActive);
            }
            *active = None;
            let generation = self.shared.next_generation();
            self.shared.begin();
            generation
        };

        info!(generation, "connecting transcription session");

        // Acquire the audio source first; no transport is opened if the
        // device is denied.
        let mut capture = match self.captures.create(&self.capture_config()) {
            Ok(capture) => capture,
            Err(e) => {
                return self
                    .fail(generation, SessionError::DeviceAccess(e.to_string()))
                    .await
            }
        };
        let audio_rx = match capture.start().await {
            Ok(rx) => rx,
            Err(e) => {
                return self
                    .fail(generation, SessionError::DeviceAccess(e.to_string()))
                    .await
            }
        };
        if !self.shared.is_current(generation) {
            return cancel(capture).await;
        }

        let token = match self.tokens.fetch_token().await {
            Ok(token) => token,
            Err(e) => {
                release(&mut capture).await;
                return self
                    .fail(generation, SessionError::Credential(e.to_string()))
                    .await;
            }
        };
        if !self.shared.is_current(generation) {
            return cancel(capture).await;
        }

        let ws = match transport::connect(&self.options.endpoint, &token).await {
            Ok(ws) => ws,
            Err(e) => {
                release(&mut capture).await;
                return self
                    .fail(generation, SessionError::Transport(e.to_string()))
                    .await;
            }
        };

        let (mut ws_tx, ws_rx) = ws.split();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut active = self.active.lock().await;
        // A disconnect may have raced the handshake; re-verify under the lock
        // before committing to Open.
        if !self.shared.is_current(generation) {
            drop(active);
            let _ = ws_tx.close().await;
            return cancel(capture).await;
        }

        self.shared.set_state(ConnectionState::Open);

        let send_task = spawn_sender(
            Arc::clone(&self.shared),
            generation,
            ws_tx,
            audio_rx,
            shutdown_rx.clone(),
        );
        let recv_task = spawn_receiver(
            Arc::clone(&self.shared),
            Arc::clone(&self.active),
            generation,
            ws_rx,
            shutdown_rx,
            self.options.policy,
        );

        *active = Some(ActiveSession {
            generation,
            capture,
            shutdown_tx,
            send_task,
            recv_task,
        });

        info!(generation, "transcription session open");

        Ok(())
    }

    /// Close the current session
    ///
    /// Idempotent and safe from any state: cancels an in-flight connect,
    /// stops the capture device, closes the transport gracefully, and clears
    /// the transcript and error fields.
    pub async fn disconnect(&self) {
        let taken = {
            let mut active = self.active.lock().await;
            if active.is_none() && self.shared.state() == ConnectionState::Closed {
                return;
            }
            // Invalidate any in-flight connect before tearing down.
            self.shared.next_generation();
            self.shared.set_state(ConnectionState::Closing);
            active.take()
        };

        if let Some(mut session) = taken {
            let _ = session.shutdown_tx.send(true);
            if let Err(e) = session.capture.stop().await {
                warn!("failed to stop audio capture: {e}");
            }
            if let Err(e) = session.send_task.await {
                warn!("audio send task panicked: {e}");
            }
            if let Err(e) = session.recv_task.await {
                warn!("recognition receive task panicked: {e}");
            }
        }

        self.shared.reset();
        self.shared.set_state(ConnectionState::Closed);

        info!("transcription session closed");
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Accumulated transcript (space-joined fragments in receipt order)
    pub fn transcript(&self) -> String {
        self.shared.transcript_tx.borrow().clone()
    }

    /// Error from the most recent failure, if any
    pub fn last_error(&self) -> Option<SessionError> {
        self.shared.error_tx.borrow().clone()
    }

    /// Subscribe to connection-state changes
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Subscribe to transcript updates
    pub fn watch_transcript(&self) -> watch::Receiver<String> {
        self.shared.transcript_tx.subscribe()
    }

    /// Subscribe to error updates
    pub fn watch_error(&self) -> watch::Receiver<Option<SessionError>> {
        self.shared.error_tx.subscribe()
    }

    /// Individual fragments with finality and confidence metadata
    pub fn fragments(&self) -> Vec<TranscriptFragment> {
        self.shared
            .fragments
            .lock()
            .map(|fragments| fragments.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self
                .shared
                .session_id
                .lock()
                .map(|id| id.clone())
                .unwrap_or_default(),
            state: self.state(),
            transcript: self.transcript(),
            fragment_count: self
                .shared
                .fragments
                .lock()
                .map(|fragments| fragments.len())
                .unwrap_or_default(),
            last_error: self.last_error().map(|e| e.to_string()),
            started_at: self
                .shared
                .started_at
                .lock()
                .map(|at| *at)
                .unwrap_or_default(),
        }
    }

    fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            sample_rate: self.options.sample_rate,
            channels: self.options.channels,
            chunk_interval: self.options.chunk_interval,
        }
    }

    /// Record a connect failure for this generation and close out
    ///
    /// Holds the active lock so a concurrent `disconnect()` cannot bump the
    /// generation between the check and the error/state writes. A stale
    /// failure never overwrites state a newer generation has cleared.
    async fn fail(&self, generation: u64, err: SessionError) -> Result<(), SessionError> {
        let _active = self.active.lock().await;
        if !self.shared.is_current(generation) {
            return Err(SessionError::Cancelled);
        }

        error!(generation, "session connect failed: {err}");
        self.shared.set_error(err.clone());
        self.shared.set_state(ConnectionState::Closed);

        Err(err)
    }
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    fn set_error(&self, err: SessionError) {
        self.error_tx.send_replace(Some(err));
    }

    /// Clear per-session fields and mark Connecting
    fn begin(&self) {
        self.reset();
        if let Ok(mut id) = self.session_id.lock() {
            *id = Some(format!("session-{}", uuid::Uuid::new_v4()));
        }
        if let Ok(mut at) = self.started_at.lock() {
            *at = Some(Utc::now());
        }
        self.state_tx.send_replace(ConnectionState::Connecting);
    }

    fn reset(&self) {
        if let Ok(mut fragments) = self.fragments.lock() {
            fragments.clear();
        }
        if let Ok(mut id) = self.session_id.lock() {
            *id = None;
        }
        if let Ok(mut at) = self.started_at.lock() {
            *at = None;
        }
        self.transcript_tx.send_replace(String::new());
        self.error_tx.send_replace(None);
    }

    /// Append a fragment, provided the session is still Open and current
    fn push_fragment(
        &self,
        generation: u64,
        text: &str,
        is_final: bool,
        confidence: Option<f32>,
    ) {
        if !self.is_current(generation) || self.state() != ConnectionState::Open {
            return;
        }

        let Ok(mut fragments) = self.fragments.lock() else {
            return;
        };
        fragments.push(TranscriptFragment {
            text: text.to_string(),
            is_final,
            confidence,
            received_at: Utc::now(),
        });
        drop(fragments);

        self.transcript_tx
            .send_modify(|transcript| append_fragment(transcript, text));
    }
}

/// Stop a capture acquired by a connect attempt that lost to a disconnect
async fn cancel(mut capture: Box<dyn AudioCapture>) -> Result<(), SessionError> {
    release(&mut capture).await;
    Err(SessionError::Cancelled)
}

async fn release(capture: &mut Box<dyn AudioCapture>) {
    if let Err(e) = capture.stop().await {
        warn!("failed to stop audio capture: {e}");
    }
}

/// Forward captured audio chunks to the transport in capture order
fn spawn_sender(
    shared: Arc<Shared>,
    generation: u64,
    mut ws_tx: WsSink,
    mut audio_rx: mpsc::Receiver<AudioChunk>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
                chunk = audio_rx.recv() => match chunk {
                    Some(chunk) if shared.is_current(generation) => {
                        if chunk.pcm.is_empty() {
                            continue;
                        }
                        if let Err(e) = ws_tx.send(Message::Binary(chunk.pcm.into())).await {
                            warn!("failed to forward audio chunk: {e}");
                            break;
                        }
                    }
                    _ => {
                        // Source drained or superseded; hold the socket open
                        // for trailing results until teardown.
                        let _ = shutdown.changed().await;
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                },
            }
        }

        let _ = ws_tx.close().await;
        debug!(generation, "audio send task stopped");
    })
}

/// Append recognition results in receipt order; handle transport close/error
fn spawn_receiver(
    shared: Arc<Shared>,
    active: Arc<Mutex<Option<ActiveSession>>>,
    generation: u64,
    mut ws_rx: WsSource,
    mut shutdown: watch::Receiver<bool>,
    policy: TranscriptPolicy,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                msg = ws_rx.next() => match msg {
                    Some(Ok(Message::Text(raw))) => {
                        let event: RecognitionEvent = match serde_json::from_str(raw.as_str()) {
                            Ok(event) => event,
                            Err(e) => {
                                warn!("unparseable recognition event: {e}");
                                continue;
                            }
                        };
                        if policy == TranscriptPolicy::FinalOnly && !event.is_final {
                            continue;
                        }
                        if let Some(text) = event.fragment() {
                            let confidence = event.confidence();
                            shared.push_fragment(generation, text, event.is_final, confidence);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "recognition transport closed by server");
                        teardown_after_transport(&shared, &active, generation, None).await;
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("recognition transport error: {e}");
                        let err = SessionError::Transport(e.to_string());
                        teardown_after_transport(&shared, &active, generation, Some(err)).await;
                        break;
                    }
                    None => {
                        teardown_after_transport(&shared, &active, generation, None).await;
                        break;
                    }
                },
            }
        }

        debug!(generation, "recognition receive task stopped");
    })
}

/// Transport-initiated teardown: release the capture and close out, but only
/// if this generation still owns the session
async fn teardown_after_transport(
    shared: &Arc<Shared>,
    active: &Arc<Mutex<Option<ActiveSession>>>,
    generation: u64,
    error: Option<SessionError>,
) {
    // Holding the lock through the state writes keeps a concurrent
    // disconnect() ordered strictly before or after this teardown.
    let mut guard = active.lock().await;
    let taken = match guard.as_ref() {
        Some(session) if session.generation == generation => guard.take(),
        _ => None,
    };

    let Some(mut session) = taken else {
        return;
    };

    let _ = session.shutdown_tx.send(true);
    if let Err(e) = session.capture.stop().await {
        warn!("failed to stop audio capture: {e}");
    }

    if let Some(err) = error {
        shared.set_error(err);
    }
    shared.set_state(ConnectionState::Closed);

    // Runs on the receive task itself: dropping the taken handles detaches
    // them rather than joining.
}
