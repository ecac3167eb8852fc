//! Protocol engine: owns one link, paces outgoing commands and classifies
//! incoming lines.
//!
//! Two tasks run per open link. The sender task owns the outgoing queue and
//! the write half; it writes one line at a time, sleeps the command spacing
//! after each and sends a keep-alive request after a quiet keep-alive
//! interval. The reader task owns the read half and hands every classified
//! line to a single dispatch callback and to the link's broadcast channel.

use crate::config::ConnectionConfig;
use crate::error::{Result, YncaError};
use crate::protocol::{self, Command, Message, KEEP_ALIVE_FUNCTION, KEEP_ALIVE_SUBUNIT};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Messages a slow subscriber may fall behind by before it skips ahead
const SUBSCRIPTION_CAPACITY: usize = 256;

/// Longer lines are dropped; real YNCA lines are well under 200 bytes
pub(crate) const MAX_LINE_LEN: usize = 1024;

/// Receives every message the engine does not drop or swallow
pub(crate) type Dispatch = Arc<dyn Fn(Message) + Send + Sync>;

/// Called once when the link goes away without `close` being called
pub type DisconnectCallback = Arc<dyn Fn() + Send + Sync>;

/// Entries of the outgoing queue
#[derive(Debug)]
enum Entry {
    Command(Command),
    KeepAlive,
    Exit,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the engine handle and its two tasks
struct Shared {
    tx: mpsc::UnboundedSender<Entry>,
    cancel: CancellationToken,
    connected: AtomicBool,
    closing: AtomicBool,
    keep_alive_pending: AtomicBool,
    last_sent: Mutex<Option<Command>>,
    commands_sent: AtomicU64,
    on_disconnect: Mutex<Option<DisconnectCallback>>,
    /// Taken on shutdown so receivers see the end of the link
    subscription: Mutex<Option<broadcast::Sender<Message>>>,
}

impl Shared {
    fn new(tx: mpsc::UnboundedSender<Entry>, on_disconnect: Option<DisconnectCallback>) -> Self {
        Self {
            tx,
            cancel: CancellationToken::new(),
            connected: AtomicBool::new(true),
            closing: AtomicBool::new(false),
            keep_alive_pending: AtomicBool::new(false),
            last_sent: Mutex::new(None),
            commands_sent: AtomicU64::new(0),
            on_disconnect: Mutex::new(on_disconnect),
            subscription: Mutex::new(Some(broadcast::channel(SUBSCRIPTION_CAPACITY).0)),
        }
    }

    /// Classify one line with its terminator stripped
    fn handle_line(&self, line: &str) -> Option<Message> {
        tracing::debug!("< {}", line);

        // Whatever arrives next answers (or abandons) an outstanding keep-alive
        let keep_alive_pending = self.keep_alive_pending.swap(false, Ordering::SeqCst);

        let Some(mut message) = protocol::parse_line(line) else {
            tracing::debug!("Dropping unrecognized line {:?}", line);
            return None;
        };

        if !message.is_ok() {
            message.in_reply_to = lock(&self.last_sent).clone();
            return Some(message);
        }

        if keep_alive_pending && message.is(KEEP_ALIVE_SUBUNIT, KEEP_ALIVE_FUNCTION) {
            tracing::trace!("Swallowing keep-alive response");
            return None;
        }

        Some(message)
    }

    fn publish(&self, message: &Message) {
        if let Some(tx) = lock(&self.subscription).as_ref() {
            if tx.receiver_count() > 0 {
                let _ = tx.send(message.clone());
            }
        }
    }

    /// Stop both tasks and drop whatever is still queued
    fn shutdown(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.closing.store(true, Ordering::SeqCst);
        lock(&self.subscription).take();
        let _ = self.tx.send(Entry::Exit);
        self.cancel.cancel();
    }

    /// The link went away underneath us
    fn connection_lost(&self) {
        if !self.connected.load(Ordering::SeqCst) {
            return;
        }
        tracing::info!("Connection lost");
        self.shutdown();
        let callback = lock(&self.on_disconnect).take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

/// Handle to an open link
pub(crate) struct ProtocolEngine {
    shared: Arc<Shared>,
    sender: Mutex<Option<JoinHandle<()>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
    close_timeout: Duration,
}

impl ProtocolEngine {
    /// Start the sender and reader tasks on a stream
    ///
    /// Two keep-alive requests are queued right away: a sleeping device loses
    /// the first command it receives, the second is the one that counts.
    pub(crate) fn open<S>(
        stream: S,
        config: &ConnectionConfig,
        dispatch: Dispatch,
        on_disconnect: Option<DisconnectCallback>,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::new(tx, on_disconnect));

        let sender = tokio::spawn(run_sender(
            write_half,
            rx,
            shared.clone(),
            config.command_spacing(),
            config.keep_alive_interval(),
        ));
        let reader = tokio::spawn(run_reader(BufReader::new(read_half), shared.clone(), dispatch));

        tracing::info!("Connected");

        let _ = shared.tx.send(Entry::KeepAlive);
        let _ = shared.tx.send(Entry::KeepAlive);

        Self {
            shared,
            sender: Mutex::new(Some(sender)),
            reader: Mutex::new(Some(reader)),
            close_timeout: config.close_timeout(),
        }
    }

    /// Queue a command for the wire
    pub(crate) fn send(&self, command: Command) -> Result<()> {
        if !self.is_connected() {
            return Err(YncaError::NotConnected);
        }
        self.shared
            .tx
            .send(Entry::Command(command))
            .map_err(|_| YncaError::NotConnected)?;
        self.shared.commands_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    pub(crate) fn commands_sent(&self) -> u64 {
        self.shared.commands_sent.load(Ordering::SeqCst)
    }

    /// A receiver for this link, `None` once it has shut down
    pub(crate) fn subscribe(&self) -> Option<broadcast::Receiver<Message>> {
        lock(&self.shared.subscription).as_ref().map(broadcast::Sender::subscribe)
    }

    /// Disarm the disconnect notification, purge the queue and join both tasks
    pub(crate) async fn close(&self) {
        lock(&self.shared.on_disconnect).take();
        self.shared.shutdown();

        let handles = [lock(&self.sender).take(), lock(&self.reader).take()];
        for mut handle in handles.into_iter().flatten() {
            if tokio::time::timeout(self.close_timeout, &mut handle)
                .await
                .is_err()
            {
                tracing::warn!("Engine task did not stop within {:?}, aborting", self.close_timeout);
                handle.abort();
            }
        }
        tracing::info!("Closed");
    }
}

impl Drop for ProtocolEngine {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}

async fn run_sender<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Entry>,
    shared: Arc<Shared>,
    spacing: Duration,
    keep_alive_interval: Duration,
) {
    loop {
        let entry = match tokio::time::timeout(keep_alive_interval, rx.recv()).await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            // Keep the device from dropping into standby
            Err(_) => Entry::KeepAlive,
        };

        let command = match entry {
            Entry::Exit => break,
            Entry::KeepAlive | Entry::Command(_) if shared.closing.load(Ordering::SeqCst) => {
                continue
            }
            Entry::KeepAlive => {
                shared.keep_alive_pending.store(true, Ordering::SeqCst);
                Command::keep_alive()
            }
            Entry::Command(command) => command,
        };

        let line = command.to_line();
        tracing::debug!("> {}", line);
        *lock(&shared.last_sent) = Some(command);

        if let Err(e) = write_line(&mut writer, &line).await {
            tracing::warn!("Failed to write {}: {}", line, e);
            shared.connection_lost();
            break;
        }

        tokio::time::sleep(spacing).await;
    }
    tracing::debug!("Sender stopped");
}

async fn run_reader<R: AsyncRead + Unpin>(
    mut reader: BufReader<R>,
    shared: Arc<Shared>,
    dispatch: Dispatch,
) {
    let mut buf = Vec::new();
    // Inside an overlong line, skipping to its end
    let mut discarding = false;
    loop {
        buf.clear();
        let mut limited = (&mut reader).take(MAX_LINE_LEN as u64);
        let read = tokio::select! {
            _ = shared.cancel.cancelled() => {
                tracing::debug!("Reader stopped");
                return;
            }
            read = limited.read_until(b'\n', &mut buf) => read,
        };

        match read {
            Ok(0) => {
                tracing::debug!("Link closed by device");
                break;
            }
            Ok(_) => {
                let complete = buf.last() == Some(&b'\n');
                if discarding {
                    discarding = !complete;
                    continue;
                }
                if !complete && buf.len() >= MAX_LINE_LEN {
                    tracing::debug!("Dropping line longer than {} bytes", MAX_LINE_LEN);
                    discarding = true;
                    continue;
                }

                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                if let Some(message) = shared.handle_line(line) {
                    shared.publish(&message);
                    dispatch(message);
                }
            }
            Err(e) => {
                tracing::warn!("Read error: {}", e);
                break;
            }
        }
    }
    shared.connection_lost();
}
