use crate::callbacks::CallbackSet;
use crate::config::ConnectionConfig;
use crate::engine::{DisconnectCallback, Dispatch, ProtocolEngine};
use crate::error::{Result, YncaError};
use crate::protocol::{Command, Message, GET};
use crate::subscription::MessageReceiver;
use crate::transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncRead, AsyncWrite};

/// Callback invoked on the receive path for every incoming message
pub type MessageCallback = Arc<dyn Fn(&Message) + Send + Sync>;

/// A link to one YNCA device
///
/// Commands submitted with [`put`](Connection::put) and [`get`](Connection::get)
/// are queued and return immediately. Incoming messages fan out to every
/// registered callback and to every [`MessageReceiver`] of the current link.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use ynca::{Connection, Message};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let connection = Connection::new("socket://192.168.1.10:50000");
///     connection.register_message_callback(Arc::new(|message: &Message| {
///         println!("{:?}", message);
///     }));
///     connection.connect(None).await?;
///     connection.get("MAIN", "VOL")?;
///     connection.close().await;
///     Ok(())
/// }
/// ```
pub struct Connection {
    target: String,
    config: ConnectionConfig,
    engine: Mutex<Option<Arc<ProtocolEngine>>>,
    closed: AtomicBool,
    callbacks: Arc<CallbackSet<dyn Fn(&Message) + Send + Sync>>,
}

impl Connection {
    /// Create a connection for a serial device path or `socket://host:port`
    pub fn new(target: impl Into<String>) -> Self {
        Self::with_config(target, ConnectionConfig::default())
    }

    pub fn with_config(target: impl Into<String>, config: ConnectionConfig) -> Self {
        Self {
            target: target.into(),
            config,
            engine: Mutex::new(None),
            closed: AtomicBool::new(false),
            callbacks: Arc::new(CallbackSet::new()),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn engine_slot(&self) -> MutexGuard<'_, Option<Arc<ProtocolEngine>>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn engine(&self) -> Option<Arc<ProtocolEngine>> {
        self.engine_slot().clone()
    }

    /// Add a subscriber; registering the same `Arc` twice has no effect
    pub fn register_message_callback(&self, callback: MessageCallback) {
        self.callbacks.insert(callback);
    }

    pub fn unregister_message_callback(&self, callback: &MessageCallback) {
        self.callbacks.remove(callback);
    }

    /// Number of registered message callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Receive messages of the current link on a task of your own
    ///
    /// The receiver ends with `ConnectionClosed` when the link is closed or
    /// drops; after a reconnect, subscribe again. Without a link the
    /// receiver is already at its end.
    pub fn subscribe(&self) -> MessageReceiver {
        match self.engine().and_then(|engine| engine.subscribe()) {
            Some(rx) => MessageReceiver::new(rx),
            None => MessageReceiver::closed(),
        }
    }

    /// Open the target and start talking to the device
    ///
    /// `on_disconnect` fires if the link drops on its own, never because of
    /// [`close`](Connection::close). After such a drop `connect` may be
    /// called again on the same connection.
    pub async fn connect(&self, on_disconnect: Option<DisconnectCallback>) -> Result<()> {
        self.check_can_connect()?;
        let stream = transport::open(&self.target, &self.config).await?;
        self.connect_stream(stream, on_disconnect)
    }

    /// Start talking to the device over an already open stream
    pub fn connect_stream<S>(&self, stream: S, on_disconnect: Option<DisconnectCallback>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        self.check_can_connect()?;

        let callbacks = self.callbacks.clone();
        let dispatch: Dispatch = Arc::new(move |message: Message| {
            callbacks.for_each(|callback| callback(&message));
        });

        let engine = ProtocolEngine::open(stream, &self.config, dispatch, on_disconnect);
        *self.engine_slot() = Some(Arc::new(engine));
        Ok(())
    }

    fn check_can_connect(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(YncaError::ConnectionClosed);
        }
        if self.engine().is_some_and(|engine| engine.is_connected()) {
            return Err(YncaError::AlreadyConnected);
        }
        Ok(())
    }

    /// Tear the link down; queued commands are discarded
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let engine = self.engine_slot().take();
        if let Some(engine) = engine {
            engine.close().await;
        }
    }

    pub fn is_connected(&self) -> bool {
        self.engine().is_some_and(|engine| engine.is_connected())
    }

    /// Commands queued since the current link was opened
    pub fn commands_sent(&self) -> u64 {
        self.engine().map_or(0, |engine| engine.commands_sent())
    }

    /// Queue `@subunit:function=value`
    ///
    /// Fails with `NotConnected` when there is no open link to accept it.
    pub fn put(&self, subunit: &str, function: &str, value: &str) -> Result<()> {
        let engine = self.engine().ok_or(YncaError::NotConnected)?;
        engine.send(Command::new(subunit, function, value))
    }

    /// Queue a read request for a function
    pub fn get(&self, subunit: &str, function: &str) -> Result<()> {
        self.put(subunit, function, GET)
    }
}
