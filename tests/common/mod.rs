//! Scripted in-memory YNCA device for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, WriteHalf};
use ynca::{Connection, ConnectionConfig};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        command_spacing_ms: 10,
        initialization_timeout_ms: 500,
        close_timeout_ms: 500,
        ..ConnectionConfig::default()
    }
}

/// Replies the device sends for each received line
#[derive(Default)]
pub struct Script {
    responses: HashMap<String, Vec<String>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `@subunit:function=?` with the given reports
    pub fn on_get(mut self, subunit: &str, function: &str, replies: &[(&str, &str, &str)]) -> Self {
        let lines = replies
            .iter()
            .map(|(s, f, v)| format!("@{s}:{f}={v}"))
            .collect();
        self.responses
            .insert(format!("@{subunit}:{function}=?"), lines);
        self
    }

    /// Answer `@subunit:function=?` with a raw line such as `@UNDEFINED`
    pub fn on_get_raw(mut self, subunit: &str, function: &str, line: &str) -> Self {
        self.responses
            .insert(format!("@{subunit}:{function}=?"), vec![line.to_string()]);
        self
    }
}

/// The device end of a duplex link
pub struct MockDevice {
    received: Arc<Mutex<Vec<String>>>,
    writer: Arc<tokio::sync::Mutex<WriteHalf<DuplexStream>>>,
}

impl MockDevice {
    /// Start a device running `script` and return it with the client stream
    pub fn start(script: Script) -> (Self, DuplexStream) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let (read_half, write_half) = tokio::io::split(server);
        let received = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::new(tokio::sync::Mutex::new(write_half));

        let task_received = received.clone();
        let task_writer = writer.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim_end().to_string();
                task_received.lock().unwrap().push(line.clone());
                if let Some(replies) = script.responses.get(&line) {
                    let mut writer = task_writer.lock().await;
                    for reply in replies {
                        if writer.write_all(format!("{reply}\r\n").as_bytes()).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        (Self { received, writer }, client)
    }

    /// Connect a fresh connection to a device running `script`
    pub fn connect(script: Script) -> (Self, Arc<Connection>) {
        init_tracing();
        let (device, stream) = Self::start(script);
        let connection = Arc::new(Connection::with_config("mock", test_config()));
        connection.connect_stream(stream, None).unwrap();
        (device, connection)
    }

    /// Send an unsolicited line to the client
    pub async fn inject(&self, line: &str) {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .unwrap();
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn has_received(&self, line: &str) -> bool {
        self.received.lock().unwrap().iter().any(|l| l == line)
    }

    /// Wait until the device has received `line`
    pub async fn expect_line(&self, line: &str) {
        let found = eventually(|| self.has_received(line)).await;
        assert!(found, "device never received {line:?}, got {:?}", self.received());
    }
}

/// Poll `condition` for up to two seconds
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
