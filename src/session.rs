//! The one-shot query burst that brings a subunit from `Created` to `Ready`.
//!
//! The device answers in order, so a GET for `SYS:VERSION` queued after the
//! real queries marks the end of the burst. The session first asks for
//! AVAIL; only an available subunit gets the full set of queries. Values
//! land in the cache through the subunit's regular message handler, the
//! session only watches for the sentinel and for error replies.

use crate::constants::{SENTINEL_FUNCTION, SUBUNIT_SYS};
use crate::connection::MessageCallback;
use crate::error::{Result, YncaError};
use crate::protocol::Message;
use crate::subunit::{Inner, AVAIL};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub(crate) struct InitializationSession<'a> {
    inner: &'a Inner,
    rx: mpsc::UnboundedReceiver<Message>,
    collector: MessageCallback,
    received: usize,
}

impl<'a> InitializationSession<'a> {
    /// Subscribe an ephemeral collector for this subunit and the sentinel
    pub(crate) fn new(inner: &'a Inner) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = inner.id.clone();
        let collector: MessageCallback = Arc::new(move |message: &Message| {
            if belongs_to_session(&id, message) {
                let _ = tx.send(message.clone());
            }
        });
        inner.connection.register_message_callback(collector.clone());

        Self {
            inner,
            rx,
            collector,
            received: 0,
        }
    }

    /// Returns whether the subunit turned out to be available
    pub(crate) async fn run(mut self) -> Result<bool> {
        let result = self.query().await;
        self.inner
            .connection
            .unregister_message_callback(&self.collector);
        result
    }

    async fn query(&mut self) -> Result<bool> {
        let id = self.inner.id.as_str();
        let connection = &self.inner.connection;

        if self.inner.kind.requires_avail {
            connection.get(id, AVAIL.name)?;
            connection.get(SUBUNIT_SYS, SENTINEL_FUNCTION)?;
            self.wait_for_sentinel().await;
            self.ensure_received()?;

            if !self.inner.is_available() {
                return Ok(false);
            }
        }

        for query in self.inner.init_queries() {
            connection.get(id, query)?;
        }
        connection.get(SUBUNIT_SYS, SENTINEL_FUNCTION)?;
        self.wait_for_sentinel().await;
        self.ensure_received()?;

        Ok(true)
    }

    fn ensure_received(&self) -> Result<()> {
        if self.received == 0 {
            return Err(YncaError::InitializationFailed(self.inner.id.clone()));
        }
        Ok(())
    }

    /// Collect messages until the sentinel arrives or the window closes
    async fn wait_for_sentinel(&mut self) {
        let timeout = self.inner.connection.config().initialization_timeout();
        let deadline = Instant::now() + timeout;

        loop {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(message)) => {
                    self.received += 1;
                    if message.is(SUBUNIT_SYS, SENTINEL_FUNCTION) {
                        return;
                    }
                    if let Some(command) = message.in_reply_to.as_ref().filter(|_| !message.is_ok()) {
                        tracing::debug!(
                            "{}: {} answered {:?}",
                            self.inner.id,
                            command.function,
                            message.status
                        );
                        self.inner.mark_unsupported(&command.function);
                    }
                }
                Ok(None) => return,
                Err(_) => {
                    tracing::warn!(
                        "{}: no end of initialization data within {:?}",
                        self.inner.id,
                        timeout
                    );
                    return;
                }
            }
        }
    }
}

fn belongs_to_session(id: &str, message: &Message) -> bool {
    message.concerns(id) || message.is(SUBUNIT_SYS, SENTINEL_FUNCTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, Status};

    #[test]
    fn session_filter() {
        assert!(belongs_to_session("MAIN", &Message::report("MAIN", "PWR", "On")));
        assert!(belongs_to_session("MAIN", &Message::report("SYS", "VERSION", "1.0")));
        assert!(!belongs_to_session("MAIN", &Message::report("ZONE2", "PWR", "On")));
        assert!(!belongs_to_session("MAIN", &Message::report("SYS", "PWR", "On")));
        assert!(belongs_to_session(
            "MAIN",
            &Message::error(Status::Undefined, Some(Command::get("MAIN", "2CHDECODER")))
        ));
        assert!(!belongs_to_session(
            "MAIN",
            &Message::error(Status::Restricted, Some(Command::get("ZONE2", "AVAIL")))
        ));
        assert!(!belongs_to_session("MAIN", &Message::error(Status::Undefined, None)));
    }
}
