use crate::error::{Result, YncaError};
use crate::protocol::Message;
use tokio::sync::broadcast;

/// Messages of one link, picked up on a task of the consumer's choosing
///
/// Obtained from [`Connection::subscribe`](crate::Connection::subscribe).
/// The stream ends with [`YncaError::ConnectionClosed`] once the link it
/// was taken from is closed or lost. A receiver that falls too far behind
/// skips the oldest messages and keeps going; [`missed`](Self::missed)
/// tells how many.
#[derive(Debug)]
pub struct MessageReceiver {
    rx: Option<broadcast::Receiver<Message>>,
    subunit: Option<String>,
    missed: u64,
}

impl MessageReceiver {
    pub(crate) fn new(rx: broadcast::Receiver<Message>) -> Self {
        Self {
            rx: Some(rx),
            subunit: None,
            missed: 0,
        }
    }

    /// A receiver for a link that is already gone
    pub(crate) fn closed() -> Self {
        Self {
            rx: None,
            subunit: None,
            missed: 0,
        }
    }

    /// Only pass messages from `subunit`, and errors answering commands sent to it
    pub fn only_subunit(mut self, subunit: impl Into<String>) -> Self {
        self.subunit = Some(subunit.into());
        self
    }

    /// Messages skipped because this receiver fell behind
    pub fn missed(&self) -> u64 {
        self.missed
    }

    fn wanted(&self, message: &Message) -> bool {
        self.subunit
            .as_deref()
            .map_or(true, |subunit| message.concerns(subunit))
    }

    fn skipped(&mut self, count: u64) {
        tracing::warn!("Receiver fell behind, {} messages skipped", count);
        self.missed += count;
    }

    /// Wait for the next message
    pub async fn recv(&mut self) -> Result<Message> {
        loop {
            let rx = self.rx.as_mut().ok_or(YncaError::ConnectionClosed)?;
            match rx.recv().await {
                Ok(message) if self.wanted(&message) => return Ok(message),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(count)) => self.skipped(count),
                Err(broadcast::error::RecvError::Closed) => {
                    self.rx = None;
                    return Err(YncaError::ConnectionClosed);
                }
            }
        }
    }

    /// Take a message that is already queued
    ///
    /// `Ok(None)` means nothing is waiting right now while the link is
    /// still up.
    pub fn try_recv(&mut self) -> Result<Option<Message>> {
        loop {
            let rx = self.rx.as_mut().ok_or(YncaError::ConnectionClosed)?;
            match rx.try_recv() {
                Ok(message) if self.wanted(&message) => return Ok(Some(message)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(count)) => self.skipped(count),
                Err(broadcast::error::TryRecvError::Closed) => {
                    self.rx = None;
                    return Err(YncaError::ConnectionClosed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{parse_line, Command};

    fn message(line: &str) -> Message {
        parse_line(line).unwrap()
    }

    #[test]
    fn nothing_queued() {
        let (tx, rx) = broadcast::channel(4);
        let mut receiver = MessageReceiver::new(rx);
        assert!(receiver.try_recv().unwrap().is_none());

        tx.send(message("@MAIN:PWR=On")).unwrap();
        let received = receiver.try_recv().unwrap().unwrap();
        assert!(received.is("MAIN", "PWR"));
        assert!(receiver.try_recv().unwrap().is_none());
    }

    #[test]
    fn filter_keeps_one_subunit() {
        let (tx, rx) = broadcast::channel(8);
        let mut receiver = MessageReceiver::new(rx).only_subunit("ZONE2");

        tx.send(message("@MAIN:PWR=On")).unwrap();
        tx.send(message("@ZONE2:VOL=-40.0")).unwrap();
        let mut error = message("@UNDEFINED");
        error.in_reply_to = Some(Command::get("ZONE2", "ZONENAME"));
        tx.send(error).unwrap();
        let mut foreign = message("@RESTRICTED");
        foreign.in_reply_to = Some(Command::get("MAIN", "ZONENAME"));
        tx.send(foreign).unwrap();

        assert!(receiver.try_recv().unwrap().unwrap().is("ZONE2", "VOL"));
        let error = receiver.try_recv().unwrap().unwrap();
        assert!(!error.is_ok());
        assert!(receiver.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn slow_receiver_skips_ahead() {
        let (tx, rx) = broadcast::channel(2);
        let mut receiver = MessageReceiver::new(rx);
        for volume in ["-1.0", "-2.0", "-3.0", "-4.0", "-5.0"] {
            tx.send(message(&format!("@MAIN:VOL={volume}"))).unwrap();
        }

        let next = receiver.recv().await.unwrap();
        assert_eq!(next.value(), Some("-4.0"));
        assert_eq!(receiver.missed(), 3);
        assert_eq!(receiver.try_recv().unwrap().unwrap().value(), Some("-5.0"));
    }

    #[tokio::test]
    async fn queued_messages_outlive_the_sender() {
        let (tx, rx) = broadcast::channel(4);
        let mut receiver = MessageReceiver::new(rx);
        tx.send(message("@SYS:PWR=Standby")).unwrap();
        drop(tx);

        assert!(receiver.recv().await.unwrap().is("SYS", "PWR"));
        assert!(matches!(receiver.recv().await, Err(YncaError::ConnectionClosed)));
        assert!(matches!(receiver.try_recv(), Err(YncaError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn closed_receiver_ends_at_once() {
        let mut receiver = MessageReceiver::closed();
        assert!(matches!(receiver.recv().await, Err(YncaError::ConnectionClosed)));
        assert!(matches!(receiver.try_recv(), Err(YncaError::ConnectionClosed)));
    }
}
