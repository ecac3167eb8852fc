//! Byte stream the protocol engine reads lines from and writes lines to.
//!
//! Targets use the serial URL convention: `socket://host:port` is a TCP
//! link (receivers listen on port 50000), anything else is a serial device
//! such as `/dev/ttyUSB0` or `COM3`.

use crate::config::ConnectionConfig;
use crate::error::{Result, YncaError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_serial::SerialPortBuilderExt;

const SOCKET_SCHEME: &str = "socket://";

/// A duplex byte stream usable as a YNCA link
pub trait LineStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> LineStream for T {}

pub type BoxedStream = Box<dyn LineStream>;

/// Where a link goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Socket(String),
    Serial(String),
}

impl Target {
    pub fn parse(target: &str) -> Self {
        match target.strip_prefix(SOCKET_SCHEME) {
            Some(addr) => Self::Socket(addr.to_string()),
            None => Self::Serial(target.to_string()),
        }
    }
}

/// Open the stream for a target string
pub async fn open(target: &str, config: &ConnectionConfig) -> Result<BoxedStream> {
    let failed = |source: std::io::Error| YncaError::ConnectionFailed {
        target: target.to_string(),
        source,
    };

    match Target::parse(target) {
        Target::Socket(addr) => {
            tracing::info!("Connecting to {}", addr);
            let stream = tokio::time::timeout(config.connect_timeout(), TcpStream::connect(&addr))
                .await
                .map_err(|_| {
                    failed(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "connect timed out",
                    ))
                })?
                .map_err(failed)?;
            // Commands are tiny and spaced, don't let Nagle hold them back
            stream.set_nodelay(true).map_err(failed)?;
            Ok(Box::new(stream))
        }
        Target::Serial(path) => {
            tracing::info!("Opening serial port {} at {} baud", path, config.baud_rate);
            let port = tokio_serial::new(&path, config.baud_rate)
                .data_bits(tokio_serial::DataBits::Eight)
                .stop_bits(tokio_serial::StopBits::One)
                .parity(tokio_serial::Parity::None)
                .flow_control(tokio_serial::FlowControl::None)
                .open_native_async()
                .map_err(|e| failed(e.into()))?;
            Ok(Box::new(port))
        }
    }
}
