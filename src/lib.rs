//! Rust client for the YNCA control protocol of Yamaha AV receivers
//!
//! YNCA is a line-based text protocol spoken over a serial port or a TCP
//! socket (usually port 50000). This library provides an async API to:
//!
//! - Connect over serial or `socket://host:port`
//! - Pace commands and keep the link alive
//! - Receive reports through callbacks or a subscription channel
//! - Initialize subunits (SYS, MAIN, ZONE2..4) and read cached values
//! - Change values with validation before anything is sent
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ynca::{Connection, Pwr, System, Zone};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = Arc::new(Connection::new("socket://192.168.1.10:50000"));
//!     connection.connect(None).await?;
//!
//!     let sys = System::new(connection.clone());
//!     sys.initialize().await?;
//!     println!("Model: {:?}", sys.modelname());
//!
//!     let main_zone = Zone::main(connection.clone());
//!     main_zone.initialize().await?;
//!     println!("Volume: {:?} dB", main_zone.vol());
//!
//!     main_zone
//!         .subunit()
//!         .register_update_callback(Arc::new(|| println!("MAIN changed")));
//!     main_zone.set_pwr(Pwr::On)?;
//!     main_zone.vol_up(Some(2))?;
//!
//!     connection.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Transport**: opens the serial port or TCP socket
//! - **Engine**: paced sender and line reader for one open link
//! - **Connection**: public handle, message fan-out and subscriptions
//! - **Function**: declarative descriptions of subunit functions
//! - **Subunit**: value cache and initialization built on the descriptors
//! - **Zone / System**: the concrete subunits

mod callbacks;
mod config;
mod connection;
pub mod constants;
pub mod converters;
mod engine;
mod error;
pub mod function;
mod protocol;
mod session;
mod subscription;
mod subunit;
pub mod system;
mod transport;
pub mod zone;

// Public exports
pub use config::ConnectionConfig;
pub use connection::{Connection, MessageCallback};
pub use constants::{
    Avail, InitVolLvl, Input, Mute, PureDirMode, Pwr, Sleep, SoundPrg, Straight, TwoChDecoder,
};
pub use converters::Either;
pub use engine::DisconnectCallback;
pub use error::{Result, YncaError};
pub use protocol::{parse_line, Command, Message, Status};
pub use subscription::MessageReceiver;
pub use subunit::{Phase, Subunit, SubunitKind, UpdateCallback, AVAIL};
pub use system::System;
pub use transport::Target;
pub use zone::Zone;
