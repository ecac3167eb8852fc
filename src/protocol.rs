use serde::{Deserialize, Serialize};
use std::fmt;

/// Value that turns a command into a read request
pub const GET: &str = "?";

/// Bare line the device sends for an unknown subunit or function
pub const UNDEFINED_LINE: &str = "@UNDEFINED";

/// Bare line the device sends when a function is not available right now
pub const RESTRICTED_LINE: &str = "@RESTRICTED";

/// Subunit and function of the keep-alive request
pub const KEEP_ALIVE_SUBUNIT: &str = "SYS";
pub const KEEP_ALIVE_FUNCTION: &str = "MODELNAME";

/// Classification of an incoming line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Undefined,
    Restricted,
}

/// Outgoing `@SUBUNIT:FUNCTION=VALUE` command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Command {
    pub subunit: String,
    pub function: String,
    pub value: String,
}

impl Command {
    pub fn new(
        subunit: impl Into<String>,
        function: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            subunit: subunit.into(),
            function: function.into(),
            value: value.into(),
        }
    }

    /// Read request for a function
    pub fn get(subunit: impl Into<String>, function: impl Into<String>) -> Self {
        Self::new(subunit, function, GET)
    }

    /// The request the protocol suggests for keeping the link alive
    pub fn keep_alive() -> Self {
        Self::get(KEEP_ALIVE_SUBUNIT, KEEP_ALIVE_FUNCTION)
    }

    pub fn is_get(&self) -> bool {
        self.value == GET
    }

    /// Wire form without line terminator
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}:{}={}", self.subunit, self.function, self.value)
    }
}

/// A classified incoming line
///
/// `Undefined` and `Restricted` messages have no subunit, function or value
/// on the wire. `in_reply_to` holds the last command written before the error
/// arrived so the error can be attributed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub status: Status,
    pub subunit: Option<String>,
    pub function: Option<String>,
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<Command>,
}

impl Message {
    /// An `Ok` report for the given triple
    pub fn report(
        subunit: impl Into<String>,
        function: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            status: Status::Ok,
            subunit: Some(subunit.into()),
            function: Some(function.into()),
            value: Some(value.into()),
            in_reply_to: None,
        }
    }

    /// A bare error marker
    pub fn error(status: Status, in_reply_to: Option<Command>) -> Self {
        Self {
            status,
            subunit: None,
            function: None,
            value: None,
            in_reply_to,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn subunit(&self) -> Option<&str> {
        self.subunit.as_deref()
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True if this is an `Ok` report for the given subunit and function
    pub fn is(&self, subunit: &str, function: &str) -> bool {
        self.is_ok() && self.subunit() == Some(subunit) && self.function() == Some(function)
    }

    /// Whether the message is about `subunit`: a report from it, or an error
    /// answering a command sent to it
    pub fn concerns(&self, subunit: &str) -> bool {
        if self.is_ok() {
            self.subunit() == Some(subunit)
        } else {
            self.in_reply_to
                .as_ref()
                .is_some_and(|command| command.subunit == subunit)
        }
    }
}

/// Parse one incoming line with its terminator already stripped
///
/// Returns `None` for lines that match neither an error marker nor the
/// `@SUBUNIT:FUNCTION=VALUE` shape. Subunit and function are non-empty and
/// end at the first `:` and `=` respectively; the value may be empty.
pub fn parse_line(line: &str) -> Option<Message> {
    match line {
        UNDEFINED_LINE => return Some(Message::error(Status::Undefined, None)),
        RESTRICTED_LINE => return Some(Message::error(Status::Restricted, None)),
        _ => {}
    }

    let rest = line.strip_prefix('@')?;
    let (subunit, rest) = rest.split_once(':')?;
    let (function, value) = rest.split_once('=')?;
    if subunit.is_empty() || function.is_empty() {
        return None;
    }

    Some(Message::report(subunit, function, value))
}
