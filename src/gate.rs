use std::fmt;

use serde_json::{Map, Value};

use crate::logging::{Boundary, BoundaryLog};
use crate::tainted::Tainted;

/// Which key carried the command tag of an envelope message.
///
/// Two historical shapes exist and both stay supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
    /// `{"type": "...", ...}`
    Type,
    /// `{"message": "...", ...}`
    Message,
}

/// A message that passed the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A bare command string, e.g. `"ClearAllData"`.
    Bare(String),
    /// An object carrying a command tag and an optional `data` payload.
    Envelope {
        /// Key the tag was found under.
        key: TagKey,
        /// The command tag.
        tag: String,
        /// The `data` field, or `Null` if absent.
        payload: Value,
    },
}

/// Commands this crate knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Wipe all stored activity.
    ClearAllData,
    /// Replace all stored activity with the attached records.
    Restore,
}

impl Command {
    /// Maps a command tag to a command.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ClearAllData" => Some(Command::ClearAllData),
            "Restore" => Some(Command::Restore),
            _ => None,
        }
    }

    /// Returns the wire tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Command::ClearAllData => "ClearAllData",
            Command::Restore => "Restore",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl Message {
    /// Decodes a raw message into one of the two accepted shapes.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] reason for anything else.
    pub fn decode(raw: Value) -> Result<Self, Rejection> {
        match raw {
            Value::String(tag) if !tag.is_empty() => Ok(Message::Bare(tag)),
            Value::String(_) => Err(Rejection::EmptyTag),
            Value::Object(mut fields) => {
                let (key, tag) = match envelope_tag(&fields) {
                    Some((key, tag)) => (key, tag.to_string()),
                    None => return Err(Rejection::MissingTag),
                };
                let payload = fields.remove("data").unwrap_or(Value::Null);
                Ok(Message::Envelope { key, tag, payload })
            }
            Value::Null => Err(Rejection::Null),
            Value::Bool(_) | Value::Number(_) | Value::Array(_) => Err(Rejection::WrongType),
        }
    }

    /// Returns the command tag.
    pub fn tag(&self) -> &str {
        match self {
            Message::Bare(tag) => tag,
            Message::Envelope { tag, .. } => tag,
        }
    }

    /// Returns the command this message requests, if it is one we route.
    pub fn command(&self) -> Option<Command> {
        Command::from_tag(self.tag())
    }

    /// Consumes the message and returns its payload (`Null` for bare commands).
    pub fn into_payload(self) -> Value {
        match self {
            Message::Bare(_) => Value::Null,
            Message::Envelope { payload, .. } => payload,
        }
    }
}

/// Why the gate turned a message away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The message was `null`.
    Null,
    /// The message was neither a string nor an object.
    WrongType,
    /// A bare command string was empty.
    EmptyTag,
    /// An object carried no non-empty `type` or `message` string.
    MissingTag,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Null => write!(f, "null message"),
            Rejection::WrongType => write!(f, "message is neither string nor object"),
            Rejection::EmptyTag => write!(f, "empty command"),
            Rejection::MissingTag => write!(f, "missing command tag"),
        }
    }
}

/// Shape check for inter-process messages.
///
/// The gate only checks shape. Payloads are sanitized by whatever handler
/// consumes them.
///
/// # Examples
///
/// ```
/// use activity_guard::{Command, MessageGate, Tainted};
/// use serde_json::json;
///
/// let gate = MessageGate::new();
///
/// let msg = gate.admit(Tainted::new(json!("ClearAllData"))).expect("valid");
/// assert_eq!(msg.command(), Some(Command::ClearAllData));
///
/// assert!(gate.admit(Tainted::new(json!({}))).is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MessageGate {
    log: BoundaryLog,
}

impl Default for MessageGate {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageGate {
    /// Creates a gate.
    pub fn new() -> Self {
        Self {
            log: BoundaryLog::new(Boundary::Message),
        }
    }

    /// Decodes `raw`, or logs the rejection and returns `None`.
    pub fn admit(&self, raw: Tainted<Value>) -> Option<Message> {
        match Message::decode(raw.into_inner()) {
            Ok(message) => {
                match message.command() {
                    Some(command) => self.log.debug(format_args!("admitted {}", command)),
                    None => self.log.debug(format_args!(
                        "admitted unrouted tag of {} bytes",
                        message.tag().len()
                    )),
                }
                Some(message)
            }
            Err(reason) => {
                self.log.rejected(reason);
                None
            }
        }
    }
}

/// Returns `true` if `message` is safe to dispatch to a handler.
///
/// ```
/// use activity_guard::is_valid_message;
/// use serde_json::json;
///
/// assert!(is_valid_message(&json!("ClearAllData")));
/// assert!(is_valid_message(&json!({"type": "Restore", "data": []})));
/// assert!(!is_valid_message(&json!(null)));
/// assert!(!is_valid_message(&json!(42)));
/// assert!(!is_valid_message(&json!({})));
/// ```
pub fn is_valid_message(message: &Value) -> bool {
    match message {
        Value::String(tag) => !tag.is_empty(),
        Value::Object(fields) => envelope_tag(fields).is_some(),
        _ => false,
    }
}

fn envelope_tag(fields: &Map<String, Value>) -> Option<(TagKey, &str)> {
    non_empty_string(fields, "type")
        .map(|tag| (TagKey::Type, tag))
        .or_else(|| non_empty_string(fields, "message").map(|tag| (TagKey::Message, tag)))
}

fn non_empty_string<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    match fields.get(key) {
        Some(Value::String(tag)) if !tag.is_empty() => Some(tag.as_str()),
        _ => None,
    }
}
