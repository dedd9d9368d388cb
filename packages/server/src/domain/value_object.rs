//! Value objects of the relay domain.
//!
//! Every identifier and user-supplied string is validated once, at the
//! boundary, and carried as a typed value afterwards.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_ID_LENGTH: usize = 128;
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_ROOM_NAME_LENGTH: usize = 100;
const MAX_MESSAGE_LENGTH: usize = 4000;

/// Display name used when a room is created without one.
pub const DEFAULT_ROOM_NAME: &str = "Chat Rahasia";
/// Attribution for participants that did not pick a name.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";
/// Attribution for a room's initial message.
pub const HOST_USERNAME: &str = "Host";

fn validate_id(field: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    let len = value.chars().count();
    if len > MAX_ID_LENGTH {
        return Err(ValueObjectError::TooLong {
            field,
            max: MAX_ID_LENGTH,
            actual: len,
        });
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValueObjectError::InvalidCharacters(field));
    }
    Ok(())
}

fn validate_length(field: &'static str, value: &str, max: usize) -> Result<(), ValueObjectError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValueObjectError::TooLong {
            field,
            max,
            actual: len,
        });
    }
    Ok(())
}

macro_rules! string_value_object {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// Opaque room identifier (a random 128-bit UUID when server-generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_id("room id", &value)?;
        Ok(Self(value))
    }

    /// Extract a room id from a shared link or pasted text.
    ///
    /// Accepts a bare id, a full room URL (`...?room=<id>`), or any text that
    /// embeds a `room=<id>` pattern.
    pub fn from_link(input: &str) -> Result<Self, ValueObjectError> {
        let input = input.trim();
        let candidate = match input.find("room=") {
            Some(pos) => {
                let rest = &input[pos + "room=".len()..];
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                    .unwrap_or(rest.len());
                &rest[..end]
            }
            None => input,
        };
        Self::new(candidate.to_string())
    }
}

string_value_object!(RoomId);

/// Room ID の生成
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        RoomId(Uuid::new_v4().to_string())
    }
}

/// Identifier of one participant connection within a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_id("connection id", &value)?;
        Ok(Self(value))
    }
}

string_value_object!(ConnectionId);

pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId(format!("user_{}", Uuid::new_v4().simple()))
    }
}

/// Message identifier, either client-supplied (idempotency token) or server-generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_id("message id", &value)?;
        Ok(Self(value))
    }
}

string_value_object!(MessageId);

pub struct MessageIdFactory;

impl MessageIdFactory {
    pub fn generate() -> MessageId {
        MessageId(Uuid::new_v4().to_string())
    }
}

/// Participant display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Blank names fall back to [`ANONYMOUS_USERNAME`].
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::anonymous());
        }
        validate_length("username", trimmed, MAX_USERNAME_LENGTH)?;
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_optional(value: Option<String>) -> Result<Self, ValueObjectError> {
        value.map_or_else(|| Ok(Self::anonymous()), Self::new)
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_USERNAME.to_string())
    }

    pub fn host() -> Self {
        Self(HOST_USERNAME.to_string())
    }
}

string_value_object!(Username);

/// Room display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomName(String);

impl RoomName {
    /// Blank names fall back to [`DEFAULT_ROOM_NAME`].
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        validate_length("room name", trimmed, MAX_ROOM_NAME_LENGTH)?;
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_optional(value: Option<String>) -> Result<Self, ValueObjectError> {
        value.map_or_else(|| Ok(Self::default()), Self::new)
    }
}

impl Default for RoomName {
    fn default() -> Self {
        Self(DEFAULT_ROOM_NAME.to_string())
    }
}

string_value_object!(RoomName);

/// Raw message text. The relay never transforms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("message"));
        }
        validate_length("message", &value, MAX_MESSAGE_LENGTH)?;
        Ok(Self(value))
    }
}

string_value_object!(MessageText);

/// Unix timestamp in milliseconds, taken at server receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
