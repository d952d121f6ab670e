//! Value objects used across the chat relay.
//!
//! Every identifier and user-provided string is wrapped in a newtype that can
//! only be constructed through validation.

use std::fmt;

use super::error::ValueObjectError;

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    Ok(())
}

/// Room identifier (opaque)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        require_non_empty("room id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one live transport connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        require_non_empty("connection id", &value)?;
        Ok(Self(value))
    }

    /// Generate a fresh connection id (UUID v4)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name chosen by a user when joining a room
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        require_non_empty("username", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chat message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        require_non_empty("message content", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Timestamp `millis` before this one, saturating at `i64::MIN`
    pub fn saturating_sub_millis(&self, millis: i64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}

/// Acknowledgement id of a unary client request, echoed back in the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_rejects_empty() {
        // テスト項目: 空の RoomId は作成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = RoomId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::Empty("room id")));
    }

    #[test]
    fn test_long_username_and_content_are_kept_verbatim() {
        // テスト項目: 長いユーザー名やメッセージも切り詰められずにそのまま保持される
        // given (前提条件):
        let username = "a".repeat(33);
        let content = "あ".repeat(1001);

        // when (操作):
        let username_result = Username::new(username.clone());
        let content_result = MessageContent::try_from(content.clone());

        // then (期待する結果):
        assert_eq!(username_result.unwrap().as_str(), username);
        assert_eq!(content_result.unwrap().into_string(), content);
    }

    #[test]
    fn test_blank_username_and_content_are_rejected() {
        // テスト項目: 空白のみのユーザー名やメッセージは拒否される
        // given (前提条件):
        let blank = "  ".to_string();

        // when (操作):
        let username_result = Username::new(blank.clone());
        let content_result = MessageContent::new(blank);

        // then (期待する結果):
        assert_eq!(username_result, Err(ValueObjectError::Empty("username")));
        assert_eq!(content_result, Err(ValueObjectError::Empty("message content")));
    }

    #[test]
    fn test_generated_connection_ids_are_unique() {
        // テスト項目: 生成される ConnectionId は一意である
        // given (前提条件):

        // when (操作):
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_timestamp_saturating_sub() {
        // テスト項目: タイムスタンプの減算はオーバーフローしない
        // given (前提条件):
        let ts = Timestamp::new(i64::MIN + 1);

        // when (操作):
        let result = ts.saturating_sub_millis(10);

        // then (期待する結果):
        assert_eq!(result.value(), i64::MIN);
    }
}
