//! Non-fatal diagnostics.
//!
//! Passes that keep going after a problem, such as import remapping,
//! collect what they encountered as [`Notification`]s. Each notification
//! is also logged through `tracing` by the code that raises it, so callers
//! without a subscriber can still inspect what happened.

use std::fmt;

use crate::stream::OpCode;

/// Severity level of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// Operation or property the current pass does not handle; it was
    /// copied or dropped unchanged.
    NotSupported,
    /// Non-fatal warning (e.g., an id that could not be remapped).
    Warning,
    /// Error that was recovered from (e.g., a malformed payload that was
    /// skipped).
    Error,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "NotSupported"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// A single diagnostic, optionally tied to the operation that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub notification_type: NotificationType,
    pub message: String,
    /// Opcode of the operation being processed
    pub opcode: Option<OpCode>,
    /// Byte offset of that operation in the source stream
    pub offset: Option<usize>,
}

impl Notification {
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            message: message.into(),
            opcode: None,
            offset: None,
        }
    }

    /// Attach the operation this notification refers to
    pub fn at(mut self, opcode: OpCode, offset: usize) -> Self {
        self.opcode = Some(opcode);
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.notification_type, self.message)?;
        if let (Some(opcode), Some(offset)) = (self.opcode, self.offset) {
            write!(f, " ({opcode} at {offset})")?;
        }
        Ok(())
    }
}

/// Notifications collected during one pass.
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification.
    pub fn notify(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        self.items.push(Notification::new(notification_type, message));
    }

    /// Record a fully built notification.
    pub fn push(&mut self, notification: Notification) {
        self.items.push(notification);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Get all notifications of a specific type.
    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    /// Check whether any notification of the given type exists.
    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Move every notification of `other` into this collection.
    pub fn extend(&mut self, other: NotificationCollection) {
        self.items.extend(other.items);
    }

    pub fn into_vec(self) -> Vec<Notification> {
        self.items
    }
}

impl IntoIterator for NotificationCollection {
    type Item = Notification;
    type IntoIter = std::vec::IntoIter<Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
