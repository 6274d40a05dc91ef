//! Control link abstraction.

use crate::error::Result;
use crate::protocol::ControlMessage;

/// Outgoing side of the connection to the robot.
///
/// Implementations deliver one text frame per message. Callers check
/// [`ControlLink::is_open`] before sending; messages for a closed link are
/// dropped, never queued.
pub trait ControlLink: Send + Sync {
    /// Whether the link is currently connected
    fn is_open(&self) -> bool;

    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LinkClosed`](crate::CoreError::LinkClosed) if the
    /// link closed before the message could be handed off.
    fn send(&self, message: &ControlMessage) -> Result<()>;
}
