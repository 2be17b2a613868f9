//! Outcome notifications for the embedding UI.
//!
//! The registry and dispatcher never talk to a status bar directly. They emit
//! `(level, message)` pairs into a [`NotificationSink`], which must return
//! immediately: sinks are called from the listener's fire threads as well as
//! from the control thread.

use std::fmt;

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Error => "error",
        }
    }

    pub fn from_ok(ok: bool) -> Self {
        if ok {
            Level::Success
        } else {
            Level::Error
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Receiver of fire-and-forget notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, level: Level, message: &str);
}

/// Sink that only writes to the tracing subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Error => tracing::warn!(event_type = "notification", level = %level, "{}", message),
            _ => tracing::info!(event_type = "notification", level = %level, "{}", message),
        }
    }
}

/// Sink that forwards notifications over an unbounded channel.
///
/// The UI thread drains the receiver on its own schedule; `notify` never
/// waits on it.
#[derive(Clone)]
pub struct ChannelSink {
    tx: async_channel::Sender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, async_channel::Receiver<Notification>) {
        let (tx, rx) = async_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, level: Level, message: &str) {
        let notification = Notification {
            level,
            message: message.to_string(),
        };
        if self.tx.try_send(notification).is_err() {
            tracing::debug!(dropped = %message, "Notification channel closed, dropping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_delivers_in_order() {
        let (sink, rx) = ChannelSink::new();
        sink.notify(Level::Info, "first");
        sink.notify(Level::Error, "second");

        let a = rx.try_recv().expect("first notification");
        let b = rx.try_recv().expect("second notification");
        assert_eq!(a.level, Level::Info);
        assert_eq!(a.message, "first");
        assert_eq!(b.level, Level::Error);
        assert_eq!(b.message, "second");
    }

    #[test]
    fn channel_sink_does_not_block_when_receiver_dropped() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.notify(Level::Success, "nobody listening");
    }

    #[test]
    fn level_from_ok() {
        assert_eq!(Level::from_ok(true), Level::Success);
        assert_eq!(Level::from_ok(false), Level::Error);
        assert_eq!(Level::Info.to_string(), "info");
    }
}
