//! Notification Decision Engine
//!
//! Maps confirmed-state transitions to notification intents, remembers what
//! has already been announced for the current incident, and fans intents out
//! to delivery channels. The classifier is the single source of truth for
//! whether a notification goes out; delivery resilience belongs to the
//! channels behind the dispatcher trait.

mod classify;
mod dispatch;
mod memory;

pub use classify::{classify, Intent};
pub use dispatch::{
    DispatchError, FanoutDispatcher, LogDispatcher, Notification, NotificationDispatcher,
};
pub use memory::NotificationMemory;
