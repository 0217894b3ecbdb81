#![forbid(unsafe_code)]

pub mod model;
pub mod notifications;
pub mod progress;
pub mod time;
pub mod timeline;

pub use notifications::{NotificationAction, NotificationState};
pub use progress::ProgressSummary;
pub use time::Clock;
pub use timeline::{Timeline, TimelineError};
