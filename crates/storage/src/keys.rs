//! Keys under which the local store keeps its JSON blobs.

pub const USER: &str = "visa.user";
pub const PROGRESS: &str = "visa.progress";
pub const TIMELINE: &str = "visa.timeline";
pub const INTERVIEW: &str = "visa.interview";

/// Every key the application owns.
pub const ALL: [&str; 4] = [USER, PROGRESS, TIMELINE, INTERVIEW];
