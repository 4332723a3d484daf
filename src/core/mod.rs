pub mod detector;
pub mod flags;
pub mod hardware;
pub mod report;
