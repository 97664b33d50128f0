//! Command layer: the boundary the desktop frontend calls into.

pub mod catalog;
pub mod dispatch;
pub mod logging;

pub use catalog::CommandError;
