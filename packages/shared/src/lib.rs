//! Utilities shared by the Bisik packages.

pub mod logger;
pub mod time;
