//! CLI support modules

pub mod logging;
