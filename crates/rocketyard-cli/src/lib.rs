//! Rocketyard CLI library.
//!
//! Command handlers and helpers behind the `rocketyard-cli` binary. The
//! binary only parses arguments and dispatches here; all domain behavior
//! comes from `rocketyard-lib`.

pub mod commands;
pub mod logging;
pub mod rocket_file;
