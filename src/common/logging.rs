//! stderr logging for the binaries, on top of `env_logger`.
//!
//! The library only emits stage-level records through the `log` facade;
//! nothing is printed unless a binary installs a logger and raises the
//! verbosity.

use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Map a `-v` count to a level: 0 warnings, 1 info, 2 debug, 3+ trace.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Logger builder for `tool`: fixed level from `verbosity`, records printed
/// as `tool: [LEVEL] message`. `RUST_LOG` is not consulted.
pub fn builder(tool: &'static str, verbosity: u8) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level_for(verbosity))
        .format(move |buf, record| writeln!(buf, "{}: [{}] {}", tool, record.level(), record.args()));
    builder
}

/// Install the stderr logger for `tool`. A second call is a no-op.
pub fn init(tool: &'static str, verbosity: u8) {
    let _ = builder(tool, verbosity).try_init();
}
