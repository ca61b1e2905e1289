pub mod bench;
pub mod manifest;
pub mod perf_log;
pub mod survey;

use std::io;

use tracing::Level;

/// Installs the fmt subscriber used by the binaries. `verbosity` counts
/// `-v` flags: none logs warnings, one debug, two or more trace.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).try_init();
}
