//! Public surface for Agenda.
//!
//! This crate re-exports the building blocks and hosts the line-oriented chat
//! shell used by the `agenda` binary.

/// Re-export for convenience.
pub use agenda_rs_config as config;
pub use agenda_rs_core as core;
/// Re-export for convenience.
pub use agenda_rs_memory as memory;
/// Re-export for convenience.
pub use agenda_rs_protocol as protocol;
pub use agenda_rs_tools as tools;

pub mod shell;

pub use shell::run_shell;

/// Initialize `env_logger` with millisecond timestamps; `RUST_LOG` controls
/// verbosity. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
