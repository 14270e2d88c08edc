//! Logger initialisation for the demo binary and host integrations.
//!
//! The engine logs through the [`log`] facade only: transitions at info,
//! per-tick decisions at debug, failed placements and listener faults at
//! warn. Hosts with their own logger can skip this module entirely.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Filter applied when `RUST_LOG` is unset.
///
/// Dependencies stay at warn; only this crate follows `verbose`.
#[must_use]
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level.as_str().to_ascii_lowercase())
}

/// Initializes the global logger.
///
/// `RUST_LOG` overrides the [`default_filter`]. Calling this again after a
/// logger is installed does nothing.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();
    builder.try_init().ok();
}

/// Installs a logger that writes through the test harness's capture.
pub fn init_for_tests() {
    Builder::new()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, "warn,softfall=info")]
    #[case(true, "warn,softfall=debug")]
    fn filter_scopes_verbosity_to_crate(#[case] verbose: bool, #[case] expected: &str) {
        assert_eq!(default_filter(verbose), expected);
    }

    #[rstest]
    fn repeated_initialisation_is_harmless() {
        init_for_tests();
        init(true);
        init(false);
    }
}
