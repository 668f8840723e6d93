//! Log setup for the CLI

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stderr.
///
/// `RUST_LOG` overrides the filter. Otherwise only warnings are shown,
/// `-v` enables debug output for tapejit crates and `-vv` trace output.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,tapejit_core=debug,tapejit=debug",
        _ => "warn,tapejit_core=trace,tapejit=trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(default_filter(0), "warn");
        assert!(default_filter(1).contains("tapejit_core=debug"));
        assert!(default_filter(5).contains("tapejit_core=trace"));
    }
}
