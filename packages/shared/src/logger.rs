//! Logger setup shared by Hiroba binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for a binary.
///
/// Binary names use hyphens while tracing targets use underscores, so
/// `hiroba-server` becomes `hiroba_server=<level>`.
fn default_directive(bin_name: &str, level: &str) -> String {
    let target = bin_name.replace('-', "_");
    format!("{target}={level},tower_http={level}")
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when it is set.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(bin_name, default_level)));

    // try_init: tests and embedded callers may already have installed a subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_replaces_hyphens() {
        // テスト項目: バイナリ名のハイフンがアンダースコアに置換される
        // when (操作):
        let directive = default_directive("hiroba-server", "debug");

        // then (期待する結果):
        assert_eq!(directive, "hiroba_server=debug,tower_http=debug");
    }
}
