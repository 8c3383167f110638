//! Tracing setup for processes embedding a node.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `DEBUG=*`, or a `DEBUG` value
/// containing `node_name`, turns on debug output; the default is info.
/// Safe to call more than once.
pub fn init_tracing(node_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let debug = std::env::var("DEBUG").ok();
        EnvFilter::new(default_level(node_name, debug.as_deref()))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn default_level(node_name: &str, debug: Option<&str>) -> &'static str {
    match debug {
        Some(v) if v.contains('*') => "debug",
        Some(v) if !node_name.is_empty() && v.contains(node_name) => "debug",
        _ => "info",
    }
}
