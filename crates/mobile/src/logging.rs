use std::sync::Once;

use tracing_subscriber::{
    EnvFilter, fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt,
};

const DEFAULT_DIRECTIVES: &str = "nearby_core=info,nearby_mobile=info";

/// Installs the global subscriber. Later calls are ignored.
///
/// `directives` uses `RUST_LOG` syntax, e.g. `"nearby_core=debug"`.
#[uniffi::export]
pub fn init_logging(directives: Option<String>) {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        let filter = directives
            .as_deref()
            .and_then(|d| EnvFilter::try_new(d).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES));

        install(filter);
    });
}

#[cfg(target_os = "android")]
fn install(filter: EnvFilter) {
    use tracing_logcat::{LogcatMakeWriter, LogcatTag};

    let tag = LogcatTag::Fixed("Nearby-Rust".to_owned());
    let Ok(writer) = LogcatMakeWriter::new(tag) else {
        return;
    };
    let layer = tracing_subscriber::fmt::layer()
        .event_format(Format::default().with_level(false).without_time())
        .with_writer(writer)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init();
}

#[cfg(not(target_os = "android"))]
fn install(filter: EnvFilter) {
    let layer = tracing_subscriber::fmt::layer()
        .event_format(Format::default().without_time())
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init();
}
