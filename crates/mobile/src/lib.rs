pub mod host;
pub mod logging;
pub mod state;

uniffi::setup_scaffolding!();

/// Route panics through tracing so they land in logcat / the Xcode console.
/// Call this once at startup from Kotlin/Swift
#[uniffi::export]
pub fn init_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!("=== RUST PANIC ===\n{panic_info}\nBacktrace:\n{backtrace}");
    }));
}

/// Every category tag the places service understands, in display order.
#[uniffi::export]
pub fn supported_categories() -> Vec<String> {
    nearby_core::model::Category::all()
        .map(|category| category.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_categories() {
        let categories = supported_categories();
        assert_eq!(categories.len(), 12);
        assert_eq!(categories.first().map(String::as_str), Some("restaurant"));
        assert!(categories.iter().any(|c| c == "gas_station"));
    }
}
