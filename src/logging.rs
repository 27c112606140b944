use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

/// `log` backend that writes to the browser console
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

fn format_record(record: &Record) -> String {
    format!("[{}] {}", record.target(), record.args())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format_record(record));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::log_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Debug builds log at `Debug`, release builds at `Info`
pub fn init() {
    let level = if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_prefixed_with_target() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("starfield started ({} stars)", 72))
                .level(Level::Info)
                .target("starfield_client::engine")
                .build(),
        );
        assert_eq!(line, "[starfield_client::engine] starfield started (72 stars)");
    }
}
