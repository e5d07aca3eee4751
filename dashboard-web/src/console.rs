use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};

/// Flattens a tracing event into `message key=value ...`.
#[derive(Debug, Default)]
pub struct EventLine {
    message: String,
    fields: String,
}

impl EventLine {
    pub fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod layer {
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::registry::Registry;
    use wasm_bindgen::JsValue;

    use super::EventLine;

    struct ConsoleLayer {
        max_level: Level,
    }

    impl<S: Subscriber> Layer<S> for ConsoleLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            if *meta.level() > self.max_level {
                return;
            }
            let mut line = EventLine::default();
            event.record(&mut line);
            let text = JsValue::from_str(&format!("[{}] {}", meta.target(), line.finish()));
            match *meta.level() {
                Level::ERROR => web_sys::console::error_1(&text),
                Level::WARN => web_sys::console::warn_1(&text),
                Level::INFO => web_sys::console::info_1(&text),
                _ => web_sys::console::debug_1(&text),
            }
        }
    }

    /// Route `tracing` events to the browser console. Safe to call twice.
    pub fn init(max_level: Level) {
        let subscriber = Registry::default().with(ConsoleLayer { max_level });
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

#[cfg(target_arch = "wasm32")]
pub use layer::init;
