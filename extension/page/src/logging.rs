//! `tracing` output routed to the devtools console.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Buffers one formatted event and hands it to `console.*` on drop.
pub struct ConsoleWriter {
	level: Level,
	buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
	fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
		self.buf.extend_from_slice(bytes);
		Ok(bytes.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl Drop for ConsoleWriter {
	fn drop(&mut self) {
		let text = String::from_utf8_lossy(&self.buf);
		let text = text.trim_end();
		if text.is_empty() {
			return;
		}
		let line = wasm_bindgen::JsValue::from_str(text);
		match self.level {
			Level::ERROR => web_sys::console::error_1(&line),
			Level::WARN => web_sys::console::warn_1(&line),
			Level::INFO => web_sys::console::info_1(&line),
			_ => web_sys::console::debug_1(&line),
		}
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
	type Writer = ConsoleWriter;

	fn make_writer(&'a self) -> Self::Writer {
		ConsoleWriter {
			level: Level::INFO,
			buf: Vec::new(),
		}
	}

	fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
		ConsoleWriter {
			level: *meta.level(),
			buf: Vec::new(),
		}
	}
}

/// `"debug"`, `"info"`... Unknown or missing levels log warnings and errors only.
pub fn parse_level(level: Option<&str>) -> Level {
	level.and_then(|l| l.parse().ok()).unwrap_or(Level::WARN)
}

/// Installs the console subscriber. A second call is a no-op.
pub fn init_logging(level: Option<&str>) {
	let _ = tracing_subscriber::fmt()
		.with_writer(ConsoleMakeWriter)
		.with_max_level(parse_level(level))
		.with_ansi(false)
		.without_time()
		.with_target(false)
		.try_init();
}
