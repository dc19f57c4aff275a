use std::{io, path::Path};

use benchplan_sdk::PROJECT_NAME;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
	filter::LevelFilter,
	fmt::{self},
	layer::SubscriberExt,
	util::SubscriberInitExt,
	Layer,
};

fn level(verbosity: u8) -> LevelFilter {
	match verbosity {
		0 => LevelFilter::WARN,
		1 => LevelFilter::INFO,
		2 => LevelFilter::DEBUG,
		_ => LevelFilter::TRACE,
	}
}

/// Logs to stderr and, with a `log_dir`, to a fresh file in it.
/// The returned guard flushes the file when dropped and must outlive the command.
pub fn init(verbosity: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
	let stderr_layer = fmt::layer()
		.with_writer(io::stderr)
		.with_target(false)
		.with_filter(level(verbosity));

	let (file_layer, guard) = match log_dir {
		Some(dir) => {
			// milliseconds keep back-to-back runs apart
			let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S%.3f");
			let file_appender = tracing_appender::rolling::never(dir, format!("{PROJECT_NAME}-{timestamp}.log"));
			let (writer, guard) = tracing_appender::non_blocking(file_appender);
			let layer = fmt::layer()
				.with_writer(writer)
				.with_ansi(false)
				.with_filter(LevelFilter::TRACE);
			(Some(layer), Some(guard))
		}
		None => (None, None),
	};

	tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();
	if let Some(dir) = log_dir {
		tracing::debug!("Logging initialized. Log file in: {}", dir.display());
	}
	guard
}
