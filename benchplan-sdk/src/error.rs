use std::path::PathBuf;
use thiserror::Error;

/// Exit status for every fatal planning error.
pub const EXIT_FATAL: i32 = 2;
/// Exit status when the user refuses to continue past the job-count warning.
pub const EXIT_DECLINED: i32 = 4;

/// The error type for everything that can abort a compilation.
/// There is no partial plan: the first error ends the invocation.
#[derive(Error, Debug)]
pub enum PlanError {
	#[error("File not found: {}", .0.display())]
	NotFound(PathBuf),

	#[error("Could not read {}", .path.display())]
	Io {
		#[source]
		source: std::io::Error,
		path: PathBuf,
	},

	#[error("Directory {} exists", .path.display())]
	DuplicateOutput { path: PathBuf },

	#[error(
		"Config '{}:L{config_line}' contained '${position}', but instance '{}:L{instance_line}' was missing an argument ${position}. Content was '{content}'",
		.config_file.display(),
		.instance_file.display()
	)]
	MissingArgument {
		position: usize,
		config_file: PathBuf,
		config_line: usize,
		instance_file: PathBuf,
		instance_line: usize,
		content: String,
	},

	#[error(
		"Instance {token} was already added from {}. Instances of the same name from different paths ({}) are not supported",
		.first.display(),
		.second.display()
	)]
	Conflict { token: String, first: PathBuf, second: PathBuf },

	#[error("Malformed placeholder `{placeholder}` at offset {offset} in `{template}`")]
	MalformedPlaceholder {
		placeholder: String,
		offset: usize,
		template: String,
	},

	#[error("Aborted by the user after {jobs} jobs")]
	Declined { jobs: usize },

	#[error("Error in benchmark description: {0}")]
	Config(String),

	#[error("Could not parse benchmark description {}", .path.display())]
	Description {
		#[source]
		source: serde_json::Error,
		path: PathBuf,
	},

	#[error("Error in prompt")]
	Interaction {
		#[source]
		source: std::io::Error,
		prompt: String,
	},
}

impl PlanError {
	pub fn exit_code(&self) -> i32 {
		match self {
			PlanError::Declined { .. } => EXIT_DECLINED,
			_ => EXIT_FATAL,
		}
	}
}
