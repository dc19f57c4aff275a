use std::io::Error;

/// Asks the person running the compiler to confirm something.
pub trait Confirmation {
	fn confirm(&self, prompt: &str) -> Result<bool, Error>;
}

/// Answers every prompt with yes, for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmation for AssumeYes {
	fn confirm(&self, _prompt: &str) -> Result<bool, Error> {
		Ok(true)
	}
}
