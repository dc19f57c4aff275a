use std::io::Error;

use benchplan_sdk::prompt::Confirmation;
use dialoguer::{theme::ColorfulTheme, Confirm};

/// Answer taken when the user just presses Enter.
const DEFAULT_ANSWER: bool = true;

/// Asks on the terminal.
pub struct CliUi;

impl Confirmation for CliUi {
	fn confirm(&self, prompt: &str) -> Result<bool, Error> {
		Confirm::with_theme(&ColorfulTheme::default())
			.with_prompt(prompt)
			.default(DEFAULT_ANSWER)
			.interact()
	}
}
