use std::process::ExitCode;

use benchplan_sdk::error::PlanError;
use clap::Parser;

use crate::cmd::{App, Cmd};

mod cli;
mod cmd;

fn main() -> ExitCode {
	let app: App = App::parse();
	match app.run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("Error: {err:#}");
			let code = err.downcast_ref::<PlanError>().map_or(1, PlanError::exit_code);
			ExitCode::from(u8::try_from(code).unwrap_or(1))
		}
	}
}
