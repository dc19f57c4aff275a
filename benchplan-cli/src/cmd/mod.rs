use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use plan::Plan;

mod logs;
mod plan;

#[derive(Subcommand)]
enum Command {
	Plan(Plan),
}

#[derive(Parser)]
#[command(about, author, version)]
pub struct App {
	/// Print more log output (-v info, -vv debug, -vvv trace).
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	/// Additionally write a full trace into a timestamped file in this directory.
	#[arg(long, global = true, value_hint = ValueHint::DirPath)]
	log_dir: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}

pub trait Cmd {
	fn run(self) -> anyhow::Result<()>;
}

impl Cmd for App {
	fn run(self) -> anyhow::Result<()> {
		let _guard = logs::init(self.verbose, self.log_dir.as_deref());
		match self.command {
			Command::Plan(plan) => plan.run(),
		}
	}
}
