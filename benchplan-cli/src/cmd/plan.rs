use std::{
	env,
	fs::File,
	io::{BufWriter, Write},
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use benchplan_sdk::{
	config::BenchConfig,
	plan::{compile, CompileOptions, Plan as CompiledPlan},
	prompt::{AssumeYes, Confirmation},
};
use clap::{Parser, ValueHint};

use super::Cmd;
use crate::cli::CliUi;

#[derive(Parser, Debug)]
pub struct Plan {
	/// The benchmark description.
	#[arg(value_hint = ValueHint::FilePath)]
	description: PathBuf,
	#[arg(long, short = 'o', value_hint = ValueHint::DirPath, help = "Directory the job output directories are created in. Defaults to the current directory")]
	output_root: Option<PathBuf>,
	#[arg(long, value_hint = ValueHint::FilePath, help = "Write the compiled plan as JSON to this file")]
	json: Option<PathBuf>,
	#[arg(long, help = "Allow output directories that already exist")]
	overwrite: bool,
	#[arg(long, short = 'y', help = "Do not ask for confirmation when many jobs are generated")]
	yes: bool,
}

fn write_json(plan: &CompiledPlan, path: &Path) -> Result<()> {
	let file = File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
	let mut writer = BufWriter::new(file);
	serde_json::to_writer_pretty(&mut writer, plan)?;
	writer.flush()?;
	tracing::info!("Plan written to {}", path.display());
	Ok(())
}

fn summary(plan: &CompiledPlan) -> Vec<String> {
	let mut lines: Vec<String> = plan
		.sets
		.iter()
		.map(|set| {
			format!(
				"{}: {} jobs in {} group(s)",
				set.base_dir.display(),
				set.job_count(),
				set.groups.len()
			)
		})
		.collect();
	lines.push(format!("Generated in total {} jobs.", plan.job_count()));
	lines
}

impl Cmd for Plan {
	fn run(self) -> Result<()> {
		let home = dirs::home_dir().context("unable to find home directory")?;
		let output_root = match self.output_root {
			Some(root) => root,
			None => env::current_dir().context("unable to read the current directory")?,
		};
		let config = BenchConfig::load(&self.description)?;
		let confirmation: &dyn Confirmation = if self.yes { &AssumeYes } else { &CliUi };
		let options = CompileOptions {
			output_root,
			overwrite: self.overwrite,
			home,
			confirmation,
		};

		let plan = compile(&config, &self.description, &options)?;
		if let Some(path) = &self.json {
			write_json(&plan, path)?;
		}
		for line in summary(&plan) {
			println!("{line}");
		}
		Ok(())
	}
}
