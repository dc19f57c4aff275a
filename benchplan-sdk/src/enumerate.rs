use std::path::{Path, PathBuf};

use itertools::iproduct;
use serde::Serialize;

use crate::{
	error::PlanError,
	expand::{Expander, Origin},
	session::Session,
	sets::{EntrySet, NamedEntry},
	staging::{decompression_tasks, dedupe, DecompressionTask, StagingEntry},
};

/// One (config, instance, run) triple with everything an emitter needs to run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedJob {
	pub config_name: String,
	pub instance_name: String,
	pub run: u32,
	pub command: String,
	pub staging: Vec<StagingEntry>,
	pub decompression: Vec<DecompressionTask>,
	pub output_dir: PathBuf,
	pub scratch_root: PathBuf,
	/// Staged destination of the runner binary, relative to `scratch_root`.
	pub runner: PathBuf,
	pub input_line: String,
}

/// Crosses the configs and instances of one set pair.
pub struct JobEnumerator<'a> {
	pub expander: Expander<'a>,
	pub runs: u32,
	/// Directory of the set pair, relative to `output_root`.
	pub base_dir: &'a Path,
	pub output_root: &'a Path,
	pub overwrite: bool,
	pub scratch_base: &'a Path,
	/// Binary staged last into every job.
	pub runner: &'a Path,
}

impl<'a> JobEnumerator<'a> {
	/// Enumerates jobs config by config, instance by instance, run by run.
	/// This order is kept by everything downstream.
	pub fn enumerate(&self, configs: &EntrySet, instances: &EntrySet, session: &mut Session) -> Result<Vec<ResolvedJob>, PlanError> {
		let enabled: Vec<&NamedEntry> = instances
			.iter()
			.filter(|instance| {
				let disabled = instance.raw_line.starts_with(['#', '%']);
				if disabled {
					tracing::debug!(instance = %instance.name, "skipping disabled instance");
				}
				!disabled
			})
			.collect();

		let mut jobs = Vec::new();
		for (config, instance, run) in iproduct!(configs.iter(), enabled.iter().copied(), 1..=self.runs) {
			let template = match config.raw_line.as_str() {
				"None" => "",
				line => line,
			};
			let origin = Origin {
				config_file: configs.source(),
				config_line: config.line_number,
				instance_file: instances.source(),
				instance_line: instance.line_number,
			};
			let job = self.job(template, config, instance, run, &origin, session)?;
			session.count_job()?;
			jobs.push(job);
		}
		Ok(jobs)
	}

	fn job(
		&self,
		template: &str,
		config: &NamedEntry,
		instance: &NamedEntry,
		run: u32,
		origin: &Origin,
		session: &mut Session,
	) -> Result<ResolvedJob, PlanError> {
		let output_dir = self.base_dir.join(&config.name).join(&instance.name).join(format!("run{run}"));
		session.claim_output(&output_dir, self.output_root, self.overwrite)?;

		let scratch_root = self.scratch_base.join(session.scratch_id().to_string());
		let expansion = self.expander.expand(template, &instance.raw_line, origin, session)?;

		let mut staging = expansion.staging.clone();
		staging.push(StagingEntry::file(self.runner));
		let staging = dedupe(staging);
		let runner = staging.last().map(|entry| entry.destination.clone()).unwrap_or_default();

		let job = ResolvedJob {
			config_name: config.name.clone(),
			instance_name: instance.name.clone(),
			run,
			command: expansion.render(&staging, &scratch_root),
			decompression: decompression_tasks(&staging, expansion.archives()),
			staging,
			output_dir,
			scratch_root,
			runner,
			input_line: instance.raw_line.clone(),
		};
		tracing::debug!(output_dir = %job.output_dir.display(), command = %job.command, "resolved job");
		Ok(job)
	}
}
