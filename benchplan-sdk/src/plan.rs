use std::{
	env,
	path::{Path, PathBuf},
};

use benchplan_stdx::path::Expand;
use path_clean::PathClean;
use serde::Serialize;

use crate::{
	chunk::{chunk, BatchGroup},
	config::BenchConfig,
	enumerate::JobEnumerator,
	error::PlanError,
	expand::Expander,
	prompt::Confirmation,
	resolver::HomeResolver,
	session::{ensure_vacant, Session},
	sets::{EntryKind, EntrySet},
};

/// The lists a set pair was compiled from, kept for whoever renders the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
	pub instances: EntrySet,
	pub configs: EntrySet,
}

/// Every job of one (config set, instance set) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetPlan {
	pub config_set: String,
	pub instance_set: String,
	/// Relative to the output root.
	pub base_dir: PathBuf,
	pub metadata: Metadata,
	pub groups: Vec<BatchGroup>,
}

impl SetPlan {
	pub fn job_count(&self) -> usize {
		self.groups.iter().map(|group| group.jobs.len()).sum()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
	pub name: String,
	pub sets: Vec<SetPlan>,
}

impl Plan {
	pub fn job_count(&self) -> usize {
		self.sets.iter().map(SetPlan::job_count).sum()
	}
}

pub struct CompileOptions<'a> {
	/// Directory the job output directories are created under.
	pub output_root: PathBuf,
	/// Allows existing output directories, on top of the description's own `overwrite`.
	pub overwrite: bool,
	pub home: PathBuf,
	pub confirmation: &'a dyn Confirmation,
}

fn disabled(name: &str, path: &str) -> bool {
	name.starts_with(['%', '#']) || path.starts_with(['%', '#'])
}

/// Compiles every config set against every instance set of a benchmark description.
///
/// All sets share one random generator, one token registry and one job counter.
/// The first error aborts the whole compilation.
pub fn compile(config: &BenchConfig, description: &Path, options: &CompileOptions) -> Result<Plan, PlanError> {
	let description = if description.is_absolute() {
		description.clean()
	} else {
		let cwd = env::current_dir().map_err(|source| PlanError::Io {
			source,
			path: description.to_path_buf(),
		})?;
		cwd.join(description).clean()
	};
	let description_dir = description.parent().map(Path::to_path_buf).unwrap_or_default();

	let resolver = HomeResolver::for_description(&options.home, config.working_dir.as_deref(), &description_dir);
	// staged as written, never rebased
	let runner = config.runsolver_path.clone();
	let overwrite = config.overwrite || options.overwrite;
	let mut session = Session::new(config.initial_seed, config.warn_above(), options.confirmation);

	let list_path = |raw: &str| -> PathBuf {
		let path = raw.expand_user(&options.home);
		if path.is_absolute() {
			path.clean()
		} else {
			description_dir.join(path).clean()
		}
	};

	let mut sets = Vec::new();
	for (instance_set, instance_list) in config.instances.sets(&config.name) {
		if disabled(&instance_set, &instance_list) {
			tracing::warn!("skipping instance set {instance_set}");
			continue;
		}
		for (config_set, config_list) in config.configs.sets(&config.name) {
			if config_set.is_empty() || config_set.starts_with('#') {
				tracing::warn!("skipping config set {config_set:?}");
				continue;
			}

			let mut base_dir = PathBuf::from(&config.name);
			if !config.configs.is_single() {
				base_dir.push(&config_set);
			}
			if !config.instances.is_single() {
				base_dir.push(&instance_set);
			}
			ensure_vacant(&base_dir, &options.output_root, overwrite)?;

			let instances = EntrySet::load(list_path(&instance_list), EntryKind::Instance)?;
			let configs = EntrySet::load(list_path(&config_list), EntryKind::Config)?;
			let instance_dir = instances.source().parent().map(Path::to_path_buf).unwrap_or_default();

			let enumerator = JobEnumerator {
				expander: Expander {
					executable: config.executable.as_deref(),
					timeout: config.effective_timeout(),
					parameters: config.instances_are_parameters,
					resolver: &resolver,
					description_dir: &description_dir,
					instance_dir: &instance_dir,
				},
				runs: config.runs,
				base_dir: &base_dir,
				output_root: &options.output_root,
				overwrite,
				scratch_base: config.scratch_base(),
				runner: &runner,
			};
			let jobs = enumerator.enumerate(&configs, &instances, &mut session)?;
			tracing::info!(
				base_dir = %base_dir.display(),
				"{config_set} x {instance_set}: {} jobs",
				jobs.len()
			);

			sets.push(SetPlan {
				config_set,
				instance_set: instance_set.clone(),
				base_dir,
				metadata: Metadata { instances, configs },
				groups: chunk(jobs, config.chunks),
			});
		}
	}

	Ok(Plan {
		name: config.name.clone(),
		sets,
	})
}
