use std::{
	fmt, fs,
	path::{Path, PathBuf},
};

use serde::{
	de::{self, MapAccess, SeqAccess, Visitor},
	Deserialize, Deserializer,
};

use crate::{error::PlanError, session::DEFAULT_LARGE_JOB_THRESHOLD};

/// Where instance or config lists come from: a single list file, several files named after
/// their path, or several files under explicit names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
	Single(String),
	List(Vec<String>),
	Named(Vec<(String, String)>),
}

impl ListSource {
	pub fn is_single(&self) -> bool {
		matches!(self, ListSource::Single(_))
	}

	/// `(set name, list path)` pairs in description order.
	/// A single file is named after the benchmark, list entries `<benchmark>_<path without extension>`.
	pub fn sets(&self, benchmark: &str) -> Vec<(String, String)> {
		match self {
			ListSource::Single(path) => vec![(benchmark.to_string(), path.clone())],
			ListSource::List(paths) => paths
				.iter()
				.map(|path| {
					let stem = Path::new(path).with_extension("");
					(format!("{benchmark}_{}", stem.to_string_lossy()), path.clone())
				})
				.collect(),
			ListSource::Named(pairs) => pairs.clone(),
		}
	}
}

impl<'de> Deserialize<'de> for ListSource {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct StringOrListOrMap;

		impl<'de> Visitor<'de> for StringOrListOrMap {
			type Value = ListSource;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("a path, a list of paths or a map of names to paths")
			}

			fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
			where
				E: de::Error,
			{
				Ok(ListSource::Single(v.to_string()))
			}

			fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
			where
				A: SeqAccess<'de>,
			{
				let mut paths = Vec::with_capacity(seq.size_hint().unwrap_or_default());
				while let Some(path) = seq.next_element::<String>()? {
					paths.push(path);
				}
				Ok(ListSource::List(paths))
			}

			fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
			where
				M: MapAccess<'de>,
			{
				let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or_default());
				while let Some((name, path)) = map.next_entry::<String, String>()? {
					pairs.push((name, path));
				}
				Ok(ListSource::Named(pairs))
			}
		}
		deserializer.deserialize_any(StringOrListOrMap)
	}
}

fn enabled() -> bool {
	true
}

fn one() -> u32 {
	1
}

fn unit_factor() -> u64 {
	1
}

fn large_job_threshold() -> usize {
	DEFAULT_LARGE_JOB_THRESHOLD
}

fn runsolver_path() -> PathBuf {
	PathBuf::from("/opt/runsolver")
}

/// A benchmark description. Fields that only matter to the scheduler renderer are ignored.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BenchConfig {
	pub name: String,
	pub instances: ListSource,
	pub configs: ListSource,
	pub timeout: u64,
	#[serde(default = "one")]
	pub runs: u32,
	#[serde(default)]
	pub executable: Option<String>,
	#[serde(default)]
	pub working_dir: Option<String>,
	#[serde(default = "unit_factor")]
	pub timeout_factor: u64,
	#[serde(default)]
	pub initial_seed: Option<u64>,
	#[serde(default)]
	pub overwrite: bool,
	#[serde(default = "enabled")]
	pub warn_large_task_num: bool,
	#[serde(default = "large_job_threshold")]
	pub large_job_threshold: usize,
	#[serde(default)]
	pub instances_are_parameters: bool,
	/// Stage into `/dev/shm` instead of `/tmp`.
	#[serde(default = "enabled")]
	pub data_to_main_mem: bool,
	#[serde(default)]
	pub chunks: Option<usize>,
	#[serde(default = "runsolver_path")]
	pub runsolver_path: PathBuf,
}

impl BenchConfig {
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PlanError> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(PlanError::NotFound(path.to_path_buf()));
		}

		let content = fs::read_to_string(path).map_err(|source| PlanError::Io {
			source,
			path: path.to_path_buf(),
		})?;
		// set names become directory names, so map keys are taken verbatim
		let config = serde_json::from_str::<BenchConfig>(&content).map_err(|source| PlanError::Description {
			source,
			path: path.to_path_buf(),
		})?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), PlanError> {
		if self.name.trim().is_empty() {
			return Err(PlanError::Config("`name` must not be empty".into()));
		}
		if self.runs == 0 {
			return Err(PlanError::Config("`runs` must be at least 1".into()));
		}
		if self.chunks == Some(0) {
			return Err(PlanError::Config("`chunks` must be at least 1".into()));
		}
		Ok(())
	}

	pub fn effective_timeout(&self) -> u64 {
		self.timeout * self.timeout_factor
	}

	/// Directory below which every job gets its own scratch root.
	pub fn scratch_base(&self) -> &'static Path {
		if self.data_to_main_mem {
			Path::new("/dev/shm")
		} else {
			Path::new("/tmp")
		}
	}

	/// The job-count threshold for the confirmation prompt, if enabled.
	pub fn warn_above(&self) -> Option<usize> {
		self.warn_large_task_num.then_some(self.large_job_threshold)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use serde_test::{assert_de_tokens, Token};
	use std::io::Write;
	use tempfile::Builder;

	#[test]
	fn deserialize_single() {
		assert_de_tokens(&ListSource::Single("instances.txt".into()), &[Token::Str("instances.txt")]);
	}

	#[test]
	fn deserialize_list() {
		assert_de_tokens(&ListSource::List(vec!["a.txt".into(), "b.txt".into()]), &[
			Token::Seq { len: Some(2) },
			Token::Str("a.txt"),
			Token::Str("b.txt"),
			Token::SeqEnd,
		]);
	}

	#[test]
	fn deserialize_named_keeps_order() {
		assert_de_tokens(
			&ListSource::Named(vec![("zeta".into(), "z.txt".into()), ("alpha".into(), "a.txt".into())]),
			&[
				Token::Map { len: Some(2) },
				Token::Str("zeta"),
				Token::Str("z.txt"),
				Token::Str("alpha"),
				Token::Str("a.txt"),
				Token::MapEnd,
			],
		);
	}

	#[test]
	fn set_names() {
		let list = ListSource::List(vec!["lists/sat.txt".into(), "unsat".into()]);
		assert_eq!(list.sets("bench"), vec![
			("bench_lists/sat".to_string(), "lists/sat.txt".to_string()),
			("bench_unsat".to_string(), "unsat".to_string()),
		]);
		assert_eq!(ListSource::Single("i.txt".into()).sets("bench"), vec![(
			"bench".to_string(),
			"i.txt".to_string()
		)]);
	}

	#[test]
	fn load_json_with_defaults() {
		let mut file = Builder::new().suffix(".json").tempfile().unwrap();
		write!(
			file,
			r#"{{
				"name": "sat",
				"instances": "instances.txt",
				"configs": {{"fast": "fast.txt", "slow": "slow.txt"}},
				"timeout": 60,
				"timeout_factor": 2,
				"request_cpus": 1,
				"mem_limit": 8000
			}}"#
		)
		.unwrap();
		let config = BenchConfig::load(file.path()).unwrap();
		assert_eq!(config.name, "sat");
		assert_eq!(config.instances, ListSource::Single("instances.txt".into()));
		assert_eq!(
			config.configs,
			ListSource::Named(vec![("fast".into(), "fast.txt".into()), ("slow".into(), "slow.txt".into())])
		);
		assert_eq!(config.runs, 1);
		assert_eq!(config.effective_timeout(), 120);
		assert_eq!(config.warn_above(), Some(DEFAULT_LARGE_JOB_THRESHOLD));
		assert_eq!(config.scratch_base(), Path::new("/dev/shm"));
		assert_eq!(config.runsolver_path, PathBuf::from("/opt/runsolver"));
	}

	#[test]
	fn load_rejects_zero_runs() {
		let mut file = Builder::new().suffix(".json").tempfile().unwrap();
		write!(file, r#"{{"name": "b", "instances": "i", "configs": "c", "timeout": 1, "runs": 0}}"#).unwrap();
		assert!(matches!(BenchConfig::load(file.path()), Err(PlanError::Config(_))));
	}

	#[test]
	fn load_missing_description() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(
			BenchConfig::load(dir.path().join("bench.json")),
			Err(PlanError::NotFound(_))
		));
	}

	#[test]
	fn load_keeps_set_name_case() {
		let mut file = Builder::new().suffix(".json").tempfile().unwrap();
		write!(
			file,
			r#"{{"name": "Sat", "instances": "i.txt", "configs": {{"FastCfg": "a.txt", "v1.2": "b.txt"}}, "timeout": 1}}"#
		)
		.unwrap();
		let config = BenchConfig::load(file.path()).unwrap();
		assert_eq!(config.configs.sets("Sat"), vec![
			("FastCfg".to_string(), "a.txt".to_string()),
			("v1.2".to_string(), "b.txt".to_string()),
		]);
	}

	#[test]
	fn load_rejects_malformed_json() {
		let mut file = Builder::new().suffix(".json").tempfile().unwrap();
		write!(file, r#"{{"name": "b", "instances": "i""#).unwrap();
		assert!(matches!(
			BenchConfig::load(file.path()),
			Err(PlanError::Description { path, .. }) if path == file.path()
		));
	}
}
