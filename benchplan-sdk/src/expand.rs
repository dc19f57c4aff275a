use std::path::{Path, PathBuf};

use benchplan_stdx::path::{archive_suffix, strip_archive_suffix};

use crate::{
	error::PlanError,
	resolver::PathResolver,
	session::Session,
	staging::StagingEntry,
	template::{self, Segment},
};

/// Where the config line and the instance line of a job come from, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
	pub config_file: &'a Path,
	pub config_line: usize,
	pub instance_file: &'a Path,
	pub instance_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CommandPart {
	Text(String),
	/// The staged destination of the entry at this index.
	Staged(usize),
	/// The staged destination of the entry at this index, without its archive suffix.
	Unpacked(usize),
	/// A file inside the folder-contents entry at `index`.
	Folder { index: usize, name: String },
}

/// A command whose staged paths are still references into its staging list.
///
/// Staging destinations may still be renamed after expansion, so the final string is only
/// produced by [`Expansion::render`] once they are settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
	parts: Vec<CommandPart>,
	pub staging: Vec<StagingEntry>,
	archives: Vec<usize>,
}

impl Expansion {
	fn stage(&mut self, entry: StagingEntry) -> usize {
		self.staging.push(entry);
		self.staging.len() - 1
	}

	/// Indices of the staging entries that are compressed instance files.
	pub fn archives(&self) -> &[usize] {
		&self.archives
	}

	/// Produces the command, with every staged reference pointing into `scratch_root`.
	///
	/// `staging` must be this expansion's staging list, possibly with renamed destinations
	/// and extra entries appended; references index into it.
	pub fn render(&self, staging: &[StagingEntry], scratch_root: &Path) -> String {
		let mut command = String::new();
		for part in &self.parts {
			match part {
				CommandPart::Text(text) => command.push_str(text),
				CommandPart::Staged(idx) => {
					command.push_str(&scratch_root.join(&staging[*idx].destination).to_string_lossy());
				}
				CommandPart::Unpacked(idx) => {
					let destination = &staging[*idx].destination;
					let unpacked = strip_archive_suffix(destination).unwrap_or_else(|| destination.clone());
					command.push_str(&scratch_root.join(unpacked).to_string_lossy());
				}
				CommandPart::Folder { index, name } => {
					let path = scratch_root.join(&staging[*index].destination).join(name);
					command.push_str(&path.to_string_lossy());
				}
			}
		}
		command
	}
}

/// Run-wide settings for turning config and instance lines into commands.
pub struct Expander<'a> {
	pub executable: Option<&'a str>,
	/// The timeout already multiplied by the timeout factor.
	pub timeout: u64,
	/// Instance tokens are literal parameters rather than files.
	pub parameters: bool,
	pub resolver: &'a dyn PathResolver,
	/// Base for relative `$file{}` and `$folder{}` paths.
	pub description_dir: &'a Path,
	/// Base for relative instance tokens.
	pub instance_dir: &'a Path,
}

enum Pending {
	Ready(CommandPart),
	Positional(usize),
}

impl<'a> Expander<'a> {
	pub fn expand(
		&self,
		template: &str,
		instance_line: &str,
		origin: &Origin,
		session: &mut Session,
	) -> Result<Expansion, PlanError> {
		let template = match self.executable {
			Some(executable) => format!("{executable} {template}"),
			None => template.to_string(),
		};
		let mut expansion = Expansion::default();

		let mut pending = Vec::new();
		for segment in template::parse(&template)? {
			let part = match segment {
				Segment::Text(text) => CommandPart::Text(text.to_string()),
				Segment::File(raw) => {
					let source = self.resolver.resolve(raw, self.description_dir);
					CommandPart::Staged(expansion.stage(StagingEntry::file(source)))
				}
				Segment::Folder(raw) => {
					let resolved = self.resolver.resolve(raw, self.description_dir);
					let source = resolved.parent().map(Path::to_path_buf).unwrap_or_else(|| resolved.clone());
					let name = resolved.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
					let index = expansion.stage(StagingEntry::folder_contents(source));
					CommandPart::Folder { index, name }
				}
				Segment::Positional(position) => {
					pending.push(Pending::Positional(position));
					continue;
				}
				Segment::Timeout => CommandPart::Text(self.timeout.to_string()),
				Segment::Seed => CommandPart::Text(session.draw_seed().to_string()),
			};
			pending.push(Pending::Ready(part));
		}

		let arguments = self.arguments(instance_line, &mut expansion, session)?;

		let mut used = vec![false; arguments.len()];
		for item in pending {
			let part = match item {
				Pending::Ready(part) => part,
				Pending::Positional(position) => {
					let argument = arguments.get(position - 1).ok_or_else(|| PlanError::MissingArgument {
						position,
						config_file: origin.config_file.to_path_buf(),
						config_line: origin.config_line,
						instance_file: origin.instance_file.to_path_buf(),
						instance_line: origin.instance_line,
						content: instance_line.to_string(),
					})?;
					used[position - 1] = true;
					argument.clone()
				}
			};
			expansion.parts.push(part);
		}

		for (argument, _) in arguments.into_iter().zip(used).filter(|(_, used)| !used) {
			expansion.parts.push(CommandPart::Text(" ".to_string()));
			expansion.parts.push(argument);
		}

		Ok(expansion)
	}

	/// Splits the instance line and stages every token unless tokens are parameters.
	fn arguments(&self, instance_line: &str, expansion: &mut Expansion, session: &mut Session) -> Result<Vec<CommandPart>, PlanError> {
		let mut arguments = Vec::new();
		for token in tokens(instance_line) {
			if self.parameters {
				arguments.push(CommandPart::Text(token.to_string()));
				continue;
			}
			let source: PathBuf = self.resolver.resolve(token, self.instance_dir);
			session.bind_token(token, &source)?;
			let index = expansion.stage(StagingEntry::file(source));
			if archive_suffix(token).is_some() {
				expansion.archives.push(index);
				arguments.push(CommandPart::Unpacked(index));
			} else {
				arguments.push(CommandPart::Staged(index));
			}
		}
		Ok(arguments)
	}
}

/// Splits an instance line on `;`, `,` and whitespace, dropping empty tokens.
pub fn tokens(instance_line: &str) -> impl Iterator<Item = &str> {
	instance_line
		.split(|c: char| c == ';' || c == ',' || c.is_whitespace())
		.filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		prompt::AssumeYes,
		resolver::HomeResolver,
		staging::{decompression_tasks, dedupe, StagingKind},
	};
	use pretty_assertions::assert_eq;

	const HOME: &str = "/home/alice";

	struct Harness {
		resolver: HomeResolver,
		parameters: bool,
		executable: Option<&'static str>,
	}

	impl Harness {
		fn new() -> Self {
			Self {
				resolver: HomeResolver::new(HOME, None),
				parameters: false,
				executable: None,
			}
		}

		fn expander(&self) -> Expander<'_> {
			Expander {
				executable: self.executable,
				timeout: 300,
				parameters: self.parameters,
				resolver: &self.resolver,
				description_dir: Path::new("/home/alice/bench"),
				instance_dir: Path::new("/home/alice/bench/instances"),
			}
		}

		fn expand(&self, template: &str, instance_line: &str) -> Result<(String, Expansion), PlanError> {
			let mut session = Session::new(Some(42), None, &AssumeYes);
			self.expand_in(template, instance_line, &mut session)
		}

		fn expand_in(&self, template: &str, instance_line: &str, session: &mut Session) -> Result<(String, Expansion), PlanError> {
			let origin = Origin {
				config_file: Path::new("configs.txt"),
				config_line: 2,
				instance_file: Path::new("instances.txt"),
				instance_line: 5,
			};
			let expansion = self.expander().expand(template, instance_line, &origin, session)?;
			let staging = dedupe(expansion.staging.clone());
			Ok((expansion.render(&staging, Path::new("/dev/shm/job")), expansion))
		}
	}

	#[test]
	fn positional_arguments_in_any_order() {
		let (command, expansion) = Harness::new().expand("solve $2 $1", "x.txt,y.txt").unwrap();
		assert_eq!(command, "solve /dev/shm/job/input/y.txt /dev/shm/job/input/x.txt");
		assert_eq!(expansion.staging, vec![
			StagingEntry::file("~/bench/instances/x.txt"),
			StagingEntry::file("~/bench/instances/y.txt"),
		]);
	}

	#[test]
	fn unused_arguments_are_appended() {
		let (command, _) = Harness::new().expand("solve -i $2", "a.cnf; b.cnf  c.cnf").unwrap();
		assert_eq!(
			command,
			"solve -i /dev/shm/job/input/b.cnf /dev/shm/job/input/a.cnf /dev/shm/job/input/c.cnf"
		);
	}

	#[test]
	fn single_argument() {
		let (command, _) = Harness::new().expand("$1", "only.cnf").unwrap();
		assert_eq!(command, "/dev/shm/job/input/only.cnf");
	}

	#[test]
	fn missing_argument_names_instance_line() {
		let err = Harness::new().expand("$1", "").unwrap_err();
		match err {
			PlanError::MissingArgument {
				position,
				instance_file,
				instance_line,
				config_line,
				..
			} => {
				assert_eq!(position, 1);
				assert_eq!(instance_file, PathBuf::from("instances.txt"));
				assert_eq!(instance_line, 5);
				assert_eq!(config_line, 2);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn compressed_instance_is_referenced_unpacked() {
		let (command, expansion) = Harness::new().expand("solve", "input.lzma").unwrap();
		assert_eq!(command, "solve /dev/shm/job/input/input");
		let tasks = decompression_tasks(&expansion.staging, expansion.archives());
		assert_eq!(tasks.len(), 1);
		assert_eq!(tasks[0].compressed, PathBuf::from("input/input.lzma"));
		assert_eq!(tasks[0].decompressed, PathBuf::from("input/input"));
	}

	#[test]
	fn file_and_folder_placeholders() {
		let (command, expansion) = Harness::new()
			.expand("run --cfg $file{cfg/a.ini} --lib $folder{lib/libx.so}", "i.cnf")
			.unwrap();
		assert_eq!(
			command,
			"run --cfg /dev/shm/job/input/a.ini --lib /dev/shm/job/input/libx.so /dev/shm/job/input/i.cnf"
		);
		assert_eq!(expansion.staging[0].source, PathBuf::from("~/bench/cfg/a.ini"));
		assert_eq!(expansion.staging[1].source, PathBuf::from("~/bench/lib"));
		assert_eq!(expansion.staging[1].kind, StagingKind::FolderContents);
		assert_eq!(expansion.staging[2].source, PathBuf::from("~/bench/instances/i.cnf"));
	}

	#[test]
	fn colliding_names_render_renamed_destinations() {
		let (command, _) = Harness::new().expand("cmp $file{a/data.txt} $1", "b/data.txt").unwrap();
		assert_eq!(command, "cmp /dev/shm/job/input/data.txt /dev/shm/job/input/data1.txt");
	}

	#[test]
	fn timeout_seed_and_executable() {
		let mut harness = Harness::new();
		harness.executable = Some("python3");
		let (command, _) = harness.expand("solver.py -t $timeout -s $seed -r $seed", "x").unwrap();
		let words: Vec<&str> = command.split(' ').collect();
		assert_eq!(&words[..3], &["python3", "solver.py", "-t"]);
		assert_eq!(words[3], "300");
		let first: u64 = words[5].parse().unwrap();
		let second: u64 = words[7].parse().unwrap();
		assert!(first <= crate::session::MAX_SEED && second <= crate::session::MAX_SEED);
	}

	#[test]
	fn same_seed_same_expansion() {
		let harness = Harness::new();
		let a = harness.expand("s --seed $seed $1", "x.cnf").unwrap();
		let b = harness.expand("s --seed $seed $1", "x.cnf").unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn parameters_are_literal() {
		let mut harness = Harness::new();
		harness.parameters = true;
		let (command, expansion) = harness.expand("solve --n $1 --m $2", "10,20 30").unwrap();
		assert_eq!(command, "solve --n 10 --m 20 30");
		assert!(expansion.staging.is_empty());
	}

	#[test]
	fn repeated_token_with_same_path() {
		let (command, expansion) = Harness::new().expand("diff $1 $2", "/data/a.txt /data/a.txt").unwrap();
		assert_eq!(expansion.staging.len(), 2);
		assert_eq!(command, "diff /dev/shm/job/input/a.txt /dev/shm/job/input/a1.txt");
	}

	#[test]
	fn token_bound_to_two_directories() {
		let harness = Harness::new();
		let mut session = Session::new(Some(1), None, &AssumeYes);
		harness.expand_in("s", "a.txt", &mut session).unwrap();

		let other = Expander {
			instance_dir: Path::new("/home/alice/other"),
			..harness.expander()
		};
		let origin = Origin {
			config_file: Path::new("configs.txt"),
			config_line: 1,
			instance_file: Path::new("other/instances.txt"),
			instance_line: 1,
		};
		let err = other.expand("s", "a.txt", &origin, &mut session).unwrap_err();
		assert!(matches!(err, PlanError::Conflict { token, .. } if token == "a.txt"));
	}

	#[test]
	fn tokenizer_drops_empty_tokens() {
		assert_eq!(tokens(" a.cnf, b.cnf;;c.cnf\td.cnf ").collect::<Vec<_>>(), vec![
			"a.cnf", "b.cnf", "c.cnf", "d.cnf"
		]);
	}
}
