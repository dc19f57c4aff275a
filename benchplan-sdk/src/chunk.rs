use serde::Serialize;

use crate::enumerate::ResolvedJob;

/// Upper bound on the size of every group but the last.
pub const SLICE_CAP: usize = 500;

/// Label of the single group produced when no chunk size is configured.
pub const UNCHUNKED_LABEL: &str = "all";

/// A contiguous run of jobs submitted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchGroup<J = ResolvedJob> {
	pub label: String,
	pub jobs: Vec<J>,
	/// Only the final group of a set is flagged.
	pub is_last: bool,
}

/// Splits `jobs` into batch groups, keeping their order.
///
/// Without a chunk size (or with `0`) every job lands in one group labelled `all`.
/// Otherwise `ceil(len / chunk_size)` groups are produced. Each takes up to [`SLICE_CAP`] jobs and
/// the last one absorbs whatever is left, so every job belongs to exactly one group.
/// Labels are `lt` followed by the cumulative end index, zero padded to five digits.
///
/// Every group holds at most [`SLICE_CAP`] jobs only while `chunk_size <= SLICE_CAP`. With a larger
/// chunk size there are fewer groups than slices and the last one grows past the cap.
pub fn chunk<J>(jobs: Vec<J>, chunk_size: Option<usize>) -> Vec<BatchGroup<J>> {
	let size = match chunk_size {
		Some(size) if size > 0 => size,
		_ => {
			return vec![BatchGroup {
				label: UNCHUNKED_LABEL.to_string(),
				jobs,
				is_last: true,
			}]
		}
	};

	let total = jobs.len();
	let count = total.div_ceil(size).max(1);
	let mut remaining = jobs.into_iter();
	let mut groups = Vec::with_capacity(count);
	for i in 0..count {
		let is_last = i + 1 == count;
		let start = (i * SLICE_CAP).min(total);
		let end = if is_last { total } else { ((i + 1) * SLICE_CAP).min(total) };
		let jobs: Vec<J> = remaining.by_ref().take(end - start).collect();
		tracing::debug!(group = i, start, end, "chunked {} jobs", jobs.len());
		groups.push(BatchGroup {
			label: format!("lt{end:05}"),
			jobs,
			is_last,
		});
	}
	groups
}
