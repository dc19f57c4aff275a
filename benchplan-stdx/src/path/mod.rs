mod archive;
mod counter;
mod expand;

pub use archive::{archive_suffix, strip_archive_suffix, ARCHIVE_SUFFIXES};
pub use counter::with_counter;
pub use expand::{Expand, HomeRelative};
