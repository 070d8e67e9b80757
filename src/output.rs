//! writing the generated files
use std::{
	ffi::OsString,
	fs,
	io::{self, ErrorKind},
	path::{Path, PathBuf},
};

/// `<path>.new`, the file we write before moving it over `path`
fn staging_path(path: &Path) -> PathBuf {
	let mut staging = OsString::from(path.as_os_str());
	staging.push(".new");
	PathBuf::from(staging)
}

/// Replace the contents of `path` with `content` unless they're identical already. A missing
/// file counts as empty.
///
/// The new contents are written next to `path` and renamed over it, so readers never see a
/// partially written file. Returns whether the file was replaced.
pub fn write_if_changed(path: &Path, content: &str) -> io::Result<bool> {
	let current = match fs::read(path) {
		Ok(current) => current,
		Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
		Err(err) => return Err(err),
	};

	if current == content.as_bytes() {
		tracing::debug!(path = %path.display(), "unchanged");
		return Ok(false);
	}

	let staging = staging_path(path);
	fs::write(&staging, content)?;
	fs::rename(&staging, path)?;

	tracing::info!(path = %path.display(), "rewritten");

	Ok(true)
}

/// Overwrite `path` with `content` in place.
pub fn write_unconditionally(path: &Path, content: &str) -> io::Result<()> {
	fs::write(path, content)?;
	tracing::debug!(path = %path.display(), bytes = content.len(), "written");
	Ok(())
}
