// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{env, fs, path::Path};

use uuid::Uuid;

/// Runs `f` inside a fresh directory under the system temp dir and removes it afterwards.
pub fn temp_dir<F, T>(f: F) -> std::io::Result<T>
where
	F: FnOnce(&Path) -> std::io::Result<T>,
{
	let mut path = env::temp_dir();
	path.push(format!("ferry-{}", Uuid::new_v4()));

	fs::create_dir(&path)?;
	let result = f(&path);

	let _ = fs::remove_dir_all(&path);
	result
}

/// Writes `contents` to `name` inside `dir` and returns the full path as a string.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> std::io::Result<String> {
	let path = dir.join(name);
	fs::write(&path, contents)?;
	Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_directory_is_removed_afterwards() {
		let kept = temp_dir(|dir| {
			write_file(dir, "a.csv", "x\n1\n")?;
			assert!(dir.join("a.csv").exists());
			Ok(dir.to_path_buf())
		})
		.unwrap();
		assert!(!kept.exists());
	}
}
