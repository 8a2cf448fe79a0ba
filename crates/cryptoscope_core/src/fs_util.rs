use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Writes `content` to `path` through a sibling temporary file that is
/// synced and then renamed into place.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    // The handle must be closed before the rename on Windows.
    drop(file);

    fs::rename(&temp_path, path)
}
