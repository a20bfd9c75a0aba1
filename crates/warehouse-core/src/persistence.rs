//! Snapshot persistence in a plain `<NAME> <count>` text format.
//!
//! ```text
//! CARBON 3
//! HYDROGEN 0
//! OXYGEN 12
//! ALCOHOL 1
//! CARBON DIOXIDE 4
//! GLUCOSE 0
//! WATER 7
//! ```
//!
//! The count is the last whitespace-separated token of a line and the name
//! is everything before it, so two-word molecule names survive a round
//! trip. Loading is lenient: malformed lines and unknown names are skipped
//! and keys missing from the file keep their current value.
//!
//! Writes are atomic:
//! 1. Write to a temp file with a PID suffix next to the target
//! 2. Flush and fsync
//! 3. Rename over the target

use crate::chemistry::{AtomKind, MoleculeKind};
use crate::config::PersistenceConfig;
use crate::error::{Result, WarehouseError};
use crate::inventory::InventorySnapshot;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info, warn};

impl InventorySnapshot {
    /// Render the snapshot as newline-delimited `<NAME> <count>` lines.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for kind in AtomKind::ALL {
            out.push_str(&format!("{} {}\n", kind, self.atoms.get(kind)));
        }
        for kind in MoleculeKind::ALL {
            out.push_str(&format!("{} {}\n", kind, self.molecules.get(kind)));
        }
        out
    }

    /// Overlay the entries found in `text` onto this snapshot.
    ///
    /// Returns the number of lines applied.
    pub fn apply_text(&mut self, text: &str) -> usize {
        let mut applied = 0;
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((name, value)) = line.rsplit_once(char::is_whitespace) else {
                warn!("Ignoring snapshot line {}: {:?}", line_no + 1, line);
                continue;
            };
            let Ok(value) = value.parse::<u64>() else {
                warn!("Ignoring snapshot line {}: bad count {:?}", line_no + 1, value);
                continue;
            };
            let name = name.trim_end();

            if let Ok(kind) = name.parse::<AtomKind>() {
                *self.atoms.get_mut(kind) = value;
            } else if let Ok(kind) = name.parse::<MoleculeKind>() {
                *self.molecules.get_mut(kind) = value;
            } else {
                warn!("Ignoring snapshot line {}: unknown name {:?}", line_no + 1, name);
                continue;
            }
            applied += 1;
        }
        applied
    }
}

/// Load a snapshot file on top of `base`.
///
/// Returns `None` if the file doesn't exist.
pub fn load_snapshot(path: &Path, base: InventorySnapshot) -> Result<Option<InventorySnapshot>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No snapshot at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(WarehouseError::io_with_path(e, path)),
    };

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| WarehouseError::Io {
        message: format!("Failed to read {}", path.display()),
        path: Some(path.to_path_buf()),
        source: Some(e),
    })?;

    let mut snapshot = base;
    let applied = snapshot.apply_text(&contents);
    info!("Inventory loaded from {} ({} entries)", path.display(), applied);
    Ok(Some(snapshot))
}

/// Write a snapshot file atomically, creating the parent directory if needed.
pub fn save_snapshot(path: &Path, snapshot: &InventorySnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WarehouseError::Io {
                message: format!("Failed to create directory {}", parent.display()),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }
    }

    let temp_path = temp_path_for(path)?;
    let serialized = snapshot.to_text();
    let temp = TempFile::new(temp_path);

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp.path())
            .map_err(|e| WarehouseError::Io {
                message: format!("Failed to create temp file {}", temp.path().display()),
                path: Some(temp.path().to_path_buf()),
                source: Some(e),
            })?;

        file.write_all(serialized.as_bytes())
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_all())
            .map_err(|e| WarehouseError::Io {
                message: format!("Failed to write temp file {}", temp.path().display()),
                path: Some(temp.path().to_path_buf()),
                source: Some(e),
            })?;
    }

    fs::rename(temp.path(), path).map_err(|e| WarehouseError::Io {
        message: format!(
            "Failed to rename {} to {}",
            temp.path().display(),
            path.display()
        ),
        path: Some(path.to_path_buf()),
        source: Some(e),
    })?;
    temp.keep();

    info!("Inventory saved to {}", path.display());
    Ok(())
}

/// Temp file that is removed on drop unless [`keep`](Self::keep) is called.
struct TempFile {
    path: PathBuf,
    keep: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// The file was renamed into place; leave the path alone.
    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temp file {}: {}", self.path.display(), e),
        }
    }
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| WarehouseError::Config {
        message: format!("Save path has no file name: {}", path.display()),
    })?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(format!(".{}.{}", process::id(), PersistenceConfig::TEMP_SUFFIX));
    Ok(path.with_file_name(temp_name))
}
