use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the data directory, both local and in the home directory
pub const TALLY_DIR_NAME: &str = ".tally";

/// Environment variable that pins the data directory
pub const TALLY_DIR_ENV: &str = "TALLY_DIR";

/// Get the tally directory - `TALLY_DIR` first, then a local .tally, then ~/.tally
pub fn get_tally_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(TALLY_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_tally(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(TALLY_DIR_NAME))
}

/// Find local .tally directory by walking up the directory tree
fn find_local_tally(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let tally_dir = current.join(TALLY_DIR_NAME);
        if tally_dir.is_dir() {
            return Some(tally_dir);
        }

        current = current.parent()?;
    }
}

/// Ensure the tally directory exists
pub fn ensure_tally_dir() -> Result<PathBuf> {
    let dir = get_tally_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local .tally directory in the current directory
pub fn init_local_tally() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let tally_dir = current_dir.join(TALLY_DIR_NAME);

    if tally_dir.exists() {
        anyhow::bail!("Tally directory already exists: {}", tally_dir.display());
    }

    fs::create_dir_all(&tally_dir)
        .with_context(|| format!("Failed to create directory: {}", tally_dir.display()))?;

    Ok(tally_dir)
}

/// Path to the JSON store holding projects, tasks and time records
pub fn store_file() -> Result<PathBuf> {
    Ok(ensure_tally_dir()?.join("store.json"))
}

/// Path to config.json
pub fn config_file() -> Result<PathBuf> {
    Ok(ensure_tally_dir()?.join("config.json"))
}

/// Default path of the report for a date (report-YYYY-MM-DD.md)
pub fn report_file(date: chrono::NaiveDate) -> Result<PathBuf> {
    let filename = format!("report-{}.md", date.format("%Y-%m-%d"));
    Ok(ensure_tally_dir()?.join(filename))
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .context("File path has no parent directory")?;

    let mut temp_file = NamedTempFile::new_in(dir)
        .context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

/// Read file content, return empty string if file doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}
