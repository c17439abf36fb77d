//! # File I/O Module
//!
//! Reading analysis inputs and writing results:
//! - **Inputs** are JSON [`AnalysisInput`] files, validated on load
//! - **Analyses** are saved as pretty-printed JSON
//! - **Force tables** are exported as CSV, one file per method
//!
//! Every write is atomic: contents go to a `.tmp` sibling, are synced to
//! disk, then renamed over the target.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bolt_core::file_io::{export_all_csv, load_input, save_analysis};
//! use bolt_core::results::analyze;
//! use std::path::Path;
//!
//! let input = load_input(Path::new("bracket.json"))?;
//! let analysis = analyze(&input)?;
//!
//! save_analysis(&analysis, Path::new("bracket.out.json"))?;
//! export_all_csv(&analysis, Path::new("out"))?;
//! # Ok::<(), bolt_core::errors::CalcError>(())
//! ```

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::calculations::SolveResult;
use crate::errors::{CalcError, CalcResult};
use crate::results::{to_csv, Analysis, AnalysisInput};

/// Load and validate an analysis input file.
///
/// # Returns
///
/// * `Err(CalcError::FileError)` - I/O error
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::InvalidInput)` - Parsed, but a value is out of range
pub fn load_input(path: &Path) -> CalcResult<AnalysisInput> {
    let mut file = File::open(path).map_err(|e| {
        CalcError::file_error("open", path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        CalcError::file_error("read", path.display().to_string(), e.to_string())
    })?;

    let input: AnalysisInput =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    input.validate()?;
    tracing::debug!(path = %path.display(), "loaded analysis input");
    Ok(input)
}

/// Save a complete analysis as pretty-printed JSON.
pub fn save_analysis(analysis: &Analysis, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(analysis).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;
    write_atomic(path, json.as_bytes())
}

/// Export one method's bolt force table as CSV.
pub fn export_csv(result: &SolveResult, path: &Path) -> CalcResult<()> {
    write_atomic(path, to_csv(result).as_bytes())
}

/// Export every method's table into `dir` as `<file stem>.csv`.
///
/// Creates `dir` if needed and returns the written paths in method order.
pub fn export_all_csv(analysis: &Analysis, dir: &Path) -> CalcResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| {
        CalcError::file_error("create directory", dir.display().to_string(), e.to_string())
    })?;

    let mut written = Vec::with_capacity(analysis.results.len());
    for (method, result) in &analysis.results {
        let path = dir.join(format!("{}.csv", method.file_stem()));
        export_csv(result, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// `<path>.tmp`, next to the target so the rename stays on one filesystem
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_atomic(path: &Path, contents: &[u8]) -> CalcResult<()> {
    write_atomic_with(path, |file| file.write_all(contents))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "file written");
    Ok(())
}

/// Write through `fill` into the temp sibling, sync, then rename over `path`.
/// The temp file is removed whenever any step fails.
fn write_atomic_with<F>(path: &Path, fill: F) -> CalcResult<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    let result = fill(&mut tmp_file)
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))
        .and_then(|()| {
            tmp_file.sync_all().map_err(|e| {
                CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
            })
        })
        .and_then(|()| {
            drop(tmp_file);
            fs::rename(&tmp_path, path).map_err(|e| {
                CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
            })
        });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
