use crate::cmdfile::{self, ParseParams};
use crate::compdb::CompileCommand;
use crate::error::{Error, Result};
use crate::progress::Progress;
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

/// Suffix of the per-object command files kbuild leaves next to objects.
const CMD_FILE_SUFFIX: &str = ".o.cmd";

/// Directory, relative to the build root, holding the kernel objects of
/// `target`. Always ends in `/`.
pub fn object_dir(target: &str) -> String {
    format!("out/target/product/{}/obj/KERNEL_OBJ/", target)
}

/// Make `path` absolute against the current directory and fold away `.`
/// and `..` components. Symlinks are not resolved.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_owned()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::io(path, e))?
            .join(path)
    };

    let mut result = PathBuf::new();
    for c in joined.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            c => result.push(c.as_os_str()),
        }
    }
    Ok(result)
}

/// Find all the cmd files below `path`, sorted. If `path` is not a
/// directory it is returned as the only entry.
pub fn find_cmd_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_owned()]);
    }
    let mut result = Vec::new();
    find_cmd_files_rec(path, &mut result)?;
    result.sort();
    Ok(result)
}

/// Search the file system recursively for cmd files. Symlinked
/// directories are not followed.
fn find_cmd_files_rec(path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(path).map_err(|e| Error::io(path, e))?;
    for entry in entries {
        let e = entry.map_err(|e| Error::io(path, e))?;
        let ft = e.file_type().map_err(|err| Error::io(e.path(), err))?;
        let p = e.path();
        if ft.is_dir() {
            find_cmd_files_rec(&p, result)?;
        } else if ft.is_symlink() && p.is_dir() {
            continue;
        } else if e.file_name().to_string_lossy().ends_with(CMD_FILE_SUFFIX) {
            result.push(p);
        }
    }

    Ok(())
}

/// Minimum number of files handed to a worker at once.
fn chunk_len(files: usize) -> usize {
    ((files as f64).sqrt() as usize).max(1)
}

/// Parse every cmd file and concatenate the entries. Files are spread over
/// the rayon pool; the first failure stops outstanding work and is
/// returned. Progress updates are drawn in completion order and
/// `finish` runs on both outcomes.
pub fn build_compdb(
    params: &ParseParams,
    cmd_files: &[PathBuf],
    progress: &dyn Progress,
) -> Result<Vec<CompileCommand>> {
    let total = cmd_files.len();
    let done = Mutex::new(0usize);
    progress.update(0, total);

    let per_file: Result<Vec<Vec<CompileCommand>>> = cmd_files
        .par_iter()
        .with_min_len(chunk_len(total))
        .map(|path| {
            let entries = cmdfile::parse_file(params, path)?;
            // held across the draw so frames never go backwards
            let mut n = done.lock().unwrap_or_else(|e| e.into_inner());
            *n += 1;
            progress.update(*n, total);
            Ok(entries)
        })
        .collect();
    progress.finish();

    Ok(per_file?.into_iter().flatten().collect())
}
