//! Compile-command database loading.
//!
//! Reads the `compile_commands.json` a build-description generator leaves in
//! the build directory and indexes it by source path relative to the source
//! root. Vendored sources under `external/` are excluded, they are not ours
//! to check.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Relative paths with this prefix belong to vendored third-party code.
const EXCLUDE_PREFIX: &str = "external";

/// One entry of the compile-command database, as written by the generator.
#[derive(Debug, Deserialize)]
struct Record {
    directory: PathBuf,
    file: PathBuf,
    command: String,
}

/// A source file together with the exact command line and working directory
/// used to compile it.
#[derive(Debug, Clone)]
pub struct CompileCommand {
    /// Path relative to the source root; the store key.
    pub src_path: PathBuf,
    /// Path as recorded in the database, resolvable from `work_dir`.
    pub file: PathBuf,
    pub invocation: String,
    pub work_dir: PathBuf,
}

/// Compile commands keyed by source path relative to the source root.
/// A `BTreeMap` keeps iteration order deterministic across runs.
pub type CompileCommands = BTreeMap<PathBuf, CompileCommand>;

fn read_records(build_dir: &Path) -> Result<Vec<Record>> {
    let db_path = build_dir.join("compile_commands.json");
    if !db_path.exists() {
        bail!("compile command database not found: {}", db_path.display());
    }

    let data = fs::read_to_string(&db_path)
        .with_context(|| format!("failed to read {}", db_path.display()))?;

    serde_json::from_str(&data)
        .with_context(|| format!("malformed compile command database: {}", db_path.display()))
}

/// Load the compile-command database from `build_dir`, keyed by path relative
/// to `source_dir`. Later records for the same path overwrite earlier ones.
pub fn read_compile_commands(source_dir: &Path, build_dir: &Path) -> Result<CompileCommands> {
    let mut commands = CompileCommands::new();

    for record in read_records(build_dir)? {
        let abs_path = normalize(&absolute(&record.directory.join(&record.file))?);
        let src_path = relative_to(&abs_path, &normalize(&absolute(source_dir)?));

        if src_path.starts_with(EXCLUDE_PREFIX) {
            continue;
        }

        commands.insert(
            src_path.clone(),
            CompileCommand {
                src_path,
                file: record.file,
                invocation: record.command,
                work_dir: record.directory,
            },
        );
    }

    Ok(commands)
}

/// Find the compile command for one specific file, compared by absolute path.
/// Used by the assembler-print helper, which has no source root to relativize
/// against; no vendor exclusion applies here.
pub fn find_command_for_file(
    build_dir: &Path,
    source_file: &Path,
) -> Result<Option<CompileCommand>> {
    let wanted = normalize(&absolute(source_file)?);

    for record in read_records(build_dir)? {
        let candidate = normalize(&absolute(&record.directory.join(&record.file))?);
        if candidate == wanted {
            return Ok(Some(CompileCommand {
                src_path: source_file.to_path_buf(),
                file: record.file,
                invocation: record.command,
                work_dir: record.directory,
            }));
        }
    }

    Ok(None)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("cannot make {} absolute", path.display()))
}

/// Lexically resolve `.` and `..` components. No filesystem access, the paths
/// in the database may name files that no longer exist.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Express `path` relative to `base`. Both must be absolute and normalized.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<_> = path.components().collect();
    let base_parts: Vec<_> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part);
    }
    rel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_db(build_dir: &Path, body: &str) {
        fs::write(build_dir.join("compile_commands.json"), body).unwrap();
    }

    #[test]
    fn test_relative_to_subdir() {
        let rel = relative_to(Path::new("/a/b/src/x.cpp"), Path::new("/a/b"));
        assert_eq!(rel, PathBuf::from("src/x.cpp"));
    }

    #[test]
    fn test_relative_to_sibling() {
        let rel = relative_to(Path::new("/a/other/x.cpp"), Path::new("/a/b"));
        assert_eq!(rel, PathBuf::from("../other/x.cpp"));
    }

    #[test]
    fn test_relative_to_stops_at_first_divergence() {
        let rel = relative_to(Path::new("/a/b/c/x.cpp"), Path::new("/a/d/c"));
        assert_eq!(rel, PathBuf::from("../../b/c/x.cpp"));
    }

    #[test]
    fn test_normalize_resolves_dots() {
        assert_eq!(
            normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
    }

    #[test]
    fn test_excludes_vendored_sources() {
        let dir = tempfile::tempdir().unwrap();
        write_db(
            dir.path(),
            r#"[
                {"directory": "/proj/build", "file": "/proj/src/a.cpp", "command": "c++ -c a"},
                {"directory": "/proj/build", "file": "/proj/external/lib/b.cpp", "command": "c++ -c b"}
            ]"#,
        );

        let commands = read_compile_commands(Path::new("/proj"), dir.path()).unwrap();
        assert_eq!(commands.len(), 1);
        assert!(commands.contains_key(Path::new("src/a.cpp")));
    }

    #[test]
    fn test_duplicate_paths_last_record_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_db(
            dir.path(),
            r#"[
                {"directory": "/proj/build", "file": "/proj/src/a.cpp", "command": "first"},
                {"directory": "/proj/build", "file": "/proj/src/a.cpp", "command": "second"}
            ]"#,
        );

        let commands = read_compile_commands(Path::new("/proj"), dir.path()).unwrap();
        assert_eq!(
            commands[Path::new("src/a.cpp")].invocation,
            "second"
        );
    }

    #[test]
    fn test_file_relative_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_db(
            dir.path(),
            r#"[{"directory": "/proj/build", "file": "../src/a.cpp", "command": "c++ -c a"}]"#,
        );

        let commands = read_compile_commands(Path::new("/proj"), dir.path()).unwrap();
        assert!(commands.contains_key(Path::new("src/a.cpp")));
        assert_eq!(
            commands[Path::new("src/a.cpp")].work_dir,
            PathBuf::from("/proj/build")
        );
    }

    #[test]
    fn test_missing_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_compile_commands(Path::new("/proj"), dir.path()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_malformed_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_db(dir.path(), "{ not an array ");
        let err = read_compile_commands(Path::new("/proj"), dir.path()).unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_find_command_for_file() {
        let dir = tempfile::tempdir().unwrap();
        write_db(
            dir.path(),
            r#"[{"directory": "/proj/build", "file": "/proj/src/a.cpp", "command": "c++ -c a"}]"#,
        );

        let found = find_command_for_file(dir.path(), Path::new("/proj/src/a.cpp")).unwrap();
        assert_eq!(found.unwrap().invocation, "c++ -c a");

        let missing = find_command_for_file(dir.path(), Path::new("/proj/src/b.cpp")).unwrap();
        assert!(missing.is_none());
    }
}
