//! File driver: one generated file per input file.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::codegen::GeneratorOptions;
use crate::error::{Error, Result};

/// Suffix replacing `.rs` in generated file names
pub const OUTPUT_SUFFIX: &str = "_restgen.rs";

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No annotated trait; nothing written
    Skipped,
    /// Output already up to date
    Unchanged(PathBuf),
    Written(PathBuf),
    /// Check mode: output missing or different from what would be generated
    Stale(PathBuf),
}

/// `photos.rs` becomes `photos_restgen.rs`, next to the input or in `out_dir`.
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}{OUTPUT_SUFFIX}");
    match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn is_generated(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(OUTPUT_SUFFIX))
}

/// Expand directories into the `.rs` files below them, sorted.
///
/// Files named explicitly are kept as given. Previously generated files are
/// never inputs.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.is_dir() {
            inputs.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry.map_err(|e| Error::Io {
                path: e.path().unwrap_or(path).to_path_buf(),
                source: e.into(),
            })?;
            let p = entry.path();
            if entry.file_type().is_file()
                && p.extension().is_some_and(|ext| ext == "rs")
                && !is_generated(p)
            {
                found.push(p.to_path_buf());
            }
        }
        found.sort();
        inputs.extend(found);
    }
    Ok(inputs)
}

/// Generate the output for `input` and write it, unless it is up to date.
///
/// With `check` set nothing is written; an out-of-date output is reported as
/// [`Outcome::Stale`].
pub fn process_file(
    input: &Path,
    out_dir: Option<&Path>,
    options: &GeneratorOptions,
    check: bool,
) -> Result<Outcome> {
    let source = fs::read_to_string(input).map_err(|source| Error::Io {
        path: input.to_path_buf(),
        source,
    })?;

    let Some(code) = crate::generate_source(&source, options)? else {
        tracing::debug!(input = %input.display(), "no annotated traits");
        return Ok(Outcome::Skipped);
    };

    let target = output_path(input, out_dir);
    // a missing or unreadable target just counts as different
    if fs::read_to_string(&target).is_ok_and(|existing| existing == code) {
        return Ok(Outcome::Unchanged(target));
    }
    if check {
        return Ok(Outcome::Stale(target));
    }

    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(&target, code).map_err(|source| Error::Io {
        path: target.clone(),
        source,
    })?;
    tracing::info!(input = %input.display(), output = %target.display(), "generated");
    Ok(Outcome::Written(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTOS: &str = r#"
        /// @GET("/photos/{id}")
        pub trait GetPhoto {
            /// @PATH("id")
            fn id(self, id: u64) -> Self;
            /// @SYNC("String")
            fn run(self) -> restclient::Result<String>;
        }
    "#;

    #[test]
    fn output_path_naming() {
        assert_eq!(
            output_path(Path::new("src/api/photos.rs"), None),
            PathBuf::from("src/api/photos_restgen.rs")
        );
        assert_eq!(
            output_path(Path::new("src/api/photos.rs"), Some(Path::new("gen"))),
            PathBuf::from("gen/photos_restgen.rs")
        );
    }

    #[test]
    fn writes_then_reports_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photos.rs");
        fs::write(&input, PHOTOS).unwrap();
        let options = GeneratorOptions::default();

        let outcome = process_file(&input, None, &options, false).unwrap();
        let target = dir.path().join("photos_restgen.rs");
        assert_eq!(outcome, Outcome::Written(target.clone()));
        let written = fs::read_to_string(&target).unwrap();
        assert!(written.starts_with(crate::BANNER));
        assert!(written.contains("GetPhotoImpl"));

        let outcome = process_file(&input, None, &options, false).unwrap();
        assert_eq!(outcome, Outcome::Unchanged(target));
    }

    #[test]
    fn check_mode_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photos.rs");
        fs::write(&input, PHOTOS).unwrap();
        let out = dir.path().join("gen");
        let options = GeneratorOptions::default();

        let outcome = process_file(&input, Some(&out), &options, true).unwrap();
        assert_eq!(outcome, Outcome::Stale(out.join("photos_restgen.rs")));
        assert!(!out.exists());

        process_file(&input, Some(&out), &options, false).unwrap();
        let outcome = process_file(&input, Some(&out), &options, true).unwrap();
        assert_eq!(outcome, Outcome::Unchanged(out.join("photos_restgen.rs")));
    }

    #[test]
    fn plain_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("plain.rs");
        fs::write(&input, "pub fn nothing() {}").unwrap();

        let outcome = process_file(&input, None, &GeneratorOptions::default(), false).unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(!dir.path().join("plain_restgen.rs").exists());
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.rs");
        let err = process_file(&input, None, &GeneratorOptions::default(), false).unwrap_err();
        assert!(matches!(err, Error::Io { path, .. } if path == input));
    }

    #[test]
    fn collect_inputs_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.rs"), "").unwrap();
        fs::write(dir.path().join("nested/a.rs"), "").unwrap();
        fs::write(dir.path().join("b_restgen.rs"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let inputs = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            inputs,
            vec![dir.path().join("b.rs"), dir.path().join("nested/a.rs")]
        );
    }
}
