use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::HeaderMode;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

const DOCKERIGNORE: &str = ".dockerignore";

#[derive(Debug, Error)]
pub enum PackError {
    #[error("Dockerfile not found at {}", .0.display())]
    DockerfileNotFound(PathBuf),

    #[error("failed to create build context archive {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk build context: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to add {} to build context: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A build context archive on local disk. The file is removed when the value
/// is dropped, whichever way the build attempt ends.
#[derive(Debug)]
pub struct BuildArchive {
    path: PathBuf,
}

impl BuildArchive {
    /// Reserves the system temp location for `app_name`'s archive.
    pub fn for_app(app_name: &str) -> Self {
        BuildArchive::in_dir(&std::env::temp_dir(), app_name)
    }

    /// `<dir>/coderun-build-<app_name>.tar.gz`
    pub fn in_dir(dir: &Path, app_name: &str) -> Self {
        BuildArchive::at(dir.join(format!("coderun-build-{app_name}.tar.gz")))
    }

    pub fn at(path: PathBuf) -> Self {
        BuildArchive { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BuildArchive {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("removed build context archive {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "failed to remove build context archive {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Fails fast when `<context_dir>/<dockerfile_path>` is not a regular file.
pub fn validate_dockerfile(context_dir: &Path, dockerfile_path: &str) -> Result<(), PackError> {
    let full_path = context_dir.join(dockerfile_path);
    if full_path.is_file() {
        Ok(())
    } else {
        Err(PackError::DockerfileNotFound(PathBuf::from(dockerfile_path)))
    }
}

/// Dot-prefixed entries are left out, apart from a `.dockerignore` file.
/// A skipped directory is not descended into.
fn is_excluded(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') && !(name == DOCKERIGNORE && !entry.file_type().is_dir())
}

/// Entry name inside the archive: relative to the context root, `/`-separated.
fn archive_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Writes `source_dir` as a gzip-compressed tar stream to `destination`.
///
/// Entries are visited in file-name order with normalized header metadata, so
/// the same tree always produces the same archive. Symlinks are stored as links.
pub fn pack(source_dir: &Path, destination: &Path) -> Result<(), PackError> {
    let create_err = |source| PackError::Create {
        path: destination.to_path_buf(),
        source,
    };

    let file = File::create(destination).map_err(create_err)?;
    // The destination may live inside the tree being walked.
    let destination = destination.canonicalize().map_err(create_err)?;

    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.mode(HeaderMode::Deterministic);
    builder.follow_symlinks(false);

    let walker = WalkDir::new(source_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry));

    let mut count = 0usize;
    for entry in walker {
        let entry = entry?;
        let Some(name) = archive_name(source_dir, entry.path()) else {
            continue;
        };
        let append_err = |source| PackError::Append {
            path: entry.path().to_path_buf(),
            source,
        };

        if entry.file_type().is_dir() {
            builder
                .append_dir(&name, entry.path())
                .map_err(append_err)?;
        } else {
            if entry.file_type().is_file()
                && entry
                    .path()
                    .canonicalize()
                    .is_ok_and(|p| p == destination)
            {
                log::debug!("skipping archive itself at {}", entry.path().display());
                continue;
            }
            builder
                .append_path_with_name(entry.path(), &name)
                .map_err(append_err)?;
        }
        count += 1;
    }

    let encoder = builder.into_inner().map_err(create_err)?;
    encoder.finish().map_err(create_err)?;
    log::debug!("packed {count} entries from {}", source_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;

    fn entries(archive: &Path) -> Vec<String> {
        let file = File::open(archive).unwrap();
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        tar.entries()
            .unwrap()
            .map(|e| {
                e.unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .trim_end_matches('/')
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn hidden_entries_are_skipped_except_dockerignore() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join(".git/objects")).unwrap();
        fs::write(src.path().join(".git/HEAD"), "ref").unwrap();
        fs::write(src.path().join(".git/objects/ab"), "blob").unwrap();
        fs::write(src.path().join(".env"), "SECRET=1").unwrap();
        fs::write(src.path().join(".dockerignore"), "target\n").unwrap();
        fs::write(src.path().join("app.py"), "print('hi')").unwrap();

        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("ctx.tar.gz");
        pack(src.path(), &archive).unwrap();

        let names = entries(&archive);
        assert_eq!(names, vec![".dockerignore", "app.py"]);
    }

    #[test]
    fn nested_paths_are_relative_and_forward_slashed() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("src/lib")).unwrap();
        fs::write(src.path().join("src/lib/mod.py"), "x = 1").unwrap();
        fs::write(src.path().join("Dockerfile"), "FROM scratch").unwrap();

        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("ctx.tar.gz");
        pack(src.path(), &archive).unwrap();

        let names = entries(&archive);
        assert_eq!(names, vec!["Dockerfile", "src", "src/lib", "src/lib/mod.py"]);
    }

    #[test]
    fn file_content_is_preserved() {
        use std::io::Read;

        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("main.go"), "package main").unwrap();
        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("ctx.tar.gz");
        pack(src.path(), &archive).unwrap();

        let mut tar = tar::Archive::new(GzDecoder::new(File::open(&archive).unwrap()));
        let mut entry = tar.entries().unwrap().next().unwrap().unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "package main");
    }

    #[test]
    fn archive_inside_context_is_not_packed() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("app.py"), "print('hi')").unwrap();
        let archive = src.path().join("ctx.tar.gz");

        pack(src.path(), &archive).unwrap();

        assert_eq!(entries(&archive), vec!["app.py"]);
    }

    #[test]
    fn packing_is_deterministic() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("b.txt"), "b").unwrap();
        fs::write(src.path().join("a.txt"), "a").unwrap();
        let out = tempfile::tempdir().unwrap();
        let first = out.path().join("one.tar.gz");
        let second = out.path().join("two.tar.gz");

        pack(src.path(), &first).unwrap();
        pack(src.path(), &second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn dockerfile_check() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir(src.path().join("docker")).unwrap();
        fs::write(src.path().join("docker/Dockerfile.prod"), "FROM scratch").unwrap();

        assert!(validate_dockerfile(src.path(), "docker/Dockerfile.prod").is_ok());
        let err = validate_dockerfile(src.path(), "Dockerfile").unwrap_err();
        assert!(matches!(err, PackError::DockerfileNotFound(_)));
        // a directory is not a Dockerfile
        assert!(validate_dockerfile(src.path(), "docker").is_err());
    }

    #[test]
    fn archive_guard_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.tar.gz");
        {
            let archive = BuildArchive::at(path.clone());
            fs::write(archive.path(), "data").unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());

        // nothing written, nothing to remove
        drop(BuildArchive::at(dir.path().join("never-created.tar.gz")));
    }

    #[test]
    fn temp_location_is_named_after_app() {
        let archive = BuildArchive::for_app("my-app");
        assert!(archive.path().ends_with("coderun-build-my-app.tar.gz"));
        assert!(archive.path().starts_with(std::env::temp_dir()));
    }
}
