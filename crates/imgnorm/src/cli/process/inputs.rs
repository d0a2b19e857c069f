//! Input discovery: expand files and directories into in-memory items.

use anyhow::Context;
use imgnorm_core::{FormatRegistry, InputItem};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand command-line inputs into a list of files.
///
/// Files named explicitly are always kept; their content decides whether they
/// decode. Directories are walked recursively for registered extensions and
/// their files sorted by path. Argument order is preserved and repeats are
/// dropped.
pub fn discover(inputs: &[PathBuf], registry: &FormatRegistry) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for input in inputs {
        if input.is_file() {
            push_unique(&mut files, input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
            let path = entry.path();
            if entry.file_type().is_file() && has_registered_extension(path, registry) {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        tracing::debug!("Found {} image(s) under {:?}", found.len(), input);

        for path in found {
            push_unique(&mut files, path);
        }
    }

    Ok(files)
}

/// Keep at most `max_items` files so the rest are never read. Returns how
/// many were skipped.
pub fn cap_files(files: &mut Vec<PathBuf>, max_items: usize) -> usize {
    let skipped = files.len().saturating_sub(max_items);
    if skipped > 0 {
        tracing::warn!(
            "{} inputs exceed the {} item limit; skipping the last {}",
            files.len(),
            max_items,
            skipped
        );
        files.truncate(max_items);
    }
    skipped
}

/// Read every file into an [`InputItem`] named after its file name.
pub fn read_inputs(files: &[PathBuf]) -> anyhow::Result<Vec<InputItem>> {
    files
        .iter()
        .map(|path| {
            let bytes =
                std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(InputItem::new(name, bytes))
        })
        .collect()
}

fn has_registered_extension(path: &Path, registry: &FormatRegistry) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| registry.supports_extension(ext))
        .unwrap_or(false)
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_walks_and_sorts_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(dir.path().join("a.JPG"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("sub").join("c.webp"), b"x").unwrap();

        let registry = FormatRegistry::builtin();
        let files = discover(&[dir.path().to_path_buf()], &registry).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "sub/c.webp"]);
    }

    #[test]
    fn test_explicit_files_keep_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join("z.png");
        let a = dir.path().join("a.dat");
        fs::write(&z, b"x").unwrap();
        fs::write(&a, b"x").unwrap();

        let registry = FormatRegistry::builtin();
        let files = discover(&[z.clone(), a.clone(), z.clone()], &registry).unwrap();
        assert_eq!(files, vec![z, a]);
    }

    #[test]
    fn test_cap_files_skips_the_tail() {
        let mut files: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{i}.png"))).collect();
        assert_eq!(cap_files(&mut files, 3), 2);
        assert_eq!(
            files,
            vec![
                PathBuf::from("0.png"),
                PathBuf::from("1.png"),
                PathBuf::from("2.png")
            ]
        );
        assert_eq!(cap_files(&mut files, 10), 0);
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_read_inputs_uses_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shoe.png");
        fs::write(&path, b"bytes").unwrap();

        let items = read_inputs(&[path]).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "shoe.png");
        assert_eq!(&*items[0].bytes, b"bytes");
    }

    #[test]
    fn test_read_inputs_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_inputs(&[dir.path().join("missing.png")]).is_err());
    }
}
