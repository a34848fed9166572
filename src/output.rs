//! Output file helpers

use crate::error::OcrError;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of the text file written next to each image in batch mode
pub const OUTPUT_SUFFIX: &str = ".ocr.txt";

/// Write `text` to `path` through a sibling `.tmp` file and a rename
///
/// Readers never observe a partially written file. Parent directories are
/// created as needed.
pub fn write_text_atomic(path: &Path, text: &str) -> Result<(), OcrError> {
    let output_error = |source| OcrError::Output {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(output_error)?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, text).map_err(output_error)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        output_error(e)
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Output path for an image: `<dir>/<stem>.ocr.txt`
pub fn output_path_for(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    image.with_file_name(format!("{}{}", stem, OUTPUT_SUFFIX))
}

/// True when `output` exists and is at least as new as `source`
///
/// Any metadata error (missing source included) counts as stale.
pub fn is_up_to_date(source: &Path, output: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified());
    match (modified(source), modified(output)) {
        (Ok(src), Ok(out)) => out >= src,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a/b/label.ocr.txt");

        write_text_atomic(&out, "S-24-0193\nHE\n").unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "S-24-0193\nHE\n");
        assert!(!tmp_path(&out).exists());
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("label.ocr.txt");
        fs::write(&out, "old").unwrap();

        write_text_atomic(&out, "新しい").unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "新しい");
    }

    #[test]
    fn test_write_into_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = write_text_atomic(&blocker.join("out.txt"), "x").unwrap_err();
        assert_eq!(err.code(), "OUTPUT_ERROR");
    }

    #[test]
    fn test_tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/x.ocr.txt")),
            PathBuf::from("/data/x.ocr.txt.tmp")
        );
    }

    #[test]
    fn test_output_path_for_image() {
        assert_eq!(
            output_path_for(Path::new("/slides/P1911642/label.jpg")),
            PathBuf::from("/slides/P1911642/label.ocr.txt")
        );
        assert_eq!(
            output_path_for(Path::new("macro.v2.png")),
            PathBuf::from("macro.v2.ocr.txt")
        );
    }

    #[test]
    fn test_up_to_date_compares_mtimes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("label.png");
        let out = dir.path().join("label.ocr.txt");
        fs::write(&src, "img").unwrap();

        assert!(!is_up_to_date(&src, &out));

        fs::write(&out, "text").unwrap();
        let now = SystemTime::now();
        set_mtime(&src, now - Duration::from_secs(60));
        set_mtime(&out, now);
        assert!(is_up_to_date(&src, &out));

        set_mtime(&src, now + Duration::from_secs(60));
        assert!(!is_up_to_date(&src, &out));
    }

    #[test]
    fn test_missing_source_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("label.ocr.txt");
        fs::write(&out, "text").unwrap();
        assert!(!is_up_to_date(&dir.path().join("gone.png"), &out));
    }
}
