//! Input reading with size enforcement and UTF-8 validation.
//!
//! `structeq-core` never touches the filesystem; every document the binary
//! compares or hashes is read here. Disk files are size-checked from their
//! metadata before any read, stdin is read through a capped reader, and every
//! failure becomes a [`CliError`] with exit code 2.
use std::io::{ErrorKind, Read as _};
use std::path::Path;

use crate::cli::PathOrStdin;
use crate::error::CliError;

/// Reads the whole of `source` as text, refusing inputs over `max_size`
/// bytes.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    match source {
        PathOrStdin::Path(path) => read_file(path, max_size),
        PathOrStdin::Stdin => read_stdin(max_size),
    }
}

/// Rejects argument lists naming stdin more than once.
pub fn ensure_single_stdin<'a>(
    sources: impl IntoIterator<Item = &'a PathOrStdin>,
) -> Result<(), CliError> {
    let count = sources
        .into_iter()
        .filter(|s| **s == PathOrStdin::Stdin)
        .count();
    if count > 1 {
        Err(CliError::StdinTwice)
    } else {
        Ok(())
    }
}

fn read_file(path: &Path, max_size: u64) -> Result<String, CliError> {
    let size = std::fs::metadata(path)
        .map_err(|e| io_error(&e, path))?
        .len();
    if size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(size),
        });
    }
    let bytes = std::fs::read(path).map_err(|e| io_error(&e, path))?;
    decode(bytes, &path.display().to_string())
}

fn io_error(e: &std::io::Error, path: &Path) -> CliError {
    let kind = e.kind();
    if kind == ErrorKind::NotFound {
        CliError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else if kind == ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        }
    }
}

/// Reads one byte past the limit so that an oversized stream is detected
/// without buffering it.
fn read_stdin(max_size: u64) -> Result<String, CliError> {
    let mut buf = Vec::new();
    std::io::stdin()
        .lock()
        .take(max_size.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|e| CliError::IoError {
            source: "-".to_owned(),
            detail: e.to_string(),
        })?;
    if buf.len() as u64 > max_size {
        return Err(CliError::FileTooLarge {
            source: "-".to_owned(),
            limit: max_size,
            actual: None,
        });
    }
    decode(buf, "-")
}

fn decode(bytes: Vec<u8>, source: &str) -> Result<String, CliError> {
    String::from_utf8(bytes).map_err(|e| CliError::InvalidUtf8 {
        source: source.to_owned(),
        byte_offset: e.utf8_error().valid_up_to(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use std::io::Write as _;
    use std::path::PathBuf;

    use super::*;

    fn temp_file_with(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("create temp file");
        f.write_all(contents).expect("write temp file");
        f
    }

    fn source(f: &tempfile::NamedTempFile) -> PathOrStdin {
        PathOrStdin::Path(f.path().to_path_buf())
    }

    #[test]
    fn reads_a_file() {
        let f = temp_file_with(br#"{"a": [1, 2]}"#);
        let text = read_input(&source(&f), 1024).expect("read");
        assert_eq!(text, r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn file_at_the_limit_is_accepted() {
        let f = temp_file_with(b"[1,2]");
        assert_eq!(read_input(&source(&f), 5).expect("read"), "[1,2]");
    }

    #[test]
    fn file_over_the_limit_reports_its_size() {
        let f = temp_file_with(b"[1,2,3,4]");
        let err = read_input(&source(&f), 4).expect_err("too large");
        assert_eq!(err.exit_code(), 2);
        let CliError::FileTooLarge {
            actual: Some(n), ..
        } = &err
        else {
            panic!("expected FileTooLarge, got {err:?}");
        };
        assert_eq!(*n, 9);
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let mut data = b"[\"ok".to_vec();
        data.push(0xFF);
        let f = temp_file_with(&data);
        let err = read_input(&source(&f), 1024).expect_err("bad utf-8");
        let CliError::InvalidUtf8 { byte_offset, .. } = &err else {
            panic!("expected InvalidUtf8, got {err:?}");
        };
        assert_eq!(*byte_offset, 4);
    }

    #[test]
    fn missing_file() {
        let missing = PathOrStdin::Path(PathBuf::from("/no/such/dir/doc.json"));
        let err = read_input(&missing, 1024).expect_err("missing");
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }

    #[test]
    fn stdin_may_appear_once() {
        let file = PathOrStdin::Path(PathBuf::from("a.json"));
        assert!(ensure_single_stdin([&PathOrStdin::Stdin, &file]).is_ok());
        assert!(matches!(
            ensure_single_stdin([&PathOrStdin::Stdin, &PathOrStdin::Stdin]),
            Err(CliError::StdinTwice)
        ));
    }
}
