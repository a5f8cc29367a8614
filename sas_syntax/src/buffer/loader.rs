//! Loading source files into memory under the compile-time size limits

use crate::config::compile_time::buffer::{MAX_BUFFER_SIZE, MAX_LINE_LENGTH};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BufferError {
    #[error("Buffer too large: {size} bytes (max: {max_size})")]
    TooLarge { size: usize, max_size: usize },

    #[error("Line {line} too long: {length} bytes (max: {max_length})")]
    LineTooLong {
        line: usize,
        length: usize,
        max_length: usize,
    },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl BufferError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            BufferError::TooLarge { .. } => codes::buffer::BUFFER_TOO_LARGE,
            BufferError::LineTooLong { .. } => codes::buffer::LINE_TOO_LONG,
            BufferError::InvalidEncoding { .. } => codes::buffer::INVALID_ENCODING,
            BufferError::Io { .. } => codes::buffer::IO_ERROR,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// Reject buffers the scanners are not sized for
pub fn check_limits(text: &str) -> Result<(), BufferError> {
    if text.len() > MAX_BUFFER_SIZE {
        return Err(BufferError::TooLarge {
            size: text.len(),
            max_size: MAX_BUFFER_SIZE,
        });
    }

    if let Some((index, line)) = text
        .split('\n')
        .enumerate()
        .find(|(_, line)| line.len() > MAX_LINE_LENGTH)
    {
        return Err(BufferError::LineTooLong {
            line: index + 1,
            length: line.len(),
            max_length: MAX_LINE_LENGTH,
        });
    }

    Ok(())
}

/// Read a source file as UTF-8 text within the buffer limits
pub fn load_file(path: &Path) -> Result<String, BufferError> {
    let display = path.display().to_string();
    log_debug!("Loading source file", "path" => &display);

    let metadata = fs::metadata(path).map_err(|e| io_error(&display, e))?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > MAX_BUFFER_SIZE {
        let err = BufferError::TooLarge {
            size,
            max_size: MAX_BUFFER_SIZE,
        };
        log_error!(err.error_code(), &err.to_string(), "path" => &display);
        return Err(err);
    }

    let bytes = fs::read(path).map_err(|e| io_error(&display, e))?;
    let text = String::from_utf8(bytes).map_err(|_| {
        let err = BufferError::InvalidEncoding {
            path: display.clone(),
        };
        log_error!(err.error_code(), &err.to_string());
        err
    })?;

    if let Err(err) = check_limits(&text) {
        log_error!(err.error_code(), &err.to_string(), "path" => &display);
        return Err(err);
    }

    log_success!(
        codes::success::BUFFER_LOADED,
        "Source buffer loaded",
        "path" => &display,
        "bytes" => text.len()
    );
    Ok(text)
}

fn io_error(path: &str, error: io::Error) -> BufferError {
    let err = BufferError::Io {
        path: path.to_string(),
        message: error.to_string(),
    };
    log_error!(err.error_code(), &err.to_string());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_load_file_reads_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "proc print;\nrun;\n").unwrap();

        let text = load_file(file.path()).unwrap();
        assert_eq!(text, "proc print;\nrun;\n");
    }

    #[test]
    fn test_load_file_rejects_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x64, 0x61, 0xff, 0xfe]).unwrap();

        assert_matches!(
            load_file(file.path()),
            Err(BufferError::InvalidEncoding { .. })
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("missing.sas")).unwrap_err();
        assert_matches!(err, BufferError::Io { .. });
        assert_eq!(err.error_code(), codes::buffer::IO_ERROR);
    }

    #[test]
    fn test_check_limits_line_length() {
        let text = format!("x;\n{}", "a".repeat(MAX_LINE_LENGTH + 1));
        assert_matches!(
            check_limits(&text),
            Err(BufferError::LineTooLong { line: 2, .. })
        );
        assert!(check_limits("data a; run;").is_ok());
    }
}
