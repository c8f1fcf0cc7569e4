use std::fs;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read code: {0}")]
    Read(#[from] std::io::Error),

    #[error("Unsupported file type: {path} (accepted: {accepted})")]
    UnsupportedFile { path: String, accepted: String },
}

/// The code about to be submitted, and the file it came from if any.
#[derive(Debug, Clone, Default)]
pub struct CodeBuffer {
    pub code: String,
    pub file_name: Option<String>,
}

impl CodeBuffer {
    pub fn from_text(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            file_name: None,
        }
    }

    /// Read the whole file as text. Only extensions in `accepted` are allowed.
    pub fn from_file(path: &Path, accepted: &[String]) -> Result<Self, InputError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let allowed = extension
            .as_deref()
            .is_some_and(|ext| accepted.iter().any(|a| a.trim_start_matches('.') == ext));
        if !allowed {
            return Err(InputError::UnsupportedFile {
                path: path.display().to_string(),
                accepted: accepted.join(", "),
            });
        }

        let code = fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = code.len(), "read code file");
        Ok(Self {
            code,
            file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        })
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, InputError> {
        let mut code = String::new();
        reader.read_to_string(&mut code)?;
        Ok(Self::from_text(code))
    }

    pub fn line_count(&self) -> usize {
        self.code.split('\n').count().max(1)
    }

    /// Code with a right-aligned line-number gutter.
    pub fn numbered(&self) -> String {
        let width = self.line_count().to_string().len();
        self.code
            .split('\n')
            .enumerate()
            .map(|(i, line)| format!("{:>width$} │ {}", i + 1, line, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
