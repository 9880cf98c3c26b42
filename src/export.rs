/*
 * @file export.rs
 * @brief Writes the latest reply to a downloadable text file
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Reply export.
//!
//! Every call overwrites the same file; there is no per-session or
//! per-reply naming.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ExportError;

/// Fixed name of the downloadable file.
pub const EXPORT_FILE_NAME: &str = "nutrition_advice.txt";

/// MIME type advertised for the downloadable file.
pub const EXPORT_MIME_TYPE: &str = "text/plain";

/// Handle to a written export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    /// Absolute or export-dir-relative location of the written file.
    pub path: PathBuf,
    pub file_name: &'static str,
    pub mime_type: &'static str,
}

/// Writes replies into `<dir>/nutrition_advice.txt`.
#[derive(Clone, Debug)]
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    /// Creates a writer targeting `dir`.
    ///
    /// # Details
    /// The directory is not created or checked here; a missing directory
    /// surfaces as an [`ExportError`] from [`ExportWriter::write`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the export file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(EXPORT_FILE_NAME)
    }

    /// Writes `content` byte-for-byte, replacing any previous export.
    ///
    /// # Errors
    /// Returns [`ExportError`] (rendered as `File creation error: ...`) when
    /// the file cannot be created or written.
    pub fn write(&self, content: &str) -> Result<ExportedFile, ExportError> {
        let path = self.path();
        fs::write(&path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "reply exported");
        Ok(ExportedFile {
            path,
            file_name: EXPORT_FILE_NAME,
            mime_type: EXPORT_MIME_TYPE,
        })
    }
}
