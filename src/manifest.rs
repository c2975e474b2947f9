//! Package manifest access
//!
//! `package.json` is read once per directory, its version field changed in
//! place and written back with the indentation the file already used.
//! [`ManifestDocument::write`] is the only code path that writes the file.

use crate::domain::Version;
use crate::error::{BumpError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Manifest file name looked up inside each project directory
pub const MANIFEST_FILE: &str = "package.json";

const DEFAULT_INDENT: &str = "  ";

/// Parsed manifest plus the formatting needed to write it back unchanged
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    path: PathBuf,
    data: Map<String, Value>,
    indent: String,
    trailing_newline: bool,
    crlf: bool,
}

impl ManifestDocument {
    /// Read the manifest of `directory`.
    ///
    /// # Returns
    /// * `Err(BumpError::NotFound)` - if the directory has no manifest
    /// * `Err(BumpError::Parse)` - if the file is not a JSON object
    pub fn read(directory: &Path) -> Result<Self> {
        let path = directory.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(BumpError::not_found(&path));
        }
        let text = fs::read_to_string(&path)?;
        Self::parse(path, &text)
    }

    /// Parse manifest text that was loaded from `path`
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let path = path.into();
        let value: Value = serde_json::from_str(text)
            .map_err(|e| BumpError::parse(format!("{}: {}", path.display(), e)))?;
        let Value::Object(data) = value else {
            return Err(BumpError::parse(format!(
                "{}: top level is not an object",
                path.display()
            )));
        };

        Ok(ManifestDocument {
            path,
            data,
            indent: detect_indent(text),
            trailing_newline: text.ends_with('\n'),
            crlf: text.contains("\r\n"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Indentation unit detected on read
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Raw version field, if present and a string
    pub fn version(&self) -> Option<&str> {
        self.data.get("version").and_then(Value::as_str)
    }

    pub fn set_version(&mut self, version: &Version) {
        self.data
            .insert("version".to_string(), Value::String(version.to_string()));
    }

    /// Serialize the whole document with the original indentation, line
    /// endings and trailing newline.
    ///
    /// Values are written in serde_json's canonical form, so a `\u00e9`
    /// escape comes back as the literal character and an exponent number
    /// such as `1e3` comes back as `1000.0`.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        self.data.serialize(&mut serializer)?;

        let mut text = String::from_utf8(buf)
            .map_err(|e| BumpError::parse(format!("{}: {}", self.path.display(), e)))?;
        if self.trailing_newline {
            text.push('\n');
        }
        if self.crlf {
            text = text.replace('\n', "\r\n");
        }
        Ok(text)
    }

    /// Write the document back to its original path.
    ///
    /// The new content goes to a temporary file in the same directory which
    /// is then renamed over the manifest, so readers never see a partial file.
    pub fn write(self) -> Result<()> {
        let text = self.render()?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.persist(&self.path).map_err(|e| BumpError::Io(e.error))?;
        Ok(())
    }
}

/// Leading whitespace of the first nested line, or two spaces.
fn detect_indent(text: &str) -> String {
    text.split_once('\n')
        .map(|(_, rest)| {
            rest.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect::<String>()
        })
        .filter(|indent| !indent.is_empty())
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}
