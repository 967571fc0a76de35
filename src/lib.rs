#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

//! Read and update INI files.
//!
//! ```no_run
//! use inifile::Ini;
//!
//! let ini = Ini::open("settings.ini").add_space(true);
//! ini.write_property("Network", "port", "8080")?;
//!
//! let sections = ini.read()?;
//! assert_eq!(sections["Network"]["port"], "8080");
//! # Ok::<(), inifile::Error>(())
//! ```
//!
//! Nothing guards concurrent access to the same file. Callers sharing a path between threads or
//! processes must serialize their calls.

pub mod error;
pub mod line;
pub mod parser;
pub mod section;
pub mod writer;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use error::{Error, Result};
pub use parser::{Properties, ReadOptions, Sections, parse, parse_str};
pub use writer::{Document, Property, WriteOptions};

/// Byte Order Mark (BOM) is used to signal the endianness of an encoding. The order `0xFF 0xFE`
/// strongly suggests that the encoding is using little-endian byte order.
///
/// <https://en.wikipedia.org/wiki/Byte_order_mark>
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Suffix of the copy of the previous contents made before each rewrite.
pub const BACKUP_SUFFIX: &str = ".tmp~";
const STAGING_SUFFIX: &str = ".new~";

/// Handle to an INI file on disk.
///
/// The handle holds no parsed state; every call reads the file again.
#[derive(Debug, Clone)]
pub struct Ini {
    path: PathBuf,
    options: WriteOptions,
}

impl Ini {
    /// Binds a handle to `path` without touching the file system.
    ///
    /// Reads and writes fail with [`Error::NotFound`] while the file does not exist.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: WriteOptions::default(),
        }
    }

    /// Binds a handle to `path`, creating an empty file (and its parent directories) if absent.
    ///
    /// # Errors
    ///
    /// Fails if the file or its directories cannot be created.
    pub fn open_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let ini = Self::open(path);

        if let Some(parent) = ini.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&ini.path)
            .map_err(|e| Error::io(&ini.path, e))?;

        Ok(ini)
    }

    #[must_use]
    pub fn add_space(mut self, add_space: bool) -> Self {
        self.options.add_space = add_space;
        self
    }

    #[must_use]
    pub fn keep_backup(mut self, keep_backup: bool) -> Self {
        self.options.keep_backup = keep_backup;
        self
    }

    #[must_use]
    pub fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn write_options(&self) -> WriteOptions {
        self.options
    }

    /// Reads the file, leaving out empty sections.
    ///
    /// # Errors
    ///
    /// See [`Ini::read_with`].
    pub fn read(&self) -> Result<Sections> {
        self.read_with(ReadOptions::default())
    }

    /// Reads the file into a map of section name to properties.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] if the file does not exist, and with a parse error if any
    /// line inside a section is malformed.
    pub fn read_with(&self, options: ReadOptions) -> Result<Sections> {
        let text = self.load()?;
        parse_str(&text, options)
    }

    /// Sets a single property, rewriting the file once.
    ///
    /// # Errors
    ///
    /// See [`Ini::write_many_with`].
    pub fn write_property(&self, section: &str, key: &str, value: &str) -> Result<()> {
        self.write_many(&[Property::new(section, key, value)])
    }

    /// Sets every property in order, rewriting the file once.
    ///
    /// # Errors
    ///
    /// See [`Ini::write_many_with`].
    pub fn write_many<'p, I>(&self, properties: I) -> Result<()>
    where
        I: IntoIterator<Item = &'p Property>,
    {
        self.write_many_with(properties, self.options)
    }

    /// Sets every property in order using `options`, rewriting the file once.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] if the file does not exist, and with a validation error if
    /// any property is invalid, in which case the file is left untouched. I/O errors during the
    /// rewrite leave the previous contents in place.
    pub fn write_many_with<'p, I>(&self, properties: I, options: WriteOptions) -> Result<()>
    where
        I: IntoIterator<Item = &'p Property>,
    {
        let text = self.load()?;
        let mut document = Document::parse(&text);
        document.set_all(properties, options)?;
        self.replace(&document.render(), options.keep_backup)
    }

    fn load(&self) -> Result<String> {
        let data = fs::read(&self.path).map_err(|e| Error::io(&self.path, e))?;
        decode_data(&data).ok_or_else(|| Error::Encoding {
            path: self.path.clone(),
        })
    }

    /// Atomically replaces the file with `content`.
    ///
    /// The new content is staged in a sibling file and renamed over the target, so an interrupted
    /// write leaves either the old or the new content.
    fn replace(&self, content: &str, keep_backup: bool) -> Result<()> {
        let staging = Staging::new(sibling(&self.path, STAGING_SUFFIX));
        let backup = sibling(&self.path, BACKUP_SUFFIX);

        {
            let mut file =
                fs::File::create(&staging.path).map_err(|e| Error::io(&staging.path, e))?;
            file.write_all(content.as_bytes())
                .and_then(|()| file.sync_all())
                .map_err(|e| Error::io(&staging.path, e))?;
        }

        let permissions = fs::metadata(&self.path)
            .map_err(|e| Error::io(&self.path, e))?
            .permissions();
        fs::set_permissions(&staging.path, permissions)
            .map_err(|e| Error::io(&staging.path, e))?;

        fs::copy(&self.path, &backup).map_err(|e| Error::io(&backup, e))?;

        if let Err(e) = fs::rename(&staging.path, &self.path) {
            _ = fs::remove_file(&backup);
            return Err(Error::io(&self.path, e));
        }
        staging.commit();

        // The new content is in place from here on.
        if !keep_backup {
            _ = fs::remove_file(&backup).inspect_err(|e| {
                warn!(path = %backup.display(), error = %e, "failed to remove backup");
            });
        }

        debug!(path = %self.path.display(), bytes = content.len(), "rewrote file");
        Ok(())
    }
}

/// Removes the staged file unless it was renamed into place.
struct Staging {
    path: PathBuf,
    committed: bool,
}

impl Staging {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if !self.committed {
            _ = fs::remove_file(&self.path);
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

// INI files written by Windows tools are frequently saved as UTF-16 LE.
fn decode_data(data: &[u8]) -> Option<String> {
    if let Some(data) = data.strip_prefix(BOM_UTF16_LE) {
        let chunks = data.chunks_exact(2);
        if !chunks.remainder().is_empty() {
            return None;
        }

        let utf16 = chunks
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect::<Vec<u16>>();

        char::decode_utf16(utf16)
            .collect::<std::result::Result<String, _>>()
            .ok()
    } else {
        let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);
        String::from_utf8(data.to_vec()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_with_and_without_bom() {
        assert_eq!(decode_data(b"[A]\nk=v\n").as_deref(), Some("[A]\nk=v\n"));
        assert_eq!(decode_data(b"\xEF\xBB\xBF[A]").as_deref(), Some("[A]"));
    }

    #[test]
    fn decodes_utf16_le() {
        let mut data = BOM_UTF16_LE.to_vec();
        for unit in "[A]\nk=v".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }

        assert_eq!(decode_data(&data).as_deref(), Some("[A]\nk=v"));
    }

    #[test]
    fn rejects_truncated_utf16_le() {
        let mut data = BOM_UTF16_LE.to_vec();
        data.extend_from_slice(&[b'[', 0, b'A', 0, b']']);

        assert_eq!(decode_data(&data), None);
    }

    #[test]
    fn builder_sets_write_options() {
        let ini = Ini::open("app.ini").add_space(true).keep_backup(true);
        assert_eq!(
            ini.write_options(),
            WriteOptions {
                add_space: true,
                keep_backup: true,
            }
        );

        let ini = ini.with_write_options(WriteOptions::default());
        assert_eq!(ini.write_options(), WriteOptions::default());
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(decode_data(b"[A]\nk=\xC3\x28"), None);
    }

    #[test]
    fn sibling_appends_suffix() {
        assert_eq!(
            sibling(Path::new("dir/app.ini"), BACKUP_SUFFIX),
            PathBuf::from("dir/app.ini.tmp~")
        );
    }
}
