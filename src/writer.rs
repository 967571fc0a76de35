//! In-place property updates.
//!
//! A [`Document`] keeps every line of the file verbatim, grouped the same way the segmenter groups
//! them. Updates only ever replace or insert single lines, so comments, blank lines and unrelated
//! sections survive a rewrite untouched.

use tracing::debug;

use crate::error::{Error, Result};
use crate::line::{self, LineKind};
use crate::section::{self, Block};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Format properties as `key = value` instead of `key=value`.
    pub add_space: bool,
    /// Keep a `.tmp~` copy of the previous file contents after a successful rewrite.
    pub keep_backup: bool,
}

/// A single `section`/`key`/`value` update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub section: String,
    pub key: String,
    pub value: String,
}

impl Property {
    #[must_use]
    pub fn new(
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Rejects updates that could not be read back as written.
    ///
    /// # Errors
    ///
    /// Section names must be non-empty and free of brackets and line breaks, keys must consist of
    /// word characters only, and values must fit on one line.
    pub fn validate(&self) -> Result<()> {
        let section = self.section.trim();
        if section.is_empty() || section.contains(['[', ']', '\r', '\n']) {
            return Err(Error::InvalidSectionName {
                name: self.section.clone(),
            });
        }

        if !line::is_valid_key(&self.key) {
            return Err(Error::InvalidKey {
                key: self.key.clone(),
            });
        }

        if self.value.contains(['\r', '\n']) {
            return Err(Error::InvalidValue {
                value: self.value.clone(),
            });
        }

        Ok(())
    }
}

impl<S, K, V> From<(S, K, V)> for Property
where
    S: Into<String>,
    K: Into<String>,
    V: Into<String>,
{
    fn from((section, key, value): (S, K, V)) -> Self {
        Self::new(section, key, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditBlock {
    header: String,
    lines: Vec<String>,
}

impl EditBlock {
    fn name(&self) -> &str {
        line::section_name(&self.header)
    }
}

impl From<&Block<'_>> for EditBlock {
    fn from(block: &Block<'_>) -> Self {
        Self {
            header: block.header().text.to_owned(),
            lines: block
                .lines()
                .iter()
                .map(|line| line.text.to_owned())
                .collect(),
        }
    }
}

/// Every line of an INI file, grouped into a preamble and section blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    preamble: Vec<String>,
    blocks: Vec<EditBlock>,
}

impl Document {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let segments = section::segment(line::numbered(text));

        Self {
            preamble: segments
                .preamble
                .iter()
                .map(|line| line.text.to_owned())
                .collect(),
            blocks: segments.blocks.iter().map(EditBlock::from).collect(),
        }
    }

    /// Sets `key` in `section` to `value`, creating the section or property if needed.
    ///
    /// Sections and keys are matched by exact, trimmed equality. If the key only exists commented
    /// out, that line is reactivated in place. A commented out header is reactivated only when
    /// nothing but dead lines follow it up to the next live header, so no live property changes
    /// section; otherwise a new section is appended.
    ///
    /// # Errors
    ///
    /// See [`Property::validate`]. The document is unchanged on error.
    pub fn set(&mut self, property: &Property, options: WriteOptions) -> Result<()> {
        property.validate()?;

        let section = property.section.trim();
        let formatted = format_property(&property.key, &property.value, options.add_space);

        let Some(index) = self
            .find_block(section)
            .or_else(|| self.reactivate(section))
        else {
            debug!(section, key = property.key.as_str(), "appending new section");
            self.blocks.push(EditBlock {
                header: format_header(section),
                lines: vec![formatted],
            });
            return Ok(());
        };

        let block = &mut self.blocks[index];

        match find_property(&block.lines, &property.key) {
            Some(i) => block.lines[i] = formatted,
            None => {
                // After the last live line, so trailing comments stay with the next section.
                let at = block
                    .lines
                    .iter()
                    .rposition(|line| line::is_live(line))
                    .map_or(0, |i| i + 1);
                debug!(section, key = property.key.as_str(), "inserting new key");
                block.lines.insert(at, formatted);
            }
        }

        Ok(())
    }

    /// Applies each update in order.
    ///
    /// # Errors
    ///
    /// Every update is validated before any is applied, so the document is unchanged on error.
    pub fn set_all<'p, I>(&mut self, properties: I, options: WriteOptions) -> Result<()>
    where
        I: IntoIterator<Item = &'p Property>,
    {
        let properties = properties.into_iter().collect::<Vec<_>>();

        for property in &properties {
            property.validate()?;
        }

        for property in properties {
            self.set(property, options)?;
        }

        Ok(())
    }

    /// Renders the document with `\n` line endings and a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();

        let lines = self.preamble.iter().chain(
            self.blocks
                .iter()
                .flat_map(|block| std::iter::once(&block.header).chain(&block.lines)),
        );

        for line in lines {
            output.push_str(line);
            output.push('\n');
        }

        output
    }

    /// The last block named `section`, the one a read reports.
    fn find_block(&self, section: &str) -> Option<usize> {
        self.blocks.iter().rposition(|block| block.name() == section)
    }

    /// Turns the first commented out `section` header with only dead lines after it into a live
    /// block, taking those trailing lines with it.
    fn reactivate(&mut self, section: &str) -> Option<usize> {
        let (at, tail) = if let Some(p) = disabled_header(&self.preamble, section) {
            (0, self.preamble.split_off(p))
        } else {
            let (i, p) = self
                .blocks
                .iter()
                .enumerate()
                .find_map(|(i, block)| disabled_header(&block.lines, section).map(|p| (i, p)))?;
            (i + 1, self.blocks[i].lines.split_off(p))
        };

        debug!(section, "reactivating commented out section");
        self.blocks.insert(
            at,
            EditBlock {
                header: format_header(section),
                lines: tail.into_iter().skip(1).collect(),
            },
        );

        Some(at)
    }
}

fn disabled_header(lines: &[String], section: &str) -> Option<usize> {
    (0..lines.len()).find(|&p| {
        let line = &lines[p];
        !line::is_live(line)
            && line::shape(line) == LineKind::SectionHeader
            && line::section_name(line) == section
            && !lines[p + 1..].iter().any(|line| line::is_live(line))
    })
}

/// The last live line setting `key`, or failing that the first commented out one.
///
/// Commented out keys after a commented out header belong to that disabled section and are left
/// alone.
fn find_property(lines: &[String], key: &str) -> Option<usize> {
    let sets_key = |line: &String| {
        line::shape(line) == LineKind::Property && line::property_key(line) == Some(key)
    };
    let own = lines
        .iter()
        .position(|line| line::shape(line) == LineKind::SectionHeader)
        .unwrap_or(lines.len());

    lines
        .iter()
        .rposition(|line| line::is_live(line) && sets_key(line))
        .or_else(|| lines[..own].iter().position(sets_key))
}

fn format_header(section: &str) -> String {
    format!("[{section}]")
}

fn format_property(key: &str, value: &str, add_space: bool) -> String {
    if add_space {
        format!("{key} = {value}")
    } else {
        format!("{key}={value}")
    }
}
