use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::line::{self, Line, LineKind};
use crate::section::{self, Block};

/// Key-value pairs of a single section.
pub type Properties = HashMap<String, String>;

/// Section name to properties.
pub type Sections = HashMap<String, Properties>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Leave out sections that have no properties.
    pub ignore_empty_sections: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            ignore_empty_sections: true,
        }
    }
}

/// Parses a document into its sections.
///
/// Dead lines are dropped before segmenting, as are any live lines before the first header.
/// Duplicate keys and duplicate sections resolve to the last occurrence.
///
/// # Errors
///
/// Fails on the first live line inside a section that is not a `key = value` property, and on
/// headers with an empty name. No partial result is returned.
pub fn parse<'a, I>(lines: I, options: ReadOptions) -> Result<Sections>
where
    I: IntoIterator<Item = Line<'a>>,
{
    let segments = section::segment(lines.into_iter().filter(Line::is_live));

    if let Some(first) = segments.preamble.first() {
        debug!(
            line = first.number,
            count = segments.preamble.len(),
            "discarding lines before the first section"
        );
    }

    let mut sections = Sections::with_capacity(segments.blocks.len());

    for block in &segments.blocks {
        let name = block.name();

        if name.is_empty() {
            return Err(Error::SectionNameEmpty {
                line: block.header().number,
            });
        }

        let properties = parse_block(block)?;

        if options.ignore_empty_sections && properties.is_empty() {
            continue;
        }

        if sections.insert(name.to_owned(), properties).is_some() {
            warn!(
                section = name,
                line = block.header().number,
                "duplicate section replaces the earlier one"
            );
        }
    }

    Ok(sections)
}

/// Parses in-memory text.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_str(text: &str, options: ReadOptions) -> Result<Sections> {
    parse(line::numbered(text), options)
}

fn parse_block(block: &Block<'_>) -> Result<Properties> {
    let mut properties = Properties::with_capacity(block.lines().len());

    for line in block.lines() {
        let (key, value) = (line.kind() == LineKind::Property)
            .then(|| line::split_property(line.text))
            .flatten()
            .ok_or_else(|| Error::MalformedProperty {
                line: line.number,
                text: line.text.to_owned(),
            })?;

        if properties.insert(key.to_owned(), value.to_owned()).is_some() {
            debug!(section = block.name(), key, "duplicate key replaces the earlier value");
        }
    }

    Ok(properties)
}
