use crate::line::{self, Line, LineKind};

/// A section header followed by every line up to the next header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    header: Line<'a>,
    lines: Vec<Line<'a>>,
}

impl<'a> Block<'a> {
    #[must_use]
    pub(crate) fn new(header: Line<'a>) -> Self {
        Self {
            header,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(&self) -> Line<'a> {
        self.header
    }

    /// Section name with brackets, comment markers and surrounding whitespace removed.
    #[must_use]
    pub fn name(&self) -> &'a str {
        line::section_name(self.header.text)
    }

    /// Lines following the header, in document order.
    #[must_use]
    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }

    pub(crate) fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }
}

/// A document split at its section headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments<'a> {
    /// Lines before the first section header.
    pub preamble: Vec<Line<'a>>,
    pub blocks: Vec<Block<'a>>,
}

/// Partitions `lines` into blocks, each starting at a live section header.
///
/// The read path feeds only live lines; the write path feeds the whole document so that comments,
/// blank lines and commented-out headers keep their place inside the section they appear in. A
/// header that appears twice yields two independent blocks.
pub fn segment<'a, I>(lines: I) -> Segments<'a>
where
    I: IntoIterator<Item = Line<'a>>,
{
    let mut segments = Segments::default();

    for line in lines {
        if line.kind() == LineKind::SectionHeader {
            segments.blocks.push(Block::new(line));
        } else if let Some(block) = segments.blocks.last_mut() {
            block.push(line);
        } else {
            segments.preamble.push(line);
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::numbered;

    fn texts<'a>(lines: &[Line<'a>]) -> Vec<&'a str> {
        lines.iter().map(|line| line.text).collect()
    }

    #[test]
    fn blocks_run_until_the_next_header() {
        let segments = segment(numbered("[A]\na=1\nb=2\n[B]\nc=3"));

        assert!(segments.preamble.is_empty());
        assert_eq!(segments.blocks.len(), 2);
        assert_eq!(segments.blocks[0].name(), "A");
        assert_eq!(texts(segments.blocks[0].lines()), vec!["a=1", "b=2"]);
        assert_eq!(segments.blocks[1].name(), "B");
        assert_eq!(texts(segments.blocks[1].lines()), vec!["c=3"]);
    }

    #[test]
    fn empty_sections_keep_their_block() {
        let segments = segment(numbered("[A]\n[B]\nk=v"));

        assert_eq!(segments.blocks.len(), 2);
        assert!(segments.blocks[0].lines().is_empty());
        assert_eq!(segments.blocks[0].header(), Line::new(1, "[A]"));
    }

    #[test]
    fn lines_before_first_header_form_the_preamble() {
        let segments = segment(numbered("; generated\nstray=1\n[A]\nk=v"));

        assert_eq!(texts(&segments.preamble), vec!["; generated", "stray=1"]);
        assert_eq!(segments.blocks.len(), 1);
    }

    #[test]
    fn repeated_headers_are_independent_blocks() {
        let segments = segment(numbered("[A]\nx=1\n[B]\n[A]\ny=2"));

        let names = segments.blocks.iter().map(Block::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["A", "B", "A"]);
        assert_eq!(texts(segments.blocks[2].lines()), vec!["y=2"]);
    }

    #[test]
    fn commented_headers_stay_in_their_section() {
        let segments = segment(numbered("[A]\nx=1\n; [Old]\ny=2\n[B]"));

        assert_eq!(segments.blocks.len(), 2);
        assert_eq!(segments.blocks[0].name(), "A");
        assert_eq!(texts(segments.blocks[0].lines()), vec!["x=1", "; [Old]", "y=2"]);
        assert_eq!(segments.blocks[1].name(), "B");
    }

    #[test]
    fn commented_header_before_first_section_is_preamble() {
        let segments = segment(numbered("; [Old]\n;k=1\n[A]"));

        assert_eq!(texts(&segments.preamble), vec!["; [Old]", ";k=1"]);
        assert_eq!(segments.blocks.len(), 1);
    }
}
