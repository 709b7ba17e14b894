//! The atom model: a non-owning view into an [`Input`] plus style/chomp
//! metadata (spec §3 "Atom", §4.4).

use std::cell::Ref;

use crate::error::Mark;
use crate::input::InputRef;

/// The lexical style of a scalar (or comment) atom.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AtomStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
    Uri,
    Comment,
}

/// Trailing-newline policy of a block scalar (spec glossary "Chomp").
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Chomp {
    /// A single trailing newline if the body had content; none otherwise.
    #[default]
    Clip,
    /// No trailing newlines.
    Strip,
    /// All trailing newlines.
    Keep,
}

/// A view of a slice of an [`Input`], plus style/chomp metadata.
///
/// Atoms never own memory; they borrow from their input. The invariant
/// `start_mark.index <= end_mark.index`, both referring to the same input,
/// holds for every atom constructed through [`Atom::new`].
#[derive(Clone)]
#[non_exhaustive]
pub struct Atom {
    pub input: InputRef,
    pub start_mark: Mark,
    pub end_mark: Mark,
    pub style: AtomStyle,
    pub chomp: Chomp,
    /// Explicit block-scalar indent increment (`|2`, `>3`, ...), if given.
    pub indent: Option<u32>,
    /// Absolute column of a literal/folded scalar's content lines, as
    /// detected (or computed from an explicit indicator) by the scanner.
    /// The raw span still includes this many leading columns on every
    /// content line; the formatter strips them before decoding.
    pub block_indent: Option<u32>,
}

impl Atom {
    pub fn new(input: InputRef, start_mark: Mark, end_mark: Mark, style: AtomStyle) -> Self {
        assert!(start_mark.index <= end_mark.index);
        Atom {
            input,
            start_mark,
            end_mark,
            style,
            chomp: Chomp::default(),
            indent: None,
            block_indent: None,
        }
    }

    #[must_use]
    pub fn with_chomp(mut self, chomp: Chomp) -> Self {
        self.chomp = chomp;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Option<u32>) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_block_indent(mut self, block_indent: Option<u32>) -> Self {
        self.block_indent = block_indent;
        self
    }

    /// The raw, undecoded source bytes the atom spans.
    pub fn raw(&self) -> Ref<'_, str> {
        let start = self.start_mark.index as usize;
        let end = self.end_mark.index as usize;
        Ref::map(self.input.text(), |t| &t[start..end])
    }

    /// The number of raw bytes spanned; a cheap upper bound used as the
    /// formatter's "storage hint" (the decoded text is never longer than
    /// the raw span, only ever shorter or equal).
    pub fn storage_hint(&self) -> usize {
        (self.end_mark.index - self.start_mark.index) as usize
    }

    /// Decode the atom into its logical scalar text.
    pub fn format(&self) -> String {
        crate::scalar::format(self)
    }
}

impl std::fmt::Debug for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atom")
            .field("style", &self.style)
            .field("chomp", &self.chomp)
            .field("start_mark", &self.start_mark)
            .field("end_mark", &self.end_mark)
            .finish()
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.style == other.style
            && self.chomp == other.chomp
            && self.indent == other.indent
            && self.block_indent == other.block_indent
            && self.start_mark == other.start_mark
            && self.end_mark == other.end_mark
            && std::rc::Rc::ptr_eq(&self.input, &other.input)
    }
}
