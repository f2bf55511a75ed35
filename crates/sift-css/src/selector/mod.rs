//! CSS Selector parsing
//!
//! This module splits a selector string into compound selectors and the
//! combinators between them, per
//! [Selectors Level 3](https://www.w3.org/TR/selectors-3/) with the
//! naming of [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
//!
//! Parsing never fails on odd input. Unreadable pieces degrade to
//! predicates that match nothing, and only an empty selector is rejected.

/// Attribute clause parsing and matching.
pub mod attribute;
/// The `An+B` argument of the `:nth-*` pseudo-classes.
pub mod nth;

use strum_macros::{Display, EnumString};

pub use attribute::{AttributeOperator, AttributeSelector};
pub use nth::NthArgument;

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
///
/// The comma of a selector list is modelled as one more combinator,
/// [`Combinator::Group`], so a whole selector is a flat list of compounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    Descendant,

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is
    /// a direct child of element A."
    Child,

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// "A selector of the form 'A + B' represents an element B that
    /// immediately follows element A, where A and B share the same parent."
    NextSibling,

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that
    /// follows element A (not necessarily immediately), where A and B share
    /// the same parent."
    SubsequentSibling,

    /// [§ 3.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
    /// "A comma-separated list of selectors represents the union of all
    /// elements selected by each of the individual selectors in the list."
    Group,
}

impl Combinator {
    /// The character that spells this combinator.
    #[must_use]
    pub const fn sign(self) -> char {
        match self {
            Self::Descendant => ' ',
            Self::Child => '>',
            Self::NextSibling => '+',
            Self::SubsequentSibling => '~',
            Self::Group => ',',
        }
    }

    /// The explicit (non-whitespace) combinator spelled by `ch`.
    const fn from_sign(ch: char) -> Option<Self> {
        match ch {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            ',' => Some(Self::Group),
            _ => None,
        }
    }
}

/// Pseudo-classes the engine knows how to evaluate.
///
/// Names parse ASCII case-insensitively from their CSS spelling
/// (`"nth-last-of-type".parse()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PseudoClassKind {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// An element with no children and no text.
    Empty,
    /// [§ 14.4.3 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.4.4 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.4.5 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 14.4.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild,
    /// [§ 14.4.2 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild,
    /// [§ 14.5.3 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.5.4 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.5.5 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,
    /// [§ 14.5.1 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType,
    /// [§ 14.5.2 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType,
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    /// "The negation pseudo-class, :not(), is a functional pseudo-class
    /// taking a selector list as an argument. It represents an element that
    /// is not represented by its argument."
    Not,
}

/// A pseudo-class as written: its name and optional parenthesised argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoClass {
    /// Name without the leading colon.
    pub name: String,
    /// Trimmed text between the parentheses, if there were any.
    pub argument: Option<String>,
}

impl PseudoClass {
    /// The evaluated pseudo-class this name refers to, if supported.
    #[must_use]
    pub fn kind(&self) -> Option<PseudoClassKind> {
        self.name.parse().ok()
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// `*` was present.
    pub universal: bool,
    /// `#id`
    pub id: Option<String>,
    /// `.class` names in order of appearance (repeats are kept).
    pub classes: Vec<String>,
    /// The first `[...]` clause.
    pub attribute: Option<AttributeSelector>,
    /// Type selector.
    pub tag: Option<String>,
    /// `::name`. Parsed so it does not leak into the tag, never matched.
    pub pseudo_element: Option<String>,
    /// `:name` or `:name(argument)`.
    pub pseudo_class: Option<PseudoClass>,
    /// How this compound relates to the one before it. `None` for the first.
    ///
    /// A compound opening a comma-separated part carries
    /// [`Combinator::Group`], or its own leading combinator when one follows
    /// the comma (`"li, > span"`).
    pub combinator: Option<Combinator>,
    /// A comma precedes this compound: the matches so far are complete and
    /// evaluation restarts from the scope.
    pub starts_group: bool,
}

impl CompoundSelector {
    /// Decompose one whitespace-free token into its simple selectors.
    ///
    /// Pieces are extracted in a fixed order, each removing its text before
    /// the next looks: universal, id, classes, attribute clause,
    /// pseudo-element, pseudo-class, and finally the first remaining name
    /// as the tag. Only text outside brackets and parentheses is examined.
    #[must_use]
    pub fn parse(token: &str, combinator: Option<Combinator>) -> Self {
        let mut text = token.to_string();

        let universal = take_universal(&mut text);
        let id = take_marked_name(&mut text, "#");
        let mut classes = Vec::new();
        while let Some(class) = take_marked_name(&mut text, ".") {
            classes.push(class);
        }
        let attribute = take_bracketed(&mut text).map(|clause| AttributeSelector::parse(&clause));
        let pseudo_element = take_marked_name(&mut text, "::");
        let pseudo_class = take_pseudo_class(&mut text);
        let tag = take_name(&text);

        Self {
            universal,
            id,
            classes,
            attribute,
            tag,
            pseudo_element,
            pseudo_class,
            combinator,
            starts_group: combinator == Some(Combinator::Group),
        }
    }

    /// Whether the compound carries no matchable predicate at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attribute.is_none()
            && self.tag.is_none()
            && self.pseudo_class.is_none()
    }
}

/// Parse a selector string into its compound selectors, left to right.
///
/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
///
/// The string is split at `,`, `>`, `+` and `~` outside brackets and
/// parentheses. The sign before each piece becomes its combinator. Each
/// piece is split again at whitespace: its first token keeps the piece's
/// combinator and every later token is a descendant. Empty pieces are
/// dropped, so a leading `> li` is a child of whatever scope the selector
/// is evaluated from. A comma is never dropped: the first compound after it
/// has [`CompoundSelector::starts_group`] set, even when another sign such
/// as `>` follows the comma and becomes its combinator.
///
/// Returns `None` for an empty or whitespace-only selector.
#[must_use]
pub fn parse_selector(selector: &str) -> Option<Vec<CompoundSelector>> {
    let mut compounds: Vec<CompoundSelector> = Vec::new();

    for segment in split_segments(selector) {
        let mut combinator = segment.combinator;
        let mut starts_group = segment.starts_group;
        for token in split_tokens(segment.text.trim()) {
            let mut compound = CompoundSelector::parse(token, combinator);
            compound.starts_group = starts_group;
            compounds.push(compound);
            combinator = Some(Combinator::Descendant);
            starts_group = false;
        }
    }

    // A leading comma has nothing to group with.
    if let Some(first) = compounds.first_mut() {
        first.starts_group = false;
        if first.combinator == Some(Combinator::Group) {
            first.combinator = None;
        }
    }

    if compounds.is_empty() {
        None
    } else {
        Some(compounds)
    }
}

/// Name characters: ASCII letters, digits, `_`, `-`, and anything non-ASCII.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

fn name_len(text: &str) -> usize {
    text.find(|c: char| !is_name_char(c)).unwrap_or(text.len())
}

/// One character of selector text with the bracket nesting around it.
#[derive(Debug, Clone, Copy)]
struct Scanned {
    offset: usize,
    ch: char,
    /// Nesting depth before this character.
    depth: usize,
    /// Nesting depth after this character.
    depth_after: usize,
}

impl Scanned {
    const fn top_level(self) -> bool {
        self.depth == 0
    }
}

/// Track `[...]` and `(...)` nesting through `text`.
///
/// Quoted strings inside brackets are opaque. If a quote is never closed,
/// the text is rescanned treating quotes as ordinary characters.
fn scan(text: &str) -> Vec<Scanned> {
    let (scanned, open_quote) = scan_nesting(text, true);
    if open_quote {
        scan_nesting(text, false).0
    } else {
        scanned
    }
}

fn scan_nesting(text: &str, quotes: bool) -> (Vec<Scanned>, bool) {
    let mut scanned = Vec::with_capacity(text.len());
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (offset, ch) in text.char_indices() {
        let before = depth;
        match quote {
            Some(open) => {
                if ch == open {
                    quote = None;
                }
            }
            None => match ch {
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                '"' | '\'' if quotes && depth > 0 => quote = Some(ch),
                _ => {}
            },
        }
        scanned.push(Scanned {
            offset,
            ch,
            depth: before,
            depth_after: depth,
        });
    }

    (scanned, quote.is_some())
}

/// A combinator-free piece of a selector and the signs before it.
#[derive(Debug, Clone, Copy)]
struct Segment<'s> {
    text: &'s str,
    /// The last sign before the piece.
    combinator: Option<Combinator>,
    /// Whether a comma came before the piece, even when another sign followed it.
    starts_group: bool,
}

/// Split at explicit combinators, pairing each piece with the signs before it.
fn split_segments(selector: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut combinator = None;
    let mut starts_group = false;

    for scanned in scan(selector) {
        if !scanned.top_level() {
            continue;
        }
        let Some(next) = Combinator::from_sign(scanned.ch) else {
            continue;
        };
        let text = &selector[start..scanned.offset];
        // An empty piece is dropped and the next one keeps its own sign. A
        // pending comma is never dropped with it.
        if !text.trim().is_empty() {
            segments.push(Segment {
                text,
                combinator,
                starts_group,
            });
            starts_group = false;
        }
        combinator = Some(next);
        starts_group |= next == Combinator::Group;
        start = scanned.offset + scanned.ch.len_utf8();
    }
    segments.push(Segment {
        text: &selector[start..],
        combinator,
        starts_group,
    });
    segments
}

/// Split a combinator-free piece at whitespace outside brackets.
fn split_tokens(segment: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for scanned in scan(segment) {
        if scanned.top_level() && scanned.ch.is_whitespace() {
            if start < scanned.offset {
                tokens.push(&segment[start..scanned.offset]);
            }
            start = scanned.offset + scanned.ch.len_utf8();
        }
    }
    if start < segment.len() {
        tokens.push(&segment[start..]);
    }
    tokens
}

/// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
fn take_universal(text: &mut String) -> bool {
    let stars: Vec<usize> = scan(text)
        .into_iter()
        .filter(|s| s.top_level() && s.ch == '*')
        .map(|s| s.offset)
        .collect();
    for &offset in stars.iter().rev() {
        let _ = text.remove(offset);
    }
    !stars.is_empty()
}

/// Remove the first top-level `marker` followed by a name, returning the name.
fn take_marked_name(text: &mut String, marker: &str) -> Option<String> {
    let (start, len) = scan(text).into_iter().filter(|s| s.top_level()).find_map(|s| {
        let after = text[s.offset..].strip_prefix(marker)?;
        let len = name_len(after);
        (len > 0).then_some((s.offset, marker.len() + len))
    })?;

    let name = text[start + marker.len()..start + len].to_string();
    text.replace_range(start..start + len, "");
    Some(name)
}

/// End offset (exclusive) of the group opened at `open`: just past the
/// character that brings nesting back to zero, or the end of the text.
fn group_end(scanned: &[Scanned], open: usize, text_len: usize) -> (usize, bool) {
    scanned
        .iter()
        .find(|s| s.offset > open && s.depth_after == 0)
        .map_or((text_len, false), |s| (s.offset + s.ch.len_utf8(), true))
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Remove the first top-level `[...]` and return the text between the
/// brackets. An unclosed bracket takes the rest of the token.
fn take_bracketed(text: &mut String) -> Option<String> {
    let scanned = scan(text);
    let open = scanned.iter().find(|s| s.top_level() && s.ch == '[')?.offset;
    let (end, closed) = group_end(&scanned, open, text.len());
    let inner_end = if closed { end - 1 } else { end };
    let clause = text[open + 1..inner_end].to_string();
    text.replace_range(open..end, "");
    Some(clause)
}

/// [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Remove the first top-level `:name` or `:name(argument)`.
fn take_pseudo_class(text: &mut String) -> Option<PseudoClass> {
    let scanned = scan(text);
    let (start, name_end) = scanned
        .iter()
        .filter(|s| s.top_level() && s.ch == ':')
        .find_map(|s| {
            let len = name_len(&text[s.offset + 1..]);
            (len > 0).then_some((s.offset, s.offset + 1 + len))
        })?;
    let name = text[start + 1..name_end].to_string();

    let (end, argument) = if text[name_end..].starts_with('(') {
        let (end, closed) = group_end(&scanned, name_end, text.len());
        let inner_end = if closed { end - 1 } else { end };
        (end, Some(text[name_end + 1..inner_end].trim().to_string()))
    } else {
        (name_end, None)
    };

    text.replace_range(start..end, "");
    Some(PseudoClass { name, argument })
}

/// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
///
/// The first top-level name left in the token.
fn take_name(text: &str) -> Option<String> {
    scan(text)
        .into_iter()
        .filter(|s| s.top_level() && is_name_char(s.ch))
        .find_map(|s| {
            let len = name_len(&text[s.offset..]);
            (len > 0).then(|| text[s.offset..s.offset + len].to_string())
        })
}
