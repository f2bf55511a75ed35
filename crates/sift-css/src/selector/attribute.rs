//! Attribute clauses: `[name]`, `[name op value]`, `[name op value i]`.
//!
//! [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)

use std::str::FromStr;

use strum_macros::{Display, EnumString};

use super::is_name_char;

/// Attribute value operators per [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation)
/// and [§ 6.2](https://www.w3.org/TR/selectors-4/#attribute-substrings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AttributeOperator {
    /// `[att=val]` "Represents an element with the att attribute whose value
    /// is exactly 'val'."
    #[strum(serialize = "=")]
    Equals,

    /// `[att~=val]` "Represents an element with the att attribute whose value
    /// is a whitespace-separated list of words, one of which is exactly 'val'."
    #[strum(serialize = "~=")]
    Includes,

    /// `[att|=val]` "Represents an element with the att attribute, its value
    /// either being exactly 'val' or beginning with 'val' immediately
    /// followed by '-'."
    #[strum(serialize = "|=")]
    DashMatch,

    /// `[att^=val]` "Represents an element with the att attribute whose value
    /// begins with the prefix 'val'."
    #[strum(serialize = "^=")]
    PrefixMatch,

    /// `[att$=val]` "Represents an element with the att attribute whose value
    /// ends with the suffix 'val'."
    #[strum(serialize = "$=")]
    SuffixMatch,

    /// `[att*=val]` "Represents an element with the att attribute whose value
    /// contains at least one instance of the substring 'val'."
    #[strum(serialize = "*=")]
    SubstringMatch,
}

/// The text between the brackets of an attribute clause, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name. Empty when the clause had no readable name, in which
    /// case nothing matches.
    pub name: String,
    /// Operator and value. `None` is a presence check.
    pub condition: Option<(AttributeOperator, String)>,
    /// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
    /// Set by a trailing `i` flag.
    pub case_insensitive: bool,
}

impl AttributeSelector {
    /// Parse the inside of `[...]`.
    ///
    /// The name is the first run of name characters, so stray punctuation
    /// before it is ignored. Values may be quoted or bare. An operator whose
    /// value cannot be read degrades to a presence check.
    #[must_use]
    pub fn parse(clause: &str) -> Self {
        let start = clause.find(is_name_char).unwrap_or(clause.len());
        let rest = &clause[start..];
        let name_len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        let name = rest[..name_len].to_string();
        let rest = rest[name_len..].trim_start();

        let mut selector = Self {
            name,
            condition: None,
            case_insensitive: false,
        };

        let Some((operator, rest)) = parse_operator(rest) else {
            return selector;
        };
        let Some((value, rest)) = parse_value(rest.trim_start()) else {
            return selector;
        };

        let flag = rest.trim();
        let flag = flag.strip_suffix(']').unwrap_or(flag).trim();
        selector.condition = Some((operator, value));
        selector.case_insensitive = flag.eq_ignore_ascii_case("i");
        selector
    }

    /// Test an element's value for this attribute (`None` when absent).
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        if self.name.is_empty() {
            return false;
        }
        let Some(value) = value else {
            return false;
        };
        let Some((operator, expected)) = &self.condition else {
            return true;
        };

        let (value, expected) = if self.case_insensitive {
            (value.to_ascii_lowercase(), expected.to_ascii_lowercase())
        } else {
            (value.to_string(), expected.clone())
        };

        match operator {
            AttributeOperator::Equals => value == expected,
            AttributeOperator::Includes => value
                .split_ascii_whitespace()
                .any(|word| word == expected),
            AttributeOperator::DashMatch => value
                .strip_prefix(expected.as_str())
                .is_some_and(|tail| tail.is_empty() || tail.starts_with('-')),
            AttributeOperator::PrefixMatch => value.starts_with(expected.as_str()),
            AttributeOperator::SuffixMatch => value.ends_with(expected.as_str()),
            AttributeOperator::SubstringMatch => value.contains(expected.as_str()),
        }
    }
}

fn parse_operator(text: &str) -> Option<(AttributeOperator, &str)> {
    [2, 1].into_iter().find_map(|len| {
        let token = text.get(..len)?;
        AttributeOperator::from_str(token)
            .ok()
            .map(|operator| (operator, &text[len..]))
    })
}

/// Read a quoted string or a bare value; returns the value and the text after it.
fn parse_value(text: &str) -> Option<(String, &str)> {
    let mut chars = text.char_indices();
    match chars.next()? {
        (_, quote @ ('"' | '\'')) => {
            let close = chars.find(|&(_, c)| c == quote)?.0;
            Some((text[1..close].to_string(), &text[close + 1..]))
        }
        _ => {
            let len = text
                .find(|c: char| !(is_name_char(c) || c == '.'))
                .unwrap_or(text.len());
            if len == 0 {
                return None;
            }
            Some((text[..len].to_string(), &text[len..]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presence() {
        let attr = AttributeSelector::parse("data-target");
        assert_eq!(attr.name, "data-target");
        assert_eq!(attr.condition, None);
        assert!(attr.matches(Some("")));
        assert!(!attr.matches(None));
    }

    #[test]
    fn test_parse_operators() {
        for (clause, operator) in [
            ("a=b", AttributeOperator::Equals),
            ("a~=b", AttributeOperator::Includes),
            ("a|=b", AttributeOperator::DashMatch),
            ("a ^= b", AttributeOperator::PrefixMatch),
            ("a$=b", AttributeOperator::SuffixMatch),
            ("a*=b", AttributeOperator::SubstringMatch),
        ] {
            let attr = AttributeSelector::parse(clause);
            assert_eq!(attr.condition, Some((operator, "b".to_string())), "{clause}");
        }
    }

    #[test]
    fn test_parse_quoted_value_and_flag() {
        let attr = AttributeSelector::parse("data-target = \"Other page\" i");
        assert_eq!(
            attr.condition,
            Some((AttributeOperator::Equals, "Other page".to_string()))
        );
        assert!(attr.case_insensitive);
        assert!(attr.matches(Some("other PAGE")));
    }

    #[test]
    fn test_parse_skips_stray_quote_before_name() {
        let attr = AttributeSelector::parse("\"data-target*=la");
        assert_eq!(attr.name, "data-target");
        assert_eq!(
            attr.condition,
            Some((AttributeOperator::SubstringMatch, "la".to_string()))
        );
    }

    #[test]
    fn test_operator_without_value_is_presence_check() {
        let attr = AttributeSelector::parse("src=");
        assert_eq!(attr.condition, None);
        assert!(attr.matches(Some("anything")));
    }

    #[test]
    fn test_empty_clause_matches_nothing() {
        let attr = AttributeSelector::parse("");
        assert!(!attr.matches(Some("value")));
    }

    #[test]
    fn test_matches_operators() {
        let dash = AttributeSelector::parse("lang|=en");
        assert!(dash.matches(Some("en")));
        assert!(dash.matches(Some("en-us")));
        assert!(!dash.matches(Some("english")));

        let words = AttributeSelector::parse("class~=top");
        assert!(words.matches(Some("top image")));
        assert!(!words.matches(Some("topmost")));

        let prefix = AttributeSelector::parse("data-target^=O");
        assert!(prefix.matches(Some("Olala")));
        assert!(!prefix.matches(Some("olala")));

        let prefix_i = AttributeSelector::parse("data-target^=o i");
        assert!(prefix_i.matches(Some("Olala")));
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(AttributeOperator::DashMatch.to_string(), "|=");
        assert_eq!(AttributeOperator::from_str("*="), Ok(AttributeOperator::SubstringMatch));
    }
}
