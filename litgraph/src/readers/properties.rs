//! Fence attribute parsing.
//!
//! Parses attribute strings like `{.python #main file=output.py}` or
//! `python #main` into structured Property values, remembering where each
//! property sits in the original string.

use std::ops::Range;

use crate::errors::{LitgraphError, Result};

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while1},
    character::complete::{char, multispace0, multispace1, none_of},
    combinator::{consumed, map, opt, value},
    multi::many0,
    sequence::{delimited, preceded},
    IResult, Parser,
};

/// A single property from a fence opener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// A class property, e.g. `.python` or a bare leading `python`.
    Class(String),
    /// An ID property, e.g. `#main`.
    Id(String),
    /// A key-value attribute, e.g. `file="output.py"`.
    Attribute(String, String),
}

impl Property {
    /// Returns the class name if this is a class property.
    pub fn as_class(&self) -> Option<&str> {
        match self {
            Property::Class(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the ID if this is an ID property.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Property::Id(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the key-value pair if this is an attribute.
    pub fn as_attribute(&self) -> Option<(&str, &str)> {
        match self {
            Property::Attribute(k, v) => Some((k, v)),
            _ => None,
        }
    }
}

/// Check if a character is valid in an identifier.
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '/' | '.' | '#')
}

fn parse_ident(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_char).parse(input)
}

fn parse_class(input: &str) -> IResult<&str, Property> {
    map(preceded(char('.'), parse_ident), |s: &str| Property::Class(s.to_string())).parse(input)
}

fn parse_id(input: &str) -> IResult<&str, Property> {
    map(preceded(char('#'), parse_ident), |s: &str| Property::Id(s.to_string())).parse(input)
}

fn parse_quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        escaped_transform(
            none_of("\\\""),
            '\\',
            alt((
                value("\\", tag("\\")),
                value("\"", tag("\"")),
                value("\n", tag("n")),
                value("\t", tag("t")),
            )),
        ),
        char('"'),
    )
    .parse(input)
}

fn parse_value(input: &str) -> IResult<&str, String> {
    alt((
        parse_quoted_string,
        map(parse_ident, |s: &str| s.to_string()),
    ))
    .parse(input)
}

/// `key=value` or `key="value"`
fn parse_attribute(input: &str) -> IResult<&str, Property> {
    map((parse_ident, char('='), parse_value), |(key, _, val)| {
        Property::Attribute(key.to_string(), val)
    })
    .parse(input)
}

fn parse_plain_class(input: &str) -> IResult<&str, Property> {
    map(parse_ident, |s: &str| Property::Class(s.to_string())).parse(input)
}

/// A prefixed property together with the text it was parsed from.
fn parse_property(input: &str) -> IResult<&str, (&str, Property)> {
    consumed(alt((parse_class, parse_id, parse_attribute))).parse(input)
}

/// The first property may also be a bare language word.
fn parse_leading_property(input: &str) -> IResult<&str, (&str, Property)> {
    consumed(alt((parse_class, parse_id, parse_attribute, parse_plain_class))).parse(input)
}

fn parse_properties_inner(input: &str) -> IResult<&str, Vec<(&str, Property)>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, first) = opt(parse_leading_property).parse(input)?;

    let Some(first) = first else {
        return Ok((input, vec![]));
    };
    let (input, rest) = many0(preceded(multispace1, parse_property)).parse(input)?;
    let (input, _) = multispace0.parse(input)?;

    let mut props = vec![first];
    props.extend(rest);
    Ok((input, props))
}

/// Byte offset of `part` inside `whole`; `part` must be a subslice of `whole`.
fn offset_in(whole: &str, part: &str) -> usize {
    part.as_ptr() as usize - whole.as_ptr() as usize
}

/// Strip outer braces from a string like `{content}`.
fn strip_braces(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(s)
}

/// Parsed properties with convenient accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    /// All properties in order.
    pub items: Vec<Property>,
    /// Byte range of each property in the parsed string.
    spans: Vec<Range<usize>>,
}

impl Properties {
    /// Parses an attribute string, with or without surrounding braces.
    pub fn parse(input: &str) -> Result<Self> {
        let inner = strip_braces(input);
        match parse_properties_inner(inner) {
            Ok(("", parsed)) => {
                let mut items = Vec::with_capacity(parsed.len());
                let mut spans = Vec::with_capacity(parsed.len());
                for (text, prop) in parsed {
                    let start = offset_in(input, text);
                    spans.push(start..start + text.len());
                    items.push(prop);
                }
                Ok(Self { items, spans })
            }
            Ok((remaining, _)) => Err(LitgraphError::InvalidProperty(format!(
                "unexpected input '{}'",
                remaining
            ))),
            Err(e) => Err(LitgraphError::InvalidProperty(e.to_string())),
        }
    }

    /// Returns the first class (typically the language).
    pub fn first_class(&self) -> Option<&str> {
        self.items.iter().find_map(Property::as_class)
    }

    /// Returns the first ID.
    pub fn first_id(&self) -> Option<&str> {
        self.items.iter().find_map(Property::as_id)
    }

    /// Returns the first ID with the byte range of its name (without `#`)
    /// in the parsed string.
    pub fn first_id_span(&self) -> Option<(&str, Range<usize>)> {
        self.items
            .iter()
            .zip(&self.spans)
            .find_map(|(prop, span)| prop.as_id().map(|id| (id, span.start + 1..span.end)))
    }

    /// Gets an attribute value by key.
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .filter_map(Property::as_attribute)
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Returns true if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_language_and_id() {
        let props = Properties::parse("python #main").unwrap();
        assert_eq!(
            props.items,
            vec![
                Property::Class("python".to_string()),
                Property::Id("main".to_string())
            ]
        );
        assert_eq!(props.first_class(), Some("python"));
        assert_eq!(props.first_id(), Some("main"));
    }

    #[test]
    fn test_parse_pandoc_braces() {
        let props = Properties::parse("{.python #main file=out.py}").unwrap();
        assert_eq!(props.first_class(), Some("python"));
        assert_eq!(props.first_id(), Some("main"));
        assert_eq!(props.get_attribute("file"), Some("out.py"));
    }

    #[test]
    fn test_parse_quoted_attribute() {
        let props = Properties::parse(r#".py #x title="hello \"world\"""#).unwrap();
        assert_eq!(props.get_attribute("title"), Some("hello \"world\""));
    }

    #[test]
    fn test_first_id_wins() {
        let props = Properties::parse("{.rust #first #second}").unwrap();
        assert_eq!(props.first_id(), Some("first"));
    }

    #[test]
    fn test_first_id_span() {
        let info = " {.python #greet}";
        let props = Properties::parse(info).unwrap();
        let (id, span) = props.first_id_span().unwrap();
        assert_eq!(id, "greet");
        assert_eq!(&info[span], "greet");
    }

    #[test]
    fn test_first_id_span_bare() {
        let info = "rust #a::b file=x.rs";
        let props = Properties::parse(info).unwrap();
        let (_, span) = props.first_id_span().unwrap();
        assert_eq!(&info[span], "a::b");
    }

    #[test]
    fn test_empty_input() {
        let props = Properties::parse("").unwrap();
        assert!(props.is_empty());
        assert!(Properties::parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_input() {
        let err = Properties::parse("python !!!").unwrap_err();
        assert!(matches!(err, LitgraphError::InvalidProperty(_)));
        assert_eq!(err.to_string(), "Invalid property: unexpected input '!!!'");
    }

    #[test]
    fn test_no_id() {
        let props = Properties::parse("python").unwrap();
        assert!(props.first_id().is_none());
        assert!(props.first_id_span().is_none());
    }
}
