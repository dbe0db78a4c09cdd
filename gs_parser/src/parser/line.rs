use std::borrow::Cow;

use winnow::ascii::{escaped, space0, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, eof, opt, preceded, terminated};
use winnow::error::{StrContext, StrContextValue};
use winnow::token::{none_of, one_of, take_till};
use winnow::{ModalResult, Parser};

/// One line of a structured-text document
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineItem<'a> {
    Blank,
    Comment(&'a str),
    Section(&'a str),
    Property { key: &'a str, value: Cow<'a, str> },
}

pub(crate) fn line_item<'a>(input: &mut &'a str) -> ModalResult<LineItem<'a>> {
    preceded(
        space0,
        alt((
            eof.value(LineItem::Blank),
            comment.map(LineItem::Comment),
            section_header.map(LineItem::Section),
            property.map(|(key, value)| LineItem::Property { key, value }),
        )),
    )
    .parse_next(input)
}

/// `; text` or `# text`, running to the end of the line
pub(crate) fn comment<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    preceded(one_of([';', '#']), till_line_ending)
        .map(str::trim)
        .context(StrContext::Label("comment"))
        .parse_next(input)
}

/// `[Name]`, optionally followed by a comment
pub(crate) fn section_header<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited(
        '[',
        cut_err(
            take_till(1.., ['[', ']'])
                .map(str::trim)
                .verify(|name: &str| !name.is_empty()),
        )
        .context(StrContext::Label("section name")),
        cut_err((']', space0, opt(comment)))
            .context(StrContext::Expected(StrContextValue::CharLiteral(']'))),
    )
    .parse_next(input)
}

/// `key = value`. Unquoted values run to the end of the line, comment characters included.
pub(crate) fn property<'a>(input: &mut &'a str) -> ModalResult<(&'a str, Cow<'a, str>)> {
    (
        take_till(1.., '=')
            .map(str::trim)
            .verify(|key: &str| !key.is_empty())
            .context(StrContext::Label("key")),
        cut_err('=').context(StrContext::Expected(StrContextValue::CharLiteral('='))),
        space0,
        alt((
            terminated(quoted_value, (space0, opt(comment))).map(Cow::Owned),
            till_line_ending.map(|value: &'a str| Cow::Borrowed(value.trim_end())),
        )),
    )
        .map(|(key, _, _, value)| (key, value))
        .parse_next(input)
}

fn quoted_value(input: &mut &str) -> ModalResult<String> {
    preceded(
        '"',
        cut_err(terminated(
            escaped(
                none_of(['\\', '"']),
                '\\',
                alt(("\"".value("\""), "\\".value("\\"))),
            )
            .map(|()| ())
            .take(),
            '"',
        ))
        .context(StrContext::Label("quoted value")),
    )
    .map(unescape)
    .parse_next(input)
}

fn unescape(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                value.push(escaped);
            }
        } else {
            value.push(c);
        }
    }
    value
}
