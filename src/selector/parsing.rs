use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while},
    combinator::{all_consuming, map, map_parser, rest, verify},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{preceded, terminated},
    IResult,
};

use super::Criteria;

/// Split selector text on whitespace and classify each step
pub(super) fn parse_selector(input: &str) -> IResult<&str, Vec<Criteria>> {
    terminated(
        many0(preceded(parse_whitespace, parse_criteria)),
        parse_whitespace,
    )(input)
}

fn parse_whitespace(input: &str) -> IResult<&str, &str> {
    take_while(char::is_whitespace)(input)
}

/// One whitespace-free step. The shapes are tried in priority order and the
/// bare tag form accepts anything, so this only fails on empty input.
fn parse_criteria(input: &str) -> IResult<&str, Criteria> {
    map_parser(
        take_till1(char::is_whitespace),
        alt((
            parse_id,
            all_consuming(parse_attribute),
            parse_class,
            parse_tag,
        )),
    )(input)
}

fn parse_remainder(input: &str) -> IResult<&str, &str> {
    verify(rest, |s: &str| !s.is_empty())(input)
}

/// Every split of `input` around `marker` that leaves something after it,
/// rightmost first
fn splits_from_right(input: &str, marker: char) -> impl Iterator<Item = (&str, &str)> {
    input
        .char_indices()
        .rev()
        .skip(1)
        .filter(move |&(_, c)| c == marker)
        .map(move |(i, c)| (&input[..i], &input[i + c.len_utf8()..]))
}

/// Split at the last `marker` that still has something after it. The whole
/// input is consumed.
fn split_at_last(input: &str, marker: char) -> IResult<&str, (&str, &str)> {
    match splits_from_right(input, marker).next() {
        Some(split) => Ok(("", split)),
        None => Err(nom::Err::Error(Error::new(input, ErrorKind::Char))),
    }
}

/// `tag#id` or `#id`
fn parse_id(input: &str) -> IResult<&str, Criteria> {
    let (r, (tag, id)) = split_at_last(input, '#')?;
    Ok((
        r,
        Criteria::Id {
            tag: tag.to_string(),
            id: id.to_string(),
        },
    ))
}

/// `tag[name=value]`. The tag runs to the last `[` and the name to the last
/// `=` that still leave a well-formed step.
fn parse_attribute(input: &str) -> IResult<&str, Criteria> {
    let (r, body) = verify(rest, |s: &str| s.ends_with(']'))(input)?;
    let body = &body[..body.len() - 1];
    splits_from_right(body, '[')
        .filter(|(tag, _)| !tag.is_empty())
        .find_map(|(tag, step)| {
            splits_from_right(step, '=')
                .find(|(name, _)| !name.is_empty())
                .map(|(name, value)| (tag, name, value))
        })
        .map(|(tag, name, value)| {
            (
                r,
                Criteria::Attribute {
                    tag: tag.to_string(),
                    name: name.to_string(),
                    value: value.to_string(),
                },
            )
        })
        .ok_or_else(|| nom::Err::Error(Error::new(input, ErrorKind::Verify)))
}

/// `tag.class` or `.class`
fn parse_class(input: &str) -> IResult<&str, Criteria> {
    let (r, (tag, class)) = split_at_last(input, '.')?;
    Ok((
        r,
        Criteria::Class {
            tag: tag.to_string(),
            class: class.to_string(),
        },
    ))
}

fn parse_tag(input: &str) -> IResult<&str, Criteria> {
    map(parse_remainder, |tag: &str| Criteria::Tag(tag.to_string()))(input)
}

#[cfg(test)]
fn criteria(input: &str) -> Criteria {
    parse_criteria(input).unwrap().1
}

#[cfg(test)]
#[test]
fn test_parse_id() {
    assert_eq!(
        criteria("div#foo"),
        Criteria::Id {
            tag: "div".to_string(),
            id: "foo".to_string()
        }
    );
    assert_eq!(
        criteria("#foo"),
        Criteria::Id {
            tag: "".to_string(),
            id: "foo".to_string()
        }
    );
    // `#` takes priority over `.`
    assert_eq!(
        criteria("a.b#c"),
        Criteria::Id {
            tag: "a.b".to_string(),
            id: "c".to_string()
        }
    );
    // Split at the last marker that has something after it
    assert_eq!(
        criteria("a#b#c"),
        Criteria::Id {
            tag: "a#b".to_string(),
            id: "c".to_string()
        }
    );
    assert_eq!(
        criteria("a#b#"),
        Criteria::Id {
            tag: "a".to_string(),
            id: "b#".to_string()
        }
    );
}

#[cfg(test)]
#[test]
fn test_parse_attribute() {
    assert_eq!(
        criteria("a[href=x]"),
        Criteria::Attribute {
            tag: "a".to_string(),
            name: "href".to_string(),
            value: "x".to_string()
        }
    );
    assert_eq!(
        criteria("a[data-x=a.b]"),
        Criteria::Attribute {
            tag: "a".to_string(),
            name: "data-x".to_string(),
            value: "a.b".to_string()
        }
    );
    assert_eq!(
        criteria("a[x=y=z]"),
        Criteria::Attribute {
            tag: "a".to_string(),
            name: "x=y".to_string(),
            value: "z".to_string()
        }
    );
    assert_eq!(criteria("a[x=]"), Criteria::Tag("a[x=]".to_string()));
    // Trailing junk after `]` is not an attribute step
    assert_eq!(criteria("a[x=y]z"), Criteria::Tag("a[x=y]z".to_string()));
    // The tag is required in this form
    assert_eq!(criteria("[x=y]"), Criteria::Tag("[x=y]".to_string()));
}

#[cfg(test)]
#[test]
fn test_parse_class() {
    assert_eq!(
        criteria("span.bar"),
        Criteria::Class {
            tag: "span".to_string(),
            class: "bar".to_string()
        }
    );
    assert_eq!(
        criteria(".bar"),
        Criteria::Class {
            tag: "".to_string(),
            class: "bar".to_string()
        }
    );
    assert_eq!(
        criteria("div.a.b"),
        Criteria::Class {
            tag: "div.a".to_string(),
            class: "b".to_string()
        }
    );
}

#[cfg(test)]
#[test]
fn test_parse_tag() {
    assert_eq!(criteria("td"), Criteria::Tag("td".to_string()));
    // Markers with nothing after them fall through to a bare tag
    assert_eq!(criteria("div#"), Criteria::Tag("div#".to_string()));
    assert_eq!(criteria("div."), Criteria::Tag("div.".to_string()));
    assert!(parse_criteria("").is_err());
}

#[cfg(test)]
#[test]
fn test_parse_selector() {
    let (r, steps) = parse_selector("  table.forumTable\n\ttd.thread ").unwrap();
    assert_eq!(r, "");
    assert_eq!(
        steps,
        vec![
            Criteria::Class {
                tag: "table".to_string(),
                class: "forumTable".to_string()
            },
            Criteria::Class {
                tag: "td".to_string(),
                class: "thread".to_string()
            },
        ]
    );
    assert_eq!(parse_selector("   ").unwrap(), ("", vec![]));
}
