use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_until, take_while, take_while1},
    character::complete::{char, digit1, hex_digit1, multispace0, multispace1, satisfy},
    combinator::{map, map_res, opt, recognize, rest},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use std::collections::VecDeque;
use tracing::trace;

/// A single markup event, in document order
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Event {
    Open {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Close(String),
    Text(String),
}

/// Elements whose content is taken verbatim up to the matching close tag
static RAW_TEXT: &[&str] = &["script", "style"];

/// Lazy, tolerant tokenizer over a markup string. Never fails: anything that
/// isn't a recognisable tag, comment or declaration comes out as text.
pub struct Tokenizer<'a> {
    source: &'a str,
    input: &'a str,
    pending: VecDeque<Event>,
    raw_text: Option<String>,
    // Byte offset of the last `>` in `source`. Past it only comments can parse.
    last_close: Option<usize>,
}

pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer {
        source: input,
        input,
        pending: VecDeque::new(),
        raw_text: None,
        last_close: input.rfind('>'),
    }
}

/// What a single markup construct at `<` turned into
#[derive(Debug, Eq, PartialEq)]
enum Markup {
    Ignored,
    Open {
        tag: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.input.is_empty() {
                return None;
            }
            if let Some(name) = self.raw_text.take() {
                let (content, remaining) = split_raw_text(self.input, &name);
                self.input = remaining;
                if !content.is_empty() {
                    return Some(Event::Text(content.to_string()));
                }
                continue;
            }
            if let Ok((remaining, markup)) = self.parse_markup_at(self.input) {
                self.input = remaining;
                match markup {
                    Markup::Ignored => continue,
                    Markup::Close(tag) => return Some(Event::Close(tag)),
                    Markup::Open {
                        tag,
                        attributes,
                        self_closing,
                    } => {
                        if self_closing {
                            self.pending.push_back(Event::Close(tag.clone()));
                        } else if RAW_TEXT.contains(&tag.as_str()) {
                            self.raw_text = Some(tag.clone());
                        }
                        return Some(Event::Open { tag, attributes });
                    }
                }
            }
            let (mut remaining, _) = parse_text(self.input);
            while !remaining.is_empty() && self.parse_markup_at(remaining).is_err() {
                remaining = parse_text(remaining).0;
            }
            let text = &self.input[..self.input.len() - remaining.len()];
            self.input = remaining;
            return Some(Event::Text(decode_entities(text)));
        }
    }
}

impl<'a> Tokenizer<'a> {
    /// Skip the tag parsers once no `>` is left; each of them would scan to
    /// the end of input before failing.
    fn parse_markup_at(&self, input: &'a str) -> IResult<&'a str, Markup> {
        let offset = self.source.len() - input.len();
        match self.last_close {
            Some(close) if close > offset => parse_markup(input),
            _ => map(parse_comment, |_| Markup::Ignored)(input),
        }
    }
}

/// Split off everything up to `</name` (case-insensitive). The close tag
/// itself stays in the remaining input.
fn split_raw_text<'a>(input: &'a str, name: &str) -> (&'a str, &'a str) {
    let needle = format!("</{}", name);
    let position = input
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| {
            input
                .get(i..i + needle.len())
                .map(|s| s.eq_ignore_ascii_case(&needle))
                .unwrap_or(false)
        })
        .unwrap_or(input.len());
    input.split_at(position)
}

#[cfg(test)]
#[test]
fn test_split_raw_text() {
    assert_eq!(
        split_raw_text("if (a < b) {}</SCRIPT>", "script"),
        ("if (a < b) {}", "</SCRIPT>")
    );
    assert_eq!(split_raw_text("never closed", "style"), ("never closed", ""));
}

/// Text runs until the next `<` that could start markup. A leading `<` is
/// always consumed, so this makes progress even on a lone `<`.
fn parse_text(input: &str) -> (&str, &str) {
    let end = input
        .char_indices()
        .skip(1)
        .find(|&(i, c)| c == '<' && starts_markup(&input[i..]))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    (&input[end..], &input[..end])
}

fn starts_markup(input: &str) -> bool {
    let mut chars = input.chars().skip(1);
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

#[cfg(test)]
#[test]
fn test_unterminated_tags_stay_text() {
    let input = "<a ".repeat(50_000);
    let events: Vec<_> = tokenize(&input).collect();
    assert_eq!(events, vec![Event::Text(input.clone())]);

    let tokenizer = tokenize("<b>x <i y");
    assert!(tokenizer.parse_markup_at("<b>x <i y").is_ok());
    assert!(tokenizer.parse_markup_at("<i y").is_err());
    let tokenizer = tokenize("x <!-- open");
    assert!(tokenizer.parse_markup_at("<!-- open").is_ok());

    let events: Vec<_> = tokenize("x <i <!-- tail").collect();
    assert_eq!(events, vec![Event::Text("x <i ".to_string())]);
}

#[cfg(test)]
#[test]
fn test_parse_text() {
    assert_eq!(parse_text("Hello <b>"), ("<b>", "Hello "));
    assert_eq!(parse_text("a < b <i>"), ("<i>", "a < b "));
    assert_eq!(parse_text("<3 <b>"), ("<b>", "<3 "));
    assert_eq!(parse_text("tail"), ("", "tail"));
}

fn parse_markup(input: &str) -> IResult<&str, Markup> {
    alt((
        map(parse_comment, |_| Markup::Ignored),
        map(parse_declaration, |_| Markup::Ignored),
        map(parse_close_tag, Markup::Close),
        parse_open_tag,
    ))(input)
}

/// `<!-- ... -->`, running to the end of input if never terminated
fn parse_comment(input: &str) -> IResult<&str, &str> {
    preceded(
        tag("<!--"),
        alt((
            map(pair(take_until("-->"), tag("-->")), |(c, _)| c),
            rest,
        )),
    )(input)
}

/// `<!DOCTYPE ...>`, `<![CDATA[...]>`, `<?xml ...?>` and friends
fn parse_declaration(input: &str) -> IResult<&str, &str> {
    delimited(alt((tag("<!"), tag("<?"))), take_until(">"), char('>'))(input)
}

/// Attempt to parse a string as a valid tag name
fn parse_tag_name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c: char| c.is_ascii_alphabetic()),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'),
        )),
        str::to_ascii_lowercase,
    )(input)
}

/// Parse a tag in the form `</name>`, returning `name`. Anything between the
/// name and `>` is ignored.
fn parse_close_tag(input: &str) -> IResult<&str, String> {
    let (remaining, (_, name, _, _)) =
        tuple((tag("</"), parse_tag_name, take_until(">"), char('>')))(input)?;
    Ok((remaining, name))
}

#[cfg(test)]
#[test]
fn test_close_tag_parse() {
    assert_eq!(parse_close_tag("</TD>").unwrap(), ("", "td".to_string()));
    assert_eq!(parse_close_tag("</div >x").unwrap(), ("x", "div".to_string()));
    assert!(parse_close_tag("</ div>").is_err());
    assert!(parse_close_tag("</div").is_err());
}

/// Parse a tag in the form `<name attr=value ...>`. Unparseable leftovers
/// before the `>` are skipped; a trailing `/` marks the tag self-closing.
fn parse_open_tag(input: &str) -> IResult<&str, Markup> {
    let (remaining, (_, tag, attributes, leftover, _)) = tuple((
        char('<'),
        parse_tag_name,
        all_attr_parser,
        take_till(|c: char| c == '>'),
        char('>'),
    ))(input)?;
    let self_closing = leftover.trim_end().ends_with('/');
    if !leftover.trim().is_empty() && !self_closing {
        trace!(tag = tag.as_str(), leftover, "Skipped unparsed tag content");
    }
    Ok((
        remaining,
        Markup::Open {
            tag,
            attributes,
            self_closing,
        },
    ))
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    let open = |tag: &str, attributes: Vec<(&str, &str)>, self_closing: bool| Markup::Open {
        tag: tag.to_string(),
        attributes: attributes
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        self_closing,
    };

    assert_eq!(parse_open_tag("<div>").unwrap(), ("", open("div", vec![], false)));
    assert_eq!(
        parse_open_tag("<DIV Class=nothing>").unwrap(),
        ("", open("div", vec![("class", "nothing")], false))
    );
    assert_eq!(
        parse_open_tag(r#"<div attr1 attr2=two attr3='three' attr4="number four">"#).unwrap(),
        (
            "",
            open(
                "div",
                vec![
                    ("attr1", ""),
                    ("attr2", "two"),
                    ("attr3", "three"),
                    ("attr4", "number four")
                ],
                false
            )
        )
    );
    assert_eq!(
        parse_open_tag(r#"<a title="a > b" href = "/x">"#).unwrap(),
        ("", open("a", vec![("title", "a > b"), ("href", "/x")], false))
    );
    assert_eq!(parse_open_tag("<br/>").unwrap(), ("", open("br", vec![], true)));
    assert_eq!(
        parse_open_tag(r#"<img src="x.png" />"#).unwrap(),
        ("", open("img", vec![("src", "x.png")], true))
    );
    assert!(parse_open_tag("< div>").is_err());
    assert!(parse_open_tag("<div").is_err());
}

// Attribute parsing below

fn parse_single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till(|c: char| c == '\''), char('\''))(input)
}

fn parse_double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"'))(input)
}

fn parse_unquoted(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !"\"'=<>`".contains(c))(input)
}

fn value_parser(input: &str) -> IResult<&str, &str> {
    alt((parse_single_quoted, parse_double_quoted, parse_unquoted))(input)
}

fn name_parser(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !"\"'>/=".contains(c))(input)
}

fn single_attr_parser(input: &str) -> IResult<&str, (String, String)> {
    let (r, (name, value)) = pair(
        name_parser,
        opt(preceded(
            tuple((multispace0, char('='), multispace0)),
            value_parser,
        )),
    )(input)?;
    Ok((
        r,
        (name.to_ascii_lowercase(), decode_entities(value.unwrap_or(""))),
    ))
}

fn all_attr_parser(input: &str) -> IResult<&str, Vec<(String, String)>> {
    many0(preceded(multispace1, single_attr_parser))(input)
}

#[cfg(test)]
#[test]
fn test_attr_parse() {
    assert_eq!(
        single_attr_parser("HREF=\"/a?x=1&amp;y=2\"").unwrap(),
        ("", ("href".to_string(), "/a?x=1&y=2".to_string()))
    );
    assert_eq!(
        single_attr_parser("checked>").unwrap(),
        (">", ("checked".to_string(), "".to_string()))
    );
    assert_eq!(
        single_attr_parser("data-x=''").unwrap(),
        ("", ("data-x".to_string(), "".to_string()))
    );
}

// Character references

fn parse_numeric_reference(input: &str) -> IResult<&str, char> {
    let hex = map_res(preceded(alt((tag("x"), tag("X"))), hex_digit1), |h: &str| {
        u32::from_str_radix(h, 16)
    });
    let dec = map_res(digit1, str::parse::<u32>);
    map_res(
        delimited(char('#'), alt((hex, dec)), char(';')),
        |code| char::from_u32(code).ok_or(()),
    )(input)
}

fn parse_named_reference(input: &str) -> IResult<&str, char> {
    alt((
        map(tag("amp;"), |_| '&'),
        map(tag("lt;"), |_| '<'),
        map(tag("gt;"), |_| '>'),
        map(tag("quot;"), |_| '"'),
        map(tag("apos;"), |_| '\''),
        map(tag("nbsp;"), |_| '\u{a0}'),
    ))(input)
}

/// Decode the character references we know about, leaving anything else as is
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut remaining = input;
    while let Some(i) = remaining.find('&') {
        out.push_str(&remaining[..i]);
        let after = &remaining[i + 1..];
        match alt((parse_numeric_reference, parse_named_reference))(after) {
            Ok((r, c)) => {
                out.push(c);
                remaining = r;
            }
            Err(_) => {
                out.push('&');
                remaining = after;
            }
        }
    }
    out.push_str(remaining);
    out
}

#[cfg(test)]
#[test]
fn test_decode_entities() {
    assert_eq!(decode_entities("Fish &amp; Chips"), "Fish & Chips");
    assert_eq!(decode_entities("&lt;b&gt; &#39;q&#x27;"), "<b> 'q'");
    assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
    assert_eq!(decode_entities("AT&T &copy; &#xZZ;"), "AT&T &copy; &#xZZ;");
    assert_eq!(decode_entities("trailing &"), "trailing &");
}
