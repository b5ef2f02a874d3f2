use super::*;
use crate::attributes;

fn open(tag: &str, attributes: Vec<(String, String)>) -> Event {
    Event::Open {
        tag: tag.to_string(),
        attributes,
    }
}

fn close(tag: &str) -> Event {
    Event::Close(tag.to_string())
}

fn text(content: &str) -> Event {
    Event::Text(content.to_string())
}

fn tags(root: &Node) -> Vec<&str> {
    root.traverse().map(|n| n.tag.as_str()).collect()
}

#[test]
fn test_well_formed_nesting() {
    let root = build(vec![
        open("html", attributes!()),
        open("body", attributes!()),
        open("div", attributes!("class" => "a")),
        open("p", attributes!()),
        text("One"),
        close("p"),
        open("p", attributes!()),
        text("Two"),
        close("p"),
        close("div"),
        close("body"),
        close("html"),
    ]);
    assert_eq!(root.tag, ROOT_TAG);
    assert_eq!(tags(&root), vec!["root", "html", "body", "div", "p", "p"]);
    let div = &root.children[0].children[0].children[0];
    assert_eq!(div.class_names, vec!["a"]);
    assert_eq!(div.children[0].data, "One");
    assert_eq!(div.children[1].data, "Two");
}

#[test]
fn test_stray_close_tag() {
    let root = parse("<div><p>a</p></span><p>b</p></div>");
    assert_eq!(tags(&root), vec!["root", "div", "p", "p"]);
    assert_eq!(root.children[0].children[0].data, "a");
    assert_eq!(root.children[0].children[1].data, "b");

    let root = build(vec![close("div")]);
    assert!(root.children.is_empty());
}

#[test]
fn test_synthetic_root_is_never_closed() {
    let root = parse("<p>x</root></p>");
    assert_eq!(tags(&root), vec!["root", "p"]);
}

#[test]
fn test_unclosed_at_end() {
    let root = parse("<div><p>x</p></div><section><p>y</p>");
    assert_eq!(tags(&root), vec!["root", "div", "p"]);
    assert!(root.traverse().all(|n| n.data != "y"));
}

#[test]
fn test_orphans_reparented_before_closed_children() {
    let root = parse("<div><span>a</span><p>one<b>two</div><i>after</i>");
    assert_eq!(tags(&root), vec!["root", "div", "p", "b", "span", "i"]);
    let div = &root.children[0];
    let children: Vec<_> = div.children.iter().map(|n| n.tag.as_str()).collect();
    assert_eq!(children, vec!["p", "b", "span"]);
    assert_eq!(div.children[0].data, "one");
    assert_eq!(div.children[1].data, "two");
    assert_eq!(div.children[2].data, "a");
    assert_eq!(root.children[1].data, "after");

    // Orphans keep whatever was already attached to them
    let root = parse("<ul><li>x<em>y</em><li>z</ul>");
    let ul = &root.children[0];
    let children: Vec<_> = ul.children.iter().map(|n| n.tag.as_str()).collect();
    assert_eq!(children, vec!["li", "li"]);
    assert_eq!(ul.children[0].children[0].tag, "em");
    assert_eq!(ul.children[1].data, "z");
}

#[test]
fn test_void_elements_are_absorbed() {
    let root = parse(r#"<head><meta charset="utf-8"><title>T</title></head><body></body>"#);
    assert_eq!(tags(&root), vec!["root", "head", "meta", "title", "body"]);
    let meta = &root.children[0].children[0];
    assert_eq!(meta.attribute("charset"), Some("utf-8"));
    assert_eq!(meta.children[0].data, "T");
}

#[test]
fn test_last_text_wins() {
    let root = parse("<p>first<br/>second</p>");
    let p = &root.children[0];
    assert_eq!(p.data, "second");
    assert_eq!(p.children[0].tag, "br");

    let root = parse("<p>  kept  <b>x</b>   \n  </p>");
    assert_eq!(root.children[0].data, "kept");

    let root = parse("loose text");
    assert_eq!(root.data, "loose text");
}

#[test]
fn test_tokenize_document() {
    let i = r#"<!DOCTYPE html>
<!-- comment --><P Class=x>a &amp; b</P><script>if (a<b) {}</script><br/>"#;
    let events: Vec<_> = tokenize(i)
        .filter(|e| !matches!(e, Event::Text(t) if t.trim().is_empty()))
        .collect();
    assert_eq!(
        events,
        vec![
            open("p", attributes!("class" => "x")),
            text("a & b"),
            close("p"),
            open("script", attributes!()),
            text("if (a<b) {}"),
            close("script"),
            open("br", attributes!()),
            close("br"),
        ]
    );
}

#[test]
fn test_tokenize_malformed() {
    let events: Vec<_> = tokenize("1 < 2 <b>bold</b> <i").collect();
    assert_eq!(
        events,
        vec![
            text("1 < 2 "),
            open("b", attributes!()),
            text("bold"),
            close("b"),
            text(" <i"),
        ]
    );
}

#[test]
fn test_document() {
    let i = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <title>The minimal, valid HTML5 document</title>
    </head>
    <body>
        <!-- User-visible content goes in the body -->
        <p>Some paragraph</p>
        Some untagged text
    </body>
</html>"#;
    let root = parse(i);
    assert_eq!(tags(&root), vec!["root", "html", "head", "title", "body", "p"]);
    let html = &root.children[0];
    assert_eq!(html.attribute("lang"), Some("en"));
    assert_eq!(html.children[0].children[0].data, "The minimal, valid HTML5 document");
    assert_eq!(html.children[1].data, "Some untagged text");
}
