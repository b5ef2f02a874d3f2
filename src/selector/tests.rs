use super::*;
use crate::attributes;
use crate::html::parse;

static FORUM: &str = r#"<html><body>
<div id="header"><td class="thread">not in the table</td></div>
<table class="forumTable">
  <tr>
    <td class="thread">
      <div class="thread_title"><div class="title"><a href="/forum/view-thread/1">Patch 3.1</a></div></div>
      <div class="postBy"><span class="post_by_account"><a href="account/view-profile/Dev">Dev</a></span><span class="post_date">, Jan 2, 2024, 4:05:06 PM</span></div>
    </td>
    <td class="views">12</td>
  </tr>
  <tr>
    <td class="thread sticky">
      <div class="thread_title"><div class="title"><a href="/forum/view-thread/2">Hotfix</a></div></div>
    </td>
  </tr>
</table>
</body></html>"#;

fn data<'a>(nodes: &[&'a Node]) -> Vec<&'a str> {
    nodes.iter().map(|n| n.data.as_str()).collect()
}

#[test]
fn test_compile_shapes() {
    let s = Selector::compile("div#foo");
    assert_eq!(
        s.criteria(),
        &[Criteria::Id {
            tag: "div".to_string(),
            id: "foo".to_string()
        }]
    );
    assert!(s.is_valid());

    let s: Selector = "span.bar a[href=x] p".parse().unwrap();
    assert_eq!(s.criteria().len(), 3);
    assert!(s.is_valid());
    assert_eq!(s.to_string(), "span.bar a[href=x] p");
}

#[test]
fn test_criteria_matches() {
    let div = Node::new("div", attributes!("id" => "foo"));
    let span = Node::new("span", attributes!("class" => "bar baz"));
    let a = Node::new("a", attributes!("href" => "x"));

    let id = Selector::compile("div#foo");
    assert!(id.criteria()[0].matches(&div));
    assert!(!id.criteria()[0].matches(&span));
    assert!(Selector::compile("#foo").criteria()[0].matches(&div));
    assert!(!Selector::compile("div#Foo").criteria()[0].matches(&div));

    let class = Selector::compile("span.bar");
    assert!(class.criteria()[0].matches(&span));
    assert!(Selector::compile(".baz").criteria()[0].matches(&span));
    assert!(!Selector::compile("div.bar").criteria()[0].matches(&span));

    let attr = Selector::compile("a[href=x]");
    assert!(attr.criteria()[0].matches(&a));
    assert!(!Selector::compile("a[href=y]").criteria()[0].matches(&a));
    assert!(!Selector::compile("a[title=x]").criteria()[0].matches(&a));

    let dotted = Node::new("div", attributes!("class" => "a.b"));
    assert!(!Selector::compile("div.a.b").criteria()[0].matches(&dotted));
    assert!(Selector::compile("div.a.b").criteria()[0].matches(&Node::new(
        "div.a",
        attributes!("class" => "b")
    )));

    assert!(Selector::compile("a").criteria()[0].matches(&a));
    assert!(!Selector::compile("A").criteria()[0].matches(&a));
}

#[test]
fn test_invalid_criteria_matches_nothing() {
    let root = parse("<div><p>x</p></div>");
    let invalid = [
        Criteria::Tag(String::new()),
        Criteria::Id {
            tag: String::new(),
            id: String::new(),
        },
        Criteria::Class {
            tag: String::new(),
            class: String::new(),
        },
        Criteria::Attribute {
            tag: String::new(),
            name: "href".to_string(),
            value: String::new(),
        },
    ];
    for criteria in invalid {
        assert!(!criteria.is_valid());
        assert!(root.traverse().all(|n| !criteria.matches(n)));
        let selector = Selector::from(vec![criteria]);
        assert!(!selector.is_valid());
        assert!(selector.select(&root).is_empty());
    }
}

#[test]
fn test_empty_selector() {
    let root = parse("<div></div>");
    for text in ["", "   \n\t"] {
        let s = Selector::compile(text);
        assert!(s.criteria().is_empty());
        assert!(!s.is_valid());
        assert!(s.select(&root).is_empty());
        assert!(evaluate(&root, &s).is_empty());
    }
}

#[test]
fn test_descendant_steps() {
    let root = parse(r#"<div id="x"><span class="a">Hi</span><span class="b">Bye</span></div>"#);
    let results = evaluate(&root, &Selector::compile("div#x span.b"));
    assert_eq!(results.len(), 1);
    assert!(std::ptr::eq(results[0], &root.children[0].children[1]));
    assert_eq!(results[0].data, "Bye");
}

#[test]
fn test_forum_threads() {
    let root = parse(FORUM);
    let threads = Selector::compile("table.forumTable td.thread").select(&root);
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|t| t.tag == "td" && t.has_class("thread")));
    assert!(threads[1].has_class("sticky"));

    let title = Selector::compile("div.thread_title div.title a");
    let first = title.first(threads[0]).unwrap();
    assert_eq!(first.data, "Patch 3.1");
    assert_eq!(first.attribute("href"), Some("/forum/view-thread/1"));
    assert_eq!(title.first(threads[1]).unwrap().data, "Hotfix");

    let author = Selector::compile("div.postBy span.post_by_account a");
    assert_eq!(author.first(threads[0]).unwrap().data, "Dev");
    assert!(author.first(threads[1]).is_none());

    let date = Selector::compile("span.post_date");
    assert_eq!(date.first(threads[0]).unwrap().data, ", Jan 2, 2024, 4:05:06 PM");
}

#[test]
fn test_step_includes_reference_node() {
    let root = parse(r#"<td class="thread"><a>x</a></td>"#);
    let td = &root.children[0];
    let results = Selector::compile("td.thread").select(td);
    assert_eq!(results.len(), 1);
    assert!(std::ptr::eq(results[0], td));
}

#[test]
fn test_duplicates_per_path() {
    let root = parse("<div><div><p>inner</p></div></div>");
    let results = Selector::compile("div p").select(&root);
    assert_eq!(data(&results), vec!["inner", "inner"]);
    assert!(std::ptr::eq(results[0], results[1]));

    let results = Selector::compile("div div p").select(&root);
    // outer div reaches the inner div, which in turn matches itself
    assert_eq!(results.len(), 3);
}

#[test]
fn test_preorder_results() {
    let root = parse("<ul><li>1<ul><li>1.1</li></ul></li><li>2</li></ul>");
    let results = Selector::compile("li").select(&root);
    assert_eq!(data(&results), vec!["1", "1.1", "2"]);
}

#[test]
fn test_repeatable() {
    let root = parse(FORUM);
    let selector = Selector::compile("table.forumTable td.thread a");
    let first: Vec<_> = selector.select(&root).into_iter().map(|n| n as *const Node).collect();
    let second: Vec<_> = selector.select(&root).into_iter().map(|n| n as *const Node).collect();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}
