use std::collections::HashMap;
use std::fmt;

/// One element of a parsed document.
///
/// `class_names` and `id` are derived from `attributes` when the node is
/// constructed and are not kept in sync afterwards.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Node {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub class_names: Vec<String>,
    pub id: String,
    /// The last non-empty, trimmed text chunk seen directly inside this node
    pub data: String,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node from a tag name and its attributes. A repeated attribute
    /// keeps the last value.
    pub fn new<K, V>(tag: impl Into<String>, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let attributes: HashMap<String, String> = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let class_names = attributes
            .get("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let id = attributes.get("id").cloned().unwrap_or_default();
        Self {
            tag: tag.into(),
            attributes,
            class_names,
            id,
            data: String::new(),
            children: vec![],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_names.iter().any(|c| c == class)
    }

    pub fn append(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Pre-order walk of this subtree, starting with `self`
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse { stack: vec![self] }
    }
}

pub struct Traverse<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reversed so the first child is popped next
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        let mut attributes: Vec<_> = self.attributes.iter().collect();
        attributes.sort();
        for (k, v) in attributes {
            write!(f, " {}=\"{}\"", k, v)?;
        }
        if !self.children.is_empty() {
            write!(
                f,
                ">[{} children]{}</{}>",
                self.children.len(),
                self.data,
                self.tag
            )
        } else if !self.data.is_empty() {
            write!(f, ">{}</{}>", self.data, self.tag)
        } else {
            write!(f, " />")
        }
    }
}

/// Build an attribute list from `name => value` pairs
#[macro_export]
macro_rules! attributes {
    ($($k:expr => $v:expr),* $(,)?) => {{
        let attrs: Vec<(String, String)> = vec![$(($k.to_string(), $v.to_string())),*];
        attrs
    }};
}

#[cfg(test)]
#[test]
fn test_derived_fields() {
    let node = Node::new("td", attributes!("class" => " thread  sticky ", "id" => "t1"));
    assert_eq!(node.class_names, vec!["thread", "sticky"]);
    assert_eq!(node.id, "t1");
    assert!(node.has_class("sticky"));
    assert!(!node.has_class("thread sticky"));

    let node = Node::new("td", attributes!("title" => "x"));
    assert!(node.class_names.is_empty());
    assert_eq!(node.id, "");
    assert_eq!(node.attribute("title"), Some("x"));
    assert_eq!(node.attribute("class"), None);
}

#[cfg(test)]
#[test]
fn test_repeated_attribute() {
    let node = Node::new("a", attributes!("href" => "first", "href" => "second"));
    assert_eq!(node.attributes.len(), 1);
    assert_eq!(node.attribute("href"), Some("second"));
}

#[cfg(test)]
#[test]
fn test_traverse_preorder() {
    let mut root = Node::new("root", attributes!());
    let mut a = Node::new("a", attributes!());
    a.append(Node::new("b", attributes!()));
    a.append(Node::new("c", attributes!()));
    root.append(a);
    root.append(Node::new("d", attributes!()));
    let tags: Vec<_> = root.traverse().map(|n| n.tag.as_str()).collect();
    assert_eq!(tags, vec!["root", "a", "b", "c", "d"]);
}

#[cfg(test)]
#[test]
fn test_display() {
    let mut node = Node::new("a", attributes!("href" => "/x", "class" => "t"));
    assert_eq!(node.to_string(), r#"<a class="t" href="/x" />"#);
    node.data = "Title".into();
    assert_eq!(node.to_string(), r#"<a class="t" href="/x">Title</a>"#);
    node.append(Node::new("b", attributes!()));
    assert_eq!(
        node.to_string(),
        r#"<a class="t" href="/x">[1 children]Title</a>"#
    );
}
