use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, span, trace, Level};

use crate::html::Node;

mod parsing;
#[cfg(test)]
mod tests;

/// A single step of a [`Selector`]. An empty `tag` matches any tag.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Criteria {
    /// `tag#id`
    Id { tag: String, id: String },
    /// `tag[name=value]`
    Attribute {
        tag: String,
        name: String,
        value: String,
    },
    /// `tag.class`
    Class { tag: String, class: String },
    /// `tag`
    Tag(String),
}

impl Criteria {
    /// A step with nothing to discriminate on never matches
    pub fn is_valid(&self) -> bool {
        match self {
            Criteria::Id { tag, id } => !tag.is_empty() || !id.is_empty(),
            Criteria::Attribute { tag, name, value } => {
                !tag.is_empty() || (!name.is_empty() && !value.is_empty())
            }
            Criteria::Class { tag, class } => !tag.is_empty() || !class.is_empty(),
            Criteria::Tag(tag) => !tag.is_empty(),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Criteria::Id { tag, .. }
            | Criteria::Attribute { tag, .. }
            | Criteria::Class { tag, .. }
            | Criteria::Tag(tag) => tag,
        }
    }

    /// Exact, case-sensitive comparison against the node's own fields
    pub fn matches(&self, node: &Node) -> bool {
        if !self.is_valid() {
            return false;
        }
        let tag = self.tag();
        if !tag.is_empty() && tag != node.tag {
            return false;
        }
        match self {
            Criteria::Id { id, .. } => id.is_empty() || *id == node.id,
            Criteria::Attribute { name, value, .. } => {
                name.is_empty() || node.attribute(name) == Some(value.as_str())
            }
            Criteria::Class { class, .. } => class.is_empty() || node.has_class(class),
            Criteria::Tag(_) => true,
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Id { tag, id } => write!(f, "{}#{}", tag, id),
            Criteria::Attribute { tag, name, value } => write!(f, "{}[{}={}]", tag, name, value),
            Criteria::Class { tag, class } => write!(f, "{}.{}", tag, class),
            Criteria::Tag(tag) => write!(f, "{}", tag),
        }
    }
}

/// A chain of [`Criteria`], each step searching the whole subtree of every
/// node the previous step matched.
///
/// ```ignore
/// let root = nodesift::html::parse(page);
/// let threads = Selector::compile("table.forumTable td.thread").select(&root);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Selector(Vec<Criteria>);

impl Selector {
    /// Compile selector text. Never fails; see [`Selector::is_valid`].
    pub fn compile(text: &str) -> Self {
        let criteria = parsing::parse_selector(text)
            .map(|(_, criteria)| criteria)
            .unwrap_or_default();
        trace!(text, steps = criteria.len(), "Compiled selector");
        Self(criteria)
    }

    pub fn criteria(&self) -> &[Criteria] {
        &self.0
    }

    /// Whether there is at least one step and every step can match something
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(Criteria::is_valid)
    }

    /// All matches in pre-order. A node reachable from several matches of an
    /// earlier step is returned once per such match.
    pub fn select<'a>(&self, root: &'a Node) -> Vec<&'a Node> {
        let span = span!(Level::DEBUG, "Evaluating selector", selector = %self);
        let _enter = span.enter();
        if self.0.is_empty() {
            debug!("Empty selector matches nothing");
            return vec![];
        }
        let mut results = vec![root];
        for criteria in &self.0 {
            results = results
                .into_iter()
                .flat_map(move |node| node.traverse().filter(move |n| criteria.matches(n)))
                .collect();
            trace!(step = %criteria, matches = results.len());
            if results.is_empty() {
                break;
            }
        }
        debug!(matches = results.len(), "Evaluated selector");
        results
    }

    pub fn first<'a>(&self, root: &'a Node) -> Option<&'a Node> {
        self.select(root).into_iter().next()
    }
}

impl From<Vec<Criteria>> for Selector {
    fn from(criteria: Vec<Criteria>) -> Self {
        Self(criteria)
    }
}

impl FromStr for Selector {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::compile(s))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, criteria) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", criteria)?;
        }
        Ok(())
    }
}

/// Evaluate `selector` against the tree under `root`
pub fn evaluate<'a>(root: &'a Node, selector: &Selector) -> Vec<&'a Node> {
    selector.select(root)
}
