use super::node::Node;
use super::tokenizer::Event;
use tracing::{debug, span, trace, Level};

/// Tag of the synthetic node every built tree hangs from
pub const ROOT_TAG: &str = "root";

/// Stack-based tree construction that recovers from unbalanced markup.
///
/// Opened elements wait on the stack until their close tag arrives and are
/// only then attached to the element below them. A close tag that matches an
/// element deeper in the stack closes everything above it too: those nodes are
/// re-parented, in document order, ahead of the matched element's existing
/// children. Close tags that match nothing are dropped, and elements still
/// open at the end are discarded along with everything attached to them.
pub struct TreeBuilder {
    // Never empty: index 0 is the synthetic root and is never popped
    stack: Vec<Node>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            stack: vec![root()],
        }
    }

    pub fn push(&mut self, event: Event) {
        match event {
            Event::Open { tag, attributes } => self.open(tag, attributes),
            Event::Close(tag) => self.close(&tag),
            Event::Text(content) => self.text(&content),
        }
    }

    fn open(&mut self, tag: String, attributes: Vec<(String, String)>) {
        self.stack.push(Node::new(tag, attributes));
    }

    fn text(&mut self, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }
        // Last chunk wins
        if let Some(top) = self.stack.last_mut() {
            top.data = content.to_string();
        }
    }

    fn close(&mut self, tag: &str) {
        let Some(position) = (1..self.stack.len()).rev().find(|&i| self.stack[i].tag == tag)
        else {
            debug!(tag, "Dropped close tag with no open element");
            return;
        };
        let mut orphans = self.stack.split_off(position + 1);
        if !orphans.is_empty() {
            trace!(tag, orphans = orphans.len(), "Re-parenting unclosed elements");
        }
        let Some(mut node) = self.stack.pop() else {
            return;
        };
        orphans.append(&mut node.children);
        node.children = orphans;
        if let Some(parent) = self.stack.last_mut() {
            parent.append(node);
        }
    }

    /// Consume the builder, returning the synthetic root
    pub fn finish(mut self) -> Node {
        if self.stack.len() > 1 {
            debug!(
                unclosed = self.stack.len() - 1,
                "Discarding elements still open at end of input"
            );
            self.stack.truncate(1);
        }
        self.stack.pop().unwrap_or_else(root)
    }
}

fn root() -> Node {
    Node::new(ROOT_TAG, Vec::<(String, String)>::new())
}

/// Build a tree from a stream of markup events
pub fn build(events: impl IntoIterator<Item = Event>) -> Node {
    let span = span!(Level::DEBUG, "Building tree");
    let _enter = span.enter();
    let mut builder = TreeBuilder::new();
    for event in events {
        builder.push(event);
    }
    builder.finish()
}
