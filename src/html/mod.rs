mod builder;
mod node;
mod tokenizer;
#[cfg(test)]
mod tests;

pub use builder::{build, TreeBuilder, ROOT_TAG};
pub use node::{Node, Traverse};
pub use tokenizer::{decode_entities, tokenize, Event, Tokenizer};

/// Tokenize and build a markup document in one go
pub fn parse(markup: &str) -> Node {
    build(tokenize(markup))
}
