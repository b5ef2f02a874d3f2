//! A small HTML tree builder and descendant-selector engine for scraping
//! loosely structured pages.

mod error;
/// Parsing of HTML into a tree of [`html::Node`]s
pub mod html;
/// Compilation and evaluation of descendant selectors
pub mod selector;
/// Fetching of documents from the web or disk
pub mod web;

pub use error::Error;
pub use html::{parse, Node};
pub use selector::{evaluate, Criteria, Selector};
