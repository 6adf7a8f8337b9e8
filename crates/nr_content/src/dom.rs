//! Thin helpers over `dom_query`, the mutable DOM the extraction stages
//! share with `dom_smoothie`.
//!
//! A `Document` holds non-atomic tendrils and is not `Send`; stages parse,
//! mutate and serialize within one synchronous call.

pub use dom_query::{Document, NodeRef, Selection};

pub const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";

/// Serialized children of `<body>`.
pub fn body_html(doc: &Document) -> String {
    doc.select_single("body").inner_html().to_string()
}
