//! Effective namespace composition.
//!
//! A dependency's effective namespace depends on the chain of dependencies
//! that led to it. Each [`super::Dependency`] records the own namespaces of
//! its ancestors, outermost first, and [`compose`] folds that chain together.
//! A parent with an empty namespace breaks the chain: its descendants start
//! over from their own namespace.

/// Composes the effective namespace of a node.
///
/// `ancestors` are the own namespaces of the enclosing dependencies,
/// outermost first; the last entry is the direct parent.
///
/// ```
/// use odm_cli::project::namespace::compose;
///
/// let chain = vec!["a".to_string(), "b".to_string()];
/// assert_eq!(compose(&chain, "c"), "a.b.c");
/// assert_eq!(compose(&chain, ""), "a.b");
/// assert_eq!(compose(&["".to_string()], "b"), "b");
/// ```
pub fn compose(ancestors: &[String], own: &str) -> String {
    let Some((parent, grandparents)) = ancestors.split_last() else {
        return own.to_string();
    };

    if parent.is_empty() {
        return own.to_string();
    }

    let parent_full = compose(grandparents, parent);
    match (parent_full.is_empty(), own.is_empty()) {
        (true, _) => own.to_string(),
        (false, true) => parent_full,
        (false, false) => format!("{parent_full}.{own}"),
    }
}
