//! # Blueprints and Context Declarations
//!
//! A *blueprint* is reusable template structure inside the outline, marked
//! with `isBlueprint`. A blueprint node can additionally be a *context
//! declaration*: a named context (with optional icon and color) that owns
//! the subtree below it and that other nodes can reference through
//! [`applied`](super::applied).
//!
//! ## Painting
//!
//! - **Paint up** ([`add_to_blueprint`]): a blueprint node's ancestors are
//!   always blueprints too, so flagging a node flags every ancestor.
//! - **Paint down** ([`remove_from_blueprint`] with `cascade`,
//!   [`declare_as_context`]): the flag is pushed through a subtree. Clearing
//!   stops at nodes that are already unflagged. Declaring skips nested
//!   declarations, which keep their own attribution.
//!
//! ## Attribution
//!
//! A node belongs to the closest declaration on its ancestor path
//! ([`get_context_declaration_id`]). A declaration nested inside another
//! declaration's subtree shadows the outer one for itself and everything
//! below it.

use crate::actions::applied;
use crate::document::Document;
use crate::error::{Result, TreeDocError};
use crate::model::NodeId;

/// A declared context as presented to a context picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDeclarationInfo {
    pub node_id: NodeId,
    pub content: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Flags `id` and paints every unflagged ancestor.
pub fn add_to_blueprint(doc: &mut Document, id: &str) -> bool {
    if !doc.contains(id) {
        return false;
    }
    let mut targets = vec![id.to_string()];
    targets.extend(doc.ancestors(id).iter().cloned());

    let mut painted = 0;
    for target in &targets {
        if let Some(node) = doc.get_mut(target) {
            if !node.metadata.is_blueprint {
                node.metadata.is_blueprint = true;
                painted += 1;
            }
        }
    }
    if painted > 0 {
        tracing::debug!(node = id, painted, "added to blueprint");
    }
    painted > 0
}

/// Clears the blueprint flag of `id`, and with `cascade` of every flagged
/// descendant, stopping at unflagged ones. The root is never cleared.
///
/// A declaration that loses its blueprint flag stops being a declaration.
pub fn remove_from_blueprint(doc: &mut Document, id: &str, cascade: bool) -> bool {
    if doc.is_root(id) || !doc.contains(id) {
        return false;
    }

    let mut cleared = Vec::new();
    if clear_blueprint(doc, id) {
        cleared.push(id.to_string());
    }
    if cascade {
        let mut stack: Vec<NodeId> = doc.children(id).to_vec();
        while let Some(current) = stack.pop() {
            if clear_blueprint(doc, &current) {
                stack.extend(doc.children(&current).iter().cloned());
                cleared.push(current);
            }
        }
    }

    if cleared.is_empty() {
        return false;
    }
    tracing::debug!(node = id, cleared = cleared.len(), cascade, "removed from blueprint");
    true
}

/// Makes `id` a context declaration and paints its subtree as blueprint,
/// skipping nested declarations.
///
/// Fails with [`TreeDocError::ParentNotBlueprint`] when `id` is the root or its
/// parent is not a blueprint node. Unknown ids are a no-op.
pub fn declare_as_context(doc: &mut Document, id: &str, icon: Option<&str>, color: Option<&str>) -> Result<bool> {
    if !doc.contains(id) {
        return Ok(false);
    }
    let parent_is_blueprint = doc
        .parent_id(id)
        .and_then(|parent| doc.get(parent))
        .is_some_and(|parent| parent.metadata.is_blueprint);
    if !parent_is_blueprint {
        return Err(TreeDocError::ParentNotBlueprint(id.to_string()));
    }

    if let Some(node) = doc.get_mut(id) {
        node.metadata.is_context_declaration = true;
        node.metadata.is_blueprint = true;
        node.metadata.blueprint_icon = icon.map(str::to_string);
        node.metadata.blueprint_color = color.map(str::to_string);
    }

    let mut painted = 0;
    for descendant in owned_descendants(doc, id) {
        if let Some(node) = doc.get_mut(&descendant) {
            if !node.metadata.is_blueprint {
                node.metadata.is_blueprint = true;
                painted += 1;
            }
        }
    }
    tracing::debug!(node = id, painted, "declared context");
    Ok(true)
}

/// Retracts the declaration on `id`.
///
/// Inside an outer declaration the subtree stays blueprinted and is attributed
/// to the outer one. Otherwise `id` and its non-nested descendants lose the
/// blueprint flag. References to `id` in applied context lists are stripped.
pub fn remove_context_declaration(doc: &mut Document, id: &str) -> bool {
    if !doc.get(id).is_some_and(|n| n.metadata.is_context_declaration) {
        return false;
    }
    let outer = enclosing_declaration(doc, id);

    if let Some(node) = doc.get_mut(id) {
        node.metadata.is_context_declaration = false;
        node.metadata.blueprint_icon = None;
        node.metadata.blueprint_color = None;
    }

    if outer.is_none() {
        let mut subtree = owned_descendants(doc, id);
        subtree.push(id.to_string());
        for node_id in subtree {
            if let Some(node) = doc.get_mut(&node_id) {
                node.metadata.is_blueprint = false;
            }
        }
    }

    let stripped = applied::detach_context(doc, id);
    tracing::debug!(node = id, outer = ?outer, stripped, "removed context declaration");
    true
}

/// `id` itself if it is a declaration, otherwise the closest declaring ancestor.
pub fn get_context_declaration_id(doc: &Document, id: &str) -> Option<NodeId> {
    let node = doc.get(id)?;
    if node.metadata.is_context_declaration {
        return Some(id.to_string());
    }
    enclosing_declaration(doc, id)
}

/// Every live declaration, in document order.
pub fn context_declarations(doc: &Document) -> Vec<ContextDeclarationInfo> {
    doc.walk()
        .into_iter()
        .filter_map(|id| doc.get(&id))
        .filter(|node| node.metadata.is_context_declaration)
        .map(|node| ContextDeclarationInfo {
            node_id: node.id.clone(),
            content: node.content.clone(),
            icon: node.metadata.blueprint_icon.clone(),
            color: node.metadata.blueprint_color.clone(),
        })
        .collect()
}

pub(crate) fn is_declaration(doc: &Document, id: &str) -> bool {
    doc.get(id).is_some_and(|n| n.metadata.is_context_declaration)
}

fn enclosing_declaration(doc: &Document, id: &str) -> Option<NodeId> {
    doc.ancestors(id)
        .iter()
        .rev()
        .find(|ancestor| is_declaration(doc, ancestor))
        .cloned()
}

/// Descendants of `id` attributed to it: nested declarations and everything
/// below them are left out.
fn owned_descendants(doc: &Document, id: &str) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(id).to_vec();
    while let Some(current) = stack.pop() {
        if is_declaration(doc, &current) {
            continue;
        }
        stack.extend(doc.children(&current).iter().cloned());
        out.push(current);
    }
    out
}

// Returns true if the node was flagged.
fn clear_blueprint(doc: &mut Document, id: &str) -> bool {
    let was_declaration = {
        let Some(node) = doc.get_mut(id) else {
            return false;
        };
        if !node.metadata.is_blueprint {
            return false;
        }
        node.metadata.is_blueprint = false;
        let was_declaration = node.metadata.is_context_declaration;
        node.metadata.is_context_declaration = false;
        node.metadata.blueprint_icon = None;
        node.metadata.blueprint_color = None;
        was_declaration
    };
    if was_declaration {
        applied::detach_context(doc, id);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::sample;
    use crate::model::Node;

    fn flagged(doc: &Document, id: &str) -> bool {
        doc.get(id).unwrap().metadata.is_blueprint
    }

    /// root -> [lib -> [ctx -> [step -> [detail], inner -> [inner_step]]], other]
    fn library() -> Document {
        Document::from_nodes(
            [
                Node::with_id("root", "").with_children(["lib", "other"]),
                Node::with_id("lib", "Library").with_children(["ctx"]),
                Node::with_id("ctx", "Writing").with_children(["step", "inner"]),
                Node::with_id("step", "Outline").with_children(["detail"]),
                Node::with_id("detail", "Detail"),
                Node::with_id("inner", "Editing").with_children(["inner_step"]),
                Node::with_id("inner_step", "Proofread"),
                Node::with_id("other", "Other"),
            ],
            "root",
        )
        .unwrap()
    }

    #[test]
    fn test_add_paints_up() {
        let mut doc = sample();
        assert!(add_to_blueprint(&mut doc, "a1"));
        assert!(flagged(&doc, "a1"));
        assert!(flagged(&doc, "a"));
        assert!(flagged(&doc, "root"));
        assert!(!flagged(&doc, "a2"));
        assert!(!flagged(&doc, "b"));

        assert!(!add_to_blueprint(&mut doc, "a1"));
        assert!(!add_to_blueprint(&mut doc, "missing"));
    }

    #[test]
    fn test_remove_without_cascade_only_touches_node() {
        let mut doc = sample();
        add_to_blueprint(&mut doc, "a1");
        assert!(remove_from_blueprint(&mut doc, "a", false));
        assert!(!flagged(&doc, "a"));
        assert!(flagged(&doc, "a1"));
    }

    #[test]
    fn test_remove_cascade_stops_at_unflagged() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "detail");
        add_to_blueprint(&mut doc, "inner");
        // Flagged below an unflagged node: the cascade must not reach it
        doc.get_mut("step").unwrap().metadata.is_blueprint = false;

        assert!(remove_from_blueprint(&mut doc, "ctx", true));
        assert!(!flagged(&doc, "ctx"));
        assert!(!flagged(&doc, "inner"));
        assert!(flagged(&doc, "detail"));
        assert!(flagged(&doc, "lib"));
    }

    #[test]
    fn test_remove_never_clears_root() {
        let mut doc = sample();
        add_to_blueprint(&mut doc, "b");
        assert!(!remove_from_blueprint(&mut doc, "root", true));
        assert!(flagged(&doc, "root"));
        assert!(flagged(&doc, "b"));
    }

    #[test]
    fn test_declare_requires_blueprint_parent() {
        let mut doc = library();
        let before = doc.clone();
        let err = declare_as_context(&mut doc, "ctx", None, None).unwrap_err();
        assert!(matches!(err, TreeDocError::ParentNotBlueprint(id) if id == "ctx"));
        assert_eq!(doc, before);

        assert!(matches!(
            declare_as_context(&mut doc, "root", None, None),
            Err(TreeDocError::ParentNotBlueprint(_))
        ));
        assert!(!declare_as_context(&mut doc, "missing", None, None).unwrap());
    }

    #[test]
    fn test_declare_paints_down_and_sets_presentation() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "lib");
        assert!(declare_as_context(&mut doc, "ctx", Some("✎"), Some("blue")).unwrap());

        let ctx = &doc.get("ctx").unwrap().metadata;
        assert!(ctx.is_context_declaration);
        assert!(ctx.is_blueprint);
        assert_eq!(ctx.blueprint_icon.as_deref(), Some("✎"));
        for id in ["step", "detail", "inner", "inner_step"] {
            assert!(flagged(&doc, id), "{} should be blueprint", id);
        }
        assert!(!flagged(&doc, "other"));
    }

    #[test]
    fn test_context_attribution_follows_nesting() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "lib");
        declare_as_context(&mut doc, "ctx", None, None).unwrap();
        assert_eq!(get_context_declaration_id(&doc, "inner_step").as_deref(), Some("ctx"));
        assert_eq!(get_context_declaration_id(&doc, "ctx").as_deref(), Some("ctx"));
        assert_eq!(get_context_declaration_id(&doc, "other"), None);

        declare_as_context(&mut doc, "inner", None, None).unwrap();
        assert_eq!(get_context_declaration_id(&doc, "inner_step").as_deref(), Some("inner"));
        assert_eq!(get_context_declaration_id(&doc, "detail").as_deref(), Some("ctx"));
    }

    #[test]
    fn test_declaring_parent_skips_nested_declarations() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "ctx");
        declare_as_context(&mut doc, "inner", Some("i"), None).unwrap();
        // An unflagged node inside the nested declaration stays untouched
        doc.get_mut("inner_step").unwrap().metadata.is_blueprint = false;

        declare_as_context(&mut doc, "ctx", None, None).unwrap();
        assert!(!flagged(&doc, "inner_step"));
        assert!(flagged(&doc, "detail"));
        let inner = &doc.get("inner").unwrap().metadata;
        assert!(inner.is_context_declaration);
        assert_eq!(inner.blueprint_icon.as_deref(), Some("i"));
    }

    #[test]
    fn test_remove_nested_declaration_keeps_outer_blueprint() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "lib");
        declare_as_context(&mut doc, "ctx", None, None).unwrap();
        declare_as_context(&mut doc, "inner", None, None).unwrap();

        assert!(remove_context_declaration(&mut doc, "inner"));
        assert!(!doc.get("inner").unwrap().metadata.is_context_declaration);
        assert!(flagged(&doc, "inner"));
        assert!(flagged(&doc, "inner_step"));
        assert_eq!(get_context_declaration_id(&doc, "inner_step").as_deref(), Some("ctx"));
    }

    #[test]
    fn test_remove_outermost_declaration_clears_non_nested_subtree() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "lib");
        declare_as_context(&mut doc, "ctx", None, None).unwrap();
        declare_as_context(&mut doc, "inner", None, None).unwrap();

        assert!(remove_context_declaration(&mut doc, "ctx"));
        assert!(!flagged(&doc, "ctx"));
        assert!(!flagged(&doc, "step"));
        assert!(!flagged(&doc, "detail"));
        // The nested declaration keeps its own flags
        assert!(flagged(&doc, "inner"));
        assert!(flagged(&doc, "inner_step"));
        assert!(flagged(&doc, "lib"));

        assert!(!remove_context_declaration(&mut doc, "ctx"));
    }

    #[test]
    fn test_remove_declaration_strips_applied_references() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "lib");
        declare_as_context(&mut doc, "ctx", None, None).unwrap();
        declare_as_context(&mut doc, "inner", None, None).unwrap();
        applied::apply_context(&mut doc, "other", "ctx");
        applied::apply_context(&mut doc, "other", "inner");

        remove_context_declaration(&mut doc, "ctx");
        let meta = &doc.get("other").unwrap().metadata;
        assert_eq!(meta.applied_context_ids, vec!["inner"]);
        assert_eq!(meta.active_context_id.as_deref(), Some("inner"));
    }

    #[test]
    fn test_unflagging_a_declaration_retracts_it() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "lib");
        declare_as_context(&mut doc, "ctx", None, None).unwrap();
        applied::apply_context(&mut doc, "other", "ctx");

        assert!(remove_from_blueprint(&mut doc, "lib", true));
        assert!(!doc.get("ctx").unwrap().metadata.is_context_declaration);
        assert!(!flagged(&doc, "detail"));
        assert!(doc.get("other").unwrap().metadata.applied_context_ids.is_empty());
        assert!(context_declarations(&doc).is_empty());
    }

    #[test]
    fn test_declarations_listed_in_document_order() {
        let mut doc = library();
        add_to_blueprint(&mut doc, "lib");
        declare_as_context(&mut doc, "ctx", Some("w"), Some("red")).unwrap();
        declare_as_context(&mut doc, "inner", None, None).unwrap();

        let list = context_declarations(&doc);
        assert_eq!(
            list,
            vec![
                ContextDeclarationInfo {
                    node_id: "ctx".into(),
                    content: "Writing".into(),
                    icon: Some("w".into()),
                    color: Some("red".into()),
                },
                ContextDeclarationInfo {
                    node_id: "inner".into(),
                    content: "Editing".into(),
                    icon: None,
                    color: None,
                },
            ]
        );
    }
}
