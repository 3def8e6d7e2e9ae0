//! Bounded depth-first traversal over foreign element trees.

use crate::platform::ElementRef;

/// Traversal limits. Depth 0 is the root.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    /// Deepest level visited; `None` for unbounded depth.
    pub max_depth: Option<usize>,
    /// Most nodes visited before giving up.
    pub max_nodes: usize,
}

/// Pre-order search returning the first node accepted by `pred`.
pub fn find_first<F>(root: &ElementRef, bounds: Bounds, mut pred: F) -> Option<ElementRef>
where
    F: FnMut(&ElementRef) -> bool,
{
    let mut found = None;
    visit(root, bounds, |node, _| {
        if pred(node) {
            found = Some(node.clone());
            false
        } else {
            true
        }
    });
    found
}

/// Return the accepted node with the greatest depth; ties go to the earliest in
/// pre-order.
pub fn find_deepest<F>(root: &ElementRef, bounds: Bounds, mut pred: F) -> Option<ElementRef>
where
    F: FnMut(&ElementRef) -> bool,
{
    let mut best: Option<(usize, ElementRef)> = None;
    visit(root, bounds, |node, depth| {
        if best.as_ref().is_none_or(|(d, _)| depth > *d) && pred(node) {
            best = Some((depth, node.clone()));
        }
        true
    });
    best.map(|(_, e)| e)
}

/// Walk nodes in pre-order. `f` receives each node with its depth and returns
/// `false` to stop.
fn visit<F>(root: &ElementRef, bounds: Bounds, mut f: F)
where
    F: FnMut(&ElementRef, usize) -> bool,
{
    let mut stack: Vec<(ElementRef, usize)> = vec![(root.clone(), 0)];
    let mut seen = 0usize;
    while let Some((node, depth)) = stack.pop() {
        if seen >= bounds.max_nodes {
            return;
        }
        seen += 1;
        if !f(&node, depth) {
            return;
        }
        if bounds.max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        let children = node.children();
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeElement;

    fn tagged(id: &str) -> FakeElement {
        FakeElement::new("AXGroup").with_identifier(id)
    }

    fn tree() -> ElementRef {
        // root
        //   a
        //     a1
        //       a1x
        //   b
        //     b1
        FakeElement::new("AXWindow")
            .with_child(tagged("a").with_child(tagged("a1").with_child(tagged("a1x"))))
            .with_child(tagged("b").with_child(tagged("b1")))
            .build()
    }

    fn id(e: &ElementRef) -> String {
        e.identifier().unwrap_or_default()
    }

    #[test]
    fn first_is_preorder() {
        let b = Bounds {
            max_depth: None,
            max_nodes: 100,
        };
        let hit = find_first(&tree(), b, |e| id(e).len() == 2).map(|e| id(&e));
        assert_eq!(hit.as_deref(), Some("a1"));
        let hit = find_first(&tree(), b, |e| id(e).starts_with('b')).map(|e| id(&e));
        assert_eq!(hit.as_deref(), Some("b"));
    }

    #[test]
    fn depth_bound_hides_deep_nodes() {
        let b = Bounds {
            max_depth: Some(2),
            max_nodes: 100,
        };
        assert!(find_first(&tree(), b, |e| id(e) == "a1x").is_none());
        assert!(find_first(&tree(), b, |e| id(e) == "a1").is_some());
    }

    #[test]
    fn node_budget_stops_walk() {
        let b = Bounds {
            max_depth: None,
            max_nodes: 3,
        };
        // Pre-order: root, a, a1, a1x, b, b1.
        assert!(find_first(&tree(), b, |e| id(e) == "a1").is_some());
        assert!(find_first(&tree(), b, |e| id(e) == "a1x").is_none());
    }

    #[test]
    fn deepest_prefers_depth_then_order() {
        let b = Bounds {
            max_depth: None,
            max_nodes: 100,
        };
        let hit = find_deepest(&tree(), b, |e| !id(e).is_empty()).map(|e| id(&e));
        assert_eq!(hit.as_deref(), Some("a1x"));
        let hit = find_deepest(&tree(), b, |e| id(e).len() == 2).map(|e| id(&e));
        assert_eq!(hit.as_deref(), Some("a1"));
    }
}
