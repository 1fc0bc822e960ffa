//! The element tree: node core, the `Element` trait and the whole-tree
//! traversals (hit-testing, invalidation, hover, render, disposal).
//!
//! Elements are owned top-down (`Vec<Box<dyn Element>>`); a node keeps only
//! its parent's id as a back-reference. Whole-tree operations are therefore
//! free functions that descend from a root, locate nodes by id and mark
//! ancestor paths while unwinding.

mod container;
mod core;
mod element;
mod style;
mod text;

pub use container::*;
pub use core::*;
pub use element::*;
pub use style::*;
pub use text::*;

use crate::geometry::Point;

/// Finds a node by id anywhere in the subtree.
pub fn find(root: &dyn Element, id: u64) -> Option<&dyn Element> {
    if root.core().id() == id {
        return Some(root);
    }
    for child in root.children().unwrap_or(&[]) {
        if let Some(found) = find(child.as_ref(), id) {
            return Some(found);
        }
    }
    None
}

fn find_path(root: &dyn Element, id: u64) -> Option<Vec<usize>> {
    if root.core().id() == id {
        return Some(Vec::new());
    }
    let children = root.children()?;
    for (index, child) in children.iter().enumerate() {
        if let Some(mut path) = find_path(child.as_ref(), id) {
            path.insert(0, index);
            return Some(path);
        }
    }
    None
}

/// Mutable lookup by id. Resolves the child-index path first, then walks it,
/// which keeps the borrow local to each tree level.
pub fn find_mut(root: &mut dyn Element, id: u64) -> Option<&mut dyn Element> {
    let path = find_path(root, id)?;
    let mut current = root;
    for index in path {
        current = current.children_mut()?.get_mut(index)?.as_mut();
    }
    Some(current)
}

/// Visits every node in document order.
pub fn for_each(root: &dyn Element, f: &mut dyn FnMut(&dyn Element)) {
    f(root);
    for child in root.children().unwrap_or(&[]) {
        for_each(child.as_ref(), f);
    }
}

pub fn for_each_mut(root: &mut dyn Element, f: &mut dyn FnMut(&mut dyn Element)) {
    f(root);
    if let Some(children) = root.children_mut() {
        for child in children {
            for_each_mut(child.as_mut(), f);
        }
    }
}

/// Marks the target and every ancestor on the path measure-dirty (which
/// implies arrange-dirty and a repaint). Returns whether the target was
/// found; an unknown id leaves the tree untouched. A node with no parent
/// above it simply ends the walk; the host polls for dirtiness.
pub fn invalidate_measure(root: &mut dyn Element, target: u64) -> bool {
    let found = mark_measure_path(root, target);
    if found {
        tracing::trace!(id = target, "invalidate measure");
    }
    found
}

fn mark_measure_path(node: &mut dyn Element, target: u64) -> bool {
    let mut found = node.core().id() == target;
    if !found {
        if let Some(children) = node.children_mut() {
            for child in children.iter_mut() {
                if mark_measure_path(child.as_mut(), target) {
                    found = true;
                    break;
                }
            }
        }
    }
    if found {
        node.core_mut().invalidate_measure_local();
    }
    found
}

/// Position-only invalidation: marks the path arrange-dirty without
/// touching measure results.
pub fn invalidate_arrange(root: &mut dyn Element, target: u64) -> bool {
    let mut found = root.core().id() == target;
    if !found {
        if let Some(children) = root.children_mut() {
            for child in children.iter_mut() {
                if invalidate_arrange(child.as_mut(), target) {
                    found = true;
                    break;
                }
            }
        }
    }
    if found {
        root.core_mut().invalidate_arrange_local();
    }
    found
}

/// Topmost hit wins: children are tested in reverse document order before
/// the node falls back to its own bounds. Invisible and hit-test-disabled
/// nodes are skipped with their whole subtree; disabled-but-visible nodes
/// still participate.
pub fn hit_test(root: &dyn Element, point: Point) -> Option<u64> {
    let core = root.core();
    if !core.is_visible() || !core.is_hit_test_visible() {
        return None;
    }
    if let Some(children) = root.children() {
        for child in children.iter().rev() {
            if let Some(id) = hit_test(child.as_ref(), point) {
                return Some(id);
            }
        }
    }
    root.hit_test_self(point).then(|| core.id())
}

/// Applies hover to the chain of nodes whose subtree contains the target
/// and clears it everywhere else. Returns whether any node transitioned.
pub fn update_hover(root: &mut dyn Element, target: Option<u64>) -> bool {
    fn walk(node: &mut dyn Element, target: Option<u64>) -> (bool, bool) {
        let mut contains = target == Some(node.core().id());
        let mut changed = false;
        if let Some(children) = node.children_mut() {
            for child in children.iter_mut() {
                let (child_contains, child_changed) = walk(child.as_mut(), target);
                contains |= child_contains;
                changed |= child_changed;
            }
        }
        changed |= node.core_mut().set_hovered(contains);
        (contains, changed)
    }

    walk(root, target).1
}

/// Depth-first render traversal: one `on_render` per visible node, parent
/// before children, skipping invisible subtrees entirely.
pub fn render_tree(root: &mut dyn Element, surface: &mut dyn DrawSurface) {
    if !root.core().is_visible() {
        return;
    }
    root.on_render(surface);
    root.core_mut().flags.remove(ElementFlags::NEEDS_PAINT);
    if let Some(children) = root.children_mut() {
        for child in children.iter_mut() {
            render_tree(child.as_mut(), surface);
        }
    }
}

/// Whether anything in the subtree still needs a layout pass. Invisible
/// subtrees don't count: their stale state is irrelevant until they are
/// shown again, and showing them re-invalidates measure.
pub fn subtree_needs_layout(root: &dyn Element) -> bool {
    if !root.core().is_visible() {
        return false;
    }
    if root.core().needs_measure() || root.core().needs_arrange() {
        return true;
    }
    root.children()
        .unwrap_or(&[])
        .iter()
        .any(|child| subtree_needs_layout(child.as_ref()))
}

pub fn subtree_needs_paint(root: &dyn Element) -> bool {
    if root.core().needs_paint() {
        return true;
    }
    root.children()
        .unwrap_or(&[])
        .iter()
        .any(|child| subtree_needs_paint(child.as_ref()))
}

/// Broadcasts a DPI scale change to the whole tree. Changed nodes
/// invalidate their own measure; the caller re-runs layout from the root.
pub fn set_scale(root: &mut dyn Element, scale: f32) {
    for_each_mut(root, &mut |node| node.core_mut().set_scale(scale));
}

/// Tears a subtree down leaf-first: every node's `dispose` hook runs after
/// its children's, and parent links are severed on the way out.
pub fn dispose_tree(root: &mut dyn Element) {
    if let Some(children) = root.children_mut() {
        for child in children.iter_mut() {
            dispose_tree(child.as_mut());
        }
    }
    root.dispose();
    root.core_mut().parent_id = None;
}
