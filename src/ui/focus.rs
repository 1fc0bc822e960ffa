use thiserror::Error;

use crate::element::{Element, find_mut};

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FocusError {
    #[error("no element with id {0} in the tree")]
    UnknownElement(u64),
    #[error("element {0} is not focusable")]
    NotFocusable(u64),
    #[error("element {0} is disabled")]
    Disabled(u64),
    #[error("element {0} is not visible")]
    NotVisible(u64),
}

/// Document-order ids of the nodes that can take focus right now:
/// focusable, effectively visible and effectively enabled (both inherited
/// from ancestors). Rebuilt on demand; the tree is the source of truth.
pub fn collect_focus_order(root: &dyn Element) -> Vec<u64> {
    fn walk(node: &dyn Element, enabled: bool, out: &mut Vec<u64>) {
        if !node.core().is_visible() {
            return;
        }
        let enabled = enabled && node.core().is_enabled();
        if enabled && node.core().is_focusable() {
            out.push(node.core().id());
        }
        for child in node.children().unwrap_or(&[]) {
            walk(child.as_ref(), enabled, out);
        }
    }

    let mut out = Vec::new();
    walk(root, true, &mut out);
    out
}

fn eligibility(node: &dyn Element, id: u64, enabled: bool) -> Option<Result<(), FocusError>> {
    let visible = node.core().is_visible();
    let enabled = enabled && node.core().is_enabled();
    if node.core().id() == id {
        return Some(if !visible {
            Err(FocusError::NotVisible(id))
        } else if !enabled {
            Err(FocusError::Disabled(id))
        } else if !node.core().is_focusable() {
            Err(FocusError::NotFocusable(id))
        } else {
            Ok(())
        });
    }
    for child in node.children().unwrap_or(&[]) {
        if let Some(result) = eligibility(child.as_ref(), id, enabled) {
            // Invisibility anywhere on the ancestor chain rejects too.
            return Some(if !visible {
                Err(FocusError::NotVisible(id))
            } else {
                result
            });
        }
    }
    None
}

/// Owns the single focused node of a tree and the tab-order traversal over
/// it. Flag writes are edge-triggered: refocusing the current node fires
/// nothing.
#[derive(Default)]
pub struct FocusManager {
    current: Option<u64>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<u64> {
        self.current
    }

    /// Moves focus to `id`. An ineligible target (unknown, invisible,
    /// disabled or not focusable) is rejected and the current focus stays
    /// untouched.
    pub fn focus(&mut self, root: &mut dyn Element, id: u64) -> Result<(), FocusError> {
        match eligibility(root, id, true) {
            None => return Err(FocusError::UnknownElement(id)),
            Some(Err(err)) => return Err(err),
            Some(Ok(())) => {}
        }
        if self.current == Some(id) {
            return Ok(());
        }
        if let Some(old) = self.current.take() {
            if let Some(node) = find_mut(root, old) {
                node.core_mut().set_focused(false);
            }
        }
        if let Some(node) = find_mut(root, id) {
            node.core_mut().set_focused(true);
        }
        self.current = Some(id);
        tracing::debug!(id, "focus moved");
        Ok(())
    }

    pub fn clear(&mut self, root: &mut dyn Element) {
        if let Some(old) = self.current.take() {
            if let Some(node) = find_mut(root, old) {
                node.core_mut().set_focused(false);
            }
        }
    }

    /// Focus the next eligible node in document order, wrapping at the end.
    pub fn focus_next(&mut self, root: &mut dyn Element) -> Option<u64> {
        self.advance(root, 1)
    }

    /// Focus the previous eligible node, wrapping at the start.
    pub fn focus_prev(&mut self, root: &mut dyn Element) -> Option<u64> {
        self.advance(root, -1)
    }

    fn advance(&mut self, root: &mut dyn Element, step: isize) -> Option<u64> {
        let order = collect_focus_order(root);
        if order.is_empty() {
            return None;
        }
        let next = match self.current.and_then(|c| order.iter().position(|&id| id == c)) {
            Some(index) => {
                let len = order.len() as isize;
                order[((index as isize + step).rem_euclid(len)) as usize]
            }
            None => {
                if step > 0 {
                    order[0]
                } else {
                    *order.last().unwrap()
                }
            }
        };
        self.focus(root, next).ok()?;
        Some(next)
    }

    /// Drops the focus reference if the focused node left the tree.
    pub fn prune(&mut self, root: &dyn Element) {
        if let Some(current) = self.current {
            if crate::element::find(root, current).is_none() {
                self.current = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Container, Element};
    use crate::panel::StackPanel;

    fn focusable() -> Box<dyn Element> {
        let mut c = Container::new();
        c.core_mut().set_focusable(true);
        Box::new(c)
    }

    fn tree_of_three() -> (StackPanel, Vec<u64>) {
        let mut root = StackPanel::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let child = focusable();
            ids.push(child.core().id());
            root.add_child(child);
        }
        (root, ids)
    }

    #[test]
    fn order_is_document_order() {
        let (root, ids) = tree_of_three();
        assert_eq!(collect_focus_order(&root), ids);
    }

    #[test]
    fn next_and_prev_wrap_cyclically() {
        let (mut root, ids) = tree_of_three();
        let mut focus = FocusManager::new();

        assert_eq!(focus.focus_next(&mut root), Some(ids[0]));
        assert_eq!(focus.focus_next(&mut root), Some(ids[1]));
        assert_eq!(focus.focus_next(&mut root), Some(ids[2]));
        assert_eq!(focus.focus_next(&mut root), Some(ids[0]));
        assert_eq!(focus.focus_prev(&mut root), Some(ids[2]));
    }

    #[test]
    fn focusing_rejects_ineligible_targets() {
        let mut root = StackPanel::new();

        let not_focusable = Container::new();
        let plain_id = not_focusable.core().id();
        root.add_child(Box::new(not_focusable));

        let mut disabled = Container::new();
        disabled.core_mut().set_focusable(true);
        disabled.core_mut().set_enabled(false);
        let disabled_id = disabled.core().id();
        root.add_child(Box::new(disabled));

        let mut hidden = Container::new();
        hidden.core_mut().set_focusable(true);
        hidden.core_mut().set_visible(false);
        let hidden_id = hidden.core().id();
        root.add_child(Box::new(hidden));

        let mut focus = FocusManager::new();
        assert_eq!(
            focus.focus(&mut root, plain_id),
            Err(FocusError::NotFocusable(plain_id))
        );
        assert_eq!(
            focus.focus(&mut root, disabled_id),
            Err(FocusError::Disabled(disabled_id))
        );
        assert_eq!(
            focus.focus(&mut root, hidden_id),
            Err(FocusError::NotVisible(hidden_id))
        );
        assert_eq!(
            focus.focus(&mut root, 123_456),
            Err(FocusError::UnknownElement(123_456))
        );
        assert_eq!(focus.focused(), None);
    }

    #[test]
    fn disabled_ancestor_rejects_descendants() {
        let mut inner = StackPanel::new();
        let target = focusable();
        let target_id = target.core().id();
        inner.add_child(target);
        inner.core_mut().set_enabled(false);

        let mut root = StackPanel::new();
        root.add_child(Box::new(inner));

        let mut focus = FocusManager::new();
        assert_eq!(
            focus.focus(&mut root, target_id),
            Err(FocusError::Disabled(target_id))
        );
        assert!(collect_focus_order(&root).is_empty());
    }

    #[test]
    fn invisible_ancestor_hides_descendants_from_the_order() {
        let mut inner = StackPanel::new();
        let target = focusable();
        let target_id = target.core().id();
        inner.add_child(target);
        inner.core_mut().set_visible(false);

        let mut root = StackPanel::new();
        root.add_child(Box::new(inner));

        assert!(collect_focus_order(&root).is_empty());
        let mut focus = FocusManager::new();
        assert_eq!(
            focus.focus(&mut root, target_id),
            Err(FocusError::NotVisible(target_id))
        );
    }

    #[test]
    fn moving_focus_flips_flags_edge_triggered() {
        let (mut root, ids) = tree_of_three();
        let mut focus = FocusManager::new();

        focus.focus(&mut root, ids[0]).unwrap();
        assert!(crate::element::find(&root, ids[0]).unwrap().core().is_focused());

        // Refocusing the same node is a quiet no-op.
        focus.focus(&mut root, ids[0]).unwrap();

        focus.focus(&mut root, ids[1]).unwrap();
        assert!(!crate::element::find(&root, ids[0]).unwrap().core().is_focused());
        assert!(crate::element::find(&root, ids[1]).unwrap().core().is_focused());
    }

    #[test]
    fn rejected_focus_leaves_state_unchanged() {
        let (mut root, ids) = tree_of_three();
        let mut focus = FocusManager::new();
        focus.focus(&mut root, ids[1]).unwrap();

        let mut hidden = Container::new();
        hidden.core_mut().set_focusable(true);
        hidden.core_mut().set_visible(false);
        let hidden_id = hidden.core().id();
        root.add_child(Box::new(hidden));

        assert!(focus.focus(&mut root, hidden_id).is_err());
        assert_eq!(focus.focused(), Some(ids[1]));
        assert!(crate::element::find(&root, ids[1]).unwrap().core().is_focused());
    }
}
