//! Sibling stacking order
//!
//! Every window keeps its children in a [`ZStack`]. Windows are stored in
//! bottom-to-top order, the last entry being the top-most sibling. Hit testing
//! walks the stack from the top.

use super::WindowId;

/// Stacking order of a set of sibling windows.
///
/// # Examples
///
/// ```
/// use casement::window::{WindowAttributes, WindowTree};
/// use casement::region::Rect;
///
/// let mut tree = WindowTree::new(Rect::new(0, 0, 800, 600));
/// let root = tree.root();
/// let a = tree.create_child(root, WindowAttributes::child(Rect::new(0, 0, 10, 10))).unwrap();
/// let b = tree.create_child(root, WindowAttributes::child(Rect::new(0, 0, 10, 10))).unwrap();
///
/// let stack = &tree.get(root).unwrap().children;
/// assert_eq!(stack.top(), Some(b));
/// assert_eq!(stack.bottom(), Some(a));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZStack {
    /// Windows ordered from bottom to top
    windows: Vec<WindowId>,
}

impl ZStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a window on top of its siblings.
    ///
    /// # Returns
    ///
    /// `true` if the window was added, `false` if it was already present
    pub fn push(&mut self, window: WindowId) -> bool {
        if self.contains(window) {
            return false;
        }
        self.windows.push(window);
        true
    }

    /// Removes a window, returning its previous position
    pub fn remove(&mut self, window: WindowId) -> Option<usize> {
        let pos = self.position(window)?;
        self.windows.remove(pos);
        Some(pos)
    }

    /// Raises a window above all of its siblings.
    ///
    /// # Returns
    ///
    /// `true` if the window was raised, `false` if it wasn't in the stack
    pub fn raise_to_top(&mut self, window: WindowId) -> bool {
        if self.remove(window).is_some() {
            self.windows.push(window);
            true
        } else {
            false
        }
    }

    /// Lowers a window below all of its siblings
    pub fn lower_to_bottom(&mut self, window: WindowId) -> bool {
        if self.remove(window).is_some() {
            self.windows.insert(0, window);
            true
        } else {
            false
        }
    }

    /// Windows in bottom-to-top order
    pub fn bottom_up(&self) -> &[WindowId] {
        &self.windows
    }

    /// Iterates windows from the top-most down
    pub fn top_down(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.windows.iter().rev().copied()
    }

    pub fn top(&self) -> Option<WindowId> {
        self.windows.last().copied()
    }

    pub fn bottom(&self) -> Option<WindowId> {
        self.windows.first().copied()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.windows.contains(&window)
    }

    /// Position 0 is the bottom-most window, and `len() - 1` is the top-most.
    pub fn position(&self, window: WindowId) -> Option<usize> {
        self.windows.iter().position(|&w| w == window)
    }
}
