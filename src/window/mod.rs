//! Logical window tree and hit testing
//!
//! Windows live in a `slotmap` arena and are addressed by [`WindowId`]
//! handles. Parents own their children through a [`ZStack`]; every other
//! reference (grabs, queued events, damage) is a plain handle that is
//! resolved through the tree.
//!
//! Destroying a window detaches its subtree and leaves tombstones behind so
//! that events still sitting in the queue can name it. Tombstones are purged
//! once nothing references them anymore.
//!
//! The root's children are native toplevels. Their stacking order is owned by
//! the platform, so hit testing at the root follows a cached copy of the
//! native front-to-back order that is invalidated whenever the toplevel set or
//! its order may have changed.

pub mod stack;

use std::collections::{HashMap, VecDeque};

use log::{debug, trace};
use slotmap::{new_key_type, SlotMap};

use crate::error::WindowError;
use crate::input::modifiers::EventMask;
use crate::platform::NativeViewId;
use crate::region::{Point, Rect};

pub use stack::ZStack;

new_key_type! {
    /// Handle of a logical window. Copy, generational.
    pub struct WindowId;
}

/// Role of a window in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// The virtual desktop. Never receives events.
    Root,
    /// A native window owned by this toolkit.
    Toplevel,
    /// An override-redirect native window such as a menu or tooltip.
    Temp,
    /// A child window inside a toplevel.
    Child,
}

impl WindowKind {
    pub fn is_toplevel(self) -> bool {
        matches!(self, WindowKind::Toplevel | WindowKind::Temp)
    }
}

/// Creation parameters for a window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAttributes {
    pub kind: WindowKind,
    /// Bounds relative to the parent (the virtual desktop for toplevels)
    pub bounds: Rect,
    pub event_mask: EventMask,
    /// Input-only windows take part in hit testing but are never painted
    pub input_only: bool,
    /// Height of the native title bar drawn above a toplevel's content
    pub decoration_height: i32,
}

impl WindowAttributes {
    pub fn toplevel(bounds: Rect) -> Self {
        Self {
            kind: WindowKind::Toplevel,
            bounds,
            event_mask: EventMask::empty(),
            input_only: false,
            decoration_height: 0,
        }
    }

    pub fn temp(bounds: Rect) -> Self {
        Self {
            kind: WindowKind::Temp,
            ..Self::toplevel(bounds)
        }
    }

    pub fn child(bounds: Rect) -> Self {
        Self {
            kind: WindowKind::Child,
            ..Self::toplevel(bounds)
        }
    }

    pub fn with_event_mask(mut self, event_mask: EventMask) -> Self {
        self.event_mask = event_mask;
        self
    }

    pub fn input_only(mut self) -> Self {
        self.input_only = true;
        self
    }

    pub fn with_decoration(mut self, height: i32) -> Self {
        self.decoration_height = height.max(0);
        self
    }
}

/// A logical window
#[derive(Debug, Clone)]
pub struct WindowNode {
    pub parent: Option<WindowId>,
    /// Children in stacking order
    pub children: ZStack,
    /// Bounds relative to the parent
    pub bounds: Rect,
    /// Origin in virtual-desktop coordinates, kept in sync with every ancestor
    pub absolute_origin: Point,
    pub event_mask: EventMask,
    pub mapped: bool,
    pub destroyed: bool,
    pub kind: WindowKind,
    pub input_only: bool,
    /// Backing native view, toplevels only
    pub view: Option<NativeViewId>,
    pub decoration_height: i32,
}

impl WindowNode {
    /// Size-only rectangle in the window's own coordinates
    pub fn local_bounds(&self) -> Rect {
        Rect::new(0, 0, self.bounds.width, self.bounds.height)
    }

    /// The native title bar strip, in the parent's coordinates
    fn decoration_rect(&self) -> Option<Rect> {
        if !self.kind.is_toplevel() || self.decoration_height <= 0 {
            return None;
        }
        Some(Rect::new(
            self.bounds.x,
            self.bounds.y - self.decoration_height,
            self.bounds.width,
            self.decoration_height,
        ))
    }
}

/// Result of a point-to-window lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The deepest mapped window containing the point
    Window(WindowId),
    /// The point is on the native decoration of this toplevel
    Decoration(WindowId),
    /// The point is outside the searched window
    Foreign,
}

/// The window hierarchy of one display
#[derive(Debug)]
pub struct WindowTree {
    nodes: SlotMap<WindowId, WindowNode>,
    root: WindowId,
    views: HashMap<NativeViewId, WindowId>,
    /// Toplevels front to back, `None` when it must be re-read from the platform
    toplevel_order: Option<Vec<WindowId>>,
    tombstones: usize,
}

impl WindowTree {
    /// Creates a tree whose root covers the given virtual desktop
    pub fn new(desktop: Rect) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(WindowNode {
            parent: None,
            children: ZStack::new(),
            bounds: desktop,
            absolute_origin: desktop.origin(),
            event_mask: EventMask::empty(),
            mapped: true,
            destroyed: false,
            kind: WindowKind::Root,
            input_only: false,
            view: None,
            decoration_height: 0,
        });

        Self {
            nodes,
            root,
            views: HashMap::new(),
            toplevel_order: None,
            tombstones: 0,
        }
    }

    pub fn root(&self) -> WindowId {
        self.root
    }

    /// Looks up a window, tombstones included
    pub fn get(&self, id: WindowId) -> Option<&WindowNode> {
        self.nodes.get(id)
    }

    /// `true` if the handle names a window that has not been destroyed
    pub fn is_alive(&self, id: WindowId) -> bool {
        self.nodes.get(id).map_or(false, |node| !node.destroyed)
    }

    fn live(&self, id: WindowId) -> Result<&WindowNode, WindowError> {
        match self.nodes.get(id) {
            None => Err(WindowError::UnknownWindow(id)),
            Some(node) if node.destroyed => Err(WindowError::Destroyed(id)),
            Some(node) => Ok(node),
        }
    }

    fn live_mut(&mut self, id: WindowId) -> Result<&mut WindowNode, WindowError> {
        match self.nodes.get_mut(id) {
            None => Err(WindowError::UnknownWindow(id)),
            Some(node) if node.destroyed => Err(WindowError::Destroyed(id)),
            Some(node) => Ok(node),
        }
    }

    /// Resizes the virtual desktop after a monitor topology change
    pub fn set_desktop_bounds(&mut self, desktop: Rect) {
        if let Some(root) = self.nodes.get_mut(self.root) {
            root.bounds = desktop;
        }
        self.update_origins(self.root);
    }

    /// Creates a toplevel backed by a native view.
    ///
    /// `attrs.bounds` are virtual-desktop coordinates of the content area.
    pub fn create_toplevel(
        &mut self,
        view: NativeViewId,
        attrs: WindowAttributes,
    ) -> Result<WindowId, WindowError> {
        if self.views.contains_key(&view) {
            return Err(WindowError::ViewAlreadyBound(view.0));
        }

        let kind = if attrs.kind == WindowKind::Temp {
            WindowKind::Temp
        } else {
            WindowKind::Toplevel
        };
        let id = self.insert_node(self.root, WindowAttributes { kind, ..attrs })?;
        if let Some(node) = self.nodes.get_mut(id) {
            node.view = Some(view);
        }
        self.views.insert(view, id);
        self.invalidate_toplevel_order();

        debug!("🪟 Created toplevel {:?} for view {:?}", id, view);
        Ok(id)
    }

    /// Creates a child window. `attrs.bounds` are relative to `parent`.
    pub fn create_child(
        &mut self,
        parent: WindowId,
        attrs: WindowAttributes,
    ) -> Result<WindowId, WindowError> {
        let id = self.insert_node(
            parent,
            WindowAttributes {
                kind: WindowKind::Child,
                ..attrs
            },
        )?;
        trace!("Created child {:?} under {:?}", id, parent);
        Ok(id)
    }

    fn insert_node(
        &mut self,
        parent: WindowId,
        attrs: WindowAttributes,
    ) -> Result<WindowId, WindowError> {
        let parent_origin = self.live(parent)?.absolute_origin;

        let id = self.nodes.insert(WindowNode {
            parent: Some(parent),
            children: ZStack::new(),
            bounds: attrs.bounds,
            absolute_origin: parent_origin + attrs.bounds.origin(),
            event_mask: attrs.event_mask,
            mapped: false,
            destroyed: false,
            kind: attrs.kind,
            input_only: attrs.input_only,
            view: None,
            decoration_height: attrs.decoration_height,
        });

        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    /// Destroys a window and its subtree.
    ///
    /// The nodes stay in the arena as tombstones until [`purge_destroyed`]
    /// finds them unreferenced.
    ///
    /// # Returns
    ///
    /// Every window destroyed by this call, the window itself first
    ///
    /// [`purge_destroyed`]: WindowTree::purge_destroyed
    pub fn destroy(&mut self, id: WindowId) -> Result<Vec<WindowId>, WindowError> {
        if id == self.root {
            return Err(WindowError::RootWindow);
        }
        let node = self.live(id)?;
        let parent = node.parent;
        let was_toplevel = node.kind.is_toplevel();

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.remove(id);
        }

        let subtree = self.subtree(id);
        for &window in &subtree {
            if let Some(node) = self.nodes.get_mut(window) {
                node.destroyed = true;
                node.mapped = false;
                if let Some(view) = node.view.take() {
                    self.views.remove(&view);
                }
            }
        }
        self.tombstones += subtree.len();

        if was_toplevel {
            self.invalidate_toplevel_order();
        }

        debug!("🗑️ Destroyed {:?} ({} windows)", id, subtree.len());
        Ok(subtree)
    }

    /// Removes tombstones that `is_referenced` no longer needs.
    ///
    /// # Returns
    ///
    /// The number of nodes released from the arena
    pub fn purge_destroyed<F>(&mut self, is_referenced: F) -> usize
    where
        F: Fn(WindowId) -> bool,
    {
        if self.tombstones == 0 {
            return 0;
        }

        let before = self.nodes.len();
        self.nodes
            .retain(|id, node| !node.destroyed || is_referenced(id));
        let released = before - self.nodes.len();
        self.tombstones -= released;

        if released > 0 {
            trace!("Purged {} destroyed windows", released);
        }
        released
    }

    pub fn has_tombstones(&self) -> bool {
        self.tombstones > 0
    }

    /// The window and all its descendants, breadth first
    fn subtree(&self, id: WindowId) -> Vec<WindowId> {
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            out.push(current);
            if let Some(node) = self.nodes.get(current) {
                queue.extend(node.children.bottom_up().iter().copied());
            }
        }
        out
    }

    /// Marks a window mapped. Returns `true` if the state changed.
    pub fn map(&mut self, id: WindowId) -> Result<bool, WindowError> {
        self.set_mapped(id, true)
    }

    /// Marks a window unmapped. Returns `true` if the state changed.
    pub fn unmap(&mut self, id: WindowId) -> Result<bool, WindowError> {
        self.set_mapped(id, false)
    }

    fn set_mapped(&mut self, id: WindowId, mapped: bool) -> Result<bool, WindowError> {
        if id == self.root {
            return Err(WindowError::RootWindow);
        }
        let node = self.live_mut(id)?;
        if node.mapped == mapped {
            return Ok(false);
        }
        node.mapped = mapped;
        if node.kind.is_toplevel() {
            self.invalidate_toplevel_order();
        }
        Ok(true)
    }

    /// Moves and resizes a window, bounds relative to its parent.
    ///
    /// # Returns
    ///
    /// `true` if the bounds changed
    pub fn move_resize(&mut self, id: WindowId, bounds: Rect) -> Result<bool, WindowError> {
        if id == self.root {
            return Err(WindowError::RootWindow);
        }
        let node = self.live_mut(id)?;
        if node.bounds == bounds {
            return Ok(false);
        }
        node.bounds = bounds;
        self.update_origins(id);
        Ok(true)
    }

    /// Moves a child window under a new parent at `origin` (parent-relative)
    pub fn reparent(
        &mut self,
        id: WindowId,
        new_parent: WindowId,
        origin: Point,
    ) -> Result<(), WindowError> {
        if id == self.root {
            return Err(WindowError::RootWindow);
        }
        if self.live(id)?.kind != WindowKind::Child || new_parent == self.root {
            return Err(WindowError::CannotReparent(id));
        }
        self.live(new_parent)?;
        if new_parent == id || self.is_ancestor(id, new_parent) {
            return Err(WindowError::WouldCreateCycle {
                child: id,
                parent: new_parent,
            });
        }

        let old_parent = self.nodes.get(id).and_then(|n| n.parent);
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(p)) {
            old.children.remove(id);
        }
        if let Some(parent) = self.nodes.get_mut(new_parent) {
            parent.children.push(id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = Some(new_parent);
            node.bounds.x = origin.x;
            node.bounds.y = origin.y;
        }
        self.update_origins(id);
        Ok(())
    }

    /// Recomputes cached absolute origins for a window and its descendants
    fn update_origins(&mut self, id: WindowId) {
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let parent_origin = self
                .nodes
                .get(current)
                .and_then(|n| n.parent)
                .and_then(|p| self.nodes.get(p))
                .map_or(Point::default(), |p| p.absolute_origin);

            if let Some(node) = self.nodes.get_mut(current) {
                node.absolute_origin = parent_origin + node.bounds.origin();
                queue.extend(node.children.bottom_up().iter().copied());
            }
        }
    }

    /// Raises a window above its siblings
    pub fn raise(&mut self, id: WindowId) -> Result<(), WindowError> {
        self.restack(id, true)
    }

    /// Lowers a window below its siblings
    pub fn lower(&mut self, id: WindowId) -> Result<(), WindowError> {
        self.restack(id, false)
    }

    fn restack(&mut self, id: WindowId, raise: bool) -> Result<(), WindowError> {
        let node = self.live(id)?;
        let parent = node.parent.ok_or(WindowError::RootWindow)?;
        let toplevel = node.kind.is_toplevel();

        if let Some(parent) = self.nodes.get_mut(parent) {
            if raise {
                parent.children.raise_to_top(id);
            } else {
                parent.children.lower_to_bottom(id);
            }
        }
        if toplevel {
            self.invalidate_toplevel_order();
        }
        Ok(())
    }

    pub fn set_event_mask(&mut self, id: WindowId, mask: EventMask) -> Result<(), WindowError> {
        self.live_mut(id)?.event_mask = mask;
        Ok(())
    }

    /// Maps a native view back to the toplevel it backs
    pub fn window_for_view(&self, view: NativeViewId) -> Option<WindowId> {
        self.views.get(&view).copied()
    }

    /// Live toplevels in arbitrary order
    pub fn toplevels(&self) -> Vec<WindowId> {
        self.nodes
            .get(self.root)
            .map(|root| root.children.bottom_up().to_vec())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: WindowId) -> Option<WindowId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Iterates the ancestors of a window, closest first, ending with the root
    pub fn ancestors(&self, id: WindowId) -> impl Iterator<Item = WindowId> + '_ {
        std::iter::successors(self.parent(id), move |&w| self.parent(w))
    }

    /// `true` if `ancestor` is a strict ancestor of `descendant`
    pub fn is_ancestor(&self, ancestor: WindowId, descendant: WindowId) -> bool {
        self.ancestors(descendant).any(|w| w == ancestor)
    }

    /// Closest window that is `a`, `b`, or an ancestor of both
    pub fn common_ancestor(&self, a: WindowId, b: WindowId) -> Option<WindowId> {
        std::iter::once(a)
            .chain(self.ancestors(a))
            .find(|&w| w == b || self.is_ancestor(w, b))
    }

    /// The toplevel containing a window (the window itself for toplevels)
    pub fn toplevel_of(&self, id: WindowId) -> Option<WindowId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&w| self.nodes.get(w).map_or(false, |n| n.kind.is_toplevel()))
    }

    /// `true` if the window and all of its ancestors are mapped
    pub fn is_viewable(&self, id: WindowId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .all(|w| self.nodes.get(w).map_or(false, |n| n.mapped && !n.destroyed))
    }

    pub fn absolute_origin(&self, id: WindowId) -> Option<Point> {
        self.nodes.get(id).map(|n| n.absolute_origin)
    }

    pub fn needs_order_refresh(&self) -> bool {
        self.toplevel_order.is_none()
    }

    pub fn invalidate_toplevel_order(&mut self) {
        if self.toplevel_order.take().is_some() {
            trace!("Toplevel order cache invalidated");
        }
    }

    /// Rebuilds the toplevel order from the native front-to-back view list.
    ///
    /// Views we don't own are skipped. Toplevels the platform doesn't list yet
    /// go after the listed ones in their sibling order.
    pub fn refresh_toplevel_order(&mut self, front_to_back: &[NativeViewId]) {
        let mut order: Vec<WindowId> = front_to_back
            .iter()
            .filter_map(|view| self.views.get(view).copied())
            .collect();

        if let Some(root) = self.nodes.get(self.root) {
            for id in root.children.top_down() {
                if !order.contains(&id) {
                    order.push(id);
                }
            }
        }

        self.toplevel_order = Some(order);
    }

    /// Children of a window from the top-most down
    fn children_top_down(&self, id: WindowId) -> Vec<WindowId> {
        if id == self.root {
            if let Some(order) = &self.toplevel_order {
                return order
                    .iter()
                    .copied()
                    .filter(|&w| self.parent(w) == Some(self.root))
                    .collect();
            }
        }
        self.nodes
            .get(id)
            .map(|n| n.children.top_down().collect())
            .unwrap_or_default()
    }

    /// Finds the deepest mapped window containing `point`.
    ///
    /// `point` is in the coordinate space of `start`'s bounds, i.e. its
    /// parent's space (virtual-desktop coordinates when `start` is the root
    /// or a toplevel).
    ///
    /// # Returns
    ///
    /// [`HitTarget::Foreign`] when the point lies outside `start`,
    /// [`HitTarget::Decoration`] when it lies on a toplevel's title bar
    pub fn find_window_at(&self, start: WindowId, point: Point) -> HitTarget {
        let Ok(node) = self.live(start) else {
            return HitTarget::Foreign;
        };
        if !node.bounds.contains_point(point.x, point.y) {
            return HitTarget::Foreign;
        }

        let mut current = start;
        let mut local = point - node.bounds.origin();

        'descend: loop {
            for child in self.children_top_down(current) {
                let Some(child_node) = self.nodes.get(child) else {
                    continue;
                };
                if child_node.destroyed || !child_node.mapped {
                    continue;
                }

                if child_node.bounds.contains_point(local.x, local.y) {
                    local = local - child_node.bounds.origin();
                    current = child;
                    continue 'descend;
                }

                if child_node
                    .decoration_rect()
                    .map_or(false, |deco| deco.contains_point(local.x, local.y))
                {
                    return HitTarget::Decoration(child);
                }
            }
            return HitTarget::Window(current);
        }
    }
}
