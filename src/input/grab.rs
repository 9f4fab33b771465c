//! Pointer and keyboard grabs
//!
//! At most one pointer grab and one keyboard grab are active at a time. A
//! pointer grab is either explicit (requested by the application) or implicit
//! (started by a button press and held until every button of that press
//! episode is released).
//!
//! Routing rules for pointer events while a grab is active:
//!
//! - an explicit grab whose mask does not select the event drops it
//! - implicit grabs skip the mask check so motion and release keep flowing
//! - with owner events, normal hit testing applies and the grab window is the
//!   fallback when no window of ours would get the event
//! - without owner events, the grab window gets the event

use log::debug;

use crate::input::modifiers::{EventMask, ModifierState};
use crate::window::{WindowId, WindowTree};

/// An active or ended grab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabRecord {
    pub window: WindowId,
    /// Window the pointer should stay inside, recorded for the platform
    pub confine_to: Option<WindowId>,
    pub owner_events: bool,
    pub event_mask: EventMask,
    pub start_serial: u64,
    /// 0 while the grab is active
    pub end_serial: u64,
    pub implicit: bool,
    pub time: u32,
}

impl GrabRecord {
    pub fn is_active(&self) -> bool {
        self.end_serial == 0
    }
}

/// Outcome of a grab request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabStatus {
    Success,
    /// Another window holds the grab
    AlreadyGrabbed,
    /// The window is destroyed or not mapped
    NotViewable,
}

/// Where an event should go given the active grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Use normal delivery, falling back to the given window if that finds nothing
    Normal { fallback: Option<WindowId> },
    /// Deliver to this window regardless of what is under the pointer
    Forced(WindowId),
    /// The grab swallows the event
    Drop,
}

/// Grabs ended together by [`GrabManager::break_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokenGrabs {
    pub keyboard: Option<GrabRecord>,
    pub pointer: Option<GrabRecord>,
}

/// Owns the pointer and keyboard grab state of one input context
#[derive(Debug, Default)]
pub struct GrabManager {
    pointer: Option<GrabRecord>,
    keyboard: Option<GrabRecord>,
    /// Buttons pressed during the current press episode
    buttons: ModifierState,
}

impl GrabManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_grab(&self) -> Option<&GrabRecord> {
        self.pointer.as_ref()
    }

    pub fn keyboard_grab(&self) -> Option<&GrabRecord> {
        self.keyboard.as_ref()
    }

    /// Buttons held in the current press episode
    pub fn buttons_down(&self) -> ModifierState {
        self.buttons
    }

    /// Requests an explicit pointer grab.
    ///
    /// Re-requesting from the grabbing window is a no-op. An implicit grab is
    /// replaced by the explicit one; its button episode keeps running.
    #[allow(clippy::too_many_arguments)]
    pub fn request_pointer_grab(
        &mut self,
        tree: &WindowTree,
        window: WindowId,
        owner_events: bool,
        event_mask: EventMask,
        confine_to: Option<WindowId>,
        time: u32,
        serial: u64,
    ) -> GrabStatus {
        if !tree.is_viewable(window) {
            return GrabStatus::NotViewable;
        }

        match &self.pointer {
            Some(grab) if !grab.implicit && grab.window != window => {
                debug!("🔒 Pointer grab for {:?} refused, held by {:?}", window, grab.window);
                return GrabStatus::AlreadyGrabbed;
            }
            Some(grab) if !grab.implicit => return GrabStatus::Success,
            _ => {}
        }

        debug!("🔒 Pointer grab started on {:?} (owner_events={})", window, owner_events);
        self.pointer = Some(GrabRecord {
            window,
            confine_to,
            owner_events,
            event_mask,
            start_serial: serial,
            end_serial: 0,
            implicit: false,
            time,
        });
        GrabStatus::Success
    }

    /// Requests a keyboard grab with the same exclusivity rules as the pointer
    pub fn request_keyboard_grab(
        &mut self,
        tree: &WindowTree,
        window: WindowId,
        owner_events: bool,
        time: u32,
        serial: u64,
    ) -> GrabStatus {
        if !tree.is_viewable(window) {
            return GrabStatus::NotViewable;
        }

        match &self.keyboard {
            Some(grab) if grab.window != window => return GrabStatus::AlreadyGrabbed,
            Some(_) => return GrabStatus::Success,
            None => {}
        }

        debug!("🔑 Keyboard grab started on {:?}", window);
        self.keyboard = Some(GrabRecord {
            window,
            confine_to: None,
            owner_events,
            event_mask: EventMask::KEY_PRESS | EventMask::KEY_RELEASE,
            start_serial: serial,
            end_serial: 0,
            implicit: false,
            time,
        });
        GrabStatus::Success
    }

    /// Ends the pointer grab, explicit or implicit
    pub fn ungrab_pointer(&mut self, serial: u64) -> Option<GrabRecord> {
        let mut grab = self.pointer.take()?;
        grab.end_serial = serial;
        debug!("🔓 Pointer grab on {:?} ended", grab.window);
        Some(grab)
    }

    pub fn ungrab_keyboard(&mut self, serial: u64) -> Option<GrabRecord> {
        let mut grab = self.keyboard.take()?;
        grab.end_serial = serial;
        debug!("🔓 Keyboard grab on {:?} ended", grab.window);
        Some(grab)
    }

    /// Records a button press about to be delivered to `window`.
    ///
    /// Starts an implicit grab when no pointer grab is active.
    ///
    /// # Returns
    ///
    /// `true` if an implicit grab was started
    pub fn begin_button_press(
        &mut self,
        window: WindowId,
        event_mask: EventMask,
        button: u32,
        time: u32,
        serial: u64,
    ) -> bool {
        self.buttons |= ModifierState::for_button(button);

        if self.pointer.is_some() {
            return false;
        }

        debug!("🖱️ Implicit grab started on {:?} by button {}", window, button);
        self.pointer = Some(GrabRecord {
            window,
            confine_to: None,
            owner_events: false,
            event_mask,
            start_serial: serial,
            end_serial: 0,
            implicit: true,
            time,
        });
        true
    }

    /// Records a button release.
    ///
    /// # Returns
    ///
    /// The implicit grab if this release ended its press episode
    pub fn end_button_release(&mut self, button: u32, serial: u64) -> Option<GrabRecord> {
        self.buttons.remove(ModifierState::for_button(button));
        if !self.buttons.is_empty() {
            return None;
        }

        match &self.pointer {
            Some(grab) if grab.implicit => self.ungrab_pointer(serial),
            _ => None,
        }
    }

    /// Decides where a pointer event of the given category goes
    pub fn route_pointer(&self, hit: Option<WindowId>, category: EventMask) -> Route {
        let Some(grab) = &self.pointer else {
            return Route::Normal { fallback: None };
        };

        if !grab.implicit && !grab.event_mask.intersects(category) {
            return Route::Drop;
        }

        if grab.owner_events && hit.is_some() {
            Route::Normal {
                fallback: Some(grab.window),
            }
        } else {
            Route::Forced(grab.window)
        }
    }

    /// Decides where a key event goes
    pub fn route_keyboard(&self) -> Route {
        match &self.keyboard {
            None => Route::Normal { fallback: None },
            Some(grab) if grab.owner_events => Route::Normal {
                fallback: Some(grab.window),
            },
            Some(grab) => Route::Forced(grab.window),
        }
    }

    /// Ends both grabs, as happens when the application loses focus
    pub fn break_all(&mut self, serial: u64) -> BrokenGrabs {
        self.buttons = ModifierState::empty();
        BrokenGrabs {
            keyboard: self.ungrab_keyboard(serial),
            pointer: self.ungrab_pointer(serial),
        }
    }

    /// Ends every grab whose window (or confine window) is no longer viewable
    pub fn release_unviewable(&mut self, tree: &WindowTree, serial: u64) -> BrokenGrabs {
        let gone = |grab: &GrabRecord| {
            !tree.is_viewable(grab.window)
                || grab.confine_to.map_or(false, |c| !tree.is_viewable(c))
        };

        let mut broken = BrokenGrabs::default();
        if self.keyboard.as_ref().map_or(false, gone) {
            broken.keyboard = self.ungrab_keyboard(serial);
        }
        if self.pointer.as_ref().map_or(false, gone) {
            broken.pointer = self.ungrab_pointer(serial);
        }
        broken
    }
}
