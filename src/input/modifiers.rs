//! Typed bitmasks for modifier state, event selection and native flags
//!
//! The toolkit-side masks ([`ModifierState`], [`EventMask`]) are what
//! applications see. The native-side masks ([`NativeModifierFlags`],
//! [`NativeButtons`]) mirror what the platform reports and are only converted
//! here.

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifiers and held mouse buttons attached to an event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ModifierState: u32 {
        const SHIFT = 1 << 0;
        /// Caps lock.
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        /// Option / Alt.
        const MOD1 = 1 << 3;
        /// Command.
        const MOD2 = 1 << 4;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;

        const KEYBOARD = Self::SHIFT.bits()
            | Self::LOCK.bits()
            | Self::CONTROL.bits()
            | Self::MOD1.bits()
            | Self::MOD2.bits();
        const BUTTONS = Self::BUTTON1.bits()
            | Self::BUTTON2.bits()
            | Self::BUTTON3.bits()
            | Self::BUTTON4.bits()
            | Self::BUTTON5.bits();
    }
}

bitflags! {
    /// Event categories a window (or grab) selects for delivery.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u32 {
        const EXPOSURE = 1 << 1;
        const POINTER_MOTION = 1 << 2;
        const POINTER_MOTION_HINT = 1 << 3;
        /// Motion while any button is held.
        const BUTTON_MOTION = 1 << 4;
        const BUTTON1_MOTION = 1 << 5;
        const BUTTON2_MOTION = 1 << 6;
        const BUTTON3_MOTION = 1 << 7;
        const BUTTON_PRESS = 1 << 8;
        const BUTTON_RELEASE = 1 << 9;
        const KEY_PRESS = 1 << 10;
        const KEY_RELEASE = 1 << 11;
        const ENTER_NOTIFY = 1 << 12;
        const LEAVE_NOTIFY = 1 << 13;
        const FOCUS_CHANGE = 1 << 14;
        /// Configure, map, unmap and delete notifications.
        const STRUCTURE = 1 << 15;
        const PROXIMITY = 1 << 16;
        const SCROLL = 1 << 21;
    }
}

bitflags! {
    /// Keyboard modifier flags as reported by the native event system.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NativeModifierFlags: u32 {
        const ALPHA_SHIFT = 1 << 16;
        const SHIFT = 1 << 17;
        const CONTROL = 1 << 18;
        const ALTERNATE = 1 << 19;
        const COMMAND = 1 << 20;
    }
}

bitflags! {
    /// Mouse buttons currently held, as reported by the native button query.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NativeButtons: u32 {
        const PRIMARY = 1 << 0;
        const SECONDARY = 1 << 1;
        const MIDDLE = 1 << 2;
        const BACK = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

impl ModifierState {
    /// Toolkit modifiers for a set of native keyboard flags
    pub fn from_native_keys(flags: NativeModifierFlags) -> Self {
        let mut state = ModifierState::empty();
        state.set(ModifierState::LOCK, flags.contains(NativeModifierFlags::ALPHA_SHIFT));
        state.set(ModifierState::SHIFT, flags.contains(NativeModifierFlags::SHIFT));
        state.set(ModifierState::CONTROL, flags.contains(NativeModifierFlags::CONTROL));
        state.set(ModifierState::MOD1, flags.contains(NativeModifierFlags::ALTERNATE));
        state.set(ModifierState::MOD2, flags.contains(NativeModifierFlags::COMMAND));
        state
    }

    /// Toolkit button bits for the native pressed-buttons mask
    ///
    /// The native secondary button is toolkit button 3 and the middle button
    /// is toolkit button 2.
    pub fn from_native_buttons(buttons: NativeButtons) -> Self {
        let mut state = ModifierState::empty();
        state.set(ModifierState::BUTTON1, buttons.contains(NativeButtons::PRIMARY));
        state.set(ModifierState::BUTTON3, buttons.contains(NativeButtons::SECONDARY));
        state.set(ModifierState::BUTTON2, buttons.contains(NativeButtons::MIDDLE));
        state.set(ModifierState::BUTTON4, buttons.contains(NativeButtons::BACK));
        state.set(ModifierState::BUTTON5, buttons.contains(NativeButtons::FORWARD));
        state
    }

    /// The state bit for toolkit button `button`, empty outside 1..=5
    pub fn for_button(button: u32) -> Self {
        match button {
            1..=5 => ModifierState::from_bits_truncate(1 << (button + 7)),
            _ => ModifierState::empty(),
        }
    }
}

impl EventMask {
    /// Motion mask selecting drags with toolkit button `button` held
    pub fn for_button_motion(button: u32) -> Self {
        match button {
            1 => EventMask::BUTTON1_MOTION,
            2 => EventMask::BUTTON2_MOTION,
            3 => EventMask::BUTTON3_MOTION,
            _ => EventMask::empty(),
        }
    }
}

/// Maps a native button number (0 = primary) to a toolkit button number
///
/// Native 0, 1, 2 are left, right, middle; toolkit 1, 2, 3 are left, middle,
/// right. Extra buttons keep their order.
pub fn toolkit_button(native_button: u32) -> u32 {
    match native_button {
        0 => 1,
        1 => 3,
        2 => 2,
        n => n + 1,
    }
}

/// A physical modifier key and the masks it toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierKey {
    pub keycode: u16,
    pub name: &'static str,
    pub native: NativeModifierFlags,
    pub state: ModifierState,
}

const MODIFIER_KEYS: &[ModifierKey] = &[
    ModifierKey {
        keycode: 54,
        name: "Meta_R",
        native: NativeModifierFlags::COMMAND,
        state: ModifierState::MOD2,
    },
    ModifierKey {
        keycode: 55,
        name: "Meta_L",
        native: NativeModifierFlags::COMMAND,
        state: ModifierState::MOD2,
    },
    ModifierKey {
        keycode: 56,
        name: "Shift_L",
        native: NativeModifierFlags::SHIFT,
        state: ModifierState::SHIFT,
    },
    ModifierKey {
        keycode: 57,
        name: "Caps_Lock",
        native: NativeModifierFlags::ALPHA_SHIFT,
        state: ModifierState::LOCK,
    },
    ModifierKey {
        keycode: 58,
        name: "Alt_L",
        native: NativeModifierFlags::ALTERNATE,
        state: ModifierState::MOD1,
    },
    ModifierKey {
        keycode: 59,
        name: "Control_L",
        native: NativeModifierFlags::CONTROL,
        state: ModifierState::CONTROL,
    },
    ModifierKey {
        keycode: 60,
        name: "Shift_R",
        native: NativeModifierFlags::SHIFT,
        state: ModifierState::SHIFT,
    },
    ModifierKey {
        keycode: 61,
        name: "Alt_R",
        native: NativeModifierFlags::ALTERNATE,
        state: ModifierState::MOD1,
    },
    ModifierKey {
        keycode: 62,
        name: "Control_R",
        native: NativeModifierFlags::CONTROL,
        state: ModifierState::CONTROL,
    },
];

/// Looks up the modifier key for a native keycode
pub fn modifier_key(keycode: u16) -> Option<&'static ModifierKey> {
    MODIFIER_KEYS.iter().find(|key| key.keycode == keycode)
}
