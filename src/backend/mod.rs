//! Platform backends
//!
//! Only the in-memory [`headless`] backend ships with the crate. Native
//! backends implement [`crate::platform::NativePlatform`] and
//! [`crate::platform::NativeCompositor`] on top of the real windowing system.

pub mod headless;

pub use headless::HeadlessPlatform;
