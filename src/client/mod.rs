// src/client/mod.rs

//! Page-level utility logic, kept free of any rendering dependency.
//!
//! These types back the small helper layer shipped alongside the built
//! pages: debounced event handling, vendor-prefixed event-name lookup and
//! body scroll locking. State that used to live in shared globals is held
//! in explicit handles or passed through the [`PageSurface`] trait so each
//! piece can be driven and tested in isolation.

pub mod capabilities;
pub mod debounce;
pub mod scroll;

pub use capabilities::EventCapabilities;
pub use debounce::Debouncer;
pub use scroll::{PageSurface, lock_body, scroll_top, unlock_body};
