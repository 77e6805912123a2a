// src/client/scroll.rs

//! Body scroll locking and scroll-to-top.

/// Page operations the scroll helpers need.
///
/// An implementation wraps whatever document handle the page has; the
/// helpers take it as a parameter so there is no module-level element
/// state.
pub trait PageSurface {
    /// Width of the vertical scrollbar in pixels, or 0 when the page does
    /// not scroll.
    fn scrollbar_width_px(&self) -> f64;

    /// Set the `data-scrollable` attribute on the root element.
    fn set_scroll_state(&mut self, state: &str);

    /// Apply right padding to the body, in rem.
    fn set_body_padding_right_rem(&mut self, rem: f64);

    fn scroll_to(&mut self, x: f64, y: f64);

    /// Push a history entry for the current location, when the platform
    /// supports it.
    fn push_history_state(&mut self) -> bool;
}

/// Disable vertical scrolling, compensating for the vanished scrollbar so
/// the layout does not shift. Pixel width maps to rem at the 62.5% root
/// font-size convention (1rem = 10px).
pub fn lock_body(surface: &mut impl PageSurface, compensate_scrollbar: bool) {
    surface.set_scroll_state("locked");
    if compensate_scrollbar {
        surface.set_body_padding_right_rem(surface.scrollbar_width_px() / 10.0);
    }
}

pub fn unlock_body(surface: &mut impl PageSurface, compensate_scrollbar: bool) {
    surface.set_scroll_state("unlocked");
    if compensate_scrollbar {
        surface.set_body_padding_right_rem(0.0);
    }
}

/// Put the viewport at the very top of the document.
///
/// Some browsers restore the previous scroll position on reload; pushing a
/// history entry for the current location and scrolling again defeats
/// that.
pub fn scroll_top(surface: &mut impl PageSurface) {
    surface.scroll_to(0.0, 0.0);
    if surface.push_history_state() {
        surface.scroll_to(0.0, 0.0);
    }
}
