// src/client/capabilities.rs

//! Vendor-prefixed event-name resolution.

/// Style properties probed for animation support, in priority order, with
/// the end-event name each one implies.
const ANIMATION_TABLE: &[(&str, &str)] = &[
    ("animation", "animationend"),
    ("OAnimation", "oAnimationEnd"),
    ("MozAnimation", "animationend"),
    ("WebkitAnimation", "webkitAnimationEnd"),
];

const TRANSITION_TABLE: &[(&str, &str)] = &[
    ("transition", "transitionend"),
    ("OTransition", "oTransitionEnd"),
    ("MozTransition", "transitionend"),
    ("WebkitTransition", "webkitTransitionEnd"),
];

/// Platform event names, resolved once at startup.
///
/// `probe` answers whether a style property exists on the platform; the
/// first supported entry of each table wins. Pages then look events up
/// here instead of re-running feature detection per listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCapabilities {
    animation_end: Option<String>,
    transition_end: Option<String>,
}

impl EventCapabilities {
    pub fn resolve(probe: impl Fn(&str) -> bool) -> Self {
        Self {
            animation_end: first_supported(ANIMATION_TABLE, &probe),
            transition_end: first_supported(TRANSITION_TABLE, &probe),
        }
    }

    /// Platform name for the animation-end event, if animations are
    /// supported at all.
    pub fn animation_end(&self) -> Option<&str> {
        self.animation_end.as_deref()
    }

    pub fn transition_end(&self) -> Option<&str> {
        self.transition_end.as_deref()
    }
}

fn first_supported(table: &[(&str, &str)], probe: &impl Fn(&str) -> bool) -> Option<String> {
    table
        .iter()
        .find(|(property, _)| probe(property))
        .map(|(_, event)| (*event).to_string())
}
