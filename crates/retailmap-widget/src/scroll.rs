//! Keeps the page from scrolling while the pointer is over the map.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEvent {
    Wheel,
    TouchMove,
}

/// Tracks whether the pointer is over the map element.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrollGuard {
    over_map: bool,
}

impl ScrollGuard {
    pub fn pointer_entered(&mut self) {
        self.over_map = true;
    }

    pub fn pointer_left(&mut self) {
        self.over_map = false;
    }

    #[must_use]
    pub fn is_over_map(&self) -> bool {
        self.over_map
    }

    /// Whether the page should cancel this event's default scrolling.
    #[must_use]
    pub fn should_prevent(&self, event: ScrollEvent) -> bool {
        match event {
            ScrollEvent::Wheel | ScrollEvent::TouchMove => self.over_map,
        }
    }
}
