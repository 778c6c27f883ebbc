//! Store locator widget logic: map adapter, results rendering, scroll guard
//! and the controller tying them to the page's events.

pub mod controller;
pub mod map;
pub mod page;
pub mod render;
pub mod scroll;

pub use controller::{LocatorController, Phase, SearchOutcome, SearchTicket, DEFAULT_SEARCH_RADIUS_MI};
pub use map::{
    CameraSettings, FitOptions, MapAdapter, MapCommand, MapSurface, PopupHandle, PopupOptions,
    RecordingSurface,
};
pub use page::PageElements;
pub use scroll::{ScrollEvent, ScrollGuard};
