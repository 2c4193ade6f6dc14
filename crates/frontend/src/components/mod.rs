pub mod map_view;
pub mod pin_form;
pub mod pin_markers;

use dioxus::prelude::*;

/// Marker icon shared by the draft form and the saved-pin layer.
pub const MARKER_ICON: Asset = asset!("/assets/marker.svg");
