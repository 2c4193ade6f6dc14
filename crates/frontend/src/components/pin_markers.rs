use dioxus::prelude::*;
use pinmap_shared::geo;
use pinmap_shared::models::Pin;

use crate::components::MARKER_ICON;
use crate::coords::Viewport;

/// Saved pins drawn over the map, with an info popup for the selected one.
///
/// Selection is keyed by pin id so it survives the list reloading.
#[component]
pub fn PinMarkers(pins: Vec<Pin>, viewport: Signal<Viewport>) -> Element {
    let mut selected = use_signal(|| None::<String>);

    let vp = *viewport.read();
    let sel = selected.read().clone();

    let markers: Vec<(Pin, f64, f64, bool, String)> = pins
        .iter()
        .map(|pin| {
            let (dx, dy) = vp.offset_of(pin.position());
            let is_selected = sel.as_deref() == Some(pin.id.as_str());
            let coord_label = geo::format_lat_lng(pin.position());
            (pin.clone(), dx, dy, is_selected, coord_label)
        })
        .collect();

    rsx! {
        for (pin, dx, dy, is_selected, coord_label) in markers {
            div {
                key: "{pin.id}",
                class: if is_selected { "pin-site selected" } else { "pin-site" },
                style: "left: calc(50% + {dx}px); top: calc(50% + {dy}px);",
                // Marker and popup interaction stays out of the map handlers
                onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                onmouseup: move |evt: Event<MouseData>| evt.stop_propagation(),
                ondoubleclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                onwheel: move |evt: Event<WheelData>| evt.stop_propagation(),
                ontouchstart: move |evt: Event<TouchData>| evt.stop_propagation(),
                ontouchend: move |evt: Event<TouchData>| evt.stop_propagation(),

                img {
                    class: "pin-marker",
                    src: MARKER_ICON,
                    alt: "{pin.title}",
                    onclick: {
                        let id = pin.id.clone();
                        move |evt: Event<MouseData>| {
                            evt.stop_propagation();
                            let cur = selected.read().clone();
                            if cur.as_deref() == Some(id.as_str()) {
                                selected.set(None);
                            } else {
                                selected.set(Some(id.clone()));
                            }
                        }
                    },
                }

                if is_selected {
                    div { class: "pin-popup",
                        button {
                            class: "close-popup",
                            onclick: move |evt: Event<MouseData>| {
                                evt.stop_propagation();
                                selected.set(None);
                            },
                            "\u{00d7}"
                        }
                        h3 { "{pin.title}" }
                        if !pin.category.is_empty() {
                            span { class: "pin-category", "{pin.category}" }
                        }
                        if !pin.description.is_empty() {
                            p { "{pin.description}" }
                        }
                        if !pin.image_url.is_empty() {
                            img { class: "pin-photo", src: "{pin.image_url}", alt: "{pin.title}" }
                        }
                        div { class: "pin-coord", "{coord_label}" }
                    }
                }
            }
        }
    }
}
