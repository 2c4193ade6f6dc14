use dioxus::logger::tracing::error;
use dioxus::prelude::*;
use pinmap_shared::geo::{self, LatLng};
use pinmap_shared::models::Pin;

use crate::api;
use crate::components::MARKER_ICON;
use crate::coords::Viewport;

/// Form for creating a pin at a clicked map position.
///
/// Renders nothing until the map reports a click. Saving hands the pin to
/// the pin service and notifies the parent so it can reload; a failed save
/// is only logged. Either way the form closes and the fields reset.
#[component]
pub fn PinForm(
    position: Signal<Option<LatLng>>,
    viewport: Signal<Viewport>,
    on_saved: EventHandler<()>,
) -> Element {
    let mut position = position;

    let mut title = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut category = use_signal(String::new);
    let mut image_url = use_signal(String::new);

    let mut clear = move || {
        position.set(None);
        title.set(String::new());
        description.set(String::new());
        category.set(String::new());
        image_url.set(String::new());
    };

    let Some(pos) = *position.read() else {
        return rsx! {};
    };
    let (dx, dy) = viewport.read().offset_of(pos);
    let coord_label = geo::format_lat_lng(pos);

    rsx! {
        div {
            class: "pin-site draft",
            style: "left: calc(50% + {dx}px); top: calc(50% + {dy}px);",

            img { class: "pin-marker", src: MARKER_ICON, alt: "New pin" }

            div {
                class: "pin-popup",
                // Keep form interaction away from the map's drag/click handlers
                onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                onmouseup: move |evt: Event<MouseData>| evt.stop_propagation(),
                ondoubleclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                onwheel: move |evt: Event<WheelData>| evt.stop_propagation(),
                ontouchstart: move |evt: Event<TouchData>| evt.stop_propagation(),
                ontouchend: move |evt: Event<TouchData>| evt.stop_propagation(),

                h3 { "New pin" }
                input {
                    r#type: "text",
                    placeholder: "Title",
                    autofocus: true,
                    value: "{title}",
                    oninput: move |evt: Event<FormData>| title.set(evt.value()),
                }
                textarea {
                    placeholder: "Description",
                    value: "{description}",
                    oninput: move |evt: Event<FormData>| description.set(evt.value()),
                }
                input {
                    r#type: "text",
                    placeholder: "Category",
                    value: "{category}",
                    oninput: move |evt: Event<FormData>| category.set(evt.value()),
                }
                input {
                    r#type: "url",
                    placeholder: "Image URL",
                    value: "{image_url}",
                    oninput: move |evt: Event<FormData>| image_url.set(evt.value()),
                }
                div { class: "pin-coord", "{coord_label}" }
                div { class: "popup-actions",
                    button {
                        class: "secondary",
                        onclick: move |evt: Event<MouseData>| {
                            evt.stop_propagation();
                            clear();
                        },
                        "Cancel"
                    }
                    button {
                        onclick: move |_| {
                            // Read the live position: a newer map click may have
                            // moved the draft since this button rendered
                            let Some(pos) = *position.read() else {
                                return;
                            };
                            let pin = Pin::unsaved(
                                title.read().clone(),
                                description.read().clone(),
                                category.read().clone(),
                                image_url.read().clone(),
                                pos,
                            );
                            spawn(async move {
                                match api::add_pin(&pin).await {
                                    Ok(_) => on_saved.call(()),
                                    Err(e) => error!("failed to save pin: {e}"),
                                }
                                // The form closes after the call settles,
                                // whether or not the pin was stored
                                clear();
                            });
                        },
                        "Save"
                    }
                }
            }
        }
    }
}
