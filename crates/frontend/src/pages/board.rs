use dioxus::logger::tracing::warn;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use pinmap_shared::geo::LatLng;
use pinmap_shared::models::Pin;

use crate::api;
use crate::components::map_view::MapView;
use crate::components::pin_form::PinForm;
use crate::components::pin_markers::PinMarkers;
use crate::storage;

/// How long the save confirmation stays up, in milliseconds.
const TOAST_MS: u32 = 2500;

/// Settle time before the viewport is written to storage.
const VIEWPORT_SAVE_MS: u32 = 500;

/// Debounce bookkeeping for the viewport store: the generation a changed
/// viewport schedules its write under, or `None` on the first run, which
/// only observes the value loaded from storage.
fn save_generation(viewport_dirty: bool, last_gen: u64) -> Option<u64> {
    if viewport_dirty {
        Some(last_gen.wrapping_add(1))
    } else {
        None
    }
}

#[component]
pub fn Board() -> Element {
    let mut pins_resource = use_resource(|| async {
        let pins = api::fetch_pins().await;
        if let Err(e) = &pins {
            warn!("failed to load pins: {e}");
        }
        pins
    });

    let viewport = use_signal(storage::load_viewport);
    let mut draft_position = use_signal(|| None::<LatLng>);
    let mut toast = use_signal(|| None::<String>);
    let mut toast_gen = use_signal(|| 0u64);
    let mut save_gen = use_signal(|| 0u64);
    let mut viewport_dirty = use_signal(|| false);

    // Persist the viewport once panning/zooming settles. Each change bumps a
    // generation; only the latest write goes through. The first run observes
    // the value just loaded from storage and schedules nothing.
    use_effect(move || {
        let vp = *viewport.read();
        let Some(gen) = save_generation(*viewport_dirty.peek(), *save_gen.peek()) else {
            viewport_dirty.set(true);
            return;
        };
        save_gen.set(gen);
        wasm_bindgen_futures::spawn_local(async move {
            TimeoutFuture::new(VIEWPORT_SAVE_MS).await;
            if *save_gen.peek() == gen {
                storage::store_viewport(vp);
            }
        });
    });

    let mut show_toast = move |msg: &str| {
        let gen = toast_gen.peek().wrapping_add(1);
        toast_gen.set(gen);
        toast.set(Some(msg.to_string()));
        spawn(async move {
            TimeoutFuture::new(TOAST_MS).await;
            if *toast_gen.peek() == gen {
                toast.set(None);
            }
        });
    };

    let pins: Vec<Pin> = match &*pins_resource.read() {
        Some(Ok(p)) => p.clone(),
        _ => vec![],
    };
    let load_failed = matches!(&*pins_resource.read(), Some(Err(_)));
    let show_hint = pins.is_empty() && !load_failed && draft_position.read().is_none();
    let toast_msg = toast.read().clone();

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "PinMap" }
                div { class: "header-status",
                    if load_failed {
                        span { class: "load-error", "Couldn't reach the pin service" }
                    }
                    if let Some(msg) = toast_msg {
                        span { class: "toast", "{msg}" }
                    }
                }
            }

            if show_hint {
                p { class: "hint", "Click anywhere on the map to drop your first pin." }
            }

            MapView {
                viewport: viewport,
                on_click: move |pos: LatLng| draft_position.set(Some(pos)),

                PinMarkers { pins: pins.clone(), viewport: viewport }
                PinForm {
                    position: draft_position,
                    viewport: viewport,
                    on_saved: move |_| {
                        pins_resource.restart();
                        show_toast("Pin added");
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_generation_first_run_schedules_nothing() {
        assert_eq!(save_generation(false, 0), None);
        assert_eq!(save_generation(false, 41), None);
    }

    #[test]
    fn test_save_generation_bumps_per_change() {
        assert_eq!(save_generation(true, 0), Some(1));
        assert_eq!(save_generation(true, 41), Some(42));
        assert_eq!(save_generation(true, u64::MAX), Some(0));
    }
}
