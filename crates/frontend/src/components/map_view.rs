use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use pinmap_shared::geo::{self, LatLng};

use crate::coords::{self, Viewport};

const MAP_CONTAINER_ID: &str = "pin-map-container";

/// Drag threshold in pixels; movement below this is treated as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Touch drag threshold, larger than mouse because touch is less precise.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// Accumulated wheel pixels that step one zoom level.
const WHEEL_PX_PER_LEVEL: f64 = 60.0;

/// Pinch spread ratio that steps one zoom level (inverse steps back out).
const PINCH_STEP_RATIO: f64 = std::f64::consts::SQRT_2;

/// Container size assumed before the element has been laid out.
const REFERENCE_WIDTH: f64 = 960.0;
const REFERENCE_HEIGHT: f64 = 640.0;

const ATTRIBUTION: &str = "© OpenStreetMap contributors";

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

/// Bounding rect of the map container, once it is in the DOM.
fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

/// Live container size, or the reference size before layout.
fn container_size() -> (f64, f64) {
    match container_rect() {
        Some(rect) if rect.width() > 0.0 => (rect.width(), rect.height()),
        _ => (REFERENCE_WIDTH, REFERENCE_HEIGHT),
    }
}

/// Cursor offset from the container center, for zoom anchoring.
fn anchor_from_client(client_x: f64, client_y: f64) -> Option<(f64, f64)> {
    let rect = container_rect()?;
    Some((
        client_x - rect.left() - rect.width() / 2.0,
        client_y - rect.top() - rect.height() / 2.0,
    ))
}

// ---------------------------------------------------------------------------
// Tile / zoom math (pure functions, easily testable)
// ---------------------------------------------------------------------------

/// One positioned tile image. `dx`/`dy` place the tile's top-left corner
/// relative to the container center; `col` keeps the unwrapped column so a
/// tile repeated across the antimeridian stays distinct in the DOM.
#[derive(Debug, Clone, PartialEq)]
struct Tile {
    col: i64,
    x: u32,
    y: u32,
    z: u8,
    dx: f64,
    dy: f64,
}

/// Raster tile URL on the OpenStreetMap tile host.
fn tile_url(z: u8, x: u32, y: u32) -> String {
    format!("https://tile.openstreetmap.org/{z}/{x}/{y}.png")
}

/// Compute the tile set covering a `w`×`h` container centered on `vp`.
///
/// Columns wrap around the antimeridian; rows outside the world are skipped,
/// which leaves blank bands when the view is pushed past the poles.
fn visible_tiles(vp: &Viewport, w: f64, h: f64) -> Vec<Tile> {
    let n = 1_i64 << vp.zoom;
    let (cx, cy) = geo::project(vp.center, vp.zoom);
    let left = cx - w / 2.0;
    let top = cy - h / 2.0;

    let col0 = (left / geo::TILE_SIZE).floor() as i64;
    let col1 = ((left + w) / geo::TILE_SIZE).ceil() as i64 - 1;
    let row0 = (top / geo::TILE_SIZE).floor() as i64;
    let row1 = ((top + h) / geo::TILE_SIZE).ceil() as i64 - 1;

    let mut tiles = Vec::new();
    for row in row0..=row1 {
        if row < 0 || row >= n {
            continue;
        }
        for col in col0..=col1 {
            tiles.push(Tile {
                col,
                x: col.rem_euclid(n) as u32,
                y: row as u32,
                z: vp.zoom,
                dx: col as f64 * geo::TILE_SIZE - cx,
                dy: row as f64 * geo::TILE_SIZE - cy,
            });
        }
    }
    tiles
}

/// Normalize a wheel delta (pixels / lines / pages) to pixels.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Drain whole zoom steps from the wheel accumulator, returning the steps
/// and the leftover remainder.
fn wheel_zoom_steps(accum: f64) -> (i32, f64) {
    let steps = (accum / WHEEL_PX_PER_LEVEL).trunc() as i32;
    (steps, accum - steps as f64 * WHEEL_PX_PER_LEVEL)
}

/// New center when the content has been dragged `dx`/`dy` pixels from the
/// drag-start center `start_px`. Content follows the cursor, so the center
/// moves the opposite way.
fn dragged_center(start_px: (f64, f64), dx: f64, dy: f64, zoom: u8) -> LatLng {
    geo::unproject(start_px.0 - dx, start_px.1 - dy, zoom)
}

/// Straight-line distance between two client points.
fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Pannable, zoomable tile map. Reports plain clicks (mouse drags and touch
/// pans excluded) as coordinates through `on_click`; overlay layers render
/// as children, positioned against the container center.
#[component]
pub fn MapView(
    viewport: Signal<Viewport>,
    on_click: EventHandler<LatLng>,
    children: Element,
) -> Element {
    let mut viewport = viewport;

    // The first render happens before the container is in the DOM, so tile
    // coverage starts from the reference size; re-render once mounted to
    // pick up the real one.
    let mut mounted = use_signal(|| false);
    use_effect(move || {
        mounted.set(true);
    });

    // Drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_center_px = use_signal(|| (0.0_f64, 0.0_f64));

    // Wheel zoom accumulator (trackpads emit many small deltas)
    let mut wheel_accum = use_signal(|| 0.0_f64);

    // Touch state
    let mut touch_start_pos = use_signal(|| None::<(f64, f64)>);
    let mut touch_did_pan = use_signal(|| false);
    let mut touch_start_center_px = use_signal(|| (0.0_f64, 0.0_f64));
    let mut is_pinching = use_signal(|| false);
    let mut pinch_start_distance = use_signal(|| 0.0_f64);

    let (cw, ch) = if *mounted.read() {
        container_size()
    } else {
        (REFERENCE_WIDTH, REFERENCE_HEIGHT)
    };

    let vp = *viewport.read();
    let tiles = visible_tiles(&vp, cw, ch);
    let readout = format!("{} · z{}", geo::format_lat_lng(vp.center), vp.zoom);

    let container_class = if *is_dragging.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();

                let accum = *wheel_accum.read() - wheel_delta_y(evt.data().delta());
                let (steps, rest) = wheel_zoom_steps(accum);
                wheel_accum.set(rest);
                if steps == 0 {
                    return;
                }

                let vp = *viewport.read();
                let new_zoom = geo::clamp_zoom(vp.zoom as i32 + steps);
                if new_zoom == vp.zoom {
                    return;
                }
                let client = evt.data().client_coordinates();
                let Some((ax, ay)) = anchor_from_client(client.x, client.y) else {
                    return;
                };
                viewport.set(vp.zoomed_about(new_zoom, ax, ay));
            },

            onmousedown: move |evt: Event<MouseData>| {
                // Pan and click only on the left button
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                let vp = *viewport.read();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_center_px.set(geo::project(vp.center, vp.zoom));
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_dragging.read() {
                    return;
                }
                let client = evt.client_coordinates();
                let (sx, sy) = *drag_start.read();
                let dx = client.x - sx;
                let dy = client.y - sy;

                if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.read() {
                    let zoom = viewport.read().zoom;
                    let center = dragged_center(*drag_start_center_px.read(), dx, dy, zoom);
                    viewport.set(Viewport { center, zoom });
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let was_dragging = *is_dragging.read();
                let was_drag = *did_drag.read();
                is_dragging.set(false);

                // A mouseup that never crossed the threshold is a click
                if was_dragging && !was_drag {
                    let client = evt.client_coordinates();
                    if let Some(pos) = coords::click_to_lat_lng(
                        client.x, client.y, MAP_CONTAINER_ID, *viewport.read(),
                    ) {
                        on_click.call(pos);
                    }
                }
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                let vp = *viewport.read();
                let new_zoom = geo::clamp_zoom(vp.zoom as i32 + 1);
                if new_zoom == vp.zoom {
                    return;
                }
                let client = evt.client_coordinates();
                let Some((ax, ay)) = anchor_from_client(client.x, client.y) else {
                    return;
                };
                viewport.set(vp.zoomed_about(new_zoom, ax, ay));
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                if touches.len() == 1 {
                    // One finger down: remember the start for tap-vs-pan
                    let t = &touches[0];
                    let vp = *viewport.read();
                    touch_start_pos.set(Some((t.client_coordinates().x, t.client_coordinates().y)));
                    touch_did_pan.set(false);
                    touch_start_center_px.set(geo::project(vp.center, vp.zoom));
                } else if touches.len() >= 2 {
                    // Second finger down: begin a pinch
                    let t0 = &touches[0];
                    let t1 = &touches[1];
                    let p0 = (t0.client_coordinates().x, t0.client_coordinates().y);
                    let p1 = (t1.client_coordinates().x, t1.client_coordinates().y);
                    is_pinching.set(true);
                    pinch_start_distance.set(point_distance(p0, p1));
                    // A second finger ends tap tracking
                    touch_start_pos.set(None);
                    touch_did_pan.set(true);
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();

                if *is_pinching.read() && touches.len() >= 2 {
                    let t0 = &touches[0];
                    let t1 = &touches[1];
                    let p0 = (t0.client_coordinates().x, t0.client_coordinates().y);
                    let p1 = (t1.client_coordinates().x, t1.client_coordinates().y);
                    let d = point_distance(p0, p1);
                    let start_d = *pinch_start_distance.read();
                    if start_d < 1.0 {
                        return;
                    }

                    // One zoom level per √2 of spread change, anchored at the
                    // midpoint; the start distance resets so a long pinch keeps
                    // stepping.
                    let ratio = d / start_d;
                    let step = if ratio >= PINCH_STEP_RATIO {
                        1
                    } else if ratio <= 1.0 / PINCH_STEP_RATIO {
                        -1
                    } else {
                        return;
                    };
                    pinch_start_distance.set(d);

                    let vp = *viewport.read();
                    let new_zoom = geo::clamp_zoom(vp.zoom as i32 + step);
                    if new_zoom == vp.zoom {
                        return;
                    }
                    let mid = ((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0);
                    if let Some((ax, ay)) = anchor_from_client(mid.0, mid.1) {
                        viewport.set(vp.zoomed_about(new_zoom, ax, ay));
                    }
                } else if touches.len() == 1 {
                    // One finger: pan
                    let t = &touches[0];
                    let cur = (t.client_coordinates().x, t.client_coordinates().y);
                    if let Some(start) = *touch_start_pos.read() {
                        let dx = cur.0 - start.0;
                        let dy = cur.1 - start.1;
                        if !*touch_did_pan.read() && point_distance(start, cur) > TOUCH_DRAG_THRESHOLD {
                            touch_did_pan.set(true);
                        }
                        if *touch_did_pan.read() {
                            let zoom = viewport.read().zoom;
                            let center = dragged_center(*touch_start_center_px.read(), dx, dy, zoom);
                            viewport.set(Viewport { center, zoom });
                        }
                    }
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let remaining = evt.data().touches().len();

                if *is_pinching.read() {
                    // The pinch ends only when every finger lifts
                    if remaining == 0 {
                        is_pinching.set(false);
                        touch_start_pos.set(None);
                    }
                    return;
                }

                // No pan and all fingers up: a tap places like a click
                if remaining == 0 && !*touch_did_pan.read() {
                    if let Some(start) = *touch_start_pos.read() {
                        if let Some(pos) = coords::click_to_lat_lng(
                            start.0, start.1, MAP_CONTAINER_ID, *viewport.read(),
                        ) {
                            on_click.call(pos);
                        }
                    }
                }

                if remaining == 0 {
                    touch_start_pos.set(None);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                // Drop all touch tracking
                touch_start_pos.set(None);
                touch_did_pan.set(false);
                is_pinching.set(false);
            },

            div { class: "tile-layer",
                for t in tiles {
                    img {
                        key: "{t.z}/{t.col}/{t.y}",
                        class: "tile",
                        src: tile_url(t.z, t.x, t.y),
                        style: "left: calc(50% + {t.dx}px); top: calc(50% + {t.dy}px);",
                        draggable: "false",
                        alt: "",
                    }
                }
            }

            // Overlay layers (saved pins, draft form) render above the tiles
            {children}

            div {
                class: "zoom-controls",
                onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                onmouseup: move |evt: Event<MouseData>| evt.stop_propagation(),
                ondoubleclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                button {
                    class: "zoom-btn",
                    onclick: move |_| {
                        let vp = *viewport.read();
                        viewport.set(vp.zoomed_about(geo::clamp_zoom(vp.zoom as i32 + 1), 0.0, 0.0));
                    },
                    "+"
                }
                button {
                    class: "zoom-btn",
                    onclick: move |_| {
                        let vp = *viewport.read();
                        viewport.set(vp.zoomed_about(geo::clamp_zoom(vp.zoom as i32 - 1), 0.0, 0.0));
                    },
                    "\u{2212}"
                }
            }

            // Readout falls through to the map; attribution swallows its clicks
            div { class: "coord-readout", "{readout}" }
            div {
                class: "map-attribution",
                onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                onmouseup: move |evt: Event<MouseData>| evt.stop_propagation(),
                "{ATTRIBUTION}"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp(lat: f64, lng: f64, zoom: u8) -> Viewport {
        Viewport {
            center: LatLng::new(lat, lng),
            zoom,
        }
    }

    // --- tile_url tests ---

    #[test]
    fn test_tile_url_shape() {
        assert_eq!(
            tile_url(5, 28, 12),
            "https://tile.openstreetmap.org/5/28/12.png"
        );
    }

    // --- visible_tiles tests ---

    #[test]
    fn test_visible_tiles_whole_world() {
        // Zoom 1 world is 512 px; a 512×512 container centered on (0, 0)
        // needs exactly the four world tiles, no extra column or row.
        let tiles = visible_tiles(&vp(0.0, 0.0, 1), 512.0, 512.0);
        assert_eq!(tiles.len(), 4);

        let mut cells: Vec<(u32, u32)> = tiles.iter().map(|t| (t.x, t.y)).collect();
        cells.sort_unstable();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);

        let top_left = tiles.iter().find(|t| t.x == 0 && t.y == 0).unwrap();
        assert!((top_left.dx - -256.0).abs() < 1e-9);
        assert!((top_left.dy - -256.0).abs() < 1e-9);
    }

    #[test]
    fn test_visible_tiles_wrap_antimeridian() {
        // Centered just west of the date line, the right edge of the view
        // shows the far-west tile column again.
        let tiles = visible_tiles(&vp(0.0, 179.9, 2), 512.0, 256.0);
        let xs: Vec<u32> = tiles.iter().map(|t| t.x).collect();
        assert!(xs.contains(&0), "wrapped column missing: {xs:?}");
        assert!(xs.contains(&2));
        assert!(xs.contains(&3));
        assert!(tiles.iter().all(|t| t.x < 4 && t.y < 4));
    }

    #[test]
    fn test_visible_tiles_skips_rows_past_the_pole() {
        // Centered at the latitude cutoff, half the container hangs above
        // the world; those rows produce no tiles.
        let tiles = visible_tiles(&vp(geo::MAX_LATITUDE, 0.0, 1), 256.0, 512.0);
        assert_eq!(tiles.len(), 2);
        assert!(tiles.iter().all(|t| t.y == 0));
    }

    #[test]
    fn test_visible_tiles_offsets_follow_center() {
        // Tile offsets are relative to the container center, so the world
        // pixel under the center maps to offset (0, 0).
        let view = vp(35.6812, 139.7671, 12);
        let (cx, cy) = geo::project(view.center, view.zoom);
        for t in visible_tiles(&view, 800.0, 600.0) {
            assert!((t.dx - (t.col as f64 * geo::TILE_SIZE - cx)).abs() < 1e-9);
            assert!((t.dy - (t.y as f64 * geo::TILE_SIZE - cy)).abs() < 1e-9);
        }
    }

    // --- wheel_zoom_steps tests ---

    #[test]
    fn test_wheel_zoom_steps_below_threshold() {
        let (steps, rest) = wheel_zoom_steps(59.9);
        assert_eq!(steps, 0);
        assert!((rest - 59.9).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_zoom_steps_drains_whole_levels() {
        let (steps, rest) = wheel_zoom_steps(130.0);
        assert_eq!(steps, 2);
        assert!((rest - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_zoom_steps_negative() {
        let (steps, rest) = wheel_zoom_steps(-70.0);
        assert_eq!(steps, -1);
        assert!((rest - -10.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_zoom_steps_exact_level() {
        let (steps, rest) = wheel_zoom_steps(-120.0);
        assert_eq!(steps, -2);
        assert!(rest.abs() < 1e-9);
    }

    // --- dragged_center tests ---

    #[test]
    fn test_dragged_center_moves_content_with_cursor() {
        // Dragging 100 px east leaves the old center 100 px east of the
        // container center: the content followed the cursor.
        let view = vp(35.6812, 139.7671, 12);
        let start_px = geo::project(view.center, view.zoom);
        let center = dragged_center(start_px, 100.0, 0.0, view.zoom);
        let moved = Viewport {
            center,
            zoom: view.zoom,
        };
        let (dx, dy) = moved.offset_of(view.center);
        assert!((dx - 100.0).abs() < 1e-6);
        assert!(dy.abs() < 1e-6);
    }

    #[test]
    fn test_dragged_center_zero_is_identity() {
        let view = vp(-33.4489, -70.6693, 9);
        let start_px = geo::project(view.center, view.zoom);
        let center = dragged_center(start_px, 0.0, 0.0, view.zoom);
        assert!((center.lat - view.center.lat).abs() < 1e-9);
        assert!((center.lng - view.center.lng).abs() < 1e-9);
    }

    // --- point_distance tests ---

    #[test]
    fn test_point_distance() {
        assert!((point_distance((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 1e-9);
        assert!(point_distance((2.0, 2.0), (2.0, 2.0)).abs() < 1e-9);
    }
}
