use std::cell::RefCell;
use std::rc::Rc;

use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, VisibilityState};

use crate::canvas::{self, BrowserHost};
use crate::engine::StarfieldEngine;

/// Engine plus the page listener that pauses it while the tab is hidden
struct MountedStarfield {
    engine: Rc<StarfieldEngine<BrowserHost>>,
    on_visibility: Closure<dyn FnMut(web_sys::Event)>,
}

impl MountedStarfield {
    fn unmount(self) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let _ = document.remove_event_listener_with_callback(
                "visibilitychange",
                self.on_visibility.as_ref().unchecked_ref(),
            );
        }
        self.engine.stop();
    }
}

fn mount_starfield(canvas: HtmlCanvasElement) -> Option<MountedStarfield> {
    let document = web_sys::window()?.document()?;

    let engine = Rc::new(canvas::create_starfield_engine(canvas, canvas::read_page_config()));
    engine.start();

    let engine_vis = engine.clone();
    let on_visibility = Closure::wrap(Box::new(move |_: web_sys::Event| {
        let hidden = web_sys::window()
            .and_then(|w| w.document())
            .map(|d| d.visibility_state() == VisibilityState::Hidden)
            .unwrap_or(false);
        if hidden {
            engine_vis.stop();
        } else {
            engine_vis.start();
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    let _ = document.add_event_listener_with_callback("visibilitychange", on_visibility.as_ref().unchecked_ref());

    Some(MountedStarfield { engine, on_visibility })
}

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="app-shell" aria-label="Ambient starfield">
            <StarfieldCanvas />
        </main>
    }
}

#[component]
fn StarfieldCanvas() -> impl IntoView {
    let canvas_ref = NodeRef::<html::Canvas>::new();
    let mounted: Rc<RefCell<Option<MountedStarfield>>> = Rc::new(RefCell::new(None));

    // Start once the canvas is in the DOM and has a layout size
    let mounted_for_effect = send_wrapper::SendWrapper::new(mounted.clone());
    Effect::new(move |_| {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let mut slot = mounted_for_effect.borrow_mut();
        if slot.is_none() {
            *slot = mount_starfield(canvas);
        }
    });

    let mounted_for_cleanup = send_wrapper::SendWrapper::new(mounted);
    on_cleanup(move || {
        let taken = mounted_for_cleanup.borrow_mut().take();
        if let Some(starfield) = taken {
            starfield.unmount();
        }
    });

    view! {
        <canvas node_ref=canvas_ref class="starfield-canvas" aria-hidden="true"></canvas>
    }
}
