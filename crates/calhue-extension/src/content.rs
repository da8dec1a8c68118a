//! Content script: wires page and storage notifications into the engine.

use crate::dom::{WebDom, elements};
use crate::error::{ShellError, ShellResult};
use calhue_core::storage::ChromeStorage;
use calhue_core::{ColorRecords, Engine, EngineConfig, EventQueue, HostEvent};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MutationObserver, MutationObserverInit, MutationRecord, Window};

thread_local! {
    static CONTENT_SCRIPT: RefCell<Option<Rc<ContentScript>>> = const { RefCell::new(None) };
}

/// One running content script per page.
pub struct ContentScript {
    engine: RefCell<Engine<WebDom>>,
    queue: EventQueue<Element>,
    store: Rc<ChromeStorage>,
    window: Window,
    observer: RefCell<Option<MutationObserver>>,
}

impl ContentScript {
    /// Build the engine and start every subscription.
    pub fn start(config: EngineConfig) -> ShellResult<()> {
        if CONTENT_SCRIPT.with(|cell| cell.borrow().is_some()) {
            return Err(ShellError::AlreadyStarted);
        }

        let window = web_sys::window().ok_or(ShellError::NoWindow)?;
        let document = window.document().ok_or(ShellError::NoDocument)?;
        let interval_ms = config.nav_poll_interval_ms;

        let script = Rc::new_cyclic(|weak: &Weak<ContentScript>| {
            let queue = EventQueue::new();
            let weak = weak.clone();
            let wake: Rc<dyn Fn()> = Rc::new(move || {
                if let Some(script) = weak.upgrade() {
                    script.pump();
                }
            });
            let dom = WebDom::new(document.clone(), queue.clone(), wake);
            ContentScript {
                engine: RefCell::new(Engine::new(dom, config)),
                queue,
                store: Rc::new(ChromeStorage::new()),
                window: window.clone(),
                observer: RefCell::new(None),
            }
        });

        script.subscribe_store()?;
        script.load_cache();
        script.watch_navigation(interval_ms)?;
        script.observe_when_ready(&document)?;

        CONTENT_SCRIPT.with(|cell| *cell.borrow_mut() = Some(script));
        log::info!("Content script running on {}", document.url().unwrap_or_default());
        Ok(())
    }

    fn post(&self, event: HostEvent<Element>) {
        self.queue.push(event);
        self.pump();
    }

    /// Drain the queue through the engine and hand its writes to the store.
    ///
    /// Events posted while the engine is dispatching (the engine's own
    /// clicks) find it borrowed and are picked up by the running loop.
    fn pump(&self) {
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            return;
        };
        engine.run_until_idle(&self.queue);
        let writes = engine.take_writes();
        drop(engine);

        for write in writes {
            let store = Rc::clone(&self.store);
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = write.apply(store.as_ref()).await {
                    log::error!("Failed to save event colors: {}", e);
                }
            });
        }
    }

    fn subscribe_store(self: &Rc<Self>) -> ShellResult<()> {
        let weak = Rc::downgrade(self);
        self.store.subscribe(move |changes| {
            if let Some(script) = weak.upgrade() {
                script.post(HostEvent::StoreChanged(changes));
            }
        })?;
        Ok(())
    }

    fn load_cache(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let store = Rc::clone(&self.store);
        wasm_bindgen_futures::spawn_local(async move {
            match ColorRecords::load(store.as_ref()).await {
                Ok(records) => {
                    if let Some(script) = weak.upgrade() {
                        script.post(HostEvent::CacheLoaded(records));
                    }
                }
                Err(e) => log::error!("Failed to load colors: {}", e),
            }
        });
    }

    fn current_url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    /// Report the URL on `popstate` and on a timer; `pushState` navigation
    /// fires no event, so the timer is what catches most changes.
    fn watch_navigation(self: &Rc<Self>, interval_ms: u32) -> ShellResult<()> {
        self.post(HostEvent::UrlChanged(self.current_url()));

        let weak = Rc::downgrade(self);
        let on_nav = Closure::wrap(Box::new(move || {
            if let Some(script) = weak.upgrade() {
                script.post(HostEvent::UrlChanged(script.current_url()));
            }
        }) as Box<dyn Fn()>);

        self.window
            .add_event_listener_with_callback("popstate", on_nav.as_ref().unchecked_ref())
            .map_err(|e| ShellError::Js(format!("{:?}", e)))?;
        self.window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                on_nav.as_ref().unchecked_ref(),
                interval_ms.min(i32::MAX as u32) as i32,
            )
            .map_err(|e| ShellError::Js(format!("{:?}", e)))?;
        on_nav.forget(); // Lives as long as the page
        Ok(())
    }

    fn observe_when_ready(self: &Rc<Self>, document: &Document) -> ShellResult<()> {
        if let Some(body) = document.body() {
            return self.observe(&body);
        }

        let weak = Rc::downgrade(self);
        let ready_document = document.clone();
        let on_ready = Closure::once(Box::new(move |_: web_sys::Event| {
            let (Some(script), Some(body)) = (weak.upgrade(), ready_document.body()) else {
                log::warn!("No document body to observe");
                return;
            };
            if let Err(e) = script.observe(&body) {
                log::error!("Failed to observe page: {}", e);
            }
        }) as Box<dyn FnOnce(web_sys::Event)>);

        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
            .map_err(|e| ShellError::Js(format!("{:?}", e)))?;
        on_ready.forget();
        Ok(())
    }

    /// Watch every insertion under `body`.
    fn observe(self: &Rc<Self>, body: &HtmlElement) -> ShellResult<()> {
        let weak = Rc::downgrade(self);
        let on_mutations = Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
            let Some(script) = weak.upgrade() else {
                return;
            };
            let added: Vec<Element> = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .flat_map(|record| elements(&record.added_nodes()))
                .collect();
            if !added.is_empty() {
                script.post(HostEvent::NodesAdded(added));
            }
        }) as Box<dyn Fn(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(on_mutations.as_ref().unchecked_ref())
            .map_err(|e| ShellError::Js(format!("{:?}", e)))?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(body, &init)
            .map_err(|e| ShellError::Js(format!("{:?}", e)))?;

        on_mutations.forget();
        *self.observer.borrow_mut() = Some(observer);
        log::debug!("Observing page mutations");

        // Pickers already on the page when we start.
        self.post(HostEvent::NodesAdded(vec![body.clone().unchecked_into::<Element>()]));
        Ok(())
    }
}
