//! [`HostDom`] over the live page.

use calhue_core::dom::SYNTHETIC_CLICK_ATTR;
use calhue_core::{ClickAction, DomError, DomResult, EventQueue, HostDom, HostEvent};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, NodeList};

/// The page document. Click listeners post into `queue` and then call
/// `wake` so the events are processed.
pub struct WebDom {
    document: Document,
    queue: EventQueue<Element>,
    wake: Rc<dyn Fn()>,
}

impl WebDom {
    pub fn new(document: Document, queue: EventQueue<Element>, wake: Rc<dyn Fn()>) -> Self {
        Self { document, queue, wake }
    }

    fn style(&self, node: &Element, property: &str, value: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(e) = element.style().set_property(property, value) {
            log::debug!("Failed to set {}: {:?}", property, e);
        }
    }
}

/// Element entries of a node list.
pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl HostDom for WebDom {
    type Node = Element;

    fn query(&self, root: &Element, selector: &str) -> Option<Element> {
        root.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, root: &Element, selector: &str) -> Vec<Element> {
        root.query_selector_all(selector)
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn query_document(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn matches(&self, node: &Element, selector: &str) -> bool {
        node.matches(selector).unwrap_or(false)
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length()).filter_map(|i| children.item(i)).collect()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        if let Err(e) = node.set_attribute(name, value) {
            log::debug!("Failed to set attribute {}: {:?}", name, e);
        }
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        if let Err(e) = node.remove_attribute(name) {
            log::debug!("Failed to remove attribute {}: {:?}", name, e);
        }
    }

    fn add_class(&self, node: &Element, class: &str) {
        if let Err(e) = node.class_list().add_1(class) {
            log::debug!("Failed to add class {}: {:?}", class, e);
        }
    }

    fn remove_class(&self, node: &Element, class: &str) {
        if let Err(e) = node.class_list().remove_1(class) {
            log::debug!("Failed to remove class {}: {:?}", class, e);
        }
    }

    fn create_element(&self, tag: &str) -> DomResult<Element> {
        self.document
            .create_element(tag)
            .map_err(|_| DomError::CreateElement(tag.to_string()))
    }

    fn append_child(&self, parent: &Element, child: &Element) -> DomResult<()> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|e| DomError::Insert(format!("{:?}", e)))
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_background(&self, node: &Element, color: &str) {
        self.style(node, "background-color", color);
    }

    fn hide(&self, node: &Element) {
        self.style(node, "display", "none");
    }

    fn click(&self, node: &Element) {
        match node.dyn_ref::<HtmlElement>() {
            Some(element) => element.click(),
            None => log::debug!("Cannot click non-HTML element"),
        }
    }

    fn listen_click(&self, node: &Element, action: ClickAction) {
        let queue = self.queue.clone();
        let wake = Rc::clone(&self.wake);
        let target = node.clone();
        let on_click = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let synthetic = target.has_attribute(SYNTHETIC_CLICK_ATTR);
            queue.push(HostEvent::Clicked {
                node: target.clone(),
                action: action.clone(),
                synthetic,
            });
            wake();
        }) as Box<dyn Fn(web_sys::Event)>);

        if let Err(e) = node.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref()) {
            log::warn!("Failed to add click listener: {:?}", e);
            return;
        }
        on_click.forget(); // Lives as long as the element
    }

    fn current_url(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.href().ok())
            .unwrap_or_default()
    }

    fn install_stylesheet(&self, id: &str, css: &str) -> DomResult<()> {
        if let Some(existing) = self.document.get_element_by_id(id) {
            existing.remove();
        }
        let head = self
            .document
            .head()
            .ok_or_else(|| DomError::Missing("document head".into()))?;

        let style = self.create_element("style")?;
        style.set_id(id);
        style.set_text_content(Some(css));
        head.append_child(&style)
            .map(|_| ())
            .map_err(|e| DomError::Insert(format!("{:?}", e)))
    }
}
