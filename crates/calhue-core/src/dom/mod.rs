//! Host page abstraction.
//!
//! The engine never touches the browser directly. It talks to a [`HostDom`]
//! and receives everything that happens on the page as [`HostEvent`]s posted
//! into an [`EventQueue`], which keeps selector matching on one side and
//! color bookkeeping on the other.

#[cfg(test)]
pub(crate) mod fake;

use crate::storage::ChangeSet;
use crate::model::ColorRecords;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// DOM operation errors.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Failed to create <{0}> element")]
    CreateElement(String),
    #[error("Failed to insert element: {0}")]
    Insert(String),
    #[error("Missing {0}")]
    Missing(String),
}

/// Result type for DOM operations.
pub type DomResult<T> = Result<T, DomError>;

/// What a click listener registered through [`HostDom::listen_click`] reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// One of our injected swatches.
    CustomSwatch { color_name: String },
    /// A swatch from the host's own palette.
    OfficialSwatch,
    /// The edit form's save control.
    Save,
}

/// Something that happened on the page or in the store.
#[derive(Debug, Clone)]
pub enum HostEvent<N> {
    /// Elements were inserted anywhere under the document body.
    NodesAdded(Vec<N>),
    /// A listened-to element was clicked. `synthetic` is set when the click
    /// was issued by the engine itself.
    Clicked { node: N, action: ClickAction, synthetic: bool },
    /// The page URL was observed, changed or not.
    UrlChanged(String),
    /// The store reported changed keys.
    StoreChanged(ChangeSet),
    /// The initial store read finished.
    CacheLoaded(ColorRecords),
}

/// FIFO shared between the DOM layer (producer) and the engine (consumer).
pub struct EventQueue<N> {
    events: Rc<RefCell<VecDeque<HostEvent<N>>>>,
}

impl<N> EventQueue<N> {
    pub fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn push(&self, event: HostEvent<N>) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn pop(&self) -> Option<HostEvent<N>> {
        self.events.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl<N> Clone for EventQueue<N> {
    fn clone(&self) -> Self {
        Self {
            events: Rc::clone(&self.events),
        }
    }
}

impl<N> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for EventQueue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue").field("len", &self.len()).finish()
    }
}

/// Attribute set on an element right before the engine clicks it, so the
/// click listener can tell the engine's own clicks from the user's.
pub const SYNTHETIC_CLICK_ATTR: &str = "data-calhue-synthetic";

/// The operations the engine needs from the host page.
///
/// Lookups return `None`/empty on a miss; setters are best effort.
pub trait HostDom {
    /// Element handle.
    type Node: Clone + PartialEq + fmt::Debug;

    /// First descendant of `root` matching `selector`.
    fn query(&self, root: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// All descendants of `root` matching `selector`, in document order.
    fn query_all(&self, root: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// First element in the whole document matching `selector`.
    fn query_document(&self, selector: &str) -> Option<Self::Node>;

    /// Whether `node` itself matches `selector`.
    fn matches(&self, node: &Self::Node, selector: &str) -> bool;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Element children of `node`.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&self, node: &Self::Node, name: &str);

    fn add_class(&self, node: &Self::Node, class: &str);

    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> DomResult<Self::Node>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> DomResult<()>;

    /// Detach the element from its parent.
    fn remove(&self, node: &Self::Node);

    fn set_text(&self, node: &Self::Node, text: &str);

    /// Set the inline background color.
    fn set_background(&self, node: &Self::Node, color: &str);

    /// Hide the element (inline `display: none`).
    fn hide(&self, node: &Self::Node);

    /// Dispatch a click on the element.
    fn click(&self, node: &Self::Node);

    /// Report clicks on `node` as [`HostEvent::Clicked`] with `action`.
    fn listen_click(&self, node: &Self::Node, action: ClickAction);

    /// Current page URL.
    fn current_url(&self) -> String;

    /// Replace the `<style id=...>` element with one holding `css`.
    fn install_stylesheet(&self, id: &str, css: &str) -> DomResult<()>;
}
