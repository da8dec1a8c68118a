//! In-memory DOM for driving the engine in tests.
//!
//! Supports compound selectors made of `tag`, `.class`, `#id`, `[attr]` and
//! `[attr="value"]`, joined by commas. Anything else panics so a test never
//! silently matches nothing.

use super::{ClickAction, DomError, DomResult, EventQueue, HostDom, HostEvent, SYNTHETIC_CLICK_ATTR};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeNode(usize);

#[derive(Debug, Default)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    children: Vec<usize>,
    parent: Option<usize>,
    text: String,
    background: Option<String>,
    hidden: bool,
    listeners: Vec<ClickAction>,
}

pub struct FakeDom {
    elements: RefCell<Vec<Element>>,
    queue: EventQueue<FakeNode>,
    url: RefCell<String>,
    stylesheets: RefCell<BTreeMap<String, String>>,
    stylesheet_installs: RefCell<usize>,
    clicks: RefCell<Vec<FakeNode>>,
    create_budget: Cell<Option<usize>>,
    body: FakeNode,
}

impl FakeDom {
    pub fn new(url: &str) -> Self {
        let elements = vec![
            Element { tag: "html".into(), children: vec![1, 2], ..Element::default() },
            Element { tag: "head".into(), parent: Some(0), ..Element::default() },
            Element { tag: "body".into(), parent: Some(0), ..Element::default() },
        ];
        Self {
            elements: RefCell::new(elements),
            queue: EventQueue::new(),
            url: RefCell::new(url.to_string()),
            stylesheets: RefCell::new(BTreeMap::new()),
            stylesheet_installs: RefCell::new(0),
            clicks: RefCell::new(Vec::new()),
            create_budget: Cell::new(None),
            body: FakeNode(2),
        }
    }

    pub fn queue(&self) -> EventQueue<FakeNode> {
        self.queue.clone()
    }

    pub fn body(&self) -> FakeNode {
        self.body
    }

    pub fn set_url(&self, url: &str) {
        *self.url.borrow_mut() = url.to_string();
    }

    /// Create an element under `parent` with the given attributes
    /// (`class` is split into classes).
    pub fn add(&self, parent: FakeNode, tag: &str, attrs: &[(&str, &str)]) -> FakeNode {
        let node = self.create(tag);
        for (name, value) in attrs {
            self.set_attribute(&node, name, value);
        }
        self.link(parent, node);
        node
    }

    /// Let `count` more `create_element` calls succeed, then fail the rest.
    /// `None` lifts the limit.
    pub fn fail_creates_after(&self, count: Option<usize>) {
        self.create_budget.set(count);
    }

    pub fn stylesheet(&self, id: &str) -> Option<String> {
        self.stylesheets.borrow().get(id).cloned()
    }

    pub fn stylesheet_installs(&self) -> usize {
        *self.stylesheet_installs.borrow()
    }

    /// Every element the engine clicked, in order.
    pub fn clicks(&self) -> Vec<FakeNode> {
        self.clicks.borrow().clone()
    }

    pub fn listeners(&self, node: FakeNode) -> Vec<ClickAction> {
        self.elements.borrow()[node.0].listeners.clone()
    }

    pub fn is_hidden(&self, node: FakeNode) -> bool {
        self.elements.borrow()[node.0].hidden
    }

    pub fn background(&self, node: FakeNode) -> Option<String> {
        self.elements.borrow()[node.0].background.clone()
    }

    pub fn text(&self, node: FakeNode) -> String {
        self.elements.borrow()[node.0].text.clone()
    }

    pub fn has_class(&self, node: FakeNode, class: &str) -> bool {
        self.elements.borrow()[node.0].classes.iter().any(|c| c == class)
    }

    /// Simulate a user click: posts one event per registered listener.
    pub fn user_click(&self, node: FakeNode) {
        self.fire_listeners(node);
    }

    fn create(&self, tag: &str) -> FakeNode {
        let mut elements = self.elements.borrow_mut();
        elements.push(Element { tag: tag.to_string(), ..Element::default() });
        FakeNode(elements.len() - 1)
    }

    fn link(&self, parent: FakeNode, child: FakeNode) {
        let mut elements = self.elements.borrow_mut();
        if let Some(old_parent) = elements[child.0].parent {
            elements[old_parent].children.retain(|&c| c != child.0);
        }
        elements[child.0].parent = Some(parent.0);
        elements[parent.0].children.push(child.0);
    }

    fn fire_listeners(&self, node: FakeNode) {
        let (actions, synthetic) = {
            let elements = self.elements.borrow();
            let element = &elements[node.0];
            (element.listeners.clone(), element.attrs.contains_key(SYNTHETIC_CLICK_ATTR))
        };
        for action in actions {
            self.queue.push(HostEvent::Clicked { node, action, synthetic });
        }
    }

    fn descendants(&self, root: FakeNode) -> Vec<FakeNode> {
        let elements = self.elements.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<usize> = elements[root.0].children.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            out.push(FakeNode(index));
            stack.extend(elements[index].children.iter().rev().copied());
        }
        out
    }

    fn element_matches(&self, node: FakeNode, selector: &str) -> bool {
        let elements = self.elements.borrow();
        let element = &elements[node.0];
        selector
            .split(',')
            .map(str::trim)
            .any(|compound| parse_compound(compound).iter().all(|simple| simple.matches(element)))
    }
}

enum Simple {
    Tag(String),
    Class(String),
    Id(String),
    Attr(String, Option<String>),
}

impl Simple {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Simple::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
            Simple::Class(class) => element.classes.iter().any(|c| c == class),
            Simple::Id(id) => element.attrs.get("id") == Some(id),
            Simple::Attr(name, None) => name == "class" && !element.classes.is_empty() || element.attrs.contains_key(name),
            Simple::Attr(name, Some(value)) => element.attrs.get(name) == Some(value),
        }
    }
}

fn parse_compound(compound: &str) -> Vec<Simple> {
    let mut out = Vec::new();
    let mut rest = compound;
    let ident_end = |s: &str| s.find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_')).unwrap_or(s.len());

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = ident_end(after);
            out.push(Simple::Class(after[..end].to_string()));
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('#') {
            let end = ident_end(after);
            out.push(Simple::Id(after[..end].to_string()));
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']').unwrap_or_else(|| panic!("unterminated selector {compound:?}"));
            let inner = &after[..close];
            match inner.split_once('=') {
                Some((name, value)) => {
                    let value = value.trim_matches(|c| c == '"' || c == '\'');
                    out.push(Simple::Attr(name.to_string(), Some(value.to_string())));
                }
                None => out.push(Simple::Attr(inner.to_string(), None)),
            }
            rest = &after[close + 1..];
        } else {
            let end = ident_end(rest);
            assert!(end > 0, "unsupported selector {compound:?}");
            out.push(Simple::Tag(rest[..end].to_string()));
            rest = &rest[end..];
        }
    }
    out
}

impl HostDom for FakeDom {
    type Node = FakeNode;

    fn query(&self, root: &FakeNode, selector: &str) -> Option<FakeNode> {
        self.descendants(*root).into_iter().find(|n| self.element_matches(*n, selector))
    }

    fn query_all(&self, root: &FakeNode, selector: &str) -> Vec<FakeNode> {
        self.descendants(*root)
            .into_iter()
            .filter(|n| self.element_matches(*n, selector))
            .collect()
    }

    fn query_document(&self, selector: &str) -> Option<FakeNode> {
        self.query(&FakeNode(0), selector)
    }

    fn matches(&self, node: &FakeNode, selector: &str) -> bool {
        self.element_matches(*node, selector)
    }

    fn closest(&self, node: &FakeNode, selector: &str) -> Option<FakeNode> {
        let mut current = Some(*node);
        while let Some(n) = current {
            if self.element_matches(n, selector) {
                return Some(n);
            }
            current = self.parent(&n);
        }
        None
    }

    fn parent(&self, node: &FakeNode) -> Option<FakeNode> {
        self.elements.borrow()[node.0].parent.map(FakeNode)
    }

    fn children(&self, node: &FakeNode) -> Vec<FakeNode> {
        self.elements.borrow()[node.0].children.iter().copied().map(FakeNode).collect()
    }

    fn attribute(&self, node: &FakeNode, name: &str) -> Option<String> {
        let elements = self.elements.borrow();
        let element = &elements[node.0];
        if name == "class" {
            return (!element.classes.is_empty()).then(|| element.classes.join(" "));
        }
        element.attrs.get(name).cloned()
    }

    fn set_attribute(&self, node: &FakeNode, name: &str, value: &str) {
        let mut elements = self.elements.borrow_mut();
        let element = &mut elements[node.0];
        if name == "class" {
            element.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&self, node: &FakeNode, name: &str) {
        self.elements.borrow_mut()[node.0].attrs.remove(name);
    }

    fn add_class(&self, node: &FakeNode, class: &str) {
        let mut elements = self.elements.borrow_mut();
        let classes = &mut elements[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &FakeNode, class: &str) {
        self.elements.borrow_mut()[node.0].classes.retain(|c| c != class);
    }

    fn create_element(&self, tag: &str) -> DomResult<FakeNode> {
        match self.create_budget.get() {
            Some(0) => return Err(DomError::CreateElement(tag.to_string())),
            Some(n) => self.create_budget.set(Some(n - 1)),
            None => {}
        }
        if tag.is_empty() {
            return Err(DomError::CreateElement(tag.to_string()));
        }
        Ok(self.create(tag))
    }

    fn append_child(&self, parent: &FakeNode, child: &FakeNode) -> DomResult<()> {
        if parent == child {
            return Err(DomError::Insert("element appended to itself".into()));
        }
        self.link(*parent, *child);
        Ok(())
    }

    fn remove(&self, node: &FakeNode) {
        let mut elements = self.elements.borrow_mut();
        if let Some(parent) = elements[node.0].parent.take() {
            elements[parent].children.retain(|&c| c != node.0);
        }
    }

    fn set_text(&self, node: &FakeNode, text: &str) {
        self.elements.borrow_mut()[node.0].text = text.to_string();
    }

    fn set_background(&self, node: &FakeNode, color: &str) {
        self.elements.borrow_mut()[node.0].background = Some(color.to_string());
    }

    fn hide(&self, node: &FakeNode) {
        self.elements.borrow_mut()[node.0].hidden = true;
    }

    fn click(&self, node: &FakeNode) {
        self.clicks.borrow_mut().push(*node);
        self.fire_listeners(*node);
    }

    fn listen_click(&self, node: &FakeNode, action: ClickAction) {
        self.elements.borrow_mut()[node.0].listeners.push(action);
    }

    fn current_url(&self) -> String {
        self.url.borrow().clone()
    }

    fn install_stylesheet(&self, id: &str, css: &str) -> DomResult<()> {
        self.stylesheets.borrow_mut().insert(id.to_string(), css.to_string());
        *self.stylesheet_installs.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        let dom = FakeDom::new("https://example.test/");
        let menu = dom.add(dom.body(), "div", &[("data-eid", "e1"), ("role", "menu")]);
        let swatch = dom.add(menu, "div", &[("class", "A1wrjc kQuqUe"), ("data-color", "#D50000")]);

        assert!(dom.matches(&swatch, ".A1wrjc"));
        assert!(dom.matches(&swatch, "div.kQuqUe[data-color=\"#D50000\"]"));
        assert!(dom.matches(&swatch, ".nope, .A1wrjc"));
        assert!(!dom.matches(&swatch, "[data-color-name]"));
        assert_eq!(dom.closest(&swatch, "[data-eid]"), Some(menu));
        assert_eq!(dom.closest(&swatch, "[role=\"menu\"]"), Some(menu));
        assert_eq!(dom.query(&dom.body(), ".A1wrjc"), Some(swatch));
        assert_eq!(dom.query(&swatch, ".A1wrjc"), None);
    }

    #[test]
    fn test_click_reports_listeners() {
        let dom = FakeDom::new("https://example.test/");
        let button = dom.add(dom.body(), "div", &[]);
        dom.listen_click(&button, ClickAction::Save);

        dom.user_click(button);
        dom.set_attribute(&button, SYNTHETIC_CLICK_ATTR, "1");
        dom.click(&button);

        let queue = dom.queue();
        assert!(matches!(queue.pop(), Some(HostEvent::Clicked { synthetic: false, .. })));
        assert!(matches!(queue.pop(), Some(HostEvent::Clicked { synthetic: true, .. })));
        assert_eq!(dom.clicks(), vec![button]);
    }
}
