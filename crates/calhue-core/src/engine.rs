//! Coordinator for everything that happens on the calendar page.
//!
//! The DOM layer posts [`HostEvent`]s into an [`EventQueue`]; [`Engine::dispatch`]
//! routes each one to the observer, the swatch injector, the selection state
//! machine or the cache. Store writes are not performed here: they are queued
//! as [`StoreWrite`]s for the shell to execute asynchronously, after the cache
//! has already been updated.

use crate::cache::ColorCache;
use crate::config::EngineConfig;
use crate::css;
use crate::dom::{ClickAction, DomResult, EventQueue, HostDom, HostEvent, SYNTHETIC_CLICK_ATTR};
use crate::model::{ColorRecords, CustomColor};
use crate::palette::closest_official_color;
use crate::selection::{MappingChange, PendingSelection, SelectionManager};
use crate::storage::{ChangeSet, KeyValueStore, Record, StorageResult};

/// Set on a picker container once swatches were injected.
pub const INJECTED_ATTR: &str = "data-calhue-injected";

/// Class added to swatch rows we create.
pub const INJECTED_ROW_CLASS: &str = "calhue-injected";

/// Set on a save control once it has a listener.
pub const SAVE_LISTENED_ATTR: &str = "data-calhue-save";

/// Attribute carrying a custom swatch's color name.
pub const COLOR_NAME_ATTR: &str = "data-color-name";

/// Attribute carrying a swatch's hex color (host and injected swatches).
pub const COLOR_ATTR: &str = "data-color";

const SWATCH_ROLE: &str = "menuitemradio";

/// Which host picker a color grid belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    /// Popover on an existing event; choices commit immediately.
    Quick,
    /// Picker in the full edit form; choices wait for the form to be saved.
    Main,
}

/// A classified picker surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface<N> {
    pub kind: PickerKind,
    /// Element whose swatches share one checked state.
    pub scope: N,
    /// Event being colored.
    pub event_id: String,
}

/// A store write produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreWrite(pub Record);

impl StoreWrite {
    pub fn record(&self) -> &Record {
        &self.0
    }

    /// Execute the write against `store`.
    pub async fn apply<S: KeyValueStore + ?Sized>(&self, store: &S) -> StorageResult<()> {
        store.set(self.0.clone()).await
    }
}

/// Event id in an edit-page URL: the path segment following `segment`.
pub fn edit_event_id(url: &str, segment: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    segments.find(|s| *s == segment)?;
    segments
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// The content-script engine.
pub struct Engine<D: HostDom> {
    dom: D,
    config: EngineConfig,
    cache: ColorCache,
    selection: SelectionManager,
    outgoing: Vec<StoreWrite>,
    last_url: Option<String>,
}

impl<D: HostDom> Engine<D> {
    pub fn new(dom: D, config: EngineConfig) -> Self {
        Self {
            dom,
            config,
            cache: ColorCache::new(),
            selection: SelectionManager::new(),
            outgoing: Vec::new(),
            last_url: None,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ColorCache {
        &self.cache
    }

    /// Records currently mirrored in the cache.
    pub fn records(&self) -> &ColorRecords {
        self.cache.records()
    }

    pub fn pending(&self) -> &PendingSelection {
        self.selection.pending()
    }

    /// Take the store writes queued since the last call, oldest first.
    pub fn take_writes(&mut self) -> Vec<StoreWrite> {
        std::mem::take(&mut self.outgoing)
    }

    /// Dispatch queued events until the queue is empty, including events
    /// posted while dispatching.
    pub fn run_until_idle(&mut self, queue: &EventQueue<D::Node>) {
        while let Some(event) = queue.pop() {
            self.dispatch(event);
        }
    }

    /// Handle one event.
    pub fn dispatch(&mut self, event: HostEvent<D::Node>) {
        match event {
            HostEvent::NodesAdded(nodes) => {
                for node in nodes {
                    self.observe_node(&node);
                }
            }
            HostEvent::Clicked { synthetic: true, action, .. } => {
                log::trace!("Ignoring synthetic click ({:?})", action);
            }
            HostEvent::Clicked { node, action, .. } => match action {
                ClickAction::CustomSwatch { color_name } => self.on_custom_click(&node, &color_name),
                ClickAction::OfficialSwatch => self.on_official_click(&node),
                ClickAction::Save => self.on_save(),
            },
            HostEvent::UrlChanged(url) => self.on_url_changed(url),
            HostEvent::StoreChanged(changes) => self.on_store_changed(&changes),
            HostEvent::CacheLoaded(records) => {
                self.cache.load(records);
                self.refresh_styles();
            }
        }
    }

    /// Stylesheet text for the current cache and pending selection.
    pub fn stylesheet(&self) -> String {
        css::synthesize(self.cache.records(), self.selection.pending(), &self.config.markup)
    }

    /// Replace the injected stylesheet.
    pub fn refresh_styles(&self) {
        let css = self.stylesheet();
        if let Err(e) = self.dom.install_stylesheet(&self.config.stylesheet_id, &css) {
            log::error!("Failed to install stylesheet: {}", e);
        }
    }

    // --- Observer ---

    fn observe_node(&self, node: &D::Node) {
        let markup = &self.config.markup;
        if self.dom.closest(node, &markup.overlay).is_some() {
            return;
        }

        if self.dom.matches(node, &markup.save_button) {
            self.listen_save(node);
        } else if let Some(save) = self.dom.query(node, &markup.save_button) {
            self.listen_save(&save);
        }

        let mut grids = self.dom.query_all(node, &markup.color_grid);
        if self.dom.matches(node, &markup.color_grid) {
            grids.insert(0, node.clone());
        }
        for container in grids.iter().filter_map(|g| self.dom.parent(g)) {
            log::debug!("Color picker detected");
            if let Err(e) = self.inject(&container) {
                log::warn!("Swatch injection failed: {}", e);
            }
        }
    }

    fn listen_save(&self, node: &D::Node) {
        if self.dom.attribute(node, SAVE_LISTENED_ATTR).is_some() {
            return;
        }
        self.dom.set_attribute(node, SAVE_LISTENED_ATTR, "");
        self.dom.listen_click(node, ClickAction::Save);
        log::debug!("Listening to save control");
    }

    /// Decide which picker `node` sits in and which event it colors.
    pub fn classify(&self, node: &D::Node) -> Option<Surface<D::Node>> {
        let markup = &self.config.markup;

        if let Some(menu) = self.dom.closest(node, &markup.event_menu) {
            let event_id = self.dom.attribute(&menu, &markup.event_menu_attr)?;
            return Some(Surface {
                kind: PickerKind::Quick,
                scope: menu,
                event_id,
            });
        }

        let event_id = edit_event_id(&self.dom.current_url(), &markup.edit_path_segment)?;
        if self.dom.closest(node, &markup.calendar_color_menu).is_some() {
            return None;
        }
        let menu = self.dom.closest(node, &markup.edit_menu)?;
        Some(Surface {
            kind: PickerKind::Main,
            scope: menu,
            event_id,
        })
    }

    // --- Injector ---

    fn inject(&self, container: &D::Node) -> DomResult<()> {
        if self.dom.attribute(container, INJECTED_ATTR).is_some() {
            return Ok(());
        }
        let Some(surface) = self.classify(container) else {
            log::debug!("Skipping color injection, not an event color picker");
            return Ok(());
        };
        log::info!("Adding custom colors to {:?} picker for event {}", surface.kind, surface.event_id);

        let markup = &self.config.markup;
        let per_row = self
            .dom
            .parent(container)
            .and_then(|p| self.dom.attribute(&p, &markup.colors_per_row_attr))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(self.config.swatches_per_row_fallback.max(1));

        let colors: Vec<(String, CustomColor)> = self
            .cache
            .ordered_colors()
            .map(|(name, color)| (name.to_string(), color.clone()))
            .collect();

        if let Err(e) = self.append_swatches(container, &colors, per_row) {
            self.remove_injected(container);
            return Err(e);
        }
        self.dom.set_attribute(container, INJECTED_ATTR, "");

        for swatch in self.dom.query_all(container, &markup.swatch) {
            if self.dom.attribute(&swatch, COLOR_NAME_ATTR).is_none() {
                self.dom.listen_click(&swatch, ClickAction::OfficialSwatch);
            }
        }

        if let Some(name) = self.selection.resolved_color(&surface.event_id, &self.cache) {
            self.mark_checked(&surface.scope, name);
        }

        if surface.kind == PickerKind::Main {
            match self.dom.query_document(&markup.save_button) {
                Some(save) => self.listen_save(&save),
                None => log::debug!("Save control not rendered yet"),
            }
        }
        Ok(())
    }

    fn append_swatches(&self, container: &D::Node, colors: &[(String, CustomColor)], per_row: usize) -> DomResult<()> {
        let mut row_index = self.config.markup.first_row_index;
        for (name, color) in colors {
            let swatch = self.build_swatch(name, color)?;
            let row = self.row_with_space(container, &mut row_index, per_row)?;
            self.dom.append_child(&row, &swatch)?;
        }
        Ok(())
    }

    /// Take back a partial injection so the next mutation retries it.
    fn remove_injected(&self, container: &D::Node) {
        for row in self.dom.query_all(container, &format!(".{}", INJECTED_ROW_CLASS)) {
            self.dom.remove(&row);
        }
        for swatch in self.dom.query_all(container, &format!("[{}]", COLOR_NAME_ATTR)) {
            self.dom.remove(&swatch);
        }
    }

    /// First row at or after `row_index` with room for another swatch,
    /// appending a new row when every existing one is full.
    fn row_with_space(&self, container: &D::Node, row_index: &mut usize, per_row: usize) -> DomResult<D::Node> {
        loop {
            let rows = self.dom.children(container);
            match rows.get(*row_index) {
                Some(row) if self.dom.children(row).len() < per_row => return Ok(row.clone()),
                Some(_) => *row_index += 1,
                None => {
                    let row = self.dom.create_element("div")?;
                    self.dom.set_attribute(&row, "class", &self.config.markup.row_classes);
                    self.dom.add_class(&row, INJECTED_ROW_CLASS);
                    self.dom.append_child(container, &row)?;
                    *row_index = rows.len();
                    return Ok(row);
                }
            }
        }
    }

    fn build_swatch(&self, name: &str, color: &CustomColor) -> DomResult<D::Node> {
        let markup = &self.config.markup;
        let dom = &self.dom;

        let swatch = dom.create_element("div")?;
        dom.set_attribute(&swatch, "class", &markup.swatch_classes);
        dom.set_attribute(&swatch, "tabindex", "0");
        dom.set_attribute(&swatch, "role", SWATCH_ROLE);
        dom.set_attribute(&swatch, "aria-label", &format!("{}, custom event color", name));
        dom.set_attribute(&swatch, COLOR_ATTR, &color.hex);
        dom.set_attribute(&swatch, COLOR_NAME_ATTR, name);
        dom.set_attribute(&swatch, "aria-checked", "false");
        dom.set_background(&swatch, &color.hex);

        let checkmark = dom.create_element("i")?;
        dom.set_attribute(&checkmark, "class", &markup.checkmark_classes);
        dom.set_attribute(&checkmark, "aria-hidden", "true");
        dom.set_text(&checkmark, &markup.checkmark_glyph);
        dom.append_child(&swatch, &checkmark)?;

        let tooltip = dom.create_element("div")?;
        dom.set_attribute(&tooltip, "class", &markup.tooltip_class);
        dom.set_attribute(&tooltip, "aria-hidden", "true");
        dom.set_attribute(&tooltip, "data-text", name);
        dom.set_attribute(&tooltip, "data-tooltip-position", "top");
        dom.append_child(&swatch, &tooltip)?;

        dom.listen_click(&swatch, ClickAction::CustomSwatch {
            color_name: name.to_string(),
        });
        Ok(swatch)
    }

    // --- Click handling ---

    fn on_custom_click(&mut self, node: &D::Node, color_name: &str) {
        let Some(surface) = self.classify(node) else {
            log::warn!("Custom swatch {:?} clicked outside an event picker", color_name);
            return;
        };
        let Some(color) = self.cache.color(color_name) else {
            log::warn!("Custom color {:?} no longer exists", color_name);
            return;
        };

        // The host only draws the stripe for colors picked from its own palette.
        self.register_stripe(&surface.scope, &color.hex);

        match surface.kind {
            PickerKind::Main => {
                self.selection.select_custom(&surface.event_id, color_name);
                self.refresh_styles();
            }
            PickerKind::Quick => {
                log::info!("Event {} mapped to custom color {:?}", surface.event_id, color_name);
                self.apply_mapping(MappingChange::Assign {
                    event_id: surface.event_id.clone(),
                    color_name: color_name.to_string(),
                });
            }
        }
        self.mark_checked(&surface.scope, color_name);

        if surface.kind == PickerKind::Quick {
            if let Some(popup) = self.dom.closest(node, &self.config.markup.quick_menu_popup) {
                self.dom.hide(&popup);
            }
        }
    }

    fn register_stripe(&self, scope: &D::Node, hex: &str) {
        let official = closest_official_color(hex);
        let selector = format!("[{}=\"{}\"]", COLOR_ATTR, official.hex);
        let Some(target) = self
            .dom
            .query_all(scope, &selector)
            .into_iter()
            .find(|n| self.dom.attribute(n, COLOR_NAME_ATTR).is_none())
        else {
            log::warn!("Could not find official color option {}", official.name);
            return;
        };

        log::debug!("Selecting official color {} for stripe", official.name);
        self.dom.set_attribute(&target, SYNTHETIC_CLICK_ATTR, "");
        self.dom.click(&target);
        self.dom.remove_attribute(&target, SYNTHETIC_CLICK_ATTR);
    }

    fn on_official_click(&mut self, node: &D::Node) {
        let Some(surface) = self.classify(node) else {
            return;
        };
        match surface.kind {
            PickerKind::Main => {
                self.selection.select_official(&surface.event_id);
                self.refresh_styles();
            }
            PickerKind::Quick => {
                self.apply_mapping(MappingChange::Clear {
                    event_id: surface.event_id.clone(),
                });
            }
        }
        self.clear_custom_checks(&surface.scope);
    }

    fn on_save(&mut self) {
        if let Some(pending_event) = self.selection.pending().event_id() {
            let editing = edit_event_id(&self.dom.current_url(), &self.config.markup.edit_path_segment);
            if editing.as_deref() != Some(pending_event) {
                log::info!("Discarding pending selection for event {}, saving another page", pending_event);
                self.selection.discard();
                self.refresh_styles();
                return;
            }
        }
        match self.selection.commit() {
            Some(change) => {
                log::info!("Committing pending selection on save: {:?}", change);
                self.apply_mapping(change);
                // The pending preview is gone even if the mapping did not change.
                self.refresh_styles();
            }
            None => log::debug!("Save with no pending selection"),
        }
    }

    /// Update the cache, queue the write and restyle if the mapping changed.
    fn apply_mapping(&mut self, change: MappingChange) {
        let changed = match &change {
            MappingChange::Assign { event_id, color_name } => self.cache.set_event_color(event_id, color_name),
            MappingChange::Clear { event_id } => self.cache.remove_event_color(event_id),
        };
        if !changed {
            return;
        }
        if let MappingChange::Clear { event_id } = &change {
            log::info!("Removed custom color mapping for event {}", event_id);
        }
        self.outgoing
            .push(StoreWrite(self.cache.records().event_colors_record()));
        self.refresh_styles();
    }

    // --- Checked state ---

    fn mark_checked(&self, scope: &D::Node, color_name: &str) {
        let markup = &self.config.markup;
        for radio in self.dom.query_all(scope, &markup.radio) {
            self.set_checked(&radio, false);
        }
        for swatch in self.dom.query_all(scope, &format!("[{}]", COLOR_NAME_ATTR)) {
            if self.dom.attribute(&swatch, COLOR_NAME_ATTR).as_deref() == Some(color_name) {
                self.set_checked(&swatch, true);
            }
        }
    }

    fn clear_custom_checks(&self, scope: &D::Node) {
        for swatch in self.dom.query_all(scope, &format!("[{}]", COLOR_NAME_ATTR)) {
            self.set_checked(&swatch, false);
        }
    }

    fn set_checked(&self, swatch: &D::Node, checked: bool) {
        let markup = &self.config.markup;
        self.dom
            .set_attribute(swatch, "aria-checked", if checked { "true" } else { "false" });
        if let Some(checkmark) = self.dom.query(swatch, &markup.checkmark) {
            if checked {
                self.dom.add_class(&checkmark, &markup.checked_class);
            } else {
                self.dom.remove_class(&checkmark, &markup.checked_class);
            }
        }
    }

    // --- Navigation and store ---

    fn on_url_changed(&mut self, url: String) {
        if self.last_url.as_deref() == Some(url.as_str()) {
            return;
        }
        log::debug!("URL changed to {}", url);

        if let Some(pending_event) = self.selection.pending().event_id() {
            let editing = edit_event_id(&url, &self.config.markup.edit_path_segment);
            if editing.as_deref() != Some(pending_event) {
                self.selection.discard();
            }
        }
        self.last_url = Some(url);
        self.refresh_styles();
    }

    fn on_store_changed(&mut self, changes: &ChangeSet) {
        if self.cache.apply_changes(changes) {
            self.refresh_styles();
        }
    }
}
