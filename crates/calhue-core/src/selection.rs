//! Uncommitted color choices made on the event edit page.
//!
//! The host only keeps a color chosen in its edit form once the form is
//! saved, so a custom choice made there is held here until the save control
//! fires and dropped if the user leaves the page instead.

use crate::cache::ColorCache;

/// The single in-flight choice, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingSelection {
    /// Nothing chosen since the last commit or discard.
    #[default]
    Idle,
    /// A custom swatch was picked for `event_id`.
    PendingCustom { event_id: String, color_name: String },
    /// A host swatch was picked for `event_id`; saving drops any custom mapping.
    PendingOfficial { event_id: String },
}

impl PendingSelection {
    /// Event the pending choice belongs to.
    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::PendingCustom { event_id, .. } | Self::PendingOfficial { event_id } => Some(event_id.as_str()),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Mapping edit produced by committing a pending choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingChange {
    Assign { event_id: String, color_name: String },
    Clear { event_id: String },
}

/// Owns the [`PendingSelection`] state machine.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    pending: PendingSelection,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &PendingSelection {
        &self.pending
    }

    /// Hold a custom color for `event_id`, replacing any other pending choice.
    pub fn select_custom(&mut self, event_id: &str, color_name: &str) {
        log::debug!("Pending custom color {:?} for event {}", color_name, event_id);
        self.pending = PendingSelection::PendingCustom {
            event_id: event_id.to_string(),
            color_name: color_name.to_string(),
        };
    }

    /// Hold a host color for `event_id`, replacing any other pending choice.
    pub fn select_official(&mut self, event_id: &str) {
        log::debug!("Pending official color for event {}", event_id);
        self.pending = PendingSelection::PendingOfficial {
            event_id: event_id.to_string(),
        };
    }

    /// Turn the pending choice into a mapping edit and return to idle.
    pub fn commit(&mut self) -> Option<MappingChange> {
        match std::mem::take(&mut self.pending) {
            PendingSelection::Idle => None,
            PendingSelection::PendingCustom { event_id, color_name } => {
                Some(MappingChange::Assign { event_id, color_name })
            }
            PendingSelection::PendingOfficial { event_id } => Some(MappingChange::Clear { event_id }),
        }
    }

    /// Forget the pending choice. Returns true if there was one.
    pub fn discard(&mut self) -> bool {
        let had_pending = !self.pending.is_idle();
        if had_pending {
            log::debug!("Discarding pending selection {:?}", self.pending);
        }
        self.pending = PendingSelection::Idle;
        had_pending
    }

    /// Color name to show as checked for `event_id`: a pending choice wins
    /// over the committed mapping.
    pub fn resolved_color<'a>(&'a self, event_id: &str, cache: &'a ColorCache) -> Option<&'a str> {
        match &self.pending {
            PendingSelection::PendingCustom { event_id: pending, color_name } if pending == event_id => {
                Some(color_name.as_str())
            }
            PendingSelection::PendingOfficial { event_id: pending } if pending == event_id => None,
            _ => cache.event_color(event_id),
        }
    }
}
