//! Calhue Core Library
//!
//! Platform-agnostic engine that layers user-defined color labels on top of
//! a web calendar's fixed event palette.

pub mod cache;
pub mod color;
pub mod config;
pub mod css;
#[cfg(feature = "debug-colors")]
pub mod debug;
pub mod dom;
pub mod engine;
pub mod library;
pub mod markup;
pub mod model;
pub mod palette;
pub mod selection;
pub mod storage;

pub use cache::ColorCache;
pub use color::{ColorParseError, Rgb, TextColor};
pub use config::EngineConfig;
pub use dom::{ClickAction, DomError, DomResult, EventQueue, HostDom, HostEvent};
pub use engine::{Engine, StoreWrite, PickerKind, Surface};
pub use library::LibraryError;
pub use markup::{ChipSelectors, HostMarkup};
pub use model::{ColorRecords, CustomColor, COLOR_ORDER_KEY, CUSTOM_COLORS_KEY, EVENT_COLORS_KEY};
pub use palette::{closest_official_color, OfficialColor, OFFICIAL_COLORS};
pub use selection::{MappingChange, PendingSelection, SelectionManager};
pub use storage::{ChangeSet, KeyValueStore, MemoryStore, Record, StorageChange, StorageError, StorageResult};
