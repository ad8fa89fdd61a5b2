//! # View
//!
//! Everything between a loaded catalog and the pixels on the page.
//!
//! ```text
//! Catalog → ViewController ─(filter + search)→ filtered → render → HTML
//!                 ▲
//!      set_filter / input_search / upsert / apply
//! ```

pub mod categories;
pub mod controller;
pub mod debounce;
pub mod events;
pub mod filter;
pub mod notifications;
pub mod render;

pub use categories::{available_categories, Category, CategoryFilter, CATEGORIES};
pub use controller::{ApplyOutcome, LoadOutcome, LoadPhase, LoadTicket, ViewController};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use events::{ViewEvent, ViewEventKind};
pub use filter::filter_materials;
pub use notifications::{Notification, NotificationCenter, NotificationKind, NOTIFICATION_TTL};
pub use render::{render_page, render_text, RenderedView};
