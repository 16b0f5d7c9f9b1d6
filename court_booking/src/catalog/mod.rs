//! Court catalog and slot generation.
//!
//! Courts carry a price, a capacity and a slot duration. Their bookable slots
//! are generated by cutting the 08:00–22:00 window into blocks of that duration,
//! unless an explicit slot list is supplied.
//!
//! ## Example
//!
//! ```
//! use court_booking::catalog::{TimeSlot, generate_slots};
//!
//! let slots = generate_slots(4);
//! assert_eq!(slots.len(), 3);
//! assert_eq!(slots[2], TimeSlot::new(16, 20).unwrap());
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod registry;
pub mod slots;

pub use errors::{CatalogError, CatalogResult};
pub use manager::CatalogManager;
pub use models::{Court, CourtId, CourtQuery, CourtStatus, CourtUpdate, NewCourt};
pub use registry::CourtCatalog;
pub use slots::{CLOSING_HOUR, OPENING_HOUR, SlotParseError, TimeSlot, generate_slots};
