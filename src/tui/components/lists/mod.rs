//! Paginated list components.
//!
//! Pages are sized by what actually fits the viewport rather than by a fixed
//! item count: items are bound into reusable slots, measured, and the page
//! starts found that way are memoized for navigation.

pub mod binder;
pub mod capacity;
pub mod offsets;
pub mod paginator;
pub mod record;
pub mod slot_pool;
pub mod track_list;

pub use binder::{ItemBinder, LineTemplate, TemplateBinder};
pub use capacity::{wrap_line, CapacityOracle, LayoutSignal, ViewportOracle};
pub use offsets::OffsetTable;
pub use paginator::{PaginationMetrics, Paginator, Selector};
pub use record::{BindingError, FieldPath, Record};
pub use slot_pool::{Slot, SlotPool};
pub use track_list::TrackList;
