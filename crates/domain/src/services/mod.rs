//! Domain services for the carpool service.
//!
//! Services contain business logic that operates on domain models.

pub mod feed;
pub mod memory_store;
pub mod ride_request;

pub use feed::{build_feed, is_stale, Feed, FeedQuery, FeedView};
pub use memory_store::InMemoryRideStore;
pub use ride_request::{
    check_ride_date, RideError, RideErrorKind, RideRequestService, RideStore, StoreError,
    DEFAULT_STALE_AFTER_HOURS,
};
