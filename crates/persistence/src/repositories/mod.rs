//! Repository implementations for database operations.

pub mod child;
pub mod group;
pub mod poi;
pub mod ride_request;
pub mod user;

pub use child::ChildRepository;
pub use group::GroupRepository;
pub use poi::PoiRepository;
pub use ride_request::{store_error, RideRequestRepository};
pub use user::{NewUser, UserRepository};
