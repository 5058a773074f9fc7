//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod child;
pub mod group;
pub mod poi;
pub mod ride_request;
pub mod user;

pub use child::ChildEntity;
pub use group::{GroupEntity, GroupMemberEntity, GroupMemberWithUserEntity};
pub use poi::PoiEntity;
pub use ride_request::{RideRequestDetailsEntity, RideRequestEntity, RIDE_REQUEST_COLUMNS};
pub use user::{UserEntity, UserSessionEntity};
