//! Domain models for the carpool service.

pub mod child;
pub mod group;
pub mod poi;
pub mod ride_request;
pub mod user;

pub use child::Child;
pub use group::{Group, GroupMember};
pub use poi::Poi;
pub use ride_request::{
    Contact, Direction, NewRideRequest, PassengerType, RideRequest, RideRequestDetails,
    RideRequestFilter, RideRequestView, RideStatus, RideTransition,
};
pub use user::{User, UserSession};
