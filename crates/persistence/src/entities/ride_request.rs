//! Ride request entities (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::ride_request::{
    Contact, Direction, PassengerType, RideRequest, RideRequestDetails, RideStatus,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Column list shared by every query returning a [`RideRequestEntity`].
pub const RIDE_REQUEST_COLUMNS: &str = "id, group_id, requester_id, passenger_type, passenger_id, \
     direction, poi_id, ride_date, status, accepter_id, created_at, accepted_at, completed_at, \
     updated_at";

/// Database row mapping for the ride_requests table.
///
/// Enumerations are stored as text and validated by CHECK constraints.
#[derive(Debug, Clone, FromRow)]
pub struct RideRequestEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub requester_id: Uuid,
    pub passenger_type: String,
    pub passenger_id: Uuid,
    pub direction: String,
    pub poi_id: Uuid,
    pub ride_date: NaiveDate,
    pub status: String,
    pub accepter_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl RideRequestEntity {
    /// Convert to domain model. Fails on enumeration values the domain
    /// does not know.
    pub fn into_domain(self) -> Result<RideRequest, String> {
        Ok(RideRequest {
            id: self.id,
            group_id: self.group_id,
            requester_id: self.requester_id,
            passenger_type: self.passenger_type.parse::<PassengerType>()?,
            passenger_id: self.passenger_id,
            direction: self.direction.parse::<Direction>()?,
            poi_id: self.poi_id,
            ride_date: self.ride_date,
            status: self.status.parse::<RideStatus>()?,
            accepter_id: self.accepter_id,
            created_at: self.created_at,
            accepted_at: self.accepted_at,
            completed_at: self.completed_at,
            updated_at: self.updated_at,
        })
    }
}

/// A ride request row joined with group, people and destination.
#[derive(Debug, Clone, FromRow)]
pub struct RideRequestDetailsEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub requester_id: Uuid,
    pub passenger_type: String,
    pub passenger_id: Uuid,
    pub direction: String,
    pub poi_id: Uuid,
    pub ride_date: NaiveDate,
    pub status: String,
    pub accepter_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub group_name: String,
    pub requester_name: String,
    pub requester_phone: String,
    pub requester_home_address: String,
    pub accepter_name: Option<String>,
    pub accepter_phone: Option<String>,
    pub accepter_home_address: Option<String>,
    pub passenger_name: String,
    pub passenger_phone: Option<String>,
    pub poi_name: String,
    pub poi_address: String,
}

impl RideRequestDetailsEntity {
    pub fn into_domain(self) -> Result<RideRequestDetails, String> {
        let accepter = match (self.accepter_id, self.accepter_name) {
            (Some(id), Some(name)) => Some(Contact {
                id,
                name,
                phone: self.accepter_phone.unwrap_or_default(),
                home_address: self.accepter_home_address.unwrap_or_default(),
            }),
            _ => None,
        };
        let requester = Contact {
            id: self.requester_id,
            name: self.requester_name,
            phone: self.requester_phone,
            home_address: self.requester_home_address,
        };
        let ride = RideRequestEntity {
            id: self.id,
            group_id: self.group_id,
            requester_id: self.requester_id,
            passenger_type: self.passenger_type,
            passenger_id: self.passenger_id,
            direction: self.direction,
            poi_id: self.poi_id,
            ride_date: self.ride_date,
            status: self.status,
            accepter_id: self.accepter_id,
            created_at: self.created_at,
            accepted_at: self.accepted_at,
            completed_at: self.completed_at,
            updated_at: self.updated_at,
        }
        .into_domain()?;

        Ok(RideRequestDetails {
            ride,
            group_name: self.group_name,
            requester,
            accepter,
            passenger_name: self.passenger_name,
            passenger_phone: self.passenger_phone,
            poi_name: self.poi_name,
            poi_address: self.poi_address,
        })
    }
}
