//! In-memory [`RideStore`] used by the ride service unit tests.
//!
//! Every write runs under one lock, which gives the same all-or-nothing
//! behavior as the guarded SQL updates in the persistence crate.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::child::Child;
use crate::models::group::Group;
use crate::models::poi::Poi;
use crate::models::ride_request::{
    Contact, NewRideRequest, PassengerType, RideDedupKey, RideRequest, RideRequestDetails,
    RideRequestFilter, RideStatus, RideTransition,
};
use crate::models::user::User;
use crate::services::ride_request::{RideStore, StoreError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    children: HashMap<Uuid, Child>,
    pois: HashMap<Uuid, Poi>,
    groups: HashMap<Uuid, Group>,
    members: HashSet<(Uuid, Uuid)>,
    rides: HashMap<Uuid, RideRequest>,
}

impl Tables {
    fn contact(&self, id: Uuid) -> Result<Contact, StoreError> {
        let user = self
            .users
            .get(&id)
            .ok_or_else(|| StoreError::Backend(format!("user {} missing", id)))?;
        Ok(Contact {
            id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            home_address: user.home_address.clone(),
        })
    }

    fn details(&self, ride: &RideRequest) -> Result<RideRequestDetails, StoreError> {
        let requester = self.contact(ride.requester_id)?;
        let accepter = ride.accepter_id.map(|id| self.contact(id)).transpose()?;
        let (passenger_name, passenger_phone) = match ride.passenger_type {
            PassengerType::Parent => (requester.name.clone(), Some(requester.phone.clone())),
            PassengerType::Child => {
                let child = self.children.get(&ride.passenger_id).ok_or_else(|| {
                    StoreError::Backend(format!("child {} missing", ride.passenger_id))
                })?;
                (child.name.clone(), child.phone.clone())
            }
        };
        let poi = self
            .pois
            .get(&ride.poi_id)
            .ok_or_else(|| StoreError::Backend(format!("poi {} missing", ride.poi_id)))?;
        let group_name = self
            .groups
            .get(&ride.group_id)
            .map(|g| g.name.clone())
            .unwrap_or_default();

        Ok(RideRequestDetails {
            ride: ride.clone(),
            group_name,
            requester,
            accepter,
            passenger_name,
            passenger_phone,
            poi_name: poi.name.clone(),
            poi_address: poi.address.clone(),
        })
    }

    fn active_duplicate(&self, key: &RideDedupKey) -> Option<&RideRequest> {
        self.rides
            .values()
            .find(|r| r.status != RideStatus::Cancelled && r.dedup_key() == *key)
    }
}

#[derive(Default)]
pub struct InMemoryRideStore {
    tables: RwLock<Tables>,
}

impl InMemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    pub async fn add_group(&self, name: &str) -> Uuid {
        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            archived: false,
            created_at: now,
            updated_at: now,
        };
        let id = group.id;
        self.tables.write().await.groups.insert(id, group);
        id
    }

    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid) {
        self.tables.write().await.members.insert((group_id, user_id));
    }

    pub async fn add_poi(&self, name: &str, address: &str) -> Uuid {
        let now = Utc::now();
        let poi = Poi {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: address.to_string(),
            archived: false,
            created_at: now,
            updated_at: now,
        };
        let id = poi.id;
        self.tables.write().await.pois.insert(id, poi);
        id
    }

    pub async fn archive_poi(&self, id: Uuid) {
        if let Some(poi) = self.tables.write().await.pois.get_mut(&id) {
            poi.archived = true;
        }
    }

    pub async fn add_child(&self, parent_id: Uuid, name: &str, phone: Option<&str>) -> Uuid {
        let child = Child {
            id: Uuid::new_v4(),
            parent_id,
            name: name.to_string(),
            phone: phone.map(str::to_string),
            created_at: Utc::now(),
        };
        let id = child.id;
        self.tables.write().await.children.insert(id, child);
        id
    }

    pub async fn ride_count(&self) -> usize {
        self.tables.read().await.rides.len()
    }
}

#[async_trait]
impl RideStore for InMemoryRideStore {
    async fn find_ride(&self, id: Uuid) -> Result<Option<RideRequest>, StoreError> {
        Ok(self.tables.read().await.rides.get(&id).cloned())
    }

    async fn find_ride_details(
        &self,
        id: Uuid,
    ) -> Result<Option<RideRequestDetails>, StoreError> {
        let tables = self.tables.read().await;
        tables.rides.get(&id).map(|r| tables.details(r)).transpose()
    }

    async fn find_active_duplicate(
        &self,
        key: &RideDedupKey,
    ) -> Result<Option<RideRequest>, StoreError> {
        Ok(self.tables.read().await.active_duplicate(key).cloned())
    }

    async fn insert_ride(&self, new: &NewRideRequest) -> Result<RideRequest, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.active_duplicate(&new.dedup_key()).is_some() {
            return Err(StoreError::UniqueViolation(
                "idx_ride_requests_active_unique".to_string(),
            ));
        }

        let ride = RideRequest {
            id: Uuid::new_v4(),
            group_id: new.group_id,
            requester_id: new.requester_id,
            passenger_type: new.passenger_type,
            passenger_id: new.passenger_id,
            direction: new.direction,
            poi_id: new.poi_id,
            ride_date: new.ride_date,
            status: RideStatus::Open,
            accepter_id: None,
            created_at: new.created_at,
            accepted_at: None,
            completed_at: None,
            updated_at: new.created_at,
        };
        tables.rides.insert(ride.id, ride.clone());
        Ok(ride)
    }

    async fn transition_ride(
        &self,
        id: Uuid,
        transition: &RideTransition,
    ) -> Result<Option<RideRequest>, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.rides.get_mut(&id) {
            Some(ride)
                if ride.status == transition.from_status() && transition.guard_holds(ride) =>
            {
                transition.apply(ride);
                Ok(Some(ride.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_ride_details(
        &self,
        filter: &RideRequestFilter,
    ) -> Result<Vec<RideRequestDetails>, StoreError> {
        let tables = self.tables.read().await;
        tables
            .rides
            .values()
            .filter(|r| filter.matches(r))
            .map(|r| tables.details(r))
            .collect()
    }

    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .members
            .contains(&(group_id, user_id)))
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, StoreError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn find_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError> {
        Ok(self.tables.read().await.pois.get(&id).cloned())
    }

    async fn find_child(&self, id: Uuid) -> Result<Option<Child>, StoreError> {
        Ok(self.tables.read().await.children.get(&id).cloned())
    }
}
