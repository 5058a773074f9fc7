//! Ride request repository.
//!
//! Implements [`RideStore`]. Every state change is a single
//! `UPDATE ... WHERE id = $1 AND status = <expected> AND <actor guard>`
//! statement, so concurrent writers cannot interleave and a lost race
//! returns no row instead of overwriting the winner.

use async_trait::async_trait;
use domain::models::child::Child;
use domain::models::group::Group;
use domain::models::poi::Poi;
use domain::models::ride_request::{
    NewRideRequest, RideDedupKey, RideRequest, RideRequestDetails, RideRequestFilter,
    RideTransition,
};
use domain::services::ride_request::{RideStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{RideRequestDetailsEntity, RideRequestEntity, RIDE_REQUEST_COLUMNS};
use crate::metrics::QueryTimer;
use crate::repositories::{ChildRepository, GroupRepository, PoiRepository};

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.group_id, r.requester_id, r.passenger_type, r.passenger_id, r.direction,
           r.poi_id, r.ride_date, r.status, r.accepter_id, r.created_at, r.accepted_at,
           r.completed_at, r.updated_at,
           g.name AS group_name,
           req.name AS requester_name,
           req.phone AS requester_phone,
           req.home_address AS requester_home_address,
           acc.name AS accepter_name,
           acc.phone AS accepter_phone,
           acc.home_address AS accepter_home_address,
           CASE WHEN r.passenger_type = 'child' THEN COALESCE(c.name, 'Removed child')
                ELSE req.name END AS passenger_name,
           CASE WHEN r.passenger_type = 'child' THEN c.phone
                ELSE req.phone END AS passenger_phone,
           p.name AS poi_name,
           p.address AS poi_address
    FROM ride_requests r
    JOIN groups g ON g.id = r.group_id
    JOIN users req ON req.id = r.requester_id
    LEFT JOIN users acc ON acc.id = r.accepter_id
    LEFT JOIN children c ON r.passenger_type = 'child' AND c.id = r.passenger_id
    JOIN pois p ON p.id = r.poi_id
"#;

/// Maps driver errors onto the store contract.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::UniqueViolation(db_err.constraint().unwrap_or_default().to_string());
        }
    }
    StoreError::Backend(err.to_string())
}

fn to_domain(entity: RideRequestEntity) -> Result<RideRequest, StoreError> {
    entity.into_domain().map_err(StoreError::Backend)
}

#[derive(Clone)]
pub struct RideRequestRepository {
    pool: PgPool,
}

impl RideRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RideRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ride_request_by_id");
        let result = sqlx::query_as::<_, RideRequestEntity>(&format!(
            "SELECT {} FROM ride_requests WHERE id = $1",
            RIDE_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_details(
        &self,
        id: Uuid,
    ) -> Result<Option<RideRequestDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ride_request_details");
        let result = sqlx::query_as::<_, RideRequestDetailsEntity>(&format!(
            "{} WHERE r.id = $1",
            DETAILS_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists ride requests matching `filter`; unset filter fields match all.
    pub async fn list_details(
        &self,
        filter: &RideRequestFilter,
    ) -> Result<Vec<RideRequestDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_ride_request_details");
        let result = sqlx::query_as::<_, RideRequestDetailsEntity>(&format!(
            r#"
            {}
            WHERE ($1::uuid IS NULL OR r.group_id = $1)
              AND ($2::text[] IS NULL OR r.status = ANY($2))
              AND ($3::uuid IS NULL OR r.requester_id = $3)
              AND ($4::uuid IS NULL OR r.accepter_id = $4)
            ORDER BY r.ride_date ASC, r.created_at DESC
            "#,
            DETAILS_SELECT
        ))
        .bind(filter.group_id)
        .bind(filter.status_strings())
        .bind(filter.requester_id)
        .bind(filter.accepter_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_active_by_key(
        &self,
        key: &RideDedupKey,
    ) -> Result<Option<RideRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_duplicate_ride_request");
        let result = sqlx::query_as::<_, RideRequestEntity>(&format!(
            r#"
            SELECT {}
            FROM ride_requests
            WHERE group_id = $1 AND requester_id = $2 AND passenger_type = $3
              AND passenger_id = $4 AND direction = $5 AND poi_id = $6 AND ride_date = $7
              AND status <> 'cancelled'
            LIMIT 1
            "#,
            RIDE_REQUEST_COLUMNS
        ))
        .bind(key.group_id)
        .bind(key.requester_id)
        .bind(key.passenger_type.as_str())
        .bind(key.passenger_id)
        .bind(key.direction.as_str())
        .bind(key.poi_id)
        .bind(key.ride_date)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn insert(&self, ride: &NewRideRequest) -> Result<RideRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_ride_request");
        let result = sqlx::query_as::<_, RideRequestEntity>(&format!(
            r#"
            INSERT INTO ride_requests
                (group_id, requester_id, passenger_type, passenger_id, direction, poi_id,
                 ride_date, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'open', $8, $8)
            RETURNING {}
            "#,
            RIDE_REQUEST_COLUMNS
        ))
        .bind(ride.group_id)
        .bind(ride.requester_id)
        .bind(ride.passenger_type.as_str())
        .bind(ride.passenger_id)
        .bind(ride.direction.as_str())
        .bind(ride.poi_id)
        .bind(ride.ride_date)
        .bind(ride.created_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Runs the guarded update for `transition`. `None` means the guard failed.
    pub async fn transition(
        &self,
        id: Uuid,
        transition: &RideTransition,
    ) -> Result<Option<RideRequestEntity>, sqlx::Error> {
        let (set_clause, guard) = match transition {
            RideTransition::Accept { .. } => (
                "status = 'accepted', accepter_id = $2, accepted_at = $3, updated_at = $3",
                "requester_id <> $2",
            ),
            RideTransition::Unaccept { .. } => (
                "status = 'open', accepter_id = NULL, accepted_at = NULL, updated_at = $3",
                "accepter_id = $2",
            ),
            RideTransition::Complete { .. } => (
                "status = 'completed', completed_at = $3, updated_at = $3",
                "(requester_id = $2 OR accepter_id = $2)",
            ),
            RideTransition::Cancel { .. } => (
                "status = 'cancelled', updated_at = $3",
                "requester_id = $2",
            ),
        };
        let actor = match transition {
            RideTransition::Accept { accepter_id, .. }
            | RideTransition::Unaccept { accepter_id, .. } => *accepter_id,
            RideTransition::Complete { actor_id, .. } => *actor_id,
            RideTransition::Cancel { requester_id, .. } => *requester_id,
        };

        let timer = QueryTimer::new(format!("{}_ride_request", transition.action()));
        let result = sqlx::query_as::<_, RideRequestEntity>(&format!(
            r#"
            UPDATE ride_requests
            SET {}
            WHERE id = $1 AND status = $4 AND {}
            RETURNING {}
            "#,
            set_clause, guard, RIDE_REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(actor)
        .bind(transition.at())
        .bind(transition.from_status().as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[async_trait]
impl RideStore for RideRequestRepository {
    async fn find_ride(&self, id: Uuid) -> Result<Option<RideRequest>, StoreError> {
        self.find_by_id(id)
            .await
            .map_err(store_error)?
            .map(to_domain)
            .transpose()
    }

    async fn find_ride_details(
        &self,
        id: Uuid,
    ) -> Result<Option<RideRequestDetails>, StoreError> {
        self.find_details(id)
            .await
            .map_err(store_error)?
            .map(|e| e.into_domain().map_err(StoreError::Backend))
            .transpose()
    }

    async fn find_active_duplicate(
        &self,
        key: &RideDedupKey,
    ) -> Result<Option<RideRequest>, StoreError> {
        self.find_active_by_key(key)
            .await
            .map_err(store_error)?
            .map(to_domain)
            .transpose()
    }

    async fn insert_ride(&self, ride: &NewRideRequest) -> Result<RideRequest, StoreError> {
        to_domain(self.insert(ride).await.map_err(store_error)?)
    }

    async fn transition_ride(
        &self,
        id: Uuid,
        transition: &RideTransition,
    ) -> Result<Option<RideRequest>, StoreError> {
        self.transition(id, transition)
            .await
            .map_err(store_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list_ride_details(
        &self,
        filter: &RideRequestFilter,
    ) -> Result<Vec<RideRequestDetails>, StoreError> {
        self.list_details(filter)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|e| e.into_domain().map_err(StoreError::Backend))
            .collect()
    }

    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        GroupRepository::new(self.pool.clone())
            .is_member(group_id, user_id)
            .await
            .map_err(store_error)
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, StoreError> {
        Ok(GroupRepository::new(self.pool.clone())
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .map(Into::into))
    }

    async fn find_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError> {
        Ok(PoiRepository::new(self.pool.clone())
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .map(Into::into))
    }

    async fn find_child(&self, id: Uuid) -> Result<Option<Child>, StoreError> {
        Ok(ChildRepository::new(self.pool.clone())
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .map(Into::into))
    }
}
