//! Ride request lifecycle.
//!
//! `RideRequestService` validates and authorizes every operation before it
//! touches the store, then applies state changes through
//! [`RideStore::transition_ride`], a conditional write that only succeeds if
//! the ride still has the status the service observed. A failed operation
//! therefore never leaves a ride half-updated, and two members racing to
//! accept the same ride produce exactly one accepter.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::child::Child;
use crate::models::group::Group;
use crate::models::poi::Poi;
use crate::models::ride_request::{
    CreateRideRequest, NewRideRequest, PassengerType, RideDedupKey, RideRequest,
    RideRequestDetails, RideRequestFilter, RideRequestView, RideStatus, RideTransition,
};
use crate::services::feed::{build_feed, Feed, FeedView};

/// Rides whose date is this far behind "now" drop out of current feeds.
pub const DEFAULT_STALE_AFTER_HOURS: i64 = 24;

// ============================================================================
// Store Contract
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Persistence operations the ride lifecycle depends on.
#[async_trait]
pub trait RideStore: Send + Sync {
    async fn find_ride(&self, id: Uuid) -> Result<Option<RideRequest>, StoreError>;

    async fn find_ride_details(&self, id: Uuid)
        -> Result<Option<RideRequestDetails>, StoreError>;

    /// Non-cancelled ride with the same deduplication key, if any.
    async fn find_active_duplicate(
        &self,
        key: &RideDedupKey,
    ) -> Result<Option<RideRequest>, StoreError>;

    /// Inserts an open ride. Returns `UniqueViolation` if an active
    /// duplicate slipped in concurrently.
    async fn insert_ride(&self, ride: &NewRideRequest) -> Result<RideRequest, StoreError>;

    /// Applies `transition` only if the ride's status still equals
    /// `transition.from_status()` and the transition's actor guard holds.
    /// Returns `None` when nothing was written.
    async fn transition_ride(
        &self,
        id: Uuid,
        transition: &RideTransition,
    ) -> Result<Option<RideRequest>, StoreError>;

    async fn list_ride_details(
        &self,
        filter: &RideRequestFilter,
    ) -> Result<Vec<RideRequestDetails>, StoreError>;

    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, StoreError>;

    async fn find_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError>;

    async fn find_child(&self, id: Uuid) -> Result<Option<Child>, StoreError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Coarse error classes, mapped to HTTP statuses by the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideErrorKind {
    Validation,
    Duplicate,
    Authorization,
    State,
    NotFound,
    Store,
}

#[derive(Debug, Error)]
pub enum RideError {
    #[error("Ride date must be today or tomorrow")]
    InvalidRideDate,

    #[error("Please select a destination")]
    MissingDestination,

    #[error("Please select a child")]
    MissingPassenger,

    #[error("Selected destination is not available")]
    PoiUnavailable,

    #[error("Group is archived")]
    GroupArchived,

    #[error("Selected child does not belong to you")]
    ChildNotOwned,

    #[error("An identical ride request already exists")]
    DuplicateRequest,

    #[error("You can't accept your own ride request")]
    SelfAccept,

    #[error("Only the member who accepted this ride can do that")]
    NotAccepter,

    #[error("Only the requester can do that")]
    NotRequester,

    #[error("Only the requester or the accepting member can do that")]
    NotParticipant,

    #[error("You are not a member of this group")]
    NotGroupMember,

    #[error("Cannot {action} a ride request that is {from}")]
    InvalidTransition {
        from: RideStatus,
        action: &'static str,
    },

    #[error("Ride request was changed by someone else, please reload")]
    Conflict,

    #[error("Ride request not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RideError {
    pub fn kind(&self) -> RideErrorKind {
        match self {
            RideError::InvalidRideDate
            | RideError::MissingDestination
            | RideError::MissingPassenger
            | RideError::PoiUnavailable
            | RideError::GroupArchived
            | RideError::ChildNotOwned => RideErrorKind::Validation,
            RideError::DuplicateRequest => RideErrorKind::Duplicate,
            RideError::SelfAccept
            | RideError::NotAccepter
            | RideError::NotRequester
            | RideError::NotParticipant
            | RideError::NotGroupMember => RideErrorKind::Authorization,
            RideError::InvalidTransition { .. } | RideError::Conflict => RideErrorKind::State,
            RideError::NotFound => RideErrorKind::NotFound,
            RideError::Store(_) => RideErrorKind::Store,
        }
    }
}

/// Checks that `ride_date` is today or tomorrow in UTC relative to `now`.
pub fn check_ride_date(ride_date: NaiveDate, now: DateTime<Utc>) -> Result<(), RideError> {
    let today = now.date_naive();
    if ride_date == today || today.succ_opt() == Some(ride_date) {
        Ok(())
    } else {
        Err(RideError::InvalidRideDate)
    }
}

// ============================================================================
// Service
// ============================================================================

pub struct RideRequestService<S> {
    store: S,
    stale_after: Duration,
}

impl<S: RideStore> RideRequestService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            stale_after: Duration::hours(DEFAULT_STALE_AFTER_HOURS),
        }
    }

    /// Overrides how far in the past a ride date may be before it is stale.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an open ride request in `group_id` on behalf of `actor`.
    pub async fn create(
        &self,
        actor: Uuid,
        group_id: Uuid,
        request: CreateRideRequest,
        now: DateTime<Utc>,
    ) -> Result<RideRequest, RideError> {
        check_ride_date(request.ride_date, now)?;
        let poi_id = request.poi_id.ok_or(RideError::MissingDestination)?;
        let passenger_id = match request.passenger_type {
            PassengerType::Parent => actor,
            PassengerType::Child => request.child_id.ok_or(RideError::MissingPassenger)?,
        };

        self.require_member(group_id, actor).await?;

        let group = self
            .store
            .find_group(group_id)
            .await?
            .ok_or(RideError::NotFound)?;
        if group.archived {
            return Err(RideError::GroupArchived);
        }

        match self.store.find_poi(poi_id).await? {
            Some(poi) if !poi.archived => {}
            _ => return Err(RideError::PoiUnavailable),
        }

        if request.passenger_type == PassengerType::Child {
            match self.store.find_child(passenger_id).await? {
                Some(child) if child.parent_id == actor => {}
                _ => return Err(RideError::ChildNotOwned),
            }
        }

        let new_ride = NewRideRequest {
            group_id,
            requester_id: actor,
            passenger_type: request.passenger_type,
            passenger_id,
            direction: request.direction,
            poi_id,
            ride_date: request.ride_date,
            created_at: now,
        };

        if self
            .store
            .find_active_duplicate(&new_ride.dedup_key())
            .await?
            .is_some()
        {
            return Err(RideError::DuplicateRequest);
        }

        let ride = self
            .store
            .insert_ride(&new_ride)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => RideError::DuplicateRequest,
                other => RideError::Store(other),
            })?;

        info!(
            ride_id = %ride.id,
            group_id = %group_id,
            requester_id = %actor,
            ride_date = %ride.ride_date,
            "Ride request created"
        );

        Ok(ride)
    }

    /// Takes an open ride. The requester cannot accept their own ride.
    pub async fn accept(
        &self,
        actor: Uuid,
        ride_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RideRequest, RideError> {
        let ride = self.load(ride_id).await?;
        self.require_member(ride.group_id, actor).await?;
        if ride.requester_id == actor {
            return Err(RideError::SelfAccept);
        }

        self.apply(
            ride,
            RideTransition::Accept {
                accepter_id: actor,
                at: now,
            },
        )
        .await
    }

    /// Gives an accepted ride back to the open pool. Accepter only.
    pub async fn unaccept(
        &self,
        actor: Uuid,
        ride_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RideRequest, RideError> {
        let ride = self.load(ride_id).await?;
        if ride.accepter_id != Some(actor) {
            return Err(RideError::NotAccepter);
        }

        self.apply(
            ride,
            RideTransition::Unaccept {
                accepter_id: actor,
                at: now,
            },
        )
        .await
    }

    /// Marks an accepted ride as done. Requester or accepter.
    pub async fn complete(
        &self,
        actor: Uuid,
        ride_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RideRequest, RideError> {
        let ride = self.load(ride_id).await?;
        if !ride.is_participant(actor) {
            return Err(RideError::NotParticipant);
        }

        self.apply(
            ride,
            RideTransition::Complete {
                actor_id: actor,
                at: now,
            },
        )
        .await
    }

    /// Withdraws an open ride. Requester only; an accepted ride has to be
    /// un-accepted first.
    pub async fn cancel(
        &self,
        actor: Uuid,
        ride_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RideRequest, RideError> {
        let ride = self.load(ride_id).await?;
        if ride.requester_id != actor {
            return Err(RideError::NotRequester);
        }

        self.apply(
            ride,
            RideTransition::Cancel {
                requester_id: actor,
                at: now,
            },
        )
        .await
    }

    /// A single ride as `actor` may see it. Group members only.
    pub async fn view(&self, actor: Uuid, ride_id: Uuid) -> Result<RideRequestView, RideError> {
        let details = self
            .store
            .find_ride_details(ride_id)
            .await?
            .ok_or(RideError::NotFound)?;
        self.require_member(details.ride.group_id, actor).await?;

        Ok(RideRequestView::for_viewer(details, actor))
    }

    /// The group's ride feed from `actor`'s point of view.
    pub async fn feed(
        &self,
        actor: Uuid,
        group_id: Uuid,
        view: FeedView,
        now: DateTime<Utc>,
    ) -> Result<Feed<RideRequestView>, RideError> {
        self.require_member(group_id, actor).await?;

        let rides = self
            .store
            .list_ride_details(&view.filter(group_id, actor))
            .await?;
        debug!(group_id = %group_id, view = %view, count = rides.len(), "Loaded ride feed");

        Ok(build_feed(rides, view, now, self.stale_after)
            .map(|details| RideRequestView::for_viewer(details, actor)))
    }

    async fn load(&self, ride_id: Uuid) -> Result<RideRequest, RideError> {
        self.store
            .find_ride(ride_id)
            .await?
            .ok_or(RideError::NotFound)
    }

    async fn require_member(&self, group_id: Uuid, user_id: Uuid) -> Result<(), RideError> {
        if self.store.is_group_member(group_id, user_id).await? {
            Ok(())
        } else {
            Err(RideError::NotGroupMember)
        }
    }

    async fn apply(
        &self,
        ride: RideRequest,
        transition: RideTransition,
    ) -> Result<RideRequest, RideError> {
        if ride.status != transition.from_status()
            || !ride.status.can_transition_to(transition.to_status())
        {
            return Err(RideError::InvalidTransition {
                from: ride.status,
                action: transition.action(),
            });
        }

        let updated = self
            .store
            .transition_ride(ride.id, &transition)
            .await?
            .ok_or(RideError::Conflict)?;

        info!(
            ride_id = %updated.id,
            action = transition.action(),
            from = %ride.status,
            to = %updated.status,
            "Ride request transitioned"
        );

        Ok(updated)
    }
}
