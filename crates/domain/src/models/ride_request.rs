//! Ride request domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle state of a ride request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Open,
    Accepted,
    Completed,
    Cancelled,
}

impl RideStatus {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Open => "open",
            RideStatus::Accepted => "accepted",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: RideStatus) -> bool {
        matches!(
            (self, target),
            (RideStatus::Open, RideStatus::Accepted)
                | (RideStatus::Open, RideStatus::Cancelled)
                | (RideStatus::Accepted, RideStatus::Open)
                | (RideStatus::Accepted, RideStatus::Completed)
        )
    }

    /// Completed and cancelled rides never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// Whether a ride in this state carries an accepter.
    pub fn has_accepter(&self) -> bool {
        matches!(self, RideStatus::Accepted | RideStatus::Completed)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RideStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(RideStatus::Open),
            "accepted" => Ok(RideStatus::Accepted),
            "completed" => Ok(RideStatus::Completed),
            "cancelled" => Ok(RideStatus::Cancelled),
            _ => Err(format!(
                "Invalid ride status: {}. Must be one of: open, accepted, completed, cancelled",
                s
            )),
        }
    }
}

/// Who travels: the requesting parent or one of their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerType {
    Parent,
    Child,
}

impl PassengerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerType::Parent => "parent",
            PassengerType::Child => "child",
        }
    }
}

impl fmt::Display for PassengerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PassengerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(PassengerType::Parent),
            "child" => Ok(PassengerType::Child),
            _ => Err(format!(
                "Invalid passenger type: {}. Must be one of: parent, child",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HomeToPoi,
    PoiToHome,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HomeToPoi => "home_to_poi",
            Direction::PoiToHome => "poi_to_home",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home_to_poi" => Ok(Direction::HomeToPoi),
            "poi_to_home" => Ok(Direction::PoiToHome),
            _ => Err(format!(
                "Invalid direction: {}. Must be one of: home_to_poi, poi_to_home",
                s
            )),
        }
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// A request for a ride to or from a point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: Uuid,
    pub group_id: Uuid,
    pub requester_id: Uuid,
    pub passenger_type: PassengerType,
    /// User id for a parent passenger, child id otherwise.
    pub passenger_id: Uuid,
    pub direction: Direction,
    pub poi_id: Uuid,
    pub ride_date: NaiveDate,
    pub status: RideStatus,
    pub accepter_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl RideRequest {
    /// Whether `viewer` may see contact details of the people on this ride.
    ///
    /// Only the requester and the accepter, and only once the ride has left
    /// the open state.
    pub fn can_see_contact_info(&self, viewer: Uuid) -> bool {
        self.status != RideStatus::Open
            && (viewer == self.requester_id || self.accepter_id == Some(viewer))
    }

    /// Whether `user_id` is the requester or the accepter.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.requester_id == user_id || self.accepter_id == Some(user_id)
    }

    /// Key of the active-request uniqueness rule.
    pub fn dedup_key(&self) -> RideDedupKey {
        RideDedupKey {
            group_id: self.group_id,
            requester_id: self.requester_id,
            passenger_type: self.passenger_type,
            passenger_id: self.passenger_id,
            direction: self.direction,
            poi_id: self.poi_id,
            ride_date: self.ride_date,
        }
    }
}

impl AsRef<RideRequest> for RideRequest {
    fn as_ref(&self) -> &RideRequest {
        self
    }
}

/// Fields that must be unique among non-cancelled ride requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RideDedupKey {
    pub group_id: Uuid,
    pub requester_id: Uuid,
    pub passenger_type: PassengerType,
    pub passenger_id: Uuid,
    pub direction: Direction,
    pub poi_id: Uuid,
    pub ride_date: NaiveDate,
}

/// A validated ride request ready to be stored. Status starts as open.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRideRequest {
    pub group_id: Uuid,
    pub requester_id: Uuid,
    pub passenger_type: PassengerType,
    pub passenger_id: Uuid,
    pub direction: Direction,
    pub poi_id: Uuid,
    pub ride_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl NewRideRequest {
    pub fn dedup_key(&self) -> RideDedupKey {
        RideDedupKey {
            group_id: self.group_id,
            requester_id: self.requester_id,
            passenger_type: self.passenger_type,
            passenger_id: self.passenger_id,
            direction: self.direction,
            poi_id: self.poi_id,
            ride_date: self.ride_date,
        }
    }
}

/// A guarded state change applied by the store.
///
/// The store writes the change only if the row still has the status the
/// caller observed and the actor guard below still holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RideTransition {
    /// Guard: `requester_id <> accepter_id`.
    Accept {
        accepter_id: Uuid,
        at: DateTime<Utc>,
    },
    /// Guard: the ride is still accepted by `accepter_id`.
    Unaccept {
        accepter_id: Uuid,
        at: DateTime<Utc>,
    },
    /// Guard: `actor_id` is the requester or the accepter.
    Complete { actor_id: Uuid, at: DateTime<Utc> },
    /// Guard: `requester_id` owns the ride.
    Cancel {
        requester_id: Uuid,
        at: DateTime<Utc>,
    },
}

impl RideTransition {
    /// Status the ride must currently have.
    pub fn from_status(&self) -> RideStatus {
        match self {
            RideTransition::Accept { .. } => RideStatus::Open,
            RideTransition::Unaccept { .. } => RideStatus::Accepted,
            RideTransition::Complete { .. } => RideStatus::Accepted,
            RideTransition::Cancel { .. } => RideStatus::Open,
        }
    }

    /// Status the ride has afterwards.
    pub fn to_status(&self) -> RideStatus {
        match self {
            RideTransition::Accept { .. } => RideStatus::Accepted,
            RideTransition::Unaccept { .. } => RideStatus::Open,
            RideTransition::Complete { .. } => RideStatus::Completed,
            RideTransition::Cancel { .. } => RideStatus::Cancelled,
        }
    }

    /// Verb used in logs, metrics and error messages.
    pub fn action(&self) -> &'static str {
        match self {
            RideTransition::Accept { .. } => "accept",
            RideTransition::Unaccept { .. } => "unaccept",
            RideTransition::Complete { .. } => "complete",
            RideTransition::Cancel { .. } => "cancel",
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            RideTransition::Accept { at, .. }
            | RideTransition::Unaccept { at, .. }
            | RideTransition::Complete { at, .. }
            | RideTransition::Cancel { at, .. } => *at,
        }
    }

    /// Whether the actor guard holds for `ride`.
    pub fn guard_holds(&self, ride: &RideRequest) -> bool {
        match self {
            RideTransition::Accept { accepter_id, .. } => ride.requester_id != *accepter_id,
            RideTransition::Unaccept { accepter_id, .. } => ride.accepter_id == Some(*accepter_id),
            RideTransition::Complete { actor_id, .. } => ride.is_participant(*actor_id),
            RideTransition::Cancel { requester_id, .. } => ride.requester_id == *requester_id,
        }
    }

    /// Applies the change to an in-memory copy. Callers check the guards first.
    pub fn apply(&self, ride: &mut RideRequest) {
        ride.status = self.to_status();
        ride.updated_at = self.at();
        match self {
            RideTransition::Accept { accepter_id, at } => {
                ride.accepter_id = Some(*accepter_id);
                ride.accepted_at = Some(*at);
            }
            RideTransition::Unaccept { .. } => {
                ride.accepter_id = None;
                ride.accepted_at = None;
            }
            RideTransition::Complete { at, .. } => {
                ride.completed_at = Some(*at);
            }
            RideTransition::Cancel { .. } => {}
        }
    }
}

// ============================================================================
// Query Filter
// ============================================================================

/// Server-side ride request query. `None` and empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideRequestFilter {
    pub group_id: Option<Uuid>,
    pub statuses: Vec<RideStatus>,
    pub requester_id: Option<Uuid>,
    pub accepter_id: Option<Uuid>,
}

impl RideRequestFilter {
    pub fn matches(&self, ride: &RideRequest) -> bool {
        self.group_id.map_or(true, |g| ride.group_id == g)
            && (self.statuses.is_empty() || self.statuses.contains(&ride.status))
            && self.requester_id.map_or(true, |r| ride.requester_id == r)
            && self
                .accepter_id
                .map_or(true, |a| ride.accepter_id == Some(a))
    }

    /// Status values as stored, for binding to a `text[]` parameter.
    pub fn status_strings(&self) -> Option<Vec<String>> {
        if self.statuses.is_empty() {
            None
        } else {
            Some(self.statuses.iter().map(|s| s.as_str().to_string()).collect())
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for creating a ride request.
///
/// Destination and child are optional here so that a missing selection is
/// reported as a domain error in the order the form is checked.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRideRequest {
    pub passenger_type: PassengerType,
    pub child_id: Option<Uuid>,
    pub direction: Direction,
    pub poi_id: Option<Uuid>,
    pub ride_date: NaiveDate,
}

// ============================================================================
// Details and Viewer Projection
// ============================================================================

/// A person's name and contact details as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub home_address: String,
}

/// A ride request joined with the records it references.
#[derive(Debug, Clone, PartialEq)]
pub struct RideRequestDetails {
    pub ride: RideRequest,
    pub group_name: String,
    pub requester: Contact,
    pub accepter: Option<Contact>,
    pub passenger_name: String,
    /// Child phone for a child passenger, requester phone for a parent.
    pub passenger_phone: Option<String>,
    pub poi_name: String,
    pub poi_address: String,
}

impl AsRef<RideRequest> for RideRequestDetails {
    fn as_ref(&self) -> &RideRequest {
        &self.ride
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonView {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub home_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassengerView {
    pub passenger_type: PassengerType,
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

/// A ride request as one particular viewer may see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideRequestView {
    pub id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub status: RideStatus,
    pub direction: Direction,
    pub ride_date: NaiveDate,
    pub poi: PoiSummary,
    pub requester: PersonView,
    pub passenger: PassengerView,
    pub accepter: Option<PersonView>,
    pub contact_visible: bool,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RideRequestView {
    /// Projects `details` for `viewer`, withholding contact fields unless
    /// the viewer is a participant of a non-open ride.
    pub fn for_viewer(details: RideRequestDetails, viewer: Uuid) -> Self {
        let visible = details.ride.can_see_contact_info(viewer);
        let person = |c: Contact| PersonView {
            id: c.id,
            name: c.name,
            phone: visible.then_some(c.phone),
            home_address: visible.then_some(c.home_address),
        };
        let ride = details.ride;

        Self {
            id: ride.id,
            group_id: ride.group_id,
            group_name: details.group_name,
            status: ride.status,
            direction: ride.direction,
            ride_date: ride.ride_date,
            poi: PoiSummary {
                id: ride.poi_id,
                name: details.poi_name,
                address: details.poi_address,
            },
            requester: person(details.requester),
            passenger: PassengerView {
                passenger_type: ride.passenger_type,
                id: ride.passenger_id,
                name: details.passenger_name,
                phone: if visible { details.passenger_phone } else { None },
            },
            accepter: details.accepter.map(person),
            contact_visible: visible,
            created_at: ride.created_at,
            accepted_at: ride.accepted_at,
            completed_at: ride.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ride(status: RideStatus, requester: Uuid, accepter: Option<Uuid>) -> RideRequest {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 7, 30, 0).unwrap();
        RideRequest {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            requester_id: requester,
            passenger_type: PassengerType::Parent,
            passenger_id: requester,
            direction: Direction::HomeToPoi,
            poi_id: Uuid::new_v4(),
            ride_date: at.date_naive(),
            status,
            accepter_id: accepter,
            created_at: at,
            accepted_at: accepter.map(|_| at),
            completed_at: None,
            updated_at: at,
        }
    }

    fn contact(id: Uuid, name: &str) -> Contact {
        Contact {
            id,
            name: name.to_string(),
            phone: format!("+421 900 {}", &id.simple().to_string()[..6]),
            home_address: format!("{} Street 1", name),
        }
    }

    fn details(ride: RideRequest) -> RideRequestDetails {
        let requester = contact(ride.requester_id, "Rita");
        let accepter = ride.accepter_id.map(|id| contact(id, "Milan"));
        RideRequestDetails {
            passenger_phone: Some(requester.phone.clone()),
            ride,
            group_name: "Oak Street".to_string(),
            requester,
            accepter,
            passenger_name: "Rita".to_string(),
            poi_name: "Elementary School".to_string(),
            poi_address: "1 School Rd".to_string(),
        }
    }

    #[test]
    fn test_status_transition_table() {
        use RideStatus::*;
        let allowed = [
            (Open, Accepted),
            (Open, Cancelled),
            (Accepted, Open),
            (Accepted, Completed),
        ];
        for from in [Open, Accepted, Completed, Cancelled] {
            for to in [Open, Accepted, Completed, Cancelled] {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(RideStatus::Completed.is_terminal());
        assert!(RideStatus::Cancelled.is_terminal());
        assert!(!RideStatus::Open.is_terminal());
        assert!(!RideStatus::Accepted.is_terminal());
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!("accepted".parse::<RideStatus>().unwrap(), RideStatus::Accepted);
        assert!("ACCEPTED".parse::<RideStatus>().is_err());
        assert_eq!(Direction::PoiToHome.to_string(), "poi_to_home");
        assert_eq!("home_to_poi".parse::<Direction>().unwrap(), Direction::HomeToPoi);
        assert_eq!("child".parse::<PassengerType>().unwrap(), PassengerType::Child);
        assert_eq!(
            serde_json::to_string(&Direction::HomeToPoi).unwrap(),
            "\"home_to_poi\""
        );
    }

    #[test]
    fn test_open_ride_hides_contacts_from_everyone() {
        let requester = Uuid::new_v4();
        let r = ride(RideStatus::Open, requester, None);
        assert!(!r.can_see_contact_info(requester));
        assert!(!r.can_see_contact_info(Uuid::new_v4()));
    }

    #[test]
    fn test_accepted_ride_shows_contacts_to_participants_only() {
        let requester = Uuid::new_v4();
        let accepter = Uuid::new_v4();
        let r = ride(RideStatus::Accepted, requester, Some(accepter));
        assert!(r.can_see_contact_info(requester));
        assert!(r.can_see_contact_info(accepter));
        assert!(!r.can_see_contact_info(Uuid::new_v4()));
    }

    #[test]
    fn test_view_redacts_for_third_member() {
        let requester = Uuid::new_v4();
        let accepter = Uuid::new_v4();
        let d = details(ride(RideStatus::Accepted, requester, Some(accepter)));

        let view = RideRequestView::for_viewer(d.clone(), Uuid::new_v4());
        assert!(!view.contact_visible);
        assert_eq!(view.requester.phone, None);
        assert_eq!(view.requester.home_address, None);
        assert_eq!(view.passenger.phone, None);
        let accepter_view = view.accepter.unwrap();
        assert_eq!(accepter_view.name, "Milan");
        assert_eq!(accepter_view.phone, None);
        // Destination stays public.
        assert_eq!(view.poi.address, "1 School Rd");

        let view = RideRequestView::for_viewer(d, accepter);
        assert!(view.contact_visible);
        assert!(view.requester.phone.is_some());
        assert_eq!(view.requester.home_address.as_deref(), Some("Rita Street 1"));
        assert!(view.passenger.phone.is_some());
    }

    #[test]
    fn test_transition_apply_and_guards() {
        let requester = Uuid::new_v4();
        let accepter = Uuid::new_v4();
        let mut r = ride(RideStatus::Open, requester, None);
        let at = r.created_at + chrono::Duration::minutes(5);

        assert!(!RideTransition::Accept { accepter_id: requester, at }.guard_holds(&r));
        let accept = RideTransition::Accept { accepter_id: accepter, at };
        assert!(accept.guard_holds(&r));
        accept.apply(&mut r);
        assert_eq!(r.status, RideStatus::Accepted);
        assert_eq!(r.accepter_id, Some(accepter));
        assert_eq!(r.accepted_at, Some(at));

        let unaccept = RideTransition::Unaccept { accepter_id: accepter, at };
        assert!(!RideTransition::Unaccept { accepter_id: requester, at }.guard_holds(&r));
        assert!(unaccept.guard_holds(&r));
        unaccept.apply(&mut r);
        assert_eq!(r.status, RideStatus::Open);
        assert_eq!(r.accepter_id, None);
        assert_eq!(r.accepted_at, None);
    }

    #[test]
    fn test_filter_matches() {
        let requester = Uuid::new_v4();
        let accepter = Uuid::new_v4();
        let r = ride(RideStatus::Accepted, requester, Some(accepter));

        assert!(RideRequestFilter::default().matches(&r));
        assert!(RideRequestFilter {
            group_id: Some(r.group_id),
            statuses: vec![RideStatus::Accepted, RideStatus::Completed],
            accepter_id: Some(accepter),
            ..Default::default()
        }
        .matches(&r));
        assert!(!RideRequestFilter {
            statuses: vec![RideStatus::Open],
            ..Default::default()
        }
        .matches(&r));
        assert!(!RideRequestFilter {
            requester_id: Some(accepter),
            ..Default::default()
        }
        .matches(&r));
    }

    #[test]
    fn test_filter_status_strings() {
        assert_eq!(RideRequestFilter::default().status_strings(), None);
        let f = RideRequestFilter {
            statuses: vec![RideStatus::Accepted, RideStatus::Completed],
            ..Default::default()
        };
        assert_eq!(
            f.status_strings(),
            Some(vec!["accepted".to_string(), "completed".to_string()])
        );
    }
}
