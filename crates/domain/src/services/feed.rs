//! Ride feed views: which rides a member sees and in what order.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::ride_request::{RideRequest, RideRequestFilter, RideStatus};

/// Named feed filters offered to members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedView {
    /// Rides still waiting for someone to accept them.
    #[default]
    Open,
    /// The viewer's own requests, split into current and past.
    Mine,
    /// Rides the viewer has accepted.
    Accepted,
    /// Everything in the group.
    All,
}

impl FeedView {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedView::Open => "open",
            FeedView::Mine => "mine",
            FeedView::Accepted => "accepted",
            FeedView::All => "all",
        }
    }

    /// Server-side query for this view in `group_id` as seen by `viewer`.
    pub fn filter(&self, group_id: Uuid, viewer: Uuid) -> RideRequestFilter {
        let group_id = Some(group_id);
        match self {
            FeedView::Open => RideRequestFilter {
                group_id,
                statuses: vec![RideStatus::Open],
                ..Default::default()
            },
            FeedView::Mine => RideRequestFilter {
                group_id,
                requester_id: Some(viewer),
                ..Default::default()
            },
            FeedView::Accepted => RideRequestFilter {
                group_id,
                statuses: vec![RideStatus::Accepted, RideStatus::Completed],
                accepter_id: Some(viewer),
                ..Default::default()
            },
            FeedView::All => RideRequestFilter {
                group_id,
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for FeedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(FeedView::Open),
            "mine" => Ok(FeedView::Mine),
            "accepted" => Ok(FeedView::Accepted),
            "all" => Ok(FeedView::All),
            _ => Err(format!(
                "Invalid feed view: {}. Must be one of: open, mine, accepted, all",
                s
            )),
        }
    }
}

/// Query string of the feed endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub view: FeedView,
}

/// Rides of one feed view. `past` is only filled for [`FeedView::Mine`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed<T> {
    pub view: FeedView,
    pub current: Vec<T>,
    pub past: Vec<T>,
}

impl<T> Feed<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Feed<U> {
        Feed {
            view: self.view,
            current: self.current.into_iter().map(&mut f).collect(),
            past: self.past.into_iter().map(&mut f).collect(),
        }
    }
}

/// Earliest ride date that still counts as current. Saturates at
/// [`NaiveDate::MIN`] when the window reaches past the representable range.
pub fn stale_cutoff(now: DateTime<Utc>, stale_after: Duration) -> NaiveDate {
    now.checked_sub_signed(stale_after)
        .map(|cutoff| cutoff.date_naive())
        .unwrap_or(NaiveDate::MIN)
}

pub fn is_stale(ride_date: NaiveDate, now: DateTime<Utc>, stale_after: Duration) -> bool {
    ride_date < stale_cutoff(now, stale_after)
}

/// Upcoming first; newest request first within a day.
fn current_order(a: &RideRequest, b: &RideRequest) -> Ordering {
    a.ride_date
        .cmp(&b.ride_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Most recent day first.
fn past_order(a: &RideRequest, b: &RideRequest) -> Ordering {
    b.ride_date
        .cmp(&a.ride_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Splits already-filtered rides by recency and sorts them for display.
///
/// Stale rides are dropped from every view except `mine`, where they form
/// the `past` list.
pub fn build_feed<T: AsRef<RideRequest>>(
    rides: Vec<T>,
    view: FeedView,
    now: DateTime<Utc>,
    stale_after: Duration,
) -> Feed<T> {
    let cutoff = stale_cutoff(now, stale_after);
    let (mut current, mut past): (Vec<T>, Vec<T>) = rides
        .into_iter()
        .partition(|r| r.as_ref().ride_date >= cutoff);

    if view != FeedView::Mine {
        past.clear();
    }

    current.sort_by(|a, b| current_order(a.as_ref(), b.as_ref()));
    past.sort_by(|a, b| past_order(a.as_ref(), b.as_ref()));

    Feed {
        view,
        current,
        past,
    }
}
