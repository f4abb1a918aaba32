//! Trip domain model.
//!
//! # Responsibility
//! - Define the Trip → Destination → Activity/Accommodation/Transportation tree.
//! - Keep the persisted wire shape (camelCase field names) stable.
//! - Provide validation and read-only derived views over the tree.
//!
//! # Invariants
//! - Ids are non-empty and unique within their containing collection.
//! - Accommodation and Transportation are zero-or-one per Destination.
//! - Amounts are finite, since the JSON snapshot cannot carry NaN or infinity.
//!
//! Dates, times and amount signs are free-form as far as the store is
//! concerned. `check_fields` offers stricter form checks for input layers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"));

/// Opaque trip identifier.
pub type TripId = String;
/// Opaque destination identifier, unique within its trip.
pub type DestinationId = String;
/// Opaque activity identifier, unique within its destination.
pub type ActivityId = String;

/// Entity kind, used to label validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Trip,
    Destination,
    Activity,
    Accommodation,
    Transportation,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Trip => "trip",
            Self::Destination => "destination",
            Self::Activity => "activity",
            Self::Accommodation => "accommodation",
            Self::Transportation => "transportation",
        };
        f.write_str(label)
    }
}

/// Validation errors for trip tree invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum TripValidationError {
    /// Entity id is blank.
    EmptyId(EntityKind),
    /// Two siblings in the same collection share an id.
    DuplicateId { entity: EntityKind, id: String },
    /// Amount is NaN or infinite and cannot be persisted.
    NonFiniteAmount {
        entity: EntityKind,
        field: &'static str,
        value: f64,
    },
    /// Amount is negative.
    InvalidAmount {
        entity: EntityKind,
        field: &'static str,
        value: f64,
    },
    /// Date field is neither empty nor `YYYY-MM-DD`.
    InvalidDate {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },
    /// Time field is neither empty nor `HH:MM`.
    InvalidTime {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },
}

impl Display for TripValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId(entity) => write!(f, "{entity} id must not be empty"),
            Self::DuplicateId { entity, id } => write!(f, "duplicate {entity} id `{id}`"),
            Self::NonFiniteAmount {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} must be a finite amount, got {value}"),
            Self::InvalidAmount {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} must not be negative, got {value}"),
            Self::InvalidDate {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} must be YYYY-MM-DD, got `{value}`"),
            Self::InvalidTime {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} must be HH:MM, got `{value}`"),
        }
    }
}

impl Error for TripValidationError {}

/// Travel mode of a transportation booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Flight,
    Train,
    Bus,
    Car,
    Other,
}

/// Top-level itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    /// Insertion order is display order.
    pub destinations: Vec<Destination>,
    pub budget: f64,
    pub notes: String,
    /// URI of the cover image.
    pub cover_image: String,
}

/// A place and date range within a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    /// Insertion order is display order.
    pub activities: Vec<Activity>,
    pub accommodation: Option<Accommodation>,
    pub transportation: Option<Transportation>,
    pub notes: String,
}

/// A single scheduled event within a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub cost: f64,
    pub notes: String,
    pub booked: bool,
}

/// Lodging booking for a destination.
///
/// An empty `id` means "not assigned yet"; the store fills it in when the
/// accommodation is attached to a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub address: String,
    pub check_in: String,
    pub check_out: String,
    pub cost: f64,
    pub booking_reference: String,
    pub notes: String,
}

/// Travel-leg booking for a destination.
///
/// Same empty-id convention as [`Accommodation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transportation {
    #[serde(default)]
    pub id: String,
    /// Serialized as `type` to match the stored snapshot schema.
    #[serde(rename = "type")]
    pub kind: TransportKind,
    pub departure_location: String,
    pub arrival_location: String,
    pub departure_date: String,
    pub departure_time: String,
    pub arrival_date: String,
    pub arrival_time: String,
    pub cost: f64,
    pub booking_reference: String,
    pub notes: String,
}

/// Trip payload for `add_trip`; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTrip {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub destinations: Vec<Destination>,
    pub budget: f64,
    pub notes: String,
    pub cover_image: String,
}

impl NewTrip {
    /// Attaches an id and produces the stored record.
    pub fn into_trip(self, id: TripId) -> Trip {
        Trip {
            id,
            title: self.title,
            start_date: self.start_date,
            end_date: self.end_date,
            destinations: self.destinations,
            budget: self.budget,
            notes: self.notes,
            cover_image: self.cover_image,
        }
    }
}

/// Destination payload for `add_destination`.
///
/// Activities are not part of the payload: a new destination always starts
/// with an empty activity list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewDestination {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub accommodation: Option<Accommodation>,
    pub transportation: Option<Transportation>,
    pub notes: String,
}

impl NewDestination {
    pub fn into_destination(self, id: DestinationId) -> Destination {
        Destination {
            id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            activities: Vec::new(),
            accommodation: self.accommodation,
            transportation: self.transportation,
            notes: self.notes,
        }
    }
}

/// Activity payload for `add_activity`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewActivity {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub cost: f64,
    pub notes: String,
    pub booked: bool,
}

impl NewActivity {
    pub fn into_activity(self, id: ActivityId) -> Activity {
        Activity {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            location: self.location,
            cost: self.cost,
            notes: self.notes,
            booked: self.booked,
        }
    }
}

impl Trip {
    /// Checks the identity invariants of this trip and its subtree: ids are
    /// non-empty and unique per collection, amounts are finite.
    pub fn validate(&self) -> Result<(), TripValidationError> {
        ensure_id(EntityKind::Trip, &self.id)?;
        ensure_finite(EntityKind::Trip, "budget", self.budget)?;
        ensure_unique_ids(
            EntityKind::Destination,
            self.destinations.iter().map(|dest| dest.id.as_str()),
        )?;
        self.destinations.iter().try_for_each(Destination::validate)
    }

    /// Form-level checks for input layers; the store never calls this.
    ///
    /// Dates must be empty or `YYYY-MM-DD`, times empty or `HH:MM`, and
    /// amounts non-negative.
    pub fn check_fields(&self) -> Result<(), TripValidationError> {
        ensure_date(EntityKind::Trip, "startDate", &self.start_date)?;
        ensure_date(EntityKind::Trip, "endDate", &self.end_date)?;
        ensure_non_negative(EntityKind::Trip, "budget", self.budget)?;
        self.destinations
            .iter()
            .try_for_each(Destination::check_fields)
    }

    pub fn find_destination(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|dest| dest.id == id)
    }

    /// Sum of every booked and planned cost across all destinations.
    pub fn total_cost(&self) -> f64 {
        self.destinations.iter().map(Destination::total_cost).sum()
    }

    /// Budget minus total cost; negative when over budget.
    pub fn remaining_budget(&self) -> f64 {
        self.budget - self.total_cost()
    }
}

impl Destination {
    pub fn validate(&self) -> Result<(), TripValidationError> {
        ensure_id(EntityKind::Destination, &self.id)?;
        ensure_unique_ids(
            EntityKind::Activity,
            self.activities.iter().map(|activity| activity.id.as_str()),
        )?;
        self.activities.iter().try_for_each(Activity::validate)?;
        if let Some(accommodation) = &self.accommodation {
            accommodation.validate()?;
        }
        if let Some(transportation) = &self.transportation {
            transportation.validate()?;
        }
        Ok(())
    }

    pub fn check_fields(&self) -> Result<(), TripValidationError> {
        ensure_date(EntityKind::Destination, "startDate", &self.start_date)?;
        ensure_date(EntityKind::Destination, "endDate", &self.end_date)?;
        self.activities
            .iter()
            .try_for_each(Activity::check_fields)?;
        if let Some(accommodation) = &self.accommodation {
            accommodation.check_fields()?;
        }
        if let Some(transportation) = &self.transportation {
            transportation.check_fields()?;
        }
        Ok(())
    }

    pub fn find_activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == id)
    }

    pub fn total_cost(&self) -> f64 {
        let activities: f64 = self.activities.iter().map(|activity| activity.cost).sum();
        let accommodation = self.accommodation.as_ref().map_or(0.0, |acc| acc.cost);
        let transportation = self.transportation.as_ref().map_or(0.0, |tr| tr.cost);
        activities + accommodation + transportation
    }
}

impl Activity {
    pub fn validate(&self) -> Result<(), TripValidationError> {
        ensure_id(EntityKind::Activity, &self.id)?;
        ensure_finite(EntityKind::Activity, "cost", self.cost)
    }

    pub fn check_fields(&self) -> Result<(), TripValidationError> {
        ensure_date(EntityKind::Activity, "date", &self.date)?;
        ensure_time(EntityKind::Activity, "time", &self.time)?;
        ensure_non_negative(EntityKind::Activity, "cost", self.cost)
    }
}

impl Accommodation {
    pub fn validate(&self) -> Result<(), TripValidationError> {
        ensure_id(EntityKind::Accommodation, &self.id)?;
        ensure_finite(EntityKind::Accommodation, "cost", self.cost)
    }

    pub fn check_fields(&self) -> Result<(), TripValidationError> {
        ensure_date(EntityKind::Accommodation, "checkIn", &self.check_in)?;
        ensure_date(EntityKind::Accommodation, "checkOut", &self.check_out)?;
        ensure_non_negative(EntityKind::Accommodation, "cost", self.cost)
    }
}

impl Transportation {
    pub fn validate(&self) -> Result<(), TripValidationError> {
        ensure_id(EntityKind::Transportation, &self.id)?;
        ensure_finite(EntityKind::Transportation, "cost", self.cost)
    }

    pub fn check_fields(&self) -> Result<(), TripValidationError> {
        const KIND: EntityKind = EntityKind::Transportation;
        ensure_date(KIND, "departureDate", &self.departure_date)?;
        ensure_time(KIND, "departureTime", &self.departure_time)?;
        ensure_date(KIND, "arrivalDate", &self.arrival_date)?;
        ensure_time(KIND, "arrivalTime", &self.arrival_time)?;
        ensure_non_negative(KIND, "cost", self.cost)
    }
}

/// Checks identity invariants across a whole collection, including trip id
/// uniqueness.
pub fn validate_trips<'a>(
    trips: impl IntoIterator<Item = &'a Trip> + Clone,
) -> Result<(), TripValidationError> {
    ensure_unique_ids(
        EntityKind::Trip,
        trips.clone().into_iter().map(|trip| trip.id.as_str()),
    )?;
    trips.into_iter().try_for_each(Trip::validate)
}

/// Whether an id counts as "not assigned yet".
pub fn is_blank_id(id: &str) -> bool {
    id.trim().is_empty()
}

fn ensure_id(entity: EntityKind, id: &str) -> Result<(), TripValidationError> {
    if is_blank_id(id) {
        return Err(TripValidationError::EmptyId(entity));
    }
    Ok(())
}

fn ensure_unique_ids<'a>(
    entity: EntityKind,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), TripValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(TripValidationError::DuplicateId {
                entity,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn ensure_finite(
    entity: EntityKind,
    field: &'static str,
    value: f64,
) -> Result<(), TripValidationError> {
    if !value.is_finite() {
        return Err(TripValidationError::NonFiniteAmount {
            entity,
            field,
            value,
        });
    }
    Ok(())
}

fn ensure_non_negative(
    entity: EntityKind,
    field: &'static str,
    value: f64,
) -> Result<(), TripValidationError> {
    if value < 0.0 {
        return Err(TripValidationError::InvalidAmount {
            entity,
            field,
            value,
        });
    }
    Ok(())
}

fn ensure_date(
    entity: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), TripValidationError> {
    if value.is_empty() || DATE_RE.is_match(value) {
        return Ok(());
    }
    Err(TripValidationError::InvalidDate {
        entity,
        field,
        value: value.to_string(),
    })
}

fn ensure_time(
    entity: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), TripValidationError> {
    if value.is_empty() || TIME_RE.is_match(value) {
        return Ok(());
    }
    Err(TripValidationError::InvalidTime {
        entity,
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{ensure_date, ensure_time, EntityKind, TripValidationError};

    #[test]
    fn dates_accept_empty_and_iso_values() {
        assert!(ensure_date(EntityKind::Trip, "startDate", "").is_ok());
        assert!(ensure_date(EntityKind::Trip, "startDate", "2023-06-15").is_ok());
        assert!(matches!(
            ensure_date(EntityKind::Trip, "startDate", "15/06/2023"),
            Err(TripValidationError::InvalidDate { .. })
        ));
        assert!(ensure_date(EntityKind::Trip, "startDate", "2023-13-01").is_err());
    }

    #[test]
    fn times_accept_empty_and_24h_values() {
        assert!(ensure_time(EntityKind::Activity, "time", "").is_ok());
        assert!(ensure_time(EntityKind::Activity, "time", "23:59").is_ok());
        assert!(ensure_time(EntityKind::Activity, "time", "24:00").is_err());
        assert!(ensure_time(EntityKind::Activity, "time", "9:00").is_err());
    }
}
