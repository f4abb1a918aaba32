//! Trip store: the authoritative in-memory trip collection.
//!
//! # Responsibility
//! - Own the trip collection and the current-trip selection.
//! - Expose add/update/delete operations over the trip tree.
//! - Keep the persisted snapshot in sync after every mutation.
//!
//! # Invariants
//! - Each mutation is one atomic transition: the new snapshot is written to
//!   storage first and only then becomes the in-memory state.
//! - Untouched trips are shared (`Arc`) between consecutive snapshots.
//! - Lookup misses are no-ops reported as `Outcome::Unmatched`, never errors.
//! - The current-trip id always names a trip in the collection, or is `None`.
//! - Only id invariants are enforced. Dates, times and amount signs are
//!   stored as given; `Trip::check_fields` is for input layers.

use crate::config::StoreConfig;
use crate::model::id::{IdGenerator, UuidIdGenerator};
use crate::model::trip::{
    is_blank_id, validate_trips, Accommodation, Activity, ActivityId, Destination,
    DestinationId, EntityKind, NewActivity, NewDestination, NewTrip, Transportation, Trip,
    TripId, TripValidationError,
};
use crate::snapshot::{encode_trips, parse_trips, SnapshotError};
use crate::storage::{BlobStore, StorageError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const MAX_ID_ATTEMPTS: usize = 8;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from trip store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Writing the snapshot failed; in-memory state is unchanged.
    Storage(StorageError),
    /// The collection could not be serialized.
    Snapshot(SnapshotError),
    /// The requested change would break a tree invariant.
    Validation(TripValidationError),
    /// The id generator kept returning blank or already-taken ids.
    IdCollision { entity: EntityKind, attempts: usize },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "failed to persist trips: {err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::IdCollision { entity, attempts } => write!(
                f,
                "could not generate a unique {entity} id after {attempts} attempts"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::IdCollision { .. } => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<SnapshotError> for StoreError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<TripValidationError> for StoreError {
    fn from(value: TripValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of an update/delete addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The target was found and the new snapshot was persisted.
    Applied,
    /// Some id on the path did not match; nothing changed.
    Unmatched,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Owned trip store for one session.
///
/// Mutations take `&mut self`, so overlapping callers are serialized by
/// whoever owns the store.
pub struct TripStore<S: BlobStore, G: IdGenerator = UuidIdGenerator> {
    storage: S,
    ids: G,
    storage_key: String,
    trips: Vec<Arc<Trip>>,
    current_trip_id: Option<TripId>,
}

impl<S: BlobStore> TripStore<S> {
    /// Opens a store that assigns random UUID ids.
    pub fn open(storage: S, config: StoreConfig) -> StoreResult<Self> {
        Self::open_with_ids(storage, config, UuidIdGenerator)
    }
}

impl<S: BlobStore, G: IdGenerator> TripStore<S, G> {
    /// Loads the persisted snapshot, or seeds and persists the configured
    /// default collection when the snapshot is absent, unreadable, not a trip
    /// array, or contains duplicate ids.
    ///
    /// Blank ids in a loaded snapshot are filled in and the repaired snapshot
    /// is written back. Field formats are never a reason to discard data.
    ///
    /// # Errors
    /// - `StoreError::Storage` when persisting the seed or a repair fails.
    /// - `StoreError::IdCollision` when a blank id cannot be repaired.
    pub fn open_with_ids(storage: S, config: StoreConfig, mut ids: G) -> StoreResult<Self> {
        let StoreConfig { storage_key, seed } = config;
        let persisted = load_persisted(&storage, &storage_key, &mut ids)?;
        let mut store = Self {
            storage,
            ids,
            storage_key,
            trips: Vec::new(),
            current_trip_id: None,
        };

        match persisted {
            Some((trips, repaired)) => {
                info!(
                    "event=store_open module=store status=ok source=snapshot trip_count={} repaired_ids={}",
                    trips.len(),
                    repaired
                );
                let trips = trips.into_iter().map(Arc::new).collect();
                if repaired > 0 {
                    store.commit(trips)?;
                } else {
                    store.trips = trips;
                }
            }
            None => {
                let trips: Vec<Arc<Trip>> = seed.trips().into_iter().map(Arc::new).collect();
                info!(
                    "event=store_open module=store status=ok source=seed seed={:?} trip_count={}",
                    seed,
                    trips.len()
                );
                store.commit(trips)?;
            }
        }

        Ok(store)
    }

    /// All trips in insertion order.
    pub fn trips(&self) -> &[Arc<Trip>] {
        &self.trips
    }

    pub fn find_trip(&self, id: &str) -> Option<&Arc<Trip>> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    /// The selected trip, always reflecting the latest snapshot.
    pub fn current_trip(&self) -> Option<&Arc<Trip>> {
        self.current_trip_id
            .as_deref()
            .and_then(|id| self.find_trip(id))
    }

    pub fn current_trip_id(&self) -> Option<&str> {
        self.current_trip_id.as_deref()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Ends the session and hands the storage back.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Appends a new trip and returns its assigned id.
    ///
    /// Bookings inside `data` that lack an id get one.
    pub fn add_trip(&mut self, data: NewTrip) -> StoreResult<TripId> {
        let trips = &self.trips;
        let id = fresh_id(&mut self.ids, EntityKind::Trip, |candidate| {
            trips.iter().any(|trip| trip.id == candidate)
        })?;

        let mut trip = data.into_trip(id.clone());
        for destination in &mut trip.destinations {
            assign_booking_ids(destination, &mut self.ids)?;
        }
        trip.validate()?;

        let mut next = self.trips.clone();
        next.push(Arc::new(trip));
        self.commit(next)?;

        debug!(
            "event=store_mutation module=store op=add_trip status=ok trip_id={} trip_count={}",
            id,
            self.trips.len()
        );
        Ok(id)
    }

    /// Replaces the trip with the same id.
    pub fn update_trip(&mut self, trip: Trip) -> StoreResult<Outcome> {
        let trip_id = trip.id.clone();
        self.edit_trip("update_trip", &trip_id, move |current, ids| {
            *current = trip;
            for destination in &mut current.destinations {
                assign_booking_ids(destination, ids)?;
            }
            Ok(Outcome::Applied)
        })
    }

    /// Removes a trip and everything it contains; clears the selection if it
    /// pointed at this trip.
    pub fn delete_trip(&mut self, id: &str) -> StoreResult<Outcome> {
        let Some(index) = self.position(id) else {
            return Ok(unmatched("delete_trip", id));
        };

        let mut next = self.trips.clone();
        next.remove(index);
        self.commit(next)?;

        if self.current_trip_id.as_deref() == Some(id) {
            self.current_trip_id = None;
        }
        debug!(
            "event=store_mutation module=store op=delete_trip status=ok trip_id={} trip_count={}",
            id,
            self.trips.len()
        );
        Ok(Outcome::Applied)
    }

    /// Selects a trip by id. `None` or an unknown id clears the selection.
    pub fn set_current_trip(&mut self, id: Option<&str>) {
        let selected = id
            .filter(|id| self.position(id).is_some())
            .map(str::to_string);
        if selected.is_none() {
            if let Some(id) = id {
                debug!("event=select_trip module=store status=unmatched trip_id={id}");
            }
        }
        self.current_trip_id = selected;
    }

    /// Appends a destination with an empty activity list.
    ///
    /// Returns `None` when `trip_id` does not match.
    pub fn add_destination(
        &mut self,
        trip_id: &str,
        data: NewDestination,
    ) -> StoreResult<Option<DestinationId>> {
        let mut added = None;
        let outcome = self.edit_trip("add_destination", trip_id, |trip, ids| {
            let id = fresh_id(ids, EntityKind::Destination, |candidate| {
                trip.find_destination(candidate).is_some()
            })?;
            let mut destination = data.into_destination(id.clone());
            assign_booking_ids(&mut destination, ids)?;
            trip.destinations.push(destination);
            added = Some(id);
            Ok(Outcome::Applied)
        })?;
        Ok(added.filter(|_| outcome.is_applied()))
    }

    pub fn update_destination(
        &mut self,
        trip_id: &str,
        destination: Destination,
    ) -> StoreResult<Outcome> {
        let destination_id = destination.id.clone();
        self.edit_destination(
            "update_destination",
            trip_id,
            &destination_id,
            move |current, ids| {
                *current = destination;
                assign_booking_ids(current, ids)?;
                Ok(Outcome::Applied)
            },
        )
    }

    pub fn delete_destination(
        &mut self,
        trip_id: &str,
        destination_id: &str,
    ) -> StoreResult<Outcome> {
        self.edit_trip("delete_destination", trip_id, |trip, _| {
            Ok(remove_by_id(&mut trip.destinations, destination_id, |dest| {
                dest.id.as_str()
            }))
        })
    }

    /// Appends an activity to a destination.
    ///
    /// Returns `None` when the trip or destination does not match.
    pub fn add_activity(
        &mut self,
        trip_id: &str,
        destination_id: &str,
        data: NewActivity,
    ) -> StoreResult<Option<ActivityId>> {
        let mut added = None;
        let outcome = self.edit_destination(
            "add_activity",
            trip_id,
            destination_id,
            |destination, ids| {
                let id = fresh_id(ids, EntityKind::Activity, |candidate| {
                    destination.find_activity(candidate).is_some()
                })?;
                destination
                    .activities
                    .push(data.into_activity(id.clone()));
                added = Some(id);
                Ok(Outcome::Applied)
            },
        )?;
        Ok(added.filter(|_| outcome.is_applied()))
    }

    pub fn update_activity(
        &mut self,
        trip_id: &str,
        destination_id: &str,
        activity: Activity,
    ) -> StoreResult<Outcome> {
        self.edit_destination(
            "update_activity",
            trip_id,
            destination_id,
            move |destination, _| {
                match destination
                    .activities
                    .iter_mut()
                    .find(|current| current.id == activity.id)
                {
                    Some(current) => {
                        *current = activity;
                        Ok(Outcome::Applied)
                    }
                    None => Ok(Outcome::Unmatched),
                }
            },
        )
    }

    pub fn delete_activity(
        &mut self,
        trip_id: &str,
        destination_id: &str,
        activity_id: &str,
    ) -> StoreResult<Outcome> {
        self.edit_destination(
            "delete_activity",
            trip_id,
            destination_id,
            |destination, _| {
                Ok(remove_by_id(
                    &mut destination.activities,
                    activity_id,
                    |activity| activity.id.as_str(),
                ))
            },
        )
    }

    /// Replaces or clears a destination's accommodation.
    ///
    /// A value with a blank id is assigned a fresh one.
    pub fn update_accommodation(
        &mut self,
        trip_id: &str,
        destination_id: &str,
        accommodation: Option<Accommodation>,
    ) -> StoreResult<Outcome> {
        self.edit_destination(
            "update_accommodation",
            trip_id,
            destination_id,
            move |destination, ids| {
                destination.accommodation = accommodation;
                assign_booking_ids(destination, ids)?;
                Ok(Outcome::Applied)
            },
        )
    }

    /// Replaces or clears a destination's transportation.
    ///
    /// A value with a blank id is assigned a fresh one.
    pub fn update_transportation(
        &mut self,
        trip_id: &str,
        destination_id: &str,
        transportation: Option<Transportation>,
    ) -> StoreResult<Outcome> {
        self.edit_destination(
            "update_transportation",
            trip_id,
            destination_id,
            move |destination, ids| {
                destination.transportation = transportation;
                assign_booking_ids(destination, ids)?;
                Ok(Outcome::Applied)
            },
        )
    }

    fn position(&self, trip_id: &str) -> Option<usize> {
        self.trips.iter().position(|trip| trip.id == trip_id)
    }

    /// Copies one trip, applies `edit`, checks id invariants and commits the
    /// result.
    ///
    /// Sibling trips are carried over by `Arc` clone.
    fn edit_trip(
        &mut self,
        op: &'static str,
        trip_id: &str,
        edit: impl FnOnce(&mut Trip, &mut G) -> StoreResult<Outcome>,
    ) -> StoreResult<Outcome> {
        let Some(index) = self.position(trip_id) else {
            return Ok(unmatched(op, trip_id));
        };

        let mut trip = Trip::clone(&self.trips[index]);
        if edit(&mut trip, &mut self.ids)? == Outcome::Unmatched {
            return Ok(unmatched(op, trip_id));
        }
        trip.validate()?;

        let mut next = self.trips.clone();
        next[index] = Arc::new(trip);
        self.commit(next)?;

        debug!("event=store_mutation module=store op={op} status=ok trip_id={trip_id}");
        Ok(Outcome::Applied)
    }

    fn edit_destination(
        &mut self,
        op: &'static str,
        trip_id: &str,
        destination_id: &str,
        edit: impl FnOnce(&mut Destination, &mut G) -> StoreResult<Outcome>,
    ) -> StoreResult<Outcome> {
        self.edit_trip(op, trip_id, |trip, ids| {
            match trip
                .destinations
                .iter_mut()
                .find(|destination| destination.id == destination_id)
            {
                Some(destination) => edit(destination, ids),
                None => Ok(Outcome::Unmatched),
            }
        })
    }

    /// Persists `next` and, only on success, makes it the current snapshot.
    fn commit(&mut self, next: Vec<Arc<Trip>>) -> StoreResult<()> {
        let blob = encode_trips(&next)?;
        if let Err(err) = self.storage.set(&self.storage_key, &blob) {
            error!(
                "event=snapshot_write module=store status=error error_code=storage_write_failed bytes={} error={}",
                blob.len(),
                err
            );
            return Err(err.into());
        }
        self.trips = next;
        Ok(())
    }
}

/// Reads and parses the snapshot, repairing blank ids in place.
///
/// Returns `None` when the seed should be used instead, along with the
/// number of ids that were filled in otherwise.
fn load_persisted<S: BlobStore, G: IdGenerator>(
    storage: &S,
    key: &str,
    ids: &mut G,
) -> StoreResult<Option<(Vec<Trip>, usize)>> {
    let blob = match storage.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            info!("event=snapshot_load module=store status=absent");
            return Ok(None);
        }
        Err(err) => {
            warn!(
                "event=snapshot_load module=store status=error error_code=storage_read_failed error={err}"
            );
            return Ok(None);
        }
    };

    let mut trips = match parse_trips(&blob) {
        Ok(trips) => trips,
        Err(err) => {
            warn!(
                "event=snapshot_load module=store status=error error_code=snapshot_malformed bytes={} error={}",
                blob.len(),
                err
            );
            return Ok(None);
        }
    };

    // Fresh ids never collide with siblings, so after the repair the only
    // remaining violation is a duplicate id in the stored data.
    let repaired = repair_blank_ids(&mut trips, ids)?;
    if let Err(err) = validate_trips(trips.iter()) {
        warn!(
            "event=snapshot_load module=store status=error error_code=snapshot_invalid bytes={} error={}",
            blob.len(),
            err
        );
        return Ok(None);
    }
    if repaired > 0 {
        warn!("event=snapshot_load module=store status=repaired repaired_ids={repaired}");
    }
    Ok(Some((trips, repaired)))
}

/// Gives every blank trip, destination, activity and booking id a fresh one.
fn repair_blank_ids<G: IdGenerator>(trips: &mut [Trip], ids: &mut G) -> StoreResult<usize> {
    let mut repaired = 0;
    for index in 0..trips.len() {
        if is_blank_id(&trips[index].id) {
            let id = fresh_id(ids, EntityKind::Trip, |candidate| {
                trips.iter().any(|trip| trip.id == candidate)
            })?;
            trips[index].id = id;
            repaired += 1;
        }

        let trip = &mut trips[index];
        for dest_index in 0..trip.destinations.len() {
            if is_blank_id(&trip.destinations[dest_index].id) {
                let id = fresh_id(ids, EntityKind::Destination, |candidate| {
                    trip.find_destination(candidate).is_some()
                })?;
                trip.destinations[dest_index].id = id;
                repaired += 1;
            }

            let destination = &mut trip.destinations[dest_index];
            for activity_index in 0..destination.activities.len() {
                if is_blank_id(&destination.activities[activity_index].id) {
                    let id = fresh_id(ids, EntityKind::Activity, |candidate| {
                        destination.find_activity(candidate).is_some()
                    })?;
                    destination.activities[activity_index].id = id;
                    repaired += 1;
                }
            }
            repaired += assign_booking_ids(destination, ids)?;
        }
    }
    Ok(repaired)
}

fn fresh_id<G: IdGenerator>(
    ids: &mut G,
    entity: EntityKind,
    taken: impl Fn(&str) -> bool,
) -> StoreResult<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = ids.next_id();
        if !is_blank_id(&candidate) && !taken(&candidate) {
            return Ok(candidate);
        }
    }
    Err(StoreError::IdCollision {
        entity,
        attempts: MAX_ID_ATTEMPTS,
    })
}

/// Fills in blank booking ids; returns how many were assigned.
fn assign_booking_ids<G: IdGenerator>(
    destination: &mut Destination,
    ids: &mut G,
) -> StoreResult<usize> {
    let mut assigned = 0;
    if let Some(accommodation) = destination.accommodation.as_mut() {
        if is_blank_id(&accommodation.id) {
            accommodation.id = fresh_id(ids, EntityKind::Accommodation, |_| false)?;
            assigned += 1;
        }
    }
    if let Some(transportation) = destination.transportation.as_mut() {
        if is_blank_id(&transportation.id) {
            transportation.id = fresh_id(ids, EntityKind::Transportation, |_| false)?;
            assigned += 1;
        }
    }
    Ok(assigned)
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> &str) -> Outcome {
    let before = items.len();
    items.retain(|item| id_of(item) != id);
    if items.len() == before {
        Outcome::Unmatched
    } else {
        Outcome::Applied
    }
}

fn unmatched(op: &'static str, trip_id: &str) -> Outcome {
    debug!("event=store_mutation module=store op={op} status=unmatched trip_id={trip_id}");
    Outcome::Unmatched
}

#[cfg(test)]
mod tests {
    use super::{assign_booking_ids, fresh_id, remove_by_id, repair_blank_ids, Outcome, StoreError};
    use crate::model::id::{IdGenerator, SequentialIdGenerator};
    use crate::model::trip::{Accommodation, Destination, EntityKind, Trip};

    struct FixedIds(&'static str);

    impl IdGenerator for FixedIds {
        fn next_id(&mut self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn fresh_id_gives_up_when_generator_repeats_taken_id() {
        let err = fresh_id(&mut FixedIds("dup"), EntityKind::Activity, |id| id == "dup")
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::IdCollision {
                entity: EntityKind::Activity,
                attempts: 8
            }
        ));
    }

    #[test]
    fn fresh_id_rejects_blank_ids() {
        assert!(fresh_id(&mut FixedIds("  "), EntityKind::Trip, |_| false).is_err());
    }

    #[test]
    fn remove_by_id_reports_miss() {
        let mut items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(remove_by_id(&mut items, "c", |s| s.as_str()), Outcome::Unmatched);
        assert_eq!(remove_by_id(&mut items, "a", |s| s.as_str()), Outcome::Applied);
        assert_eq!(items, vec!["b".to_string()]);
    }

    /// Replays a fixed list of ids, then repeats the last one.
    struct ScriptedIds(Vec<&'static str>);

    impl IdGenerator for ScriptedIds {
        fn next_id(&mut self) -> String {
            if self.0.len() > 1 {
                self.0.remove(0).to_string()
            } else {
                self.0[0].to_string()
            }
        }
    }

    fn destination(id: &str) -> Destination {
        Destination {
            id: id.to_string(),
            name: "Lisbon".to_string(),
            start_date: String::new(),
            end_date: String::new(),
            activities: Vec::new(),
            accommodation: None,
            transportation: None,
            notes: String::new(),
        }
    }

    fn inn(id: &str) -> Accommodation {
        Accommodation {
            id: id.to_string(),
            name: "Inn".to_string(),
            address: String::new(),
            check_in: String::new(),
            check_out: String::new(),
            cost: 0.0,
            booking_reference: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn booking_ids_skip_blank_generator_output() {
        let mut dest = destination("d1");
        dest.accommodation = Some(inn(""));
        let assigned = assign_booking_ids(&mut dest, &mut ScriptedIds(vec!["", " ", "acc-9"]))
            .unwrap();
        assert_eq!(assigned, 1);
        assert_eq!(dest.accommodation.unwrap().id, "acc-9");
    }

    #[test]
    fn booking_ids_fail_when_generator_only_returns_blanks() {
        let mut dest = destination("d1");
        dest.accommodation = Some(inn(""));
        let err = assign_booking_ids(&mut dest, &mut FixedIds("")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::IdCollision {
                entity: EntityKind::Accommodation,
                ..
            }
        ));
    }

    #[test]
    fn repair_fills_blank_ids_without_touching_assigned_ones() {
        let mut dest = destination("");
        dest.accommodation = Some(inn("acc1"));
        let mut trips = vec![Trip {
            id: "1".to_string(),
            title: "Coast".to_string(),
            start_date: String::new(),
            end_date: String::new(),
            destinations: vec![dest, destination("d2")],
            budget: 0.0,
            notes: String::new(),
            cover_image: String::new(),
        }];

        let repaired = repair_blank_ids(&mut trips, &mut SequentialIdGenerator::new("r")).unwrap();

        assert_eq!(repaired, 1);
        assert_eq!(trips[0].id, "1");
        assert_eq!(trips[0].destinations[0].id, "r-1");
        assert_eq!(trips[0].destinations[0].accommodation.as_ref().unwrap().id, "acc1");
        assert_eq!(trips[0].destinations[1].id, "d2");
    }
}
