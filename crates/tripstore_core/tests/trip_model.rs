use tripstore_core::{
    encode_trips, sample_trips, validate_trips, Accommodation, Destination, EntityKind,
    NewDestination, NewTrip, TransportKind, Transportation, Trip, TripValidationError,
};
use std::sync::Arc;

fn tokyo() -> Destination {
    sample_trips()[1].destinations[0].clone()
}

#[test]
fn trip_serialization_uses_camel_case_wire_fields() {
    let trip = &sample_trips()[0];
    let json = serde_json::to_value(trip).unwrap();

    assert_eq!(json["id"], "1");
    assert_eq!(json["startDate"], "2023-06-15");
    assert_eq!(json["endDate"], "2023-06-30");
    assert_eq!(json["budget"], 3000.0);
    assert!(json["coverImage"].as_str().unwrap().starts_with("https://"));

    let paris = &json["destinations"][0];
    assert_eq!(paris["accommodation"]["checkIn"], "2023-06-15");
    assert_eq!(paris["accommodation"]["bookingReference"], "PARIS123");
    assert_eq!(paris["transportation"]["type"], "flight");
    assert_eq!(paris["transportation"]["departureTime"], "08:00");
    assert_eq!(paris["activities"][0]["booked"], true);

    let decoded: Trip = serde_json::from_value(json).unwrap();
    assert_eq!(&decoded, trip);
}

#[test]
fn absent_bookings_serialize_as_null() {
    let json = serde_json::to_value(tokyo()).unwrap();
    assert!(json["transportation"].is_null());
}

#[test]
fn booking_without_id_field_deserializes_with_blank_id() {
    let value = serde_json::json!({
        "name": "Hostel",
        "address": "2 Main St",
        "checkIn": "2024-03-01",
        "checkOut": "2024-03-04",
        "cost": 90,
        "bookingReference": "",
        "notes": ""
    });
    let accommodation: Accommodation = serde_json::from_value(value).unwrap();
    assert!(accommodation.id.is_empty());
    assert_eq!(
        accommodation.validate().unwrap_err(),
        TripValidationError::EmptyId(EntityKind::Accommodation)
    );
}

#[test]
fn transport_kinds_use_lowercase_tags() {
    for (kind, tag) in [
        (TransportKind::Flight, "flight"),
        (TransportKind::Train, "train"),
        (TransportKind::Bus, "bus"),
        (TransportKind::Car, "car"),
        (TransportKind::Other, "other"),
    ] {
        assert_eq!(serde_json::to_value(kind).unwrap(), tag);
    }
    assert!(serde_json::from_str::<TransportKind>("\"boat\"").is_err());
}

#[test]
fn encoded_collection_decodes_to_equal_trips() {
    let trips: Vec<Arc<Trip>> = sample_trips().into_iter().map(Arc::new).collect();
    let blob = encode_trips(&trips).unwrap();
    let decoded = tripstore_core::decode_trips(&blob).unwrap();
    assert_eq!(decoded, sample_trips());
}

#[test]
fn validation_rejects_duplicate_activity_ids() {
    let mut destination = tokyo();
    let copy = destination.activities[0].clone();
    destination.activities.push(copy);

    assert_eq!(
        destination.validate().unwrap_err(),
        TripValidationError::DuplicateId {
            entity: EntityKind::Activity,
            id: "a4".to_string(),
        }
    );
}

#[test]
fn validation_rejects_non_finite_budget_but_not_loose_formats() {
    let mut trips = sample_trips();
    trips[0].start_date = "June".to_string();
    trips[0].destinations[0].activities[0].cost = -1.0;
    validate_trips(trips.iter()).unwrap();

    trips[0].budget = f64::NAN;
    assert!(matches!(
        validate_trips(trips.iter()).unwrap_err(),
        TripValidationError::NonFiniteAmount {
            entity: EntityKind::Trip,
            field: "budget",
            ..
        }
    ));
}

#[test]
fn field_checks_report_bad_times_dates_and_negative_amounts() {
    let mut leg: Transportation = sample_trips()[0].destinations[0]
        .transportation
        .clone()
        .unwrap();
    leg.validate().unwrap();
    leg.arrival_time = "8pm".to_string();
    leg.validate().unwrap();
    assert_eq!(
        leg.check_fields().unwrap_err(),
        TripValidationError::InvalidTime {
            entity: EntityKind::Transportation,
            field: "arrivalTime",
            value: "8pm".to_string(),
        }
    );

    let mut trip = sample_trips()[1].clone();
    trip.check_fields().unwrap();
    trip.destinations[0].activities[0].cost = -3.0;
    assert!(matches!(
        trip.check_fields().unwrap_err(),
        TripValidationError::InvalidAmount {
            entity: EntityKind::Activity,
            field: "cost",
            ..
        }
    ));
    trip.end_date = "2023-7-1".to_string();
    assert!(matches!(
        trip.check_fields().unwrap_err(),
        TripValidationError::InvalidDate {
            entity: EntityKind::Trip,
            field: "endDate",
            ..
        }
    ));
}

#[test]
fn derived_costs_cover_activities_and_bookings() {
    let trip = &sample_trips()[1];
    // 30 activity + 700 hotel, no transportation
    assert_eq!(trip.destinations[0].total_cost(), 730.0);
    assert_eq!(trip.remaining_budget(), 3770.0);
    assert!(trip.find_destination("d3").unwrap().find_activity("a4").is_some());
    assert!(trip.find_destination("d1").is_none());
}

#[test]
fn new_payloads_attach_ids_and_start_empty() {
    let trip = NewTrip {
        title: "Weekend".to_string(),
        ..NewTrip::default()
    }
    .into_trip("t-1".to_string());
    assert_eq!(trip.id, "t-1");
    assert!(trip.destinations.is_empty());

    let destination = NewDestination {
        name: "Bruges".to_string(),
        ..NewDestination::default()
    }
    .into_destination("d-1".to_string());
    assert_eq!(destination.id, "d-1");
    assert!(destination.activities.is_empty());
    assert!(destination.accommodation.is_none());
}
