//! Sample trips used when no usable snapshot is persisted.

use crate::model::trip::{
    Accommodation, Activity, Destination, TransportKind, Transportation, Trip,
};

/// Returns the two sample trips shown on first launch.
pub fn sample_trips() -> Vec<Trip> {
    vec![european_adventure(), asian_expedition()]
}

fn european_adventure() -> Trip {
    Trip {
        id: "1".into(),
        title: "European Adventure".into(),
        start_date: "2023-06-15".into(),
        end_date: "2023-06-30".into(),
        destinations: vec![
            Destination {
                id: "d1".into(),
                name: "Paris, France".into(),
                start_date: "2023-06-15".into(),
                end_date: "2023-06-20".into(),
                activities: vec![
                    activity("a1", "Visit Eiffel Tower", "2023-06-16", "10:00", "Eiffel Tower", 25.0, "Buy tickets in advance", true),
                    activity("a2", "Louvre Museum", "2023-06-17", "13:00", "Louvre Museum", 15.0, "Spend at least 3 hours here", true),
                ],
                accommodation: Some(Accommodation {
                    id: "acc1".into(),
                    name: "Hotel de Paris".into(),
                    address: "123 Rue de Rivoli".into(),
                    check_in: "2023-06-15".into(),
                    check_out: "2023-06-20".into(),
                    cost: 800.0,
                    booking_reference: "PARIS123".into(),
                    notes: "Breakfast included".into(),
                }),
                transportation: Some(Transportation {
                    id: "tr1".into(),
                    kind: TransportKind::Flight,
                    departure_location: "New York".into(),
                    arrival_location: "Paris".into(),
                    departure_date: "2023-06-15".into(),
                    departure_time: "08:00".into(),
                    arrival_date: "2023-06-15".into(),
                    arrival_time: "20:00".into(),
                    cost: 600.0,
                    booking_reference: "FL123456".into(),
                    notes: "Terminal 2E".into(),
                }),
                notes: "Remember to bring adapter for French outlets".into(),
            },
            Destination {
                id: "d2".into(),
                name: "Rome, Italy".into(),
                start_date: "2023-06-21".into(),
                end_date: "2023-06-30".into(),
                activities: vec![activity(
                    "a3", "Colosseum Tour", "2023-06-22", "09:00", "Colosseum", 20.0, "Guided tour in English", true,
                )],
                accommodation: Some(Accommodation {
                    id: "acc2".into(),
                    name: "Roma Luxe Hotel".into(),
                    address: "45 Via del Corso".into(),
                    check_in: "2023-06-21".into(),
                    check_out: "2023-06-30".into(),
                    cost: 950.0,
                    booking_reference: "ROME456".into(),
                    notes: "City view room".into(),
                }),
                transportation: Some(Transportation {
                    id: "tr2".into(),
                    kind: TransportKind::Train,
                    departure_location: "Paris".into(),
                    arrival_location: "Rome".into(),
                    departure_date: "2023-06-20".into(),
                    departure_time: "14:00".into(),
                    arrival_date: "2023-06-21".into(),
                    arrival_time: "10:00".into(),
                    cost: 150.0,
                    booking_reference: "TR789012".into(),
                    notes: "First class seats".into(),
                }),
                notes: "Learn basic Italian phrases".into(),
            },
        ],
        budget: 3000.0,
        notes: "First time in Europe!".into(),
        cover_image: "https://images.pexels.com/photos/2346216/pexels-photo-2346216.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2".into(),
    }
}

fn asian_expedition() -> Trip {
    Trip {
        id: "2".into(),
        title: "Asian Expedition".into(),
        start_date: "2023-09-10".into(),
        end_date: "2023-09-25".into(),
        destinations: vec![Destination {
            id: "d3".into(),
            name: "Tokyo, Japan".into(),
            start_date: "2023-09-10".into(),
            end_date: "2023-09-17".into(),
            activities: vec![activity(
                "a4", "Tokyo Skytree", "2023-09-11", "16:00", "Tokyo Skytree", 30.0, "Sunset view recommended", false,
            )],
            accommodation: Some(Accommodation {
                id: "acc3".into(),
                name: "Shinjuku Grand Hotel".into(),
                address: "1-5-8 Kabukicho, Shinjuku".into(),
                check_in: "2023-09-10".into(),
                check_out: "2023-09-17".into(),
                cost: 700.0,
                booking_reference: "TKY789".into(),
                notes: "Close to train station".into(),
            }),
            transportation: None,
            notes: "Get Suica card for public transport".into(),
        }],
        budget: 4500.0,
        notes: "Need to exchange currency".into(),
        cover_image: "https://images.pexels.com/photos/1440476/pexels-photo-1440476.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2".into(),
    }
}

#[allow(clippy::too_many_arguments)]
fn activity(
    id: &str,
    title: &str,
    date: &str,
    time: &str,
    location: &str,
    cost: f64,
    notes: &str,
    booked: bool,
) -> Activity {
    Activity {
        id: id.into(),
        title: title.into(),
        date: date.into(),
        time: time.into(),
        location: location.into(),
        cost,
        notes: notes.into(),
        booked,
    }
}

#[cfg(test)]
mod tests {
    use super::sample_trips;
    use crate::model::trip::validate_trips;

    #[test]
    fn sample_trips_satisfy_tree_invariants() {
        let trips = sample_trips();
        assert_eq!(trips.len(), 2);
        validate_trips(trips.iter()).expect("sample data must be valid");
    }

    #[test]
    fn sample_budget_math_matches_bookings() {
        let trips = sample_trips();
        // 25 + 15 + 800 + 600 + 20 + 950 + 150
        assert_eq!(trips[0].total_cost(), 2560.0);
        assert_eq!(trips[0].remaining_budget(), 440.0);
        assert!(trips[1].destinations[0].transportation.is_none());
    }
}
