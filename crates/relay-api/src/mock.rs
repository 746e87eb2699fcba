//! Canned shipment served when mock mode is enabled.
//!
//! Lets the front-end be developed without provider credentials. The result
//! depends only on the tracking id and request language.

use relay_core::{Carrier, ShipmentResult, TrackingEvent, TrackingRequest};

/// Provider name reported for canned results.
pub const MOCK_PROVIDER: &str = "mock";

/// Builds the canned shipment for a request.
pub fn mock_shipment(request: &TrackingRequest) -> ShipmentResult {
    let italian = request.language.eq_ignore_ascii_case("it");
    let text = |en: &str, it: &str| (if italian { it } else { en }).to_string();

    let event = |id: &str, status: &str, description: String, timestamp: &str, location: &str| {
        TrackingEvent {
            id: id.to_string(),
            status: status.to_string(),
            description,
            timestamp: timestamp.to_string(),
            location: location.to_string(),
        }
    };

    let mut shipment = ShipmentResult::new(&request.tracking_id, MOCK_PROVIDER);
    shipment.carrier =
        Carrier { name: "Mock Carrier".to_string(), slug: "mock-carrier".to_string() };
    shipment.status = "in_transit".to_string();
    shipment.origin = "IT".to_string();
    shipment.destination =
        request.destination_country.clone().unwrap_or_else(|| "DE".to_string());
    shipment.events = vec![
        event(
            "mock-3",
            "in_transit",
            text("Departed from sorting center", "Partito dal centro di smistamento"),
            "2024-01-03T08:15:00Z",
            "Bologna, IT",
        ),
        event(
            "mock-2",
            "in_transit",
            text("Arrived at sorting center", "Arrivato al centro di smistamento"),
            "2024-01-02T18:40:00Z",
            "Bologna, IT",
        ),
        event(
            "mock-1",
            "info_received",
            text("Shipment information received", "Informazioni sulla spedizione ricevute"),
            "2024-01-01T10:00:00Z",
            "Roma, IT",
        ),
    ];

    shipment
}
