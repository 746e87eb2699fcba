//! Canned provider payloads.
//!
//! Each function returns a body shaped like the real provider's response so
//! adapters can be exercised end to end against `ProviderMock`.

use serde_json::{json, Value};

/// ParcelsApp create response carrying a correlation id.
pub fn parcels_created(uuid: &str) -> Value {
    json!({ "uuid": uuid })
}

/// ParcelsApp response declaring an error code.
pub fn parcels_error(code: &str) -> Value {
    json!({ "error": code })
}

/// ParcelsApp poll response with one finished shipment.
pub fn parcels_shipment(tracking_id: &str) -> Value {
    json!({
        "done": true,
        "fromCache": false,
        "shipments": [{
            "trackingId": tracking_id,
            "status": "transit",
            "origin": "Italy",
            "destination": "Germany",
            "detectedCarrier": { "name": "Poste Italiane", "slug": "poste-italiane" },
            "states": [
                {
                    "status": "In transit",
                    "date": "2024-03-02T09:00:00Z",
                    "location": "Bologna"
                },
                {
                    "status": "Accepted",
                    "date": "2024-03-01T09:00:00Z",
                    "location": "Roma"
                }
            ]
        }]
    })
}

/// ParcelsApp poll response for a lookup still in progress.
pub fn parcels_pending() -> Value {
    json!({ "done": false })
}

/// TrackingMore response with one tracking.
pub fn trackingmore_tracking(tracking_id: &str) -> Value {
    json!({
        "meta": { "code": 200, "message": "Request response is successful" },
        "data": [{
            "tracking_number": tracking_id,
            "courier_code": "dhl",
            "delivery_status": "transit",
            "origin_country": "CN",
            "destination_country": "IT",
            "origin_info": { "trackinfo": [{
                "checkpoint_date": "2024-03-01T08:00:00+08:00",
                "tracking_detail": "Picked up",
                "location": "Shenzhen",
                "checkpoint_delivery_status": "transit"
            }]},
            "destination_info": { "trackinfo": [] }
        }]
    })
}

/// TrackingMore response with a non-success meta code.
pub fn trackingmore_rejected() -> Value {
    json!({ "meta": { "code": 4190, "message": "Daily request limit exceeded" }, "data": [] })
}

/// UPS token response.
pub fn ups_token(token: &str) -> Value {
    json!({ "access_token": token, "token_type": "Bearer", "expires_in": "14399" })
}

/// UPS Track API response with one delivered package.
pub fn ups_details(tracking_id: &str) -> Value {
    json!({
        "trackResponse": { "shipment": [{ "package": [{
            "trackingNumber": tracking_id,
            "currentStatus": { "description": "Delivered", "code": "011" },
            "packageAddress": [
                { "type": "ORIGIN", "address": { "city": "ATLANTA", "countryCode": "US" } },
                { "type": "DESTINATION", "address": { "city": "MILANO", "countryCode": "IT" } }
            ],
            "activity": [
                {
                    "location": { "address": { "city": "MILANO", "countryCode": "IT" } },
                    "status": { "type": "D", "description": "DELIVERED", "code": "KB" },
                    "date": "20240305",
                    "time": "143000"
                },
                {
                    "location": { "address": { "city": "ATLANTA", "countryCode": "US" } },
                    "status": { "type": "I", "description": "Departed from Facility" },
                    "date": "20240301",
                    "time": "090500"
                }
            ]
        }]}]}
    })
}

/// 17Track response with one accepted tracking.
pub fn track17_accepted(tracking_id: &str) -> Value {
    json!({
        "code": 0,
        "data": {
            "accepted": [{
                "number": tracking_id,
                "track_info": {
                    "latest_status": { "status": "InTransit" },
                    "shipping_info": {
                        "shipper_address": { "country": "CN" },
                        "recipient_address": { "country": "IT" }
                    },
                    "tracking": { "providers": [{
                        "provider": { "key": 190271, "name": "Yun Express" },
                        "events": [{
                            "time_iso": "2024-03-02T10:00:00+08:00",
                            "description": "Departed from sorting center",
                            "location": "Shenzhen",
                            "stage": "InTransit"
                        }]
                    }]}
                }
            }],
            "rejected": []
        }
    })
}

/// 17Track response that accepted nothing.
pub fn track17_empty(tracking_id: &str) -> Value {
    json!({
        "code": 0,
        "data": {
            "accepted": [],
            "rejected": [{ "number": tracking_id, "error": { "code": -18019902 } }]
        }
    })
}
