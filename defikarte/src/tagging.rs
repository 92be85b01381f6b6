//! Mapping of a [`DefibrillatorRequest`] onto OSM tags.
//!
//! The mapping is pure: coordinates are copied as-is and every tag is
//! written, even when its value is empty.

use crate::model::{DefibrillatorRequest, GeoNode, Tags};

/// `emergency` tag key; its value marks the node as an AED.
pub const EMERGENCY: &str = "emergency";
/// Value of the `emergency` tag for AEDs.
pub const DEFIBRILLATOR: &str = "defibrillator";
pub const EMERGENCY_PHONE: &str = "emergency:phone";
pub const DEFIBRILLATOR_LOCATION: &str = "defibrillator:location";
pub const OPENING_HOURS: &str = "opening_hours";
pub const PHONE: &str = "phone";
pub const OPERATOR: &str = "operator";
pub const ACCESS: &str = "access";
pub const INDOOR: &str = "indoor";

/// Build the tag set for a new AED node.
pub fn tags_for(request: &DefibrillatorRequest) -> Tags {
    [
        (EMERGENCY, DEFIBRILLATOR),
        (EMERGENCY_PHONE, request.emergency_phone.as_str()),
        (DEFIBRILLATOR_LOCATION, request.location.as_str()),
        (OPENING_HOURS, request.opening_hours.as_str()),
        (PHONE, request.operator_phone.as_str()),
        (OPERATOR, request.operator_name.as_str()),
        (ACCESS, yes_no(request.accessible)),
        (INDOOR, yes_no(request.indoor)),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

/// Build the node to create for `request`. Id and changeset are left empty.
pub fn node_for(request: &DefibrillatorRequest) -> GeoNode {
    GeoNode {
        lat: request.latitude,
        lon: request.longitude,
        tags: tags_for(request),
        ..Default::default()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
