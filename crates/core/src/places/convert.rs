//! Server payloads into the app's place shape.

use nearby_api_types::{ApiDayHours, ApiHours, ApiPlace, ApiReview, HealthResponse};

use crate::model::{HealthStatus, Location, Place, PlaceId, Review};

const WEEKDAYS: [(&str, &str); 7] = [
    ("monday", "Monday"),
    ("tuesday", "Tuesday"),
    ("wednesday", "Wednesday"),
    ("thursday", "Thursday"),
    ("friday", "Friday"),
    ("saturday", "Saturday"),
    ("sunday", "Sunday"),
];

/// `origin` is only used when the server leaves `distance` out.
pub fn place_from_api(api: ApiPlace, origin: Option<&Location>) -> Place {
    let location = Location::new(api.latitude, api.longitude);

    let distance_m = match (api.distance, origin) {
        (Some(km), _) => Some(km * 1000.0),
        (None, Some(origin)) => Some(origin.distance_to(&location)),
        (None, None) => None,
    };

    Place {
        id: PlaceId::new(api.id.to_string()),
        name: api.name,
        address: api.address.unwrap_or_default(),
        location,
        rating: api.rating,
        types: api.kind.into_iter().collect(),
        photos: api.photos.unwrap_or_default(),
        distance_m,
        phone: api.phone,
        website: api.website,
        price_level: api.price_level,
        opening_hours: api.hours.as_ref().and_then(weekly_schedule),
        reviews: api
            .reviews
            .unwrap_or_default()
            .into_iter()
            .map(review_from_api)
            .collect(),
    }
}

fn review_from_api(api: ApiReview) -> Review {
    Review {
        author: api.author_name.unwrap_or_else(|| "Anonymous".into()),
        rating: api.rating,
        text: api.text.unwrap_or_default(),
        relative_time: api.relative_time_description,
    }
}

/// One line per weekday, Monday first. Days the server leaves out are closed.
pub fn weekly_schedule(hours: &ApiHours) -> Option<Vec<String>> {
    if hours.is_empty() {
        return None;
    }

    let lines = WEEKDAYS
        .iter()
        .map(|(key, label)| {
            let day = hours
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .and_then(|(_, v)| v.as_ref());

            match day {
                Some(ApiDayHours::Range { open, close }) => format!("{label}: {open} - {close}"),
                Some(ApiDayHours::Text(text)) => format!("{label}: {text}"),
                None => format!("{label}: Closed"),
            }
        })
        .collect();

    Some(lines)
}

pub fn health_from_api(api: HealthResponse) -> HealthStatus {
    let healthy = matches!(api.status.to_ascii_lowercase().as_str(), "ok" | "healthy" | "up");
    HealthStatus {
        healthy,
        status: api.status,
        version: api.version,
    }
}
