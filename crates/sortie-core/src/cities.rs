//! Supported city centers.
//!
//! Search lanes and distance checks all measure from these fixed center
//! points. An unrecognized city resolves to the first entry rather than
//! erroring — city choice is a preference, not a validation gate.

/// A supported city with its search-center coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityCenter {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

/// Cities the service currently supports. The first entry is the fallback.
pub const SUPPORTED_CITIES: &[CityCenter] = &[
    CityCenter {
        name: "Amsterdam",
        lat: 52.3676,
        lng: 4.9041,
    },
    CityCenter {
        name: "Rotterdam",
        lat: 51.9244,
        lng: 4.4777,
    },
    CityCenter {
        name: "Utrecht",
        lat: 52.0907,
        lng: 5.1214,
    },
    CityCenter {
        name: "The Hague",
        lat: 52.0705,
        lng: 4.3007,
    },
    CityCenter {
        name: "Eindhoven",
        lat: 51.4416,
        lng: 5.4697,
    },
    CityCenter {
        name: "Groningen",
        lat: 53.2194,
        lng: 6.5665,
    },
    CityCenter {
        name: "Antwerp",
        lat: 51.2194,
        lng: 4.4025,
    },
    CityCenter {
        name: "Berlin",
        lat: 52.5200,
        lng: 13.4050,
    },
];

impl CityCenter {
    /// Resolves a caller-supplied city name, case-insensitively, falling
    /// back to the first supported city.
    #[must_use]
    pub fn resolve(raw: &str) -> &'static CityCenter {
        let wanted = raw.trim();
        SUPPORTED_CITIES
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
            .unwrap_or(&SUPPORTED_CITIES[0])
    }
}
