use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Countries and the cities offered for each of them.
const COUNTRY_CITIES: &[(&str, &[&str])] = &[
    ("Sri Lanka", &["Colombo", "Kandy", "Galle", "Jaffna"]),
    ("India", &["Delhi", "Mumbai", "Bangalore", "Kolkata"]),
    ("USA", &["New York", "Los Angeles", "Chicago", "Houston"]),
    ("UK", &["London", "Manchester", "Bristol", "Edinburgh"]),
];

/// A city picked from the catalog, together with the country it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    pub city: String,
}

impl Location {
    /// Build a location, checking that `city` is listed under `country`.
    pub fn new(country: &str, city: &str) -> Result<Self> {
        let cities = cities_for(country).ok_or_else(|| {
            anyhow!(
                "Unknown country '{country}'. Supported countries: {}.",
                countries().join(", ")
            )
        })?;

        if !cities.contains(&city) {
            return Err(anyhow!(
                "City '{city}' is not available for {country}. Choose one of: {}.",
                cities.join(", ")
            ));
        }

        Ok(Self { country: country.to_string(), city: city.to_string() })
    }

    /// Build a location from a city name alone, looking up its country.
    pub fn from_city(city: &str) -> Result<Self> {
        let country = country_of(city).ok_or_else(|| {
            anyhow!(
                "City '{city}' is not in the catalog.\n\
                 Hint: run `weatherboard cities` to see the supported cities."
            )
        })?;

        Self::new(country, city)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

/// All countries in the catalog, sorted by name.
pub fn countries() -> Vec<&'static str> {
    let mut names: Vec<_> = COUNTRY_CITIES.iter().map(|(country, _)| *country).collect();
    names.sort_unstable();
    names
}

/// Cities offered for `country`, sorted by name.
pub fn cities_for(country: &str) -> Option<Vec<&'static str>> {
    COUNTRY_CITIES.iter().find(|(name, _)| *name == country).map(|(_, cities)| {
        let mut cities = cities.to_vec();
        cities.sort_unstable();
        cities
    })
}

/// Reverse lookup of the country a city is listed under.
pub fn country_of(city: &str) -> Option<&'static str> {
    COUNTRY_CITIES
        .iter()
        .find(|(_, cities)| cities.contains(&city))
        .map(|(country, _)| *country)
}
