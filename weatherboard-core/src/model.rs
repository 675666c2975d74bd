use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Conditions reported by the current-weather endpoint for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// Local time at the location, as formatted by the provider.
    pub localtime: String,
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity_pct: f64,
    pub wind_kph: f64,
    pub condition_text: String,
    pub cloud_pct: f64,
    pub uv_index: f64,
    pub dewpoint_c: f64,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub visibility_km: f64,
    /// `None` when the provider did not include air-quality figures.
    pub air_quality: Option<AirQuality>,
}

/// Pollutant concentrations (μg/m3) and the US EPA index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub us_epa_index: Option<u8>,
}

/// One day of the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub condition_text: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    pub avg_humidity_pct: f64,
    pub chance_of_rain_pct: f64,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// Everything a single fetch produces for the render surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    /// Ordered by ascending date.
    pub forecast: Vec<ForecastDay>,
}

impl WeatherReport {
    /// Lowest minimum and highest maximum across the forecast.
    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        self.forecast.iter().fold(None, |acc, day| match acc {
            None => Some((day.min_temp_c, day.max_temp_c)),
            Some((lo, hi)) => Some((lo.min(day.min_temp_c), hi.max(day.max_temp_c))),
        })
    }
}
