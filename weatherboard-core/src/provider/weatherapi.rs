use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument, warn};

use crate::{
    config::Config,
    error::{FetchError, classify},
    model::{AirQuality, CurrentConditions, ForecastDay, WeatherReport},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    forecast_days: u8,
    air_quality: bool,
    http: Client,
}

/// Status and body of one endpoint, read in full.
#[derive(Debug)]
struct RawResponse {
    status: StatusCode,
    body: String,
}

impl WeatherApiProvider {
    /// Build a provider for `api_key` using the endpoint and timeout settings in `config`.
    pub fn new(api_key: String, config: &Config) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::unexpected(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            forecast_days: config.forecast_days,
            air_quality: config.air_quality,
            http,
        })
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<RawResponse, FetchError> {
        let url = format!("{}/{endpoint}.json", self.base_url);
        debug!(endpoint, "Sending WeatherAPI request");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| with_endpoint(endpoint, classify(&e)))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| with_endpoint(endpoint, classify(&e)))?;

        debug!(endpoint, %status, bytes = body.len(), "WeatherAPI response received");

        if !status.is_success() {
            warn!(endpoint, %status, body = %truncate_body(&body), "WeatherAPI request failed");
        }

        Ok(RawResponse { status, body })
    }

    async fn fetch_raw(&self, city: &str) -> Result<(RawResponse, RawResponse), FetchError> {
        let aqi = if self.air_quality { "yes" } else { "no" };
        let days = self.forecast_days.to_string();

        let current_query = [("q", city), ("aqi", aqi)];
        let forecast_query =
            [("q", city), ("days", days.as_str()), ("aqi", "no"), ("alerts", "no")];

        // The endpoints are independent, so both go out at once.
        let (current, forecast) = tokio::join!(
            self.get("current", &current_query),
            self.get("forecast", &forecast_query),
        );

        combine(current, forecast)
    }
}

/// Merge the two endpoint outcomes; a failure on either side fails the fetch.
fn combine(
    current: Result<RawResponse, FetchError>,
    forecast: Result<RawResponse, FetchError>,
) -> Result<(RawResponse, RawResponse), FetchError> {
    match (current, forecast) {
        (Ok(current), Ok(forecast)) => {
            if current.status.is_success() && forecast.status.is_success() {
                Ok((current, forecast))
            } else {
                Err(FetchError::ApiError {
                    status_current: current.status.as_u16(),
                    status_forecast: forecast.status.as_u16(),
                })
            }
        }
        (Err(err), Ok(forecast)) => {
            Err(with_note(err, &format!("forecast status {}", forecast.status.as_u16())))
        }
        (Ok(current), Err(err)) => {
            Err(with_note(err, &format!("current status {}", current.status.as_u16())))
        }
        (Err(current), Err(forecast)) => Err(with_note(current, &detail(&forecast))),
    }
}

/// Append `note` to the message of `err`, keeping its kind.
fn with_note(err: FetchError, note: &str) -> FetchError {
    match err {
        FetchError::NetworkError { message } => FetchError::network(format!("{message}; {note}")),
        FetchError::MalformedResponse { message } => {
            FetchError::malformed(format!("{message}; {note}"))
        }
        FetchError::Unexpected { message } => {
            FetchError::unexpected(format!("{message}; {note}"))
        }
        api @ FetchError::ApiError { .. } => api,
    }
}

fn detail(err: &FetchError) -> String {
    match err {
        FetchError::NetworkError { message }
        | FetchError::MalformedResponse { message }
        | FetchError::Unexpected { message } => message.clone(),
        api @ FetchError::ApiError { .. } => api.to_string(),
    }
}

fn with_endpoint(endpoint: &str, err: FetchError) -> FetchError {
    match err {
        FetchError::NetworkError { message } => {
            FetchError::network(format!("{endpoint} request: {message}"))
        }
        FetchError::MalformedResponse { message } => {
            FetchError::malformed(format!("{endpoint} response: {message}"))
        }
        FetchError::Unexpected { message } => {
            FetchError::unexpected(format!("{endpoint} request: {message}"))
        }
        api @ FetchError::ApiError { .. } => api,
    }
}

/// Project the current-conditions body onto [`CurrentConditions`].
pub fn parse_current(body: &str) -> Result<CurrentConditions, FetchError> {
    let parsed: WaCurrentResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(format!("current response: {e}")))?;

    let WaCurrentResponse { location, current } = parsed;

    Ok(CurrentConditions {
        city: location.name,
        region: location.region,
        country: location.country,
        lat: location.lat,
        lon: location.lon,
        localtime: location.localtime,
        temp_c: current.temp_c,
        feelslike_c: current.feelslike_c,
        humidity_pct: current.humidity,
        wind_kph: current.wind_kph,
        condition_text: current.condition.text,
        cloud_pct: current.cloud,
        uv_index: current.uv,
        dewpoint_c: current.dewpoint_c,
        pressure_mb: current.pressure_mb,
        precip_mm: current.precip_mm,
        visibility_km: current.vis_km,
        air_quality: current.air_quality.map(|aq| AirQuality {
            co: aq.co,
            no2: aq.no2,
            o3: aq.o3,
            so2: aq.so2,
            pm2_5: aq.pm2_5,
            pm10: aq.pm10,
            us_epa_index: aq.us_epa_index,
        }),
    })
}

/// Project the forecast body onto a date-ordered list of [`ForecastDay`].
pub fn parse_forecast(body: &str) -> Result<Vec<ForecastDay>, FetchError> {
    let parsed: WaForecastResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(format!("forecast response: {e}")))?;

    let days: Vec<ForecastDay> = parsed
        .forecast
        .forecastday
        .into_iter()
        .map(|fd| {
            let astro = fd.astro.unwrap_or_default();
            ForecastDay {
                date: fd.date,
                condition_text: fd.day.condition.text,
                max_temp_c: fd.day.maxtemp_c,
                min_temp_c: fd.day.mintemp_c,
                avg_temp_c: fd.day.avgtemp_c,
                avg_humidity_pct: fd.day.avghumidity,
                chance_of_rain_pct: fd.day.daily_chance_of_rain,
                sunrise: astro.sunrise.filter(|s| !s.is_empty()),
                sunset: astro.sunset.filter(|s| !s.is_empty()),
            }
        })
        .collect();

    if let Some(pair) = days.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(FetchError::malformed(format!(
            "forecast response: dates not ascending ({} followed by {})",
            pair[0].date, pair[1].date
        )));
    }

    Ok(days)
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    region: String,
    country: String,
    lat: f64,
    lon: f64,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaAirQuality {
    co: Option<f64>,
    no2: Option<f64>,
    o3: Option<f64>,
    so2: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    #[serde(rename = "us-epa-index")]
    us_epa_index: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: f64,
    wind_kph: f64,
    condition: WaCondition,
    cloud: f64,
    uv: f64,
    dewpoint_c: f64,
    pressure_mb: f64,
    precip_mm: f64,
    vis_km: f64,
    air_quality: Option<WaAirQuality>,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    avghumidity: f64,
    condition: WaCondition,
    #[serde(default, deserialize_with = "number_or_string")]
    daily_chance_of_rain: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WaAstro {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
    astro: Option<WaAstro>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
}

/// Older API revisions send percentages as strings ("89").
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::String(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    #[instrument(skip(self))]
    async fn fetch(&self, city: &str) -> Result<WeatherReport, FetchError> {
        let (current, forecast) = self.fetch_raw(city).await.inspect_err(|err| {
            warn!(error = %err, "Weather fetch failed");
        })?;

        let report = WeatherReport {
            current: parse_current(&current.body)?,
            forecast: parse_forecast(&forecast.body)?,
        };

        debug!(days = report.forecast.len(), "Weather report ready");
        Ok(report)
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
