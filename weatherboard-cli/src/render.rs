//! Terminal rendering of a [`WeatherReport`].
//!
//! Everything here is presentation: the records arrive fully normalized from
//! `weatherboard-core` and are only formatted.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize, style};
use weatherboard_core::{
    AirQuality, CurrentConditions, FetchError, ForecastDay, Theme, WeatherReport,
};

const UNAVAILABLE: &str = "unavailable";
const TREND_WIDTH: usize = 32;
const CONDITION_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy)]
enum Role {
    Title,
    Heading,
    Label,
    Value,
    Warm,
    Cool,
    Error,
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    theme: Theme,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    fn paint(&self, text: &str, role: Role) -> String {
        match self.theme {
            Theme::Classic => text.to_string(),
            Theme::Dark => {
                let color = match role {
                    Role::Title => Color::White,
                    Role::Heading => Color::Cyan,
                    Role::Label => Color::Grey,
                    Role::Value => Color::White,
                    Role::Warm => Color::Rgb { r: 0xff, g: 0x6e, b: 0x6e },
                    Role::Cool => Color::Rgb { r: 0x1f, g: 0x77, b: 0xb4 },
                    Role::Error => Color::Yellow,
                };
                let styled = style(text).with(color);
                match role {
                    Role::Title | Role::Heading | Role::Error => styled.bold().to_string(),
                    _ => styled.to_string(),
                }
            }
        }
    }

    pub fn render_report<W: Write>(&self, out: &mut W, report: &WeatherReport) -> io::Result<()> {
        self.header(out, &report.current)?;
        self.metrics(out, &report.current)?;
        self.forecast_table(out, &report.forecast)?;
        self.temperature_trend(out, report)?;
        self.atmosphere(out, &report.current)?;
        self.astronomy(out, &report.forecast)?;
        self.air_quality(out, report.current.air_quality.as_ref())?;
        self.map(out, &report.current)?;
        out.flush()
    }

    pub fn render_error<W: Write>(&self, out: &mut W, err: &FetchError) -> io::Result<()> {
        writeln!(out, "{}", self.paint(&format!("⚠️ {}", err.user_message()), Role::Error))
    }

    fn heading<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.paint(text, Role::Heading))
    }

    fn field<W: Write>(&self, out: &mut W, label: &str, value: &str) -> io::Result<()> {
        writeln!(
            out,
            "  {} {}",
            self.paint(&format!("{label:<16}"), Role::Label),
            self.paint(value, Role::Value)
        )
    }

    fn header<W: Write>(&self, out: &mut W, cur: &CurrentConditions) -> io::Result<()> {
        let title = format!("{} {}", condition_icon(&cur.condition_text), cur.condition_text);
        writeln!(out, "{}", self.paint(&title, Role::Title))?;
        writeln!(out, "📍 {}, {}", cur.city, cur.region)?;
        writeln!(out, "🌍 {}", cur.country)?;
        writeln!(out, "🕓 Local Time: {}", cur.localtime)?;
        writeln!(out, "📌 Lat, Lon: {}, {}", cur.lat, cur.lon)
    }

    fn metrics<W: Write>(&self, out: &mut W, cur: &CurrentConditions) -> io::Result<()> {
        self.heading(out, "Now")?;
        self.field(out, "Temp (°C)", &cur.temp_c.to_string())?;
        self.field(out, "Feels Like", &cur.feelslike_c.to_string())?;
        self.field(out, "Humidity", &format!("{}%", cur.humidity_pct))?;
        self.field(out, "Wind", &format!("{} kph", cur.wind_kph))
    }

    fn forecast_table<W: Write>(&self, out: &mut W, days: &[ForecastDay]) -> io::Result<()> {
        self.heading(out, &format!("📅 {}-Day Forecast", days.len()))?;
        let header = format!(
            "  {:<10} {:<cw$} {:>7} {:>7} {:>7} {:>9} {:>7}",
            "Date",
            "Condition",
            "Max °C",
            "Min °C",
            "Avg °C",
            "Humidity",
            "Rain %",
            cw = CONDITION_WIDTH
        );
        writeln!(out, "{}", self.paint(&header, Role::Label))?;

        for day in days {
            writeln!(
                out,
                "  {:<10} {:<cw$} {:>7} {:>7} {:>7} {:>9} {:>7}",
                day.date.format("%a %d %b").to_string(),
                clip(&day.condition_text, CONDITION_WIDTH),
                day.max_temp_c,
                day.min_temp_c,
                day.avg_temp_c,
                format!("{}%", day.avg_humidity_pct),
                day.chance_of_rain_pct,
                cw = CONDITION_WIDTH
            )?;
        }
        Ok(())
    }

    fn temperature_trend<W: Write>(&self, out: &mut W, report: &WeatherReport) -> io::Result<()> {
        self.heading(out, "📈 Temperature Trend")?;
        let Some((lo, hi)) = report.temperature_range() else {
            return writeln!(out, "  no forecast days");
        };

        for day in &report.forecast {
            let (start, end) = bar_span(day.min_temp_c, day.max_temp_c, lo, hi, TREND_WIDTH);
            writeln!(
                out,
                "  {:<10} {:>6} {}{}{} {}",
                day.date.format("%a %d").to_string(),
                self.paint(&day.min_temp_c.to_string(), Role::Cool),
                " ".repeat(start),
                "█".repeat(end - start),
                " ".repeat(TREND_WIDTH - end),
                self.paint(&day.max_temp_c.to_string(), Role::Warm),
            )?;
        }
        Ok(())
    }

    fn atmosphere<W: Write>(&self, out: &mut W, cur: &CurrentConditions) -> io::Result<()> {
        self.heading(out, "📊 Atmospheric Metrics")?;
        self.field(out, "Cloud (%)", &cur.cloud_pct.to_string())?;
        self.field(out, "UV Index", &cur.uv_index.to_string())?;
        self.field(out, "Dew Point (°C)", &cur.dewpoint_c.to_string())?;
        self.field(out, "Pressure (mb)", &cur.pressure_mb.to_string())?;
        self.field(out, "Precip. (mm)", &cur.precip_mm.to_string())?;
        self.field(out, "Visibility (km)", &cur.visibility_km.to_string())
    }

    fn astronomy<W: Write>(&self, out: &mut W, days: &[ForecastDay]) -> io::Result<()> {
        self.heading(out, "🌅 Sunrise & Sunset")?;
        for day in days {
            writeln!(
                out,
                "  {:<10} ↑ {:<11} ↓ {}",
                day.date.format("%a %d %b").to_string(),
                day.sunrise.as_deref().unwrap_or(UNAVAILABLE),
                day.sunset.as_deref().unwrap_or(UNAVAILABLE),
            )?;
        }
        Ok(())
    }

    fn air_quality<W: Write>(&self, out: &mut W, aq: Option<&AirQuality>) -> io::Result<()> {
        self.heading(out, "🌫️ Air Quality")?;
        let Some(aq) = aq else {
            return writeln!(out, "  {UNAVAILABLE}");
        };

        let pollutants = [
            ("CO (μg/m³)", aq.co),
            ("NO₂ (μg/m³)", aq.no2),
            ("O₃ (μg/m³)", aq.o3),
            ("SO₂ (μg/m³)", aq.so2),
            ("PM2.5 (μg/m³)", aq.pm2_5),
            ("PM10 (μg/m³)", aq.pm10),
        ];
        for (label, value) in pollutants {
            let value = value.map_or_else(|| UNAVAILABLE.to_string(), |v| v.to_string());
            self.field(out, label, &value)?;
        }

        let epa = aq.us_epa_index.map_or_else(
            || UNAVAILABLE.to_string(),
            |idx| format!("{idx} ({})", epa_label(idx)),
        );
        self.field(out, "US EPA index", &epa)
    }

    fn map<W: Write>(&self, out: &mut W, cur: &CurrentConditions) -> io::Result<()> {
        self.heading(out, "🗺️ Map Location")?;
        writeln!(
            out,
            "  https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=5/{lat}/{lon}",
            lat = cur.lat,
            lon = cur.lon
        )
    }
}

/// Glyph shown next to the condition text.
pub fn condition_icon(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();
    if condition.contains("rain") {
        "🌧️"
    } else if condition.contains("sun") || condition.contains("clear") {
        "☀️"
    } else {
        "☁️"
    }
}

fn epa_label(index: u8) -> &'static str {
    match index {
        1 => "Good",
        2 => "Moderate",
        3 => "Unhealthy for sensitive groups",
        4 => "Unhealthy",
        5 => "Very unhealthy",
        6 => "Hazardous",
        _ => "Unknown",
    }
}

/// Column span `[start, end)` of a min..max bar on a `lo..hi` scale.
fn bar_span(min: f64, max: f64, lo: f64, hi: f64, width: usize) -> (usize, usize) {
    if hi <= lo {
        return (0, width);
    }
    let scale = |t: f64| {
        (((t - lo) / (hi - lo)) * width as f64).round().clamp(0.0, width as f64) as usize
    };
    let start = scale(min.min(max));
    let end = scale(max.max(min)).max(start + 1).min(width);
    (start.min(end - 1), end)
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(width - 1).collect();
        clipped.push('…');
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn report(air_quality: Option<AirQuality>) -> WeatherReport {
        let day = |d: u32, min: f64, max: f64, sunrise: Option<&str>| ForecastDay {
            date: NaiveDate::from_ymd_opt(2025, 7, d).unwrap(),
            condition_text: "Light rain shower".into(),
            max_temp_c: max,
            min_temp_c: min,
            avg_temp_c: (min + max) / 2.0,
            avg_humidity_pct: 70.0,
            chance_of_rain_pct: 64.0,
            sunrise: sunrise.map(str::to_string),
            sunset: sunrise.map(|_| "09:20 PM".to_string()),
        };

        WeatherReport {
            current: CurrentConditions {
                city: "Manchester".into(),
                region: "Greater Manchester".into(),
                country: "United Kingdom".into(),
                lat: 53.48,
                lon: -2.25,
                localtime: "2025-07-01 09:00".into(),
                temp_c: 17.5,
                feelslike_c: 17.0,
                humidity_pct: 72.0,
                wind_kph: 13.3,
                condition_text: "Sunny".into(),
                cloud_pct: 25.0,
                uv_index: 4.1,
                dewpoint_c: 11.2,
                pressure_mb: 1018.0,
                precip_mm: 0.0,
                visibility_km: 10.0,
                air_quality,
            },
            forecast: vec![day(1, 12.0, 20.0, Some("04:41 AM")), day(2, 10.0, 22.5, None)],
        }
    }

    fn render(theme: Theme, report: &WeatherReport) -> String {
        let mut buf = Vec::new();
        Renderer::new(theme).render_report(&mut buf, report).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn classic_output_has_every_section() {
        let out = render(Theme::Classic, &report(None));

        assert!(out.starts_with("☀️ Sunny"));
        assert!(out.contains("📍 Manchester, Greater Manchester"));
        assert!(out.contains("17.5"));
        assert!(out.contains("2-Day Forecast"));
        assert!(out.contains("Tue 01 Jul"));
        assert!(out.contains("Temperature Trend"));
        assert!(out.contains("1018"));
        assert!(out.contains("mlat=53.48&mlon=-2.25"));
        assert!(!out.contains('\u{1b}'), "classic theme must not emit ANSI escapes");
    }

    #[test]
    fn missing_astronomy_and_air_quality_are_marked_unavailable() {
        let out = render(Theme::Classic, &report(None));

        assert!(out.contains("04:41 AM"));
        assert!(out.contains("Wed 02 Jul ↑ unavailable"));
        assert!(out.contains("Air Quality\n  unavailable"));
    }

    #[test]
    fn air_quality_figures_are_shown() {
        let aq = AirQuality { pm2_5: Some(8.5), us_epa_index: Some(2), ..Default::default() };
        let out = render(Theme::Classic, &report(Some(aq)));

        assert!(out.contains("8.5"));
        assert!(out.contains("2 (Moderate)"));
    }

    #[test]
    fn dark_theme_adds_colour() {
        let out = render(Theme::Dark, &report(None));
        assert!(out.contains('\u{1b}'));
        assert!(out.contains("Manchester"));
    }

    #[test]
    fn error_is_rendered_with_user_message() {
        let mut buf = Vec::new();
        let err = FetchError::ApiError { status_current: 401, status_forecast: 200 };
        Renderer::new(Theme::Classic).render_error(&mut buf, &err).unwrap();

        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "⚠️ API Error: Status Code 401 or 200. Please check the API key or city.\n"
        );
    }

    #[test]
    fn icon_heuristic() {
        assert_eq!(condition_icon("Patchy rain nearby"), "🌧️");
        assert_eq!(condition_icon("Clear"), "☀️");
        assert_eq!(condition_icon("Sunny"), "☀️");
        assert_eq!(condition_icon("Overcast"), "☁️");
    }

    #[test]
    fn bar_span_covers_scale() {
        assert_eq!(bar_span(10.0, 20.0, 10.0, 20.0, 10), (0, 10));
        assert_eq!(bar_span(15.0, 20.0, 10.0, 20.0, 10), (5, 10));
        assert_eq!(bar_span(20.0, 20.0, 10.0, 20.0, 10), (9, 10));
        assert_eq!(bar_span(5.0, 5.0, 5.0, 5.0, 10), (0, 10));
    }

    #[test]
    fn clip_long_conditions() {
        assert_eq!(clip("Sunny", 10), "Sunny");
        assert_eq!(clip("Patchy light rain with thunder", 10), "Patchy li…");
    }
}
