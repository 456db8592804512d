use crate::error::Result;
use crate::logic::advisory::{ConnectionStatus, RiskReport, SprayAdvisory};
use crate::models::{DiseaseRiskAssessment, WeatherForecast, WetnessWindowMetrics};
use serde::Serialize;
use std::fmt::Write;

const RULE: &str = "────────────────────────────────────────────";

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_advisory(advisory: &SprayAdvisory) -> String {
    let mut out = String::new();
    let decision = &advisory.decision;

    let _ = writeln!(
        out,
        "{} {}",
        decision.recommendation.symbol(),
        decision.recommendation
    );
    let _ = writeln!(out, "  {}", decision.reason);
    if let Some(ref rule) = decision.vetoed_by {
        let _ = writeln!(out, "  (vetoed by {})", rule);
    }
    let _ = writeln!(out, "{}", RULE);

    match advisory.primary {
        Some(ref primary) => {
            let _ = writeln!(
                out,
                "Primary risk:   {} {}% ({})",
                primary.name, primary.value, primary.status
            );
        }
        None => {
            let _ = writeln!(out, "Primary risk:   unavailable");
        }
    }

    match advisory.current {
        Some(current) => {
            let _ = writeln!(
                out,
                "Current:        {:.1}°C, wind {:.1} km/h",
                current.temp_celsius, current.wind_speed_kmh
            );
        }
        None => {
            let _ = writeln!(out, "Current:        unavailable");
        }
    }

    match advisory.forecast {
        Some(forecast) => {
            let _ = writeln!(
                out,
                "Rain:           in {:.0} h ({}% chance)",
                forecast.rain_in_next_hours, forecast.chance_of_rain_percent
            );
        }
        None => {
            let _ = writeln!(out, "Rain:           unavailable");
        }
    }

    if let Some(ref risk) = advisory.risk {
        let _ = writeln!(out, "{}", RULE);
        out.push_str(&render_risk_report(risk));
    }

    let _ = writeln!(
        out,
        "Generated {}",
        advisory.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    out
}

pub fn render_risk_report(report: &RiskReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Disease risk {} to {} ({} readings)",
        report.from, report.to, report.readings
    );
    out.push_str(&render_metrics(&report.metrics));
    out.push('\n');
    for assessment in &report.assessments {
        out.push_str(&render_assessment(assessment));
    }
    out
}

fn render_metrics(metrics: &WetnessWindowMetrics) -> String {
    if !metrics.has_wetness() {
        return format!(
            "  No leaf wetness recorded, avg humidity {:.2}%\n",
            metrics.overall_avg_humidity
        );
    }
    format!(
        "  Wetness {:.1} h at {:.2}°C, avg humidity {:.2}%\n",
        metrics.total_wetness_hours, metrics.avg_temp_during_wetness, metrics.overall_avg_humidity
    )
}

fn render_assessment(assessment: &DiseaseRiskAssessment) -> String {
    format!(
        "  {} {:<20} {:>3}%  {}\n",
        assessment.status.symbol(),
        assessment.name,
        assessment.value,
        assessment.status
    )
}

pub fn render_forecast(forecast: &WeatherForecast) -> String {
    let mut out = String::new();
    let location = &forecast.location;
    if location.country.is_empty() {
        let _ = writeln!(out, "Forecast for {}", location.city);
    } else {
        let _ = writeln!(out, "Forecast for {}, {}", location.city, location.country);
    }
    let _ = writeln!(out, "{}", RULE);

    if forecast.entries.is_empty() {
        let _ = writeln!(out, "  No forecast entries");
        return out;
    }

    for entry in &forecast.entries {
        let badge = if entry.is_ideal_for_spraying() {
            "  [ideal]"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {} {} {:>5.1}°C {:>4.1} m/s {:>3.0}%  {}{}",
            entry.timestamp.format("%a %H:%M"),
            entry.condition.symbol(),
            entry.temperature_celsius,
            entry.wind_speed_mps,
            entry.precipitation_prob * 100.0,
            entry.description,
            badge
        );
    }
    out
}

pub fn render_connections(status: &ConnectionStatus, rules: &[(&str, &str)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Field station:  {}", online(status.device));
    let forecast = match status.openweathermap {
        Some(ok) => online(ok),
        None => "not configured",
    };
    let _ = writeln!(out, "OpenWeatherMap: {}", forecast);

    let _ = writeln!(out, "Spray vetoes (in order):");
    for (id, name) in rules {
        let _ = writeln!(out, "  {:<15} {}", id, name);
    }
    out
}

fn online(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "OFFLINE"
    }
}
