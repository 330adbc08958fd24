//! Plain-text rendering of dashboard snapshots: current-weather blocks, a
//! forecast table, and per-location summary insights.

use weatherdash_core::{
    CityWeather, CurrentObservation, DashboardSnapshot, ForecastSeries, TemperatureUnit,
};

pub fn snapshot(snapshot: &DashboardSnapshot, unit: TemperatureUnit) {
    current_block(&snapshot.primary.current);
    if let Some(second) = &snapshot.comparison {
        current_block(&second.current);
    }

    forecast_table(&snapshot.combined, unit);

    insights(&snapshot.primary, unit);
    if let Some(second) = &snapshot.comparison {
        insights(second, unit);
    }
}

fn current_block(obs: &CurrentObservation) {
    println!();
    println!("=== {} ===", obs.location);
    println!("Temperature: {:.2} {}", obs.temperature, obs.unit);
    println!("Humidity:    {:.2} %", f64::from(obs.humidity_pct));
    println!("Condition:   {} ({})", obs.condition, obs.icon_url());
    println!("Coordinates: {:.2}, {:.2}", obs.latitude, obs.longitude);
    println!(
        "Updated:     {}",
        obs.observed_at.format("%Y-%m-%d %H:%M UTC")
    );
}

fn forecast_table(series: &ForecastSeries, unit: TemperatureUnit) {
    println!();
    println!(
        "{:<17} {:<16} {:>9} {:>7} {:>9} {:>7}  {}",
        "TIME",
        "LOCATION",
        format!("TEMP {unit}"),
        "HUM %",
        "WIND m/s",
        "RAIN %",
        "CONDITION"
    );

    for record in &series.records {
        println!(
            "{:<17} {:<16} {:>9.2} {:>7.2} {:>9.2} {:>7.2}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            record.location,
            record.temperature,
            f64::from(record.humidity_pct),
            record.wind_speed_mps,
            record.precip_prob_pct,
            record.condition,
        );
    }
}

fn insights(city: &CityWeather, unit: TemperatureUnit) {
    let Some(summary) = city.forecast.summary() else {
        return;
    };

    println!();
    println!("--- {} forecast summary ---", city.current.location);
    println!("Avg temperature: {:.2} {}", summary.avg_temperature, unit);
    println!("Max temperature: {:.2} {}", summary.max_temperature, unit);
    println!("Min temperature: {:.2} {}", summary.min_temperature, unit);
    println!("Avg wind speed:  {:.2} m/s", summary.avg_wind_speed_mps);
    println!("Rainy periods (>50%): {}", summary.rainy_periods);
}
