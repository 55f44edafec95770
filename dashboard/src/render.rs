use std::{sync::Arc, thread, time::Duration};

use roomsense_core::{LightState, Reading};

use crate::{history, ingest::IngestService, store::PartitionStore};

const CHART_HEIGHT: usize = 10;
const CHART_WIDTH: usize = 60;

/// The dashboard loop: poll the ingestion service, repaint, sleep, repeat.
/// The process itself is the loop driver.
pub fn run(ingest: Arc<IngestService>, store: Arc<PartitionStore>, refresh: Duration) -> ! {
    let mut current: Option<Reading> = None;

    loop {
        ingest.start(Arc::clone(&store));

        if let Some(reading) = ingest.pop_queued() {
            current = Some(reading);
        } else if current.is_none() {
            current = ingest.latest();
        }

        let history = history::load_current_partition(&store);

        print!("\x1b[2J\x1b[H");
        print!("{}", status_panel(current.as_ref(), ingest.is_running()));
        println!();
        print!("{}", trend_section(&history));

        thread::sleep(refresh);
    }
}

fn status_panel(current: Option<&Reading>, connected: bool) -> String {
    let mut panel = String::new();
    panel.push_str("roomsense dashboard\n");
    panel.push_str("===================\n");

    match current {
        Some(reading) => {
            panel.push_str(&format!("Light:       {}\n", light_line(reading)));
            panel.push_str(&format!("Temperature: {:.1} °C\n", reading.temperature));
            panel.push_str(&format!("Humidity:    {:.1} %\n", reading.humidity));
            panel.push_str(&format!("Last update: {}\n", reading.timestamp));
        }
        None => panel.push_str("Waiting for sensor data...\n"),
    }

    panel.push_str(&format!(
        "Broker:      {}\n",
        if connected { "connected" } else { "disconnected" }
    ));

    panel
}

fn light_line(reading: &Reading) -> String {
    match reading.light_state() {
        LightState::On => "on".to_string(),
        LightState::Off => "off".to_string(),
        LightState::Unrecognized => format!("'{}' (unrecognized)", reading.light_status),
    }
}

fn trend_section(history: &[Reading]) -> String {
    if history.is_empty() {
        return "No readings stored today yet.\n".to_string();
    }

    let mut section = render_chart(history);

    let count = history.len();
    let mean_temperature = history.iter().map(|r| r.temperature).sum::<f64>() / count as f64;
    let mean_humidity = history.iter().map(|r| r.humidity).sum::<f64>() / count as f64;
    section.push_str(&format!(
        "Average temperature: {mean_temperature:.1} °C   Average humidity: {mean_humidity:.1} %   Records: {count}\n"
    ));

    section
}

/// Dual-axis character chart: temperature on the left axis, humidity on the
/// right. History is resampled across the terminal width.
fn render_chart(history: &[Reading]) -> String {
    let width = history.len().min(CHART_WIDTH);
    let column_index = |column: usize| column * history.len() / width;

    let temperatures: Vec<f64> = (0..width)
        .map(|column| history[column_index(column)].temperature)
        .collect();
    let humidities: Vec<f64> = (0..width)
        .map(|column| history[column_index(column)].humidity)
        .collect();

    let (t_min, t_max) = series_bounds(&temperatures);
    let (h_min, h_max) = series_bounds(&humidities);

    let mut grid = vec![vec![' '; width]; CHART_HEIGHT];
    for (column, value) in temperatures.iter().enumerate() {
        grid[row_for(*value, t_min, t_max)][column] = '*';
    }
    for (column, value) in humidities.iter().enumerate() {
        let row = row_for(*value, h_min, h_max);
        grid[row][column] = if grid[row][column] == '*' { '#' } else { '+' };
    }

    let mut chart = String::new();
    for (row, cells) in grid.iter().enumerate() {
        let left = axis_label(row, t_max, t_min);
        let right = axis_label(row, h_max, h_min);
        let line: String = cells.iter().collect();
        chart.push_str(&format!("{left:>7} |{line}| {right}\n"));
    }
    chart.push_str(&format!("{:>7} +{}+\n", "", "-".repeat(width)));
    chart.push_str(&format!(
        "{:>8}* temperature (°C, left)   + humidity (%, right)   # both\n",
        ""
    ));

    chart
}

fn axis_label(row: usize, top: f64, bottom: f64) -> String {
    if row == 0 {
        format!("{top:.1}")
    } else if row == CHART_HEIGHT - 1 {
        format!("{bottom:.1}")
    } else {
        String::new()
    }
}

fn series_bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

fn row_for(value: f64, min: f64, max: f64) -> usize {
    if max - min < f64::EPSILON {
        return CHART_HEIGHT / 2;
    }
    let normalized = (value - min) / (max - min);
    ((1.0 - normalized) * (CHART_HEIGHT - 1) as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(timestamp: &str, light: &str, temperature: f64, humidity: f64) -> Reading {
        Reading {
            timestamp: timestamp.to_string(),
            light_status: light.to_string(),
            temperature,
            humidity,
        }
    }

    #[test]
    fn panel_shows_waiting_without_data() {
        let panel = status_panel(None, false);
        assert!(panel.contains("Waiting for sensor data"));
        assert!(panel.contains("disconnected"));
    }

    #[test]
    fn panel_shows_reading_and_connection() {
        let reading = reading("2026-08-07 10:00:00", "on", 23.54, 55.0);
        let panel = status_panel(Some(&reading), true);
        assert!(panel.contains("Light:       on"));
        assert!(panel.contains("Temperature: 23.5 °C"));
        assert!(panel.contains("Humidity:    55.0 %"));
        assert!(panel.contains("Last update: 2026-08-07 10:00:00"));
        assert!(panel.contains("Broker:      connected"));
    }

    #[test]
    fn panel_warns_on_unrecognized_light_value() {
        let reading = reading("2026-08-07 10:00:00", "開", 23.5, 55.0);
        let panel = status_panel(Some(&reading), true);
        assert!(panel.contains("'開' (unrecognized)"));
    }

    #[test]
    fn empty_history_renders_placeholder() {
        assert_eq!(trend_section(&[]), "No readings stored today yet.\n");
    }

    #[test]
    fn stats_line_has_means_and_count() {
        let history = vec![
            reading("2026-08-07 10:00:00", "on", 20.0, 40.0),
            reading("2026-08-07 10:00:05", "on", 30.0, 60.0),
        ];
        let section = trend_section(&history);
        assert!(section.contains("Average temperature: 25.0 °C"));
        assert!(section.contains("Average humidity: 50.0 %"));
        assert!(section.contains("Records: 2"));
    }

    #[test]
    fn chart_spans_both_axes() {
        let history = vec![
            reading("2026-08-07 10:00:00", "on", 20.0, 60.0),
            reading("2026-08-07 10:00:05", "on", 30.0, 40.0),
        ];
        let chart = render_chart(&history);
        let lines: Vec<&str> = chart.lines().collect();

        // Top row carries both maxima; the rising series ends there, the
        // falling one starts there.
        assert!(lines[0].contains("30.0"));
        assert!(lines[0].contains("60.0"));
        assert!(lines[0].contains('*'));
        assert!(lines[0].contains('+'));
        assert!(lines[CHART_HEIGHT - 1].contains("20.0"));
        assert!(lines[CHART_HEIGHT - 1].contains("40.0"));
    }

    #[test]
    fn flat_series_sits_mid_chart() {
        let history = vec![reading("2026-08-07 10:00:00", "on", 22.0, 50.0)];
        let chart = render_chart(&history);
        let lines: Vec<&str> = chart.lines().collect();
        // Both series collapse onto the same mid-row cell.
        assert!(lines[CHART_HEIGHT / 2].contains('#'));
    }
}
