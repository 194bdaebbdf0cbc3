use crate::model::{AggregateSnapshot, TelemetryRecord};
use crate::units::{format_difficulty, format_hash_rate, format_power};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};

const MISSING: &str = "—";

/// Render found nodes with a fleet totals footer
pub fn render_results(records: &[TelemetryRecord], aggregate: &AggregateSnapshot) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(vec!["IP", "Hashrate", "Temp", "Power", "Best Diff"]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.address),
            Cell::new(
                record
                    .hash_rate_ghs
                    .map_or_else(|| MISSING.to_string(), format_hash_rate),
            ),
            Cell::new(format_temperature(record.temperature_c)),
            Cell::new(format!("{} W", format_power(record.power_w))),
            Cell::new(record.best_difficulty.as_deref().unwrap_or(MISSING)),
        ]);
    }

    table.add_row(vec![
        Cell::new(format!("{} device(s)", aggregate.device_count)).add_attribute(Attribute::Bold),
        Cell::new(format_hash_rate(aggregate.total_hash_rate_ghs)).add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(format!("{} W", format_power(Some(aggregate.total_power_w))))
            .add_attribute(Attribute::Bold),
        Cell::new(format_difficulty(aggregate.overall_best_difficulty))
            .add_attribute(Attribute::Bold),
    ]);

    table.to_string()
}

/// One-line form used while partial results stream in
pub fn render_partial(record: &TelemetryRecord) -> String {
    format!(
        "Found {} | {} | {} | {} W | BD {}",
        record.address,
        format_hash_rate(record.hash_rate_ghs.unwrap_or(0.0)),
        format_temperature(record.temperature_c),
        format_power(record.power_w),
        record.best_difficulty.as_deref().unwrap_or(MISSING)
    )
}

fn format_temperature(temp: Option<f64>) -> String {
    match temp {
        Some(t) if t.is_finite() => format!("{:.1}°C", t),
        _ => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rows_and_totals() {
        let records = vec![TelemetryRecord {
            hash_rate_ghs: Some(1500.0),
            temperature_c: Some(61.25),
            power_w: Some(15.0),
            best_difficulty: Some("2.5M".to_string()),
            ..TelemetryRecord::new("192.168.1.20")
        }];
        let aggregate = AggregateSnapshot {
            total_hash_rate_ghs: 1500.0,
            total_power_w: 15.0,
            device_count: 1,
            overall_best_difficulty: 2_500_000.0,
        };

        let rendered = render_results(&records, &aggregate);
        assert!(rendered.contains("192.168.1.20"));
        assert!(rendered.contains("1.50 TH/s"));
        assert!(rendered.contains("15.00 W"));
        assert!(rendered.contains("2.50M"));
        assert!(rendered.contains("1 device(s)"));
    }

    #[test]
    fn partial_line_tolerates_missing_fields() {
        let line = render_partial(&TelemetryRecord {
            power_w: Some(3.0),
            ..TelemetryRecord::new("10.0.0.8")
        });
        assert_eq!(line, "Found 10.0.0.8 | 0.00 GH/s | — | 3.00 W | BD —");
    }
}
