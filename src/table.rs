//! Dry-run table rendering using comfy-table

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};

use crate::keystore::date::format_timestamp;
use crate::keystore::CertificateRecord;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days from `now` until `end_date`, negative once expired.
pub fn days_left(end_date: i64, now: i64) -> i64 {
    (end_date - now).div_euclid(SECONDS_PER_DAY)
}

/// Formats scanned certificates as a table, relative to `now` (epoch seconds).
pub fn certificate_table(certs: &[(String, CertificateRecord)], now: i64) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let header_cells: Vec<Cell> = ["Alias", "Valid from", "Valid until", "Days left"]
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for (alias, record) in certs {
        let days = days_left(record.end_date, now);
        let days_cell = if days < 0 {
            Cell::new(days).fg(Color::Red)
        } else {
            Cell::new(days).fg(Color::Green)
        };

        table.add_row(vec![
            Cell::new(alias),
            Cell::new(render_date(record.start_date)),
            Cell::new(render_date(record.end_date)),
            days_cell,
        ]);
    }

    table.to_string()
}

fn render_date(timestamp: i64) -> String {
    format_timestamp(timestamp).unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_left() {
        assert_eq!(days_left(10 * SECONDS_PER_DAY, 0), 10);
        assert_eq!(days_left(10 * SECONDS_PER_DAY - 1, 0), 9);
        assert_eq!(days_left(0, 1), -1);
    }

    #[test]
    fn test_certificate_table() {
        let certs = vec![
            (
                "tomcat".to_string(),
                CertificateRecord {
                    start_date: 1_672_671_845,
                    end_date: 1_704_207_845,
                },
            ),
            (
                "old-root".to_string(),
                CertificateRecord {
                    start_date: 0,
                    end_date: 86_400,
                },
            ),
        ];

        let rendered = certificate_table(&certs, 1_672_671_845);

        assert!(rendered.contains("Alias"));
        assert!(rendered.contains("tomcat"));
        assert!(rendered.contains("old-root"));
        assert!(rendered.contains("365"));
        assert!(rendered.contains(&format_timestamp(1_704_207_845).unwrap()));
    }
}
