use super::{FieldReport, Formatter};

/// One row per grid cell; empty `signal_dbm` marks no data
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &FieldReport) -> String {
        report
            .cells
            .iter()
            .map(|c| {
                let signal = c.signal_dbm.map_or(String::new(), |v| format!("{:.2}", v));
                format!(
                    "{},{},{:.3},{:.3},{},{}",
                    c.col,
                    c.row,
                    c.x,
                    c.y,
                    signal,
                    c.band.label()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(&self) -> Option<&'static str> {
        Some("col,row,x,y,signal_dbm,band")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emitter;
    use crate::geometry::Point;
    use crate::output::tests::sample_report;

    #[test]
    fn test_rows_per_cell() {
        let emitters = vec![Emitter::new("a", Point::new(5.0, 5.0), -30.0, 2437.0)];
        let (report, grid) = sample_report(&emitters);
        let csv = CsvFormatter.format(&report);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), grid.len());
        assert_eq!(lines[0], "0,0,5.000,5.000,-30.00,excellent");
        assert_eq!(CsvFormatter.header().unwrap().split(',').count(), 6);
    }

    #[test]
    fn test_missing_signal_is_empty_field() {
        let (report, _) = sample_report(&[]);
        let csv = CsvFormatter.format(&report);
        assert!(csv.lines().all(|l| l.contains(",,no signal")));
    }
}
