use super::{FieldReport, Formatter, NO_COVERAGE_MESSAGE};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &FieldReport) -> String {
        let mut out = format!(
            "Field: {}x{} cells of {:.2} ({:?}, n={:.2})\n",
            report.columns, report.rows, report.cell_size, report.model, report.path_loss_exponent
        );

        let Some(signal) = &report.signal else {
            out.push_str(NO_COVERAGE_MESSAGE);
            return out;
        };

        out.push_str(&format!(
            "Signal: mean {:>6.1} dBm, min {:>6.1}, max {:>6.1}\n",
            signal.mean, signal.min, signal.max
        ));
        out.push_str(&format!("Usable: {:.1}%\n", report.usable_fraction * 100.0));

        let total: usize = report.bands.iter().map(|b| b.cells).sum();
        for count in &report.bands {
            let pct = if total > 0 {
                count.cells as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            out.push_str(&format!(
                "  {:<10} {:>8} ({:>5.1}%)\n",
                count.band.label(),
                count.cells,
                pct
            ));
        }

        if self.verbose {
            for e in &report.emitters {
                out.push_str(&format!(
                    "Emitter {}: ({:.1}, {:.1}) tx {:.1} dBm @ {:.0} MHz, radius {:.1}\n",
                    e.id, e.x, e.y, e.tx_power_dbm, e.frequency_mhz, e.coverage_radius
                ));
            }
        }
        out
    }
}
