//! The [`StateReporter`] capability and its sink.

use potts_core::{CellId, EnergyError, Vec3};

use crate::context::EnergyContext;
use crate::contributor::Plugin;

/// A reported value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReportValue {
    /// A scalar.
    Scalar(f64),
    /// A vector.
    Vector(Vec3),
}

/// One named per-cell value.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// The cell the value describes.
    pub cell: CellId,
    /// Value name, e.g. `"persistent_motion.direction"`.
    pub name: String,
    /// The value.
    pub value: ReportValue,
}

/// Receives reports from [`StateReporter`]s.
pub trait ReportSink {
    /// Accept one report.
    fn record(&mut self, report: Report);
}

impl ReportSink for Vec<Report> {
    fn record(&mut self, report: Report) {
        self.push(report);
    }
}

/// A read-only observer that publishes per-cell values.
pub trait StateReporter: Plugin {
    /// Push the current values to `sink`.
    fn report(&self, ctx: &EnergyContext<'_>, sink: &mut dyn ReportSink) -> Result<(), EnergyError>;
}
