use gridintel_core::RawRecord;

use crate::aggregate::MergedRecord;
use crate::summary::RunSummary;

/// Destination for a run's output.
pub trait RecordSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Records as extracted and classified, before enrichment.
    ///
    /// # Errors
    ///
    /// Implementation-defined write failure.
    fn write_raw(&mut self, records: &[RawRecord]) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Implementation-defined write failure.
    fn write_merged(&mut self, records: &[MergedRecord]) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Implementation-defined write failure.
    fn write_summary(&mut self, summary: &RunSummary) -> Result<(), Self::Error>;
}
