//! JSON file sink for a run's output.
//!
//! Files written under the output directory:
//!
//! | File | Contents |
//! |------|----------|
//! | `raw_data.json` | classified records before enrichment |
//! | `analyzed_data.json` | merged records, pretty-printed array |
//! | `analyzed_data.jsonl` | merged records, one flat row per line |
//! | `strategic_summary.json` | run summary statistics |

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use gridintel_core::RawRecord;
use gridintel_enrich::{MergedRecord, RecordSink, RunSummary};
use serde::Serialize;

pub(crate) const RAW_FILE: &str = "raw_data.json";
pub(crate) const ANALYZED_FILE: &str = "analyzed_data.json";
pub(crate) const ANALYZED_ROWS_FILE: &str = "analyzed_data.jsonl";
pub(crate) const SUMMARY_FILE: &str = "strategic_summary.json";

/// Writes each output as a file in one directory, replacing earlier files.
#[derive(Debug)]
pub(crate) struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    /// Creates `dir` (and parents) if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be created.
    pub(crate) fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn write_pretty<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> io::Result<()> {
        let path = self.dir.join(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "wrote output file");
        Ok(())
    }
}

impl RecordSink for JsonFileSink {
    type Error = io::Error;

    fn write_raw(&mut self, records: &[RawRecord]) -> io::Result<()> {
        self.write_pretty(RAW_FILE, records)
    }

    fn write_merged(&mut self, records: &[MergedRecord]) -> io::Result<()> {
        self.write_pretty(ANALYZED_FILE, records)?;

        let path = self.dir.join(ANALYZED_ROWS_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        tracing::info!(path = %path.display(), rows = records.len(), "wrote output file");
        Ok(())
    }

    fn write_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.write_pretty(SUMMARY_FILE, summary)
    }
}
