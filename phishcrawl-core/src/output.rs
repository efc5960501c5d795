// JSON Lines record sink: one serialized FeatureRecord per line

use crate::error::Result;
use phishcrawl_scanner::FeatureRecord;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub struct RecordWriter {
    out: BufWriter<Box<dyn Write + Send>>,
    written: usize,
    destination: String,
}

impl RecordWriter {
    /// Write to `path`, or to stdout when the path is absent or `-`
    pub fn create(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path != Path::new("-") => {
                let file = File::create(path)?;
                Ok(Self::from_writer(
                    Box::new(file),
                    path.display().to_string(),
                ))
            }
            _ => Ok(Self::from_writer(Box::new(io::stdout()), "stdout".to_string())),
        }
    }

    pub fn from_writer(out: Box<dyn Write + Send>, destination: String) -> Self {
        Self {
            out: BufWriter::new(out),
            written: 0,
            destination,
        }
    }

    pub fn write(&mut self, record: &FeatureRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Flush buffered records and return how many were written
    pub fn finish(mut self) -> Result<usize> {
        self.out.flush()?;
        Ok(self.written)
    }
}
