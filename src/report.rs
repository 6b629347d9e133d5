use chrono::{DateTime, Local};
use log::info;
use std::io::{self, Write};
use std::time::Duration;

use crate::aggregate::PairTally;

/// What the coordinator knows once the reduction has landed
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub bound: u64,
    pub launched: usize,
    pub active: usize,
    pub tally: PairTally,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn log(&self) {
        let elapsed_us = self.elapsed.as_micros();
        info!(
            "{} | n={} | ranks {}/{} | interior {} boundary {} base {} | total {} | {}us ({:.2}ms)",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.bound,
            self.active,
            self.launched,
            self.tally.interior,
            self.tally.boundary,
            self.tally.base,
            self.tally.total(),
            elapsed_us,
            elapsed_us as f64 / 1000.0
        );
    }
}

/// Write the final count as a single line
pub fn write_count<W: Write>(writer: &mut W, count: u64) -> io::Result<()> {
    let mut itoa_buf = itoa::Buffer::new();
    writer.write_all(itoa_buf.format(count).as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_count_single_line() {
        let mut out = Vec::new();
        write_count(&mut out, 411).unwrap();
        assert_eq!(out, b"411\n");

        let mut out = Vec::new();
        write_count(&mut out, 0).unwrap();
        assert_eq!(out, b"0\n");
    }
}
