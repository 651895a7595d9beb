//! # pulse-to-freq
//!
//! Line filter converting pulse counts into frequency labels. Each stdin
//! line holding an integer count of pulses seen during one sampling period
//! becomes `<count / period>Hz` on stdout. Lines that are not integers are
//! reported on stderr and passed through unchanged.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Length of the sampling period the counts were taken over.
const SAMPLE_DURATION_SECS: f64 = 0.5;

/// Converts one input line. `Err` carries the line back unchanged.
fn convert(line: &str) -> Result<String, &str> {
    let count: i64 = line.trim().parse().map_err(|_| line)?;
    let hz = (count as f64 / SAMPLE_DURATION_SECS).trunc() as i64;
    Ok(format!("{}Hz", hz))
}

/// Filters `input` line by line into `output`.
///
/// Lines that do not hold an integer, including lines that are not valid
/// UTF-8, are reported on `diagnostics` and written back byte for byte.
/// Only I/O errors stop the filter.
fn run(mut input: impl BufRead, mut output: impl Write, mut diagnostics: impl Write) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).context("reading stdin")? == 0 {
            return Ok(());
        }
        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);

        let converted = std::str::from_utf8(raw)
            .ok()
            .and_then(|line| convert(line).ok());
        let written = match converted {
            Some(label) => writeln!(output, "{}", label),
            None => {
                writeln!(diagnostics, "can't convert '{}'", String::from_utf8_lossy(raw))
                    .context("writing stderr")?;
                output.write_all(raw).and_then(|()| output.write_all(b"\n"))
            }
        };
        written.context("writing stdout")?;
        output.flush().context("flushing stdout")?;
    }
}

fn main() -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(stdin.lock(), stdout.lock(), io::stderr())
}
