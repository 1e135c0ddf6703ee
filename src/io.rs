//! Tab-separated file I/O for qBED/BED event tables, blocks, bedGraph
//! tracks, peaks, and the intermediate peak-calling CSV (spec.md §6).

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{BlockifyError, Result};
use crate::event::Event;
use crate::interval::Interval;
use crate::normalization::NormalizedRegion;
use crate::peaks::{Peak, PeakRecord};

/// A streaming, line-oriented TSV reader that skips blank, `#`, `track`,
/// and `browser` lines, tracking line numbers for parse errors.
struct TsvReader<R: BufRead> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl<R: BufRead> TsvReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::with_capacity(256),
        }
    }

    fn next_line(&mut self) -> Result<Option<&str>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }
            return Ok(Some(line));
        }
    }
}

fn parse_coord(s: &str, line: usize, field: &str) -> Result<i64> {
    s.parse().map_err(|_| BlockifyError::Parse {
        line,
        message: format!("invalid {field} coordinate: '{s}'"),
    })
}

/// Read a qBED/BED event table: `chrom<TAB>start<TAB>end[<TAB>weight[...]]`.
/// Column 4, if present, is the event weight (defaults to `1.0`); any
/// further columns are ignored.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let file = File::open(path)?;
    read_events_from(BufReader::new(file))
}

pub fn read_events_from<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut tsv = TsvReader::new(reader);
    let mut events = Vec::new();
    while let Some(line) = tsv.next_line()? {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(BlockifyError::Parse {
                line: tsv.line_number,
                message: format!("expected at least 3 fields, got {}", fields.len()),
            });
        }
        let start = parse_coord(fields[1], tsv.line_number, "start")?;
        let end = parse_coord(fields[2], tsv.line_number, "end")?;
        if start >= end {
            return Err(BlockifyError::Parse {
                line: tsv.line_number,
                message: format!("start ({start}) must be < end ({end})"),
            });
        }
        let weight = match fields.get(3) {
            Some(w) => w.parse().map_err(|_| BlockifyError::Parse {
                line: tsv.line_number,
                message: format!("invalid weight: '{w}'"),
            })?,
            None => 1.0,
        };
        events.push(Event::new(fields[0], start, end, weight));
    }
    Ok(events)
}

/// Read a BED3 interval table (regions / background files).
pub fn read_intervals<P: AsRef<Path>>(path: P) -> Result<Vec<Interval>> {
    let file = File::open(path)?;
    read_intervals_from(BufReader::new(file))
}

pub fn read_intervals_from<R: BufRead>(reader: R) -> Result<Vec<Interval>> {
    let mut tsv = TsvReader::new(reader);
    let mut intervals = Vec::new();
    while let Some(line) = tsv.next_line()? {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(BlockifyError::Parse {
                line: tsv.line_number,
                message: format!("expected at least 3 fields, got {}", fields.len()),
            });
        }
        let start = parse_coord(fields[1], tsv.line_number, "start")?;
        let end = parse_coord(fields[2], tsv.line_number, "end")?;
        intervals.push(Interval::new(fields[0], start, end));
    }
    Ok(intervals)
}

/// Write blocks: `chrom<TAB>start<TAB>end`, no header.
pub fn write_blocks<W: Write>(writer: &mut W, blocks: &[Interval]) -> io::Result<()> {
    for b in blocks {
        writeln!(writer, "{}\t{}\t{}", b.chrom, b.start, b.end)?;
    }
    Ok(())
}

/// Write a bedGraph-style normalized track: `chrom<TAB>start<TAB>end<TAB>value`.
pub fn write_bedgraph<W: Write>(writer: &mut W, regions: &[NormalizedRegion]) -> io::Result<()> {
    for r in regions {
        writeln!(writer, "{}\t{}\t{}\t{}", r.chrom, r.start, r.end, r.value)?;
    }
    Ok(())
}

/// Write BED6 peaks: `chrom<TAB>start<TAB>end<TAB>name<TAB>score<TAB>strand`.
pub fn write_peaks<W: Write>(writer: &mut W, peaks: &[Peak]) -> io::Result<()> {
    for p in peaks {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            p.chrom, p.start, p.end, p.name, p.score, p.strand
        )?;
    }
    Ok(())
}

/// Write the intermediate peak-calling CSV (header row, optional
/// correction columns appended when present on the first row).
pub fn write_intermediate_csv<W: Write>(writer: &mut W, rows: &[PeakRecord]) -> io::Result<()> {
    let has_correction = rows.first().map(|r| r.corrected_p_value.is_some()).unwrap_or(false);
    if has_correction {
        writeln!(
            writer,
            "chrom,start,end,Input,Background,Normed_bg,Net_density,pValue,negLog10pValue,corrected_pValue,negLog10corrected,rejected"
        )?;
    } else {
        writeln!(
            writer,
            "chrom,start,end,Input,Background,Normed_bg,Net_density,pValue,negLog10pValue"
        )?;
    }
    for r in rows {
        write!(
            writer,
            "{},{},{},{},{},{},{},{},{}",
            r.chrom,
            r.start,
            r.end,
            r.input,
            r.background,
            r.normed_bg,
            r.net_density,
            r.p_value,
            r.neg_log10_p_value
        )?;
        if has_correction {
            writeln!(
                writer,
                ",{},{},{}",
                r.corrected_p_value.unwrap_or(f64::NAN),
                r.neg_log10_corrected.unwrap_or(f64::NAN),
                r.rejected.unwrap_or(false)
            )?;
        } else {
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_events_default_weight() {
        let content = "chr1\t0\t1\nchr1\t1\t2\t2.5\n";
        let events = read_events_from(content.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].weight, 1.0);
        assert_eq!(events[1].weight, 2.5);
    }

    #[test]
    fn test_read_events_skips_comments_and_track_lines() {
        let content = "# comment\ntrack name=test\nchr1\t0\t1\n";
        let events = read_events_from(content.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_read_events_rejects_start_ge_end() {
        let content = "chr1\t5\t5\n";
        assert!(read_events_from(content.as_bytes()).is_err());
    }

    #[test]
    fn test_read_intervals_bed3() {
        let content = "chr1\t100\t200\nchr2\t0\t10\n";
        let intervals = read_intervals_from(content.as_bytes()).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].chrom, "chr1");
    }

    #[test]
    fn test_write_blocks_roundtrip() {
        let blocks = vec![Interval::new("chr1", 0, 10), Interval::new("chr1", 10, 20)];
        let mut buf = Vec::new();
        write_blocks(&mut buf, &blocks).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "chr1\t0\t10\nchr1\t10\t20\n");
    }
}
