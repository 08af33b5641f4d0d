use crate::domain::model::RawLine;
use crate::utils::error::Result;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Line source over delimited text.
///
/// The first line is treated as a header and never yielded. Every other line
/// is yielded exactly once, blank ones included, so the step can count it.
/// Rows may carry fewer (or more) fields than the header; mapping decides
/// what that means. Bytes that are not valid UTF-8 become U+FFFD.
pub struct CsvLineSource<R: Read> {
    lines: BufReader<R>,
    parser: csv::ReaderBuilder,
    line_number: u64,
    buf: Vec<u8>,
}

fn parser(delimiter: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::None);
    builder
}

fn strip_terminator(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn split_line(parser: &csv::ReaderBuilder, line_number: u64, line: &[u8]) -> Result<RawLine> {
    if line.is_empty() {
        return Ok(RawLine::new(line_number, vec![String::new()]));
    }

    let mut record = csv::ByteRecord::new();
    parser.from_reader(line).read_byte_record(&mut record)?;
    let fields = record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();

    Ok(RawLine::new(line_number, fields))
}

impl CsvLineSource<File> {
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file, delimiter))
    }

    /// Opens and reads `path` on the blocking pool.
    ///
    /// An open failure arrives as the first (and only) item of the channel.
    pub fn spawn_from_path(
        path: PathBuf,
        delimiter: u8,
        capacity: usize,
    ) -> mpsc::Receiver<Result<RawLine>> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::task::spawn_blocking(move || match Self::from_path(&path, delimiter) {
            Ok(source) => source.forward(&tx),
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
            }
        });
        rx
    }
}

impl<R: Read> CsvLineSource<R> {
    pub fn from_reader(reader: R, delimiter: u8) -> Self {
        Self {
            lines: BufReader::new(reader),
            parser: parser(delimiter),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    // Stops at the first read error, or once the receiving step has gone away.
    fn forward(self, tx: &mpsc::Sender<Result<RawLine>>) {
        for line in self {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    }
}

impl<R: Read + Send + 'static> CsvLineSource<R> {
    /// Moves the source onto the blocking pool and hands lines over through a
    /// bounded channel.
    pub fn spawn(self, capacity: usize) -> mpsc::Receiver<Result<RawLine>> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::task::spawn_blocking(move || self.forward(&tx));
        rx
    }
}

impl<R: Read> Iterator for CsvLineSource<R> {
    type Item = Result<RawLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.lines.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }

            self.line_number += 1;
            if self.line_number == 1 {
                continue;
            }

            let line = strip_terminator(&self.buf);
            return Some(split_line(&self.parser, self.line_number, line));
        }
    }
}
