use crate::error::{PlotError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

/// Column holding the base-pair position.
pub const POS_COLUMN: &str = "BP";
/// Column holding the association p-value.
pub const P_COLUMN: &str = "P";

/// Cells that count as missing, in addition to empty ones.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
    /// Runs of spaces/tabs, as in PLINK's column-aligned `.assoc` output
    Whitespace,
}

impl Delimiter {
    /// Pick the delimiter from the header line: comma wins, then tab, else whitespace.
    fn sniff(header: &str) -> Self {
        if header.contains(',') {
            Delimiter::Comma
        } else if header.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Whitespace
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Delimiter::Comma => "comma",
            Delimiter::Tab => "tab",
            Delimiter::Whitespace => "whitespace",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssocRecord {
    /// 1-based line in the input file
    pub line: u64,
    /// Base-pair position; only its span is reported, the strip itself has no position axis
    pub bp: f64,
    pub p: f64,
}

/// Complete rows of an association file, in file order.
#[derive(Debug)]
pub struct AssocTable {
    pub records: Vec<AssocRecord>,
    /// Rows discarded because some field was missing
    pub dropped: usize,
    pub delimiter: Delimiter,
}

/// Column positions resolved from the header row.
struct Layout {
    width: usize,
    bp: usize,
    p: usize,
}

impl Layout {
    fn from_header<'a>(names: impl Iterator<Item = &'a str>, source: &Path) -> Result<Self> {
        let names: Vec<&str> = names.map(str::trim).collect();
        let find = |col: &str| names.iter().position(|n| *n == col);
        match (find(POS_COLUMN), find(P_COLUMN)) {
            (Some(bp), Some(p)) => Ok(Layout {
                width: names.len(),
                bp,
                p,
            }),
            (bp, p) => {
                let missing: Vec<&str> = [(POS_COLUMN, bp), (P_COLUMN, p)]
                    .iter()
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(col, _)| *col)
                    .collect();
                Err(PlotError::file_format(
                    source,
                    format!(
                        "missing required column(s) {} (header: {})",
                        missing.join(", "),
                        names.join(" | ")
                    ),
                ))
            }
        }
    }
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_TOKENS.contains(&cell)
}

/// Any finite number is a usable position.
fn parse_position(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reader that remembers the byte offset of every `\n` passed through it, so
/// csv record offsets can be turned into physical line numbers.
struct LineIndex<R> {
    inner: R,
    consumed: u64,
    newlines: Vec<u64>,
}

impl<R: Read> LineIndex<R> {
    fn new(inner: R) -> Self {
        LineIndex {
            inner,
            consumed: 0,
            newlines: Vec::new(),
        }
    }

    /// 0-based line containing `byte` (a `\n` belongs to the line it ends).
    fn line_of(&self, byte: u64) -> u64 {
        self.newlines.partition_point(|&nl| nl < byte) as u64
    }
}

impl<R: Read> Read for LineIndex<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        let start = self.consumed;
        self.newlines.extend(
            buf[..n]
                .iter()
                .enumerate()
                .filter(|(_, &b)| b == b'\n')
                .map(|(i, _)| start + i as u64),
        );
        self.consumed += n as u64;
        Ok(n)
    }
}

/// Open and parse an association file.
pub fn read_assoc(path: &Path) -> Result<AssocTable> {
    let file = File::open(path).map_err(|e| PlotError::file_format(path, e))?;
    AssocTable::from_reader(BufReader::new(file), path)
}

impl AssocTable {
    /// Parse a header row plus data rows. `source` only labels errors.
    pub fn from_reader<R: BufRead>(mut reader: R, source: &Path) -> Result<Self> {
        // Leading blank lines are skipped; remember how many for line numbers.
        let mut header = String::new();
        let mut header_line: u64 = 0;
        loop {
            header.clear();
            let n = reader
                .read_line(&mut header)
                .map_err(|e| PlotError::file_format(source, e))?;
            if n == 0 {
                return Err(PlotError::file_format(source, "file is empty (no header row)"));
            }
            header_line += 1;
            if !header.trim().is_empty() {
                break;
            }
        }
        if let Some(stripped) = header.strip_prefix('\u{feff}') {
            header = stripped.to_string();
        }

        let delimiter = Delimiter::sniff(&header);
        let mut table = AssocTable {
            records: Vec::new(),
            dropped: 0,
            delimiter,
        };

        match delimiter {
            Delimiter::Comma | Delimiter::Tab => {
                let byte = if delimiter == Delimiter::Comma { b',' } else { b'\t' };
                let mut rdr = ReaderBuilder::new()
                    .delimiter(byte)
                    .has_headers(true)
                    .flexible(true)
                    .trim(Trim::All)
                    .from_reader(LineIndex::new(Cursor::new(header.into_bytes()).chain(reader)));
                let layout = {
                    let names = rdr
                        .headers()
                        .map_err(|e| PlotError::file_format(source, e))?;
                    Layout::from_header(names.iter(), source)?
                };
                // A record's start offset may sit on a skipped blank line or a
                // pending CRLF `\n`; the reader position after it ends on its own line.
                let mut record = StringRecord::new();
                while rdr
                    .read_record(&mut record)
                    .map_err(|e| PlotError::file_format(source, e))?
                {
                    let last = rdr.position().byte().saturating_sub(1);
                    let line = header_line + rdr.get_ref().line_of(last);
                    table.push_row(record.iter(), line, &layout, source)?;
                }
            }
            Delimiter::Whitespace => {
                let splitter = Regex::new(r"\s+").expect("invalid regex");
                let layout = Layout::from_header(splitter.split(header.trim()), source)?;
                for (i, line) in reader.lines().enumerate() {
                    let line = line.map_err(|e| PlotError::file_format(source, e))?;
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let line_no = header_line + 1 + i as u64;
                    table.push_row(splitter.split(trimmed), line_no, &layout, source)?;
                }
            }
        }
        Ok(table)
    }

    fn push_row<'a>(
        &mut self,
        fields: impl Iterator<Item = &'a str>,
        line: u64,
        layout: &Layout,
        source: &Path,
    ) -> Result<()> {
        let cells: Vec<&str> = fields.map(str::trim).collect();
        if cells.len() > layout.width {
            return Err(PlotError::file_format(
                source,
                format!(
                    "line {}: expected {} fields, saw {}",
                    line,
                    layout.width,
                    cells.len()
                ),
            ));
        }
        if cells.len() < layout.width || cells.iter().any(|c| is_missing(c)) {
            self.dropped += 1;
            return Ok(());
        }

        let bp_raw = cells[layout.bp];
        let bp = parse_position(bp_raw).ok_or_else(|| {
            PlotError::file_format(
                source,
                format!("line {}: column {} has non-numeric value '{}'", line, POS_COLUMN, bp_raw),
            )
        })?;
        let p_raw = cells[layout.p];
        let p = p_raw.parse::<f64>().map_err(|_| {
            PlotError::file_format(
                source,
                format!("line {}: column {} has non-numeric value '{}'", line, P_COLUMN, p_raw),
            )
        })?;
        self.records.push(AssocRecord { line, bp, p });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// (min, max) base-pair position over the complete rows.
    pub fn bp_span(&self) -> Option<(f64, f64)> {
        self.records.iter().fold(None, |acc, r| match acc {
            None => Some((r.bp, r.bp)),
            Some((lo, hi)) => Some((lo.min(r.bp), hi.max(r.bp))),
        })
    }
}
