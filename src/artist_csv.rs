//! CSV import and export of artists.
//!
//! Columns: name, dob, gender, address, first release year, albums released.
//! The first record of an upload is always treated as the header. Fields may
//! be quoted, quoted fields can contain commas, doubled quotes and newlines.

use crate::store::validation::validate_artist_fields;
use crate::store::{Artist, ArtistFields, ArtistRepository, Gender, DATE_FORMAT};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const EXPORT_HEADER: &str = "Name,DOB,Gender,Address,First Release Year,Albums Released";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("line {line}: expected 6 fields, found {found}")]
    MalformedRow { line: usize, found: usize },

    #[error("line {line}: invalid {field}: {message}")]
    InvalidField {
        line: usize,
        field: &'static str,
        message: String,
    },

    #[error("line {line}: quoted field is never closed")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: could not be saved: {message}")]
    Persist { line: usize, message: String },
}

impl RowError {
    pub fn line(&self) -> usize {
        match self {
            RowError::MalformedRow { line, .. }
            | RowError::InvalidField { line, .. }
            | RowError::UnterminatedQuote { line }
            | RowError::Persist { line, .. } => *line,
        }
    }
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: usize,
    pub failures: Vec<RowError>,
}

#[derive(Debug, Serialize)]
pub struct FailedRow {
    pub line: usize,
    pub reason: String,
}

impl ImportReport {
    pub fn failed_rows(&self) -> Vec<FailedRow> {
        self.failures
            .iter()
            .map(|e| FailedRow {
                line: e.line(),
                reason: e.to_string(),
            })
            .collect()
    }
}

/// A parsed record and the 1-based line it starts on.
#[derive(Debug, PartialEq, Eq)]
struct Record {
    line: usize,
    fields: Vec<String>,
    /// A quoted field was still open at the end of the input.
    unterminated: bool,
}

/// Splits text into records. A record that is a single unquoted empty field
/// (a blank line) is dropped.
///
/// A quote opens a quoted field only as the first character of the field,
/// anywhere else it is kept as a literal character. A quoted field still open
/// at the end of the input turns its record into an unterminated one, and
/// reading resumes on the line after the opening quote.
fn parse_records(text: &str) -> Vec<Record> {
    let mut records = vec![];
    let mut offset = 0;
    let mut line = 1;
    while let Some((resume_offset, resume_line)) =
        scan_records(&text[offset..], line, &mut records)
    {
        offset += resume_offset;
        line = resume_line;
    }
    records
}

fn push_record(
    records: &mut Vec<Record>,
    line: usize,
    mut fields: Vec<String>,
    field: String,
    quoted: bool,
) {
    fields.push(field);
    let blank = fields.len() == 1 && fields[0].trim().is_empty() && !quoted;
    if !blank {
        records.push(Record {
            line,
            fields,
            unterminated: false,
        });
    }
}

/// Reads records from `text` until its end or an unterminated quoted field.
/// In the latter case returns where to resume: the offset into `text` and
/// the line number of the line following the opening quote.
fn scan_records(
    text: &str,
    first_line: usize,
    records: &mut Vec<Record>,
) -> Option<(usize, usize)> {
    let mut fields: Vec<String> = vec![];
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_quoted = false;
    let mut record_quoted = false;
    let mut line = first_line;
    let mut record_line = first_line;
    let mut resume = None;

    let mut chars = text.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        if in_quotes {
            match c {
                '"' if next == Some('"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() && !field_quoted => {
                in_quotes = true;
                field_quoted = true;
                record_quoted = true;
                resume = text[pos..]
                    .find('\n')
                    .map(|i| (pos + i + 1, line + 1));
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                field_quoted = false;
            }
            '\r' if next == Some('\n') => {}
            '\n' => {
                push_record(
                    records,
                    record_line,
                    std::mem::take(&mut fields),
                    std::mem::take(&mut field),
                    record_quoted,
                );
                record_quoted = false;
                field_quoted = false;
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        fields.push(field);
        records.push(Record {
            line: record_line,
            fields,
            unterminated: true,
        });
        return resume;
    }
    if !fields.is_empty() || !field.is_empty() || record_quoted {
        push_record(records, record_line, fields, field, record_quoted);
    }
    None
}

fn invalid(line: usize, field: &'static str, message: impl Into<String>) -> RowError {
    RowError::InvalidField {
        line,
        field,
        message: message.into(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts a plain year or a full date, of which only the year is kept.
fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    value
        .parse::<i32>()
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value, DATE_FORMAT).ok().map(|d| d.year()))
}

fn parse_artist_row(line: usize, fields: &[String]) -> Result<ArtistFields, RowError> {
    let [name, dob, gender, address, year, albums] = fields else {
        return Err(RowError::MalformedRow {
            line,
            found: fields.len(),
        });
    };

    let dob = match non_empty(dob) {
        None => None,
        Some(dob) => Some(
            NaiveDate::parse_from_str(&dob, DATE_FORMAT).map_err(|_| {
                invalid(line, "dob", format!("'{}' is not a YYYY-MM-DD date", dob))
            })?,
        ),
    };
    let gender = Gender::parse_lenient(gender)
        .ok_or_else(|| invalid(line, "gender", format!("unknown gender '{}'", gender.trim())))?;
    let first_release_year = parse_year(year).ok_or_else(|| {
        invalid(
            line,
            "first_release_year",
            format!("'{}' is not a year", year.trim()),
        )
    })?;
    let no_of_albums_released = albums.trim().parse::<u32>().map_err(|_| {
        invalid(
            line,
            "no_of_albums_released",
            format!("'{}' is not a non-negative integer", albums.trim()),
        )
    })?;

    let artist = ArtistFields {
        user_id: None,
        name: name.trim().to_string(),
        dob,
        gender,
        address: non_empty(address),
        first_release_year,
        no_of_albums_released,
    };
    if let Some(error) = validate_artist_fields(&artist).into_iter().next() {
        return Err(invalid(line, error.field(), error.to_string()));
    }
    Ok(artist)
}

/// Imports every valid row of `bytes`. Bad rows are reported and skipped, the
/// import itself never fails.
pub fn import_artists<S>(store: &S, bytes: &[u8]) -> ImportReport
where
    S: ArtistRepository + ?Sized,
{
    let text = String::from_utf8_lossy(bytes);
    let mut report = ImportReport::default();

    for record in parse_records(&text).into_iter().skip(1) {
        if record.unterminated {
            let error = RowError::UnterminatedQuote { line: record.line };
            debug!("Skipping CSV row: {}", error);
            report.failures.push(error);
            continue;
        }
        let artist = match parse_artist_row(record.line, &record.fields) {
            Ok(artist) => artist,
            Err(error) => {
                debug!("Skipping CSV row: {}", error);
                report.failures.push(error);
                continue;
            }
        };
        match store.create_artist(&artist) {
            Ok(_) => report.created += 1,
            Err(err) => {
                warn!("Failed to save CSV row at line {}: {}", record.line, err);
                report.failures.push(RowError::Persist {
                    line: record.line,
                    message: err.to_string(),
                });
            }
        }
    }
    report
}

fn quote_if_needed(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_csv_row(artist: &Artist) -> String {
    let dob = artist
        .dob
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default();
    [
        quote_if_needed(&artist.name),
        dob,
        artist.gender.code().to_string(),
        quote_if_needed(artist.address.as_deref().unwrap_or_default()),
        artist.first_release_year.to_string(),
        artist.no_of_albums_released.to_string(),
    ]
    .join(",")
}

/// Header line plus one line per artist, each terminated by `\n`.
pub fn export_artists(artists: &[Artist]) -> String {
    let mut out = String::with_capacity(64 * (artists.len() + 1));
    out.push_str(EXPORT_HEADER);
    out.push('\n');
    for artist in artists {
        out.push_str(&to_csv_row(artist));
        out.push('\n');
    }
    out
}

pub fn is_csv_filename(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}
