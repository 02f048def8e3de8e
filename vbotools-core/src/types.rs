//! Core types shared by the VBO and DBN codecs

use crate::constants::{channel, DATA_SECTION, HEADER_SECTION};
use crate::error::VboError;
use crate::time::logger_time_to_millis;
use core::fmt;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A named section of a VBO file and its non-blank lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section name without brackets, as it appeared in the file
    pub name: String,

    /// Raw lines, in file order
    pub lines: Vec<String>,
}

impl Section {
    /// Create a new section
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Section names compare case-insensitively (`[DATA]` == `[data]`)
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Order-preserving, in-memory representation of a VBO file
///
/// Sections keep the order in which they were first opened. Lookups by name
/// are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionStore {
    sections: Vec<Section>,
}

impl SectionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a section by name
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.is_named(name))
    }

    /// Lines of a section, if present
    pub fn lines(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|s| s.lines.as_slice())
    }

    /// Mutable lines of a section, if present
    pub fn lines_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        self.sections
            .iter_mut()
            .find(|s| s.is_named(name))
            .map(|s| &mut s.lines)
    }

    /// Lines of a section, creating it at the end when absent
    pub fn open(&mut self, name: &str) -> &mut Vec<String> {
        let idx = match self.sections.iter().position(|s| s.is_named(name)) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(name, Vec::new()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx].lines
    }

    /// Replace the contents of a section, keeping its position if it exists
    pub fn insert(&mut self, name: &str, lines: Vec<String>) {
        *self.open(name) = lines;
    }

    /// Remove a section
    pub fn remove(&mut self, name: &str) -> Option<Section> {
        let idx = self.sections.iter().position(|s| s.is_named(name))?;
        Some(self.sections.remove(idx))
    }

    /// Check whether a section is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over sections in order
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Section names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the store has no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Lines of a section that must be present
    pub fn require(&self, name: &str) -> Result<&[String], VboError> {
        self.lines(name)
            .ok_or_else(|| VboError::MissingSection(name.to_string()))
    }

    /// The `[header]` channel names
    pub fn header(&self) -> Result<&[String], VboError> {
        self.require(HEADER_SECTION)
    }

    /// The `[data]` lines
    pub fn data(&self) -> Result<&[String], VboError> {
        self.require(DATA_SECTION)
    }

    /// Column positions resolved from `[header]`
    pub fn columns(&self) -> Result<ColumnIndex, VboError> {
        Ok(ColumnIndex::from_header(self.header()?))
    }

    /// Decode every data line into a [`GpsSample`]
    pub fn samples(&self, separator: Separator) -> Result<Vec<GpsSample>, VboError> {
        self.samples_where(separator, |_, _, _| true)
    }

    /// Decode the data lines whose position passes `keep`
    ///
    /// `keep` receives satellites, latitude and longitude. Time and speed are
    /// only parsed for lines it accepts.
    pub fn samples_where<F>(
        &self,
        separator: Separator,
        keep: F,
    ) -> Result<Vec<GpsSample>, VboError>
    where
        F: Fn(u8, f64, f64) -> bool,
    {
        let columns = self.columns()?;
        let layout = SampleLayout::resolve(&columns)?;

        let mut samples = Vec::new();
        for (line, text) in self.data()?.iter().enumerate() {
            let fields = separator.split(text);
            let (satellites, latitude, longitude) = layout.position(line, &fields)?;
            if keep(satellites, latitude, longitude) {
                samples.push(layout.decode(line, &fields, satellites, latitude, longitude)?);
            }
        }
        Ok(samples)
    }
}

/// Separator between fields of a `[data]` line
///
/// A property of the whole file, detected once from the first data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// Single space; runs of spaces count as one separator
    Space,
    /// Comma
    Comma,
    /// Tab
    Tab,
}

impl Separator {
    /// Candidates in detection priority order
    pub const ALL: [Separator; 3] = [Separator::Space, Separator::Comma, Separator::Tab];

    /// The separator character
    pub const fn as_char(&self) -> char {
        match self {
            Separator::Space => ' ',
            Separator::Comma => ',',
            Separator::Tab => '\t',
        }
    }

    /// The separator as a string slice
    pub const fn as_str(&self) -> &'static str {
        match self {
            Separator::Space => " ",
            Separator::Comma => ",",
            Separator::Tab => "\t",
        }
    }

    /// Split a data line into fields
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Separator::Space => line.split(' ').filter(|f| !f.is_empty()).collect(),
            Separator::Comma | Separator::Tab => {
                let mut fields: Vec<&str> = line.split(self.as_char()).map(str::trim).collect();
                while fields.last().is_some_and(|f| f.is_empty()) {
                    fields.pop();
                }
                fields
            }
        }
    }

    /// Join fields back into a data line
    pub fn join(&self, fields: &[&str]) -> String {
        fields.join(self.as_str())
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separator::Space => f.write_str("space"),
            Separator::Comma => f.write_str("comma"),
            Separator::Tab => f.write_str("tab"),
        }
    }
}

/// Case-insensitive channel name -> field position map built from `[header]`
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Build the index; the first occurrence of a duplicated name wins
    pub fn from_header(header: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(header.len());
        for (idx, name) in header.iter().enumerate() {
            positions
                .entry(name.trim().to_ascii_lowercase())
                .or_insert(idx);
        }
        Self { positions }
    }

    /// Position of a channel
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(&name.to_ascii_lowercase()).copied()
    }

    /// Position of a channel that must be present
    pub fn require(&self, name: &str) -> Result<usize, VboError> {
        self.position(name)
            .ok_or_else(|| VboError::MissingColumn(name.to_string()))
    }
}

/// One decoded data line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    /// Milliseconds since local midnight
    pub time_ms: u64,
    /// Latitude (VBO minutes)
    pub latitude: f64,
    /// Longitude (VBO minutes)
    pub longitude: f64,
    /// Speed in km/h
    pub speed_kmh: f64,
    /// Satellites in view
    pub satellites: u8,
}

struct SampleLayout {
    time: usize,
    satellites: usize,
    latitude: usize,
    longitude: usize,
    velocity: usize,
}

impl SampleLayout {
    fn resolve(columns: &ColumnIndex) -> Result<Self, VboError> {
        Ok(Self {
            time: columns.require(channel::TIME)?,
            satellites: columns.require(channel::SATELLITES)?,
            latitude: columns.require(channel::LATITUDE)?,
            longitude: columns.require(channel::LONGITUDE)?,
            velocity: columns.require(channel::VELOCITY)?,
        })
    }

    fn position(&self, line: usize, fields: &[&str]) -> Result<(u8, f64, f64), VboError> {
        let raw = field(fields, line, self.satellites, channel::SATELLITES)?;
        let satellites = raw
            .trim()
            .parse()
            .map_err(|_| invalid(line, channel::SATELLITES, raw))?;
        Ok((
            satellites,
            number(fields, line, self.latitude, channel::LATITUDE)?,
            number(fields, line, self.longitude, channel::LONGITUDE)?,
        ))
    }

    fn decode(
        &self,
        line: usize,
        fields: &[&str],
        satellites: u8,
        latitude: f64,
        longitude: f64,
    ) -> Result<GpsSample, VboError> {
        let time = field(fields, line, self.time, channel::TIME)?;
        Ok(GpsSample {
            time_ms: logger_time_to_millis(time)?,
            latitude,
            longitude,
            speed_kmh: number(fields, line, self.velocity, channel::VELOCITY)?,
            satellites,
        })
    }
}

/// Field `idx` of a split data line
pub(crate) fn field<'a>(
    fields: &[&'a str],
    line: usize,
    idx: usize,
    column: &str,
) -> Result<&'a str, VboError> {
    fields
        .get(idx)
        .copied()
        .ok_or_else(|| invalid(line, column, ""))
}

/// Field `idx` parsed as a decimal number; comma decimal marks are accepted
pub(crate) fn number(
    fields: &[&str],
    line: usize,
    idx: usize,
    column: &str,
) -> Result<f64, VboError> {
    let raw = field(fields, line, idx, column)?;
    raw.trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| invalid(line, column, raw))
}

pub(crate) fn invalid(line: usize, column: &str, value: &str) -> VboError {
    VboError::InvalidField {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}
