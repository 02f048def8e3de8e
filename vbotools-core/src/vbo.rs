//! VBO text format: section parser, separator detection and writer

use crate::constants::{BANNER_PREFIX, BANNER_SUFFIX, SECTION_ORDER};
use crate::error::VboError;
use crate::types::{SectionStore, Separator};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::debug;

/// Parse a VBO file into a [`SectionStore`]
///
/// The file is fully read and closed before returning.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SectionStore, VboError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| VboError::malformed(path.display().to_string(), e))?;

    parse_reader(BufReader::new(file))
        .map_err(|e| match e {
            VboError::MalformedFile { reason, .. } => {
                VboError::malformed(path.display().to_string(), reason)
            }
            other => other,
        })
}

/// Parse VBO text from a buffered reader
///
/// A line starting with `[` switches the current section. Blank lines and
/// lines before the first section header are dropped. A section header
/// that appears twice keeps appending to the first occurrence. Each line is
/// decoded on its own (see [`decode_line`]), so stray non-UTF-8 bytes never
/// fail the parse.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<SectionStore, VboError> {
    let mut store = SectionStore::new();
    let mut current: Option<String> = None;

    for bytes in reader.split(b'\n') {
        let bytes = bytes.map_err(|e| VboError::malformed("<stream>", e))?;
        let line = decode_line(&bytes);
        let line = line.trim_end_matches('\r');

        if let Some(name) = section_name(line) {
            store.open(name);
            current = Some(name.to_string());
        } else if let Some(name) = current.as_deref() {
            if !line.trim().is_empty() {
                store.open(name).push(line.to_string());
            }
        }
    }

    #[cfg(feature = "logging")]
    debug!("Parsed {} sections", store.len());

    Ok(store)
}

/// Parse VBO text held in memory
pub fn parse_str(text: &str) -> Result<SectionStore, VboError> {
    parse_reader(text.as_bytes())
}

/// Decode one line of VBO text
///
/// Loggers write comments, units and lap markers (`°`, `¥`) in a single-byte
/// Windows charset. A line that is not valid UTF-8 is read as Latin-1.
pub fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Decode a whole VBO file, line by line
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Name of the section opened by `line`, if it is a section header
fn section_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let name = match rest.find(']') {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(name.trim())
}

/// The banner line of a VBO file (`File created ...`), if any
pub fn find_banner(text: &str) -> Option<&str> {
    text.lines()
        .map(|l| l.trim_end_matches('\r'))
        .find(|l| l.starts_with(BANNER_PREFIX))
}

/// Detect the data separator from the first `[data]` line
///
/// Candidates are tried in priority order (space, comma, tab); the first that
/// yields more than one field wins.
pub fn detect_separator(store: &SectionStore) -> Result<Separator, VboError> {
    let first = store
        .data()?
        .first()
        .ok_or(VboError::UndeterminedSeparator)?;

    Separator::ALL
        .into_iter()
        .find(|sep| sep.split(first).len() > 1)
        .ok_or(VboError::UndeterminedSeparator)
}

/// Banner line stamped with the current local time
pub fn default_banner() -> String {
    let now = chrono::Local::now();
    format!(
        "{} on {} {}",
        BANNER_PREFIX,
        now.format("%d/%m/%Y at %H:%M:%S"),
        BANNER_SUFFIX
    )
}

/// Writer for VBO files with a configurable banner and section order
///
/// Sections requested but absent from the store are skipped; sections not
/// requested are not written.
pub struct VboWriter {
    banner: String,
    order: Vec<String>,
}

impl Default for VboWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VboWriter {
    /// Create a writer with a timestamped banner and the standard order
    pub fn new() -> Self {
        Self {
            banner: default_banner(),
            order: SECTION_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set the banner line
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Set the section order
    pub fn order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Render the store to text
    ///
    /// Layout: banner line, then for each section `[name]`, its lines and a
    /// blank line.
    pub fn render(&self, store: &SectionStore) -> String {
        let mut out = String::new();
        out.push_str(&self.banner);
        out.push('\n');

        for name in &self.order {
            if let Some(section) = store.get(name) {
                out.push('[');
                out.push_str(&section.name);
                out.push_str("]\n");
                for line in &section.lines {
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
            }
        }

        out
    }

    /// Render and write the store to `path`
    ///
    /// The whole file is rendered in memory before the write starts.
    pub fn write<P: AsRef<Path>>(&self, store: &SectionStore, path: P) -> Result<(), VboError> {
        let text = self.render(store);
        std::fs::write(path.as_ref(), text)?;

        #[cfg(feature = "logging")]
        debug!("Wrote VBO file {}", path.as_ref().display());

        Ok(())
    }
}

/// Write a store to `path` with the standard banner and section order
pub fn write_file<P: AsRef<Path>>(store: &SectionStore, path: P) -> Result<(), VboError> {
    VboWriter::new().write(store, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "File created on 31/07/2006 at 09:39:25\r\n\
\r\n\
[header]\r\n\
satellites\r\n\
time\r\n\
\r\n\
[comments]\r\n\
Some comment\r\n\
[column names]\r\n\
sats time\r\n\
\r\n\
[data]\r\n\
008 093925.20\r\n\
008 093925.40\r\n";

    #[test]
    fn test_parse_sections() {
        let store = parse_str(SAMPLE).unwrap();

        assert_eq!(
            store.names().collect::<Vec<_>>(),
            vec!["header", "comments", "column names", "data"]
        );
        assert_eq!(store.header().unwrap(), &["satellites", "time"]);
        assert_eq!(store.data().unwrap().len(), 2);
        assert_eq!(store.data().unwrap()[0], "008 093925.20");
    }

    #[test]
    fn test_lines_before_first_section_dropped() {
        let store = parse_str("junk\nmore junk\n[data]\n1 2\n").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.data().unwrap(), &["1 2"]);
    }

    #[test]
    fn test_repeated_section_appends() {
        let store = parse_str("[data]\n1 2\n[comments]\nx\n[data]\n3 4\n").unwrap();
        assert_eq!(store.data().unwrap(), &["1 2", "3 4"]);
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["data", "comments"]);
    }

    #[test]
    fn test_empty_section_kept() {
        let store = parse_str("[laptiming]\n\n[data]\n1 2\n").unwrap();
        assert!(store.contains("laptiming"));
        assert!(store.lines("laptiming").unwrap().is_empty());
    }

    #[test]
    fn test_detect_separator_priority() {
        for (line, expected) in [
            ("1 2 3", Separator::Space),
            ("1,2,3", Separator::Comma),
            ("1\t2\t3", Separator::Tab),
            ("1,5 2,5", Separator::Space),
        ] {
            let store = parse_str(&format!("[data]\n{line}\n")).unwrap();
            assert_eq!(detect_separator(&store).unwrap(), expected, "{line:?}");
        }
    }

    #[test]
    fn test_detect_separator_fails() {
        let store = parse_str("[data]\nsinglefield\n").unwrap();
        assert_eq!(detect_separator(&store), Err(VboError::UndeterminedSeparator));

        let store = parse_str("[data]\n").unwrap();
        assert_eq!(detect_separator(&store), Err(VboError::UndeterminedSeparator));
    }

    #[test]
    fn test_render_order_and_skip_missing() {
        let store = parse_str(SAMPLE).unwrap();
        let text = VboWriter::new().banner("File created on test").render(&store);

        assert_eq!(
            text,
            "File created on test\n\
[header]\nsatellites\ntime\n\n\
[comments]\nSome comment\n\n\
[column names]\nsats time\n\n\
[data]\n008 093925.20\n008 093925.40\n\n"
        );
    }

    #[test]
    fn test_render_custom_order() {
        let store = parse_str(SAMPLE).unwrap();
        let text = VboWriter::new()
            .banner("b")
            .order(["data", "missing"])
            .render(&store);
        assert_eq!(text, "b\n[data]\n008 093925.20\n008 093925.40\n\n");
    }

    #[test]
    fn test_default_banner_prefix() {
        let banner = default_banner();
        assert!(banner.starts_with(BANNER_PREFIX));
        assert_eq!(find_banner(&format!("{banner}\n[data]\n")), Some(banner.as_str()));
    }

    #[test]
    fn test_parse_windows_charset_bytes() {
        let mut raw = b"File created on 31/07/2006 at 09:39:25\r\n[header]\r\ntemp \xB0C\r\n".to_vec();
        raw.extend_from_slice(b"[comments]\r\nTrack temp 31\xB0\r\n");
        raw.extend_from_slice(b"[laptiming]\r\nStart +02279.20000 -01401.60000 \xA5 Start / Finish\r\n");
        raw.extend_from_slice(b"[data]\r\n008 093925.20\r\n");

        let store = parse_reader(raw.as_slice()).unwrap();
        assert_eq!(store.header().unwrap(), &["temp °C"]);
        assert_eq!(store.lines("comments").unwrap(), &["Track temp 31°"]);
        assert!(store.lines("laptiming").unwrap()[0].contains("¥ Start / Finish"));
        assert_eq!(store.data().unwrap(), &["008 093925.20"]);
    }

    #[test]
    fn test_decode_line_prefers_utf8() {
        assert_eq!(decode_line("31°".as_bytes()), "31°");
        assert_eq!(decode_line(b"31\xB0"), "31°");
        assert_eq!(decode_text(b"a\xA5\nb\xC2\xB0\n"), "a¥\nb°\n");
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_file("/definitely/not/here.vbo").unwrap_err();
        assert!(matches!(err, VboError::MalformedFile { .. }));
    }
}
