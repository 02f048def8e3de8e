//! Video synchronization: `avifileindex`/`avisynctime` columns
//!
//! Every data line gets a video segment tag and the offset, in milliseconds,
//! of the video frame it corresponds to. The offset between telemetry and
//! video is signed:
//!
//! - positive: telemetry logging starts after the video begins; line `i`
//!   maps to `offset + i * interval`
//! - negative: telemetry starts before the video; the first
//!   `|offset| / interval` lines have no video frame and get the sentinel,
//!   the rest count up from `|offset| % interval`

use crate::constants::{
    channel, AVI_SECTION, COLUMN_NAMES_SECTION, DATA_SECTION, HEADER_SECTION,
    NO_VIDEO_SYNC_TIME, VIDEO_SEGMENT_TAG,
};
use crate::error::VboError;
use crate::interval::{estimate, GpsDataInterval};
use crate::types::{SectionStore, Separator};
use crate::vbo::detect_separator;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Container of the synchronized video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoContainer {
    /// MPEG-4
    #[serde(rename = "MP4")]
    Mp4,
    /// Audio Video Interleave
    #[serde(rename = "AVI")]
    Avi,
}

impl VideoContainer {
    /// Name written to the `[avi]` section
    pub const fn name(&self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "MP4",
            VideoContainer::Avi => "AVI",
        }
    }

    /// Infer the container from a video file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, VboError> {
        let path = path.as_ref();
        path.extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| VboError::UnsupportedVideoContainer(path.display().to_string()))?
            .parse()
    }
}

impl FromStr for VideoContainer {
    type Err = VboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp4" => Ok(VideoContainer::Mp4),
            "avi" => Ok(VideoContainer::Avi),
            _ => Err(VboError::UnsupportedVideoContainer(s.to_string())),
        }
    }
}

impl fmt::Display for VideoContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to do when the input already carries sync columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Fail with [`VboError::AlreadySynchronized`]
    Strict,
    /// Strip the old columns and write fresh ones
    #[default]
    Lenient,
}

/// Render a sync offset as an 8-digit, zero-padded, sign-aware integer
pub fn format_sync_time(offset_ms: i64) -> String {
    if offset_ms < 0 {
        format!("-{:08}", offset_ms.unsigned_abs())
    } else {
        format!("{:08}", offset_ms)
    }
}

/// Offset for data line `line`, or [`NO_VIDEO_SYNC_TIME`] before the video starts
///
/// Computed in `i64`, so every `i32` offset is exact; the line term saturates.
pub fn line_offset(offset_ms: i32, interval: GpsDataInterval, line: usize) -> i64 {
    let offset = i64::from(offset_ms);
    let interval = i64::from(interval.millis());
    let line = i64::try_from(line).unwrap_or(i64::MAX);
    if offset < 0 {
        let lead = -offset;
        let invalid_lines = lead / interval;
        if line < invalid_lines {
            NO_VIDEO_SYNC_TIME
        } else {
            (line - invalid_lines)
                .saturating_mul(interval)
                .saturating_add(lead % interval)
        }
    } else {
        line.saturating_mul(interval).saturating_add(offset)
    }
}

/// Video synchronization settings
#[derive(Debug, Clone)]
pub struct VideoSync {
    offset_ms: i32,
    session_name: String,
    container: VideoContainer,
    mode: SyncMode,
    interval: Option<GpsDataInterval>,
}

impl VideoSync {
    /// Create settings for a telemetry/video offset in milliseconds
    pub fn new(offset_ms: i32, session_name: impl Into<String>, container: VideoContainer) -> Self {
        Self {
            offset_ms,
            session_name: session_name.into(),
            container,
            mode: SyncMode::default(),
            interval: None,
        }
    }

    /// Choose strict or lenient handling of existing sync columns
    pub fn mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a known interval instead of estimating it from the data
    pub fn interval(mut self, interval: GpsDataInterval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Rewrite `store` with sync columns and an `[avi]` section
    ///
    /// On error the store is left untouched.
    pub fn align(&self, store: &mut SectionStore) -> Result<(), VboError> {
        let header = store.header()?;
        let existing = sync_positions(header);

        if !existing.is_empty() {
            if self.mode == SyncMode::Strict {
                return Err(VboError::AlreadySynchronized);
            }
            #[cfg(feature = "logging")]
            warn!("Input already contains avifileindex/avisynctime; replacing them");
        }

        let separator = detect_separator(store)?;

        let mut work = store.clone();
        strip_sync_columns(&mut work, &existing, separator);

        let interval = match self.interval {
            Some(interval) => interval,
            None => estimate(&work, separator)?,
        };

        #[cfg(feature = "logging")]
        debug!(
            "Aligning with offset {} ms at {} ms interval",
            self.offset_ms,
            interval.millis()
        );

        let header = work.open(HEADER_SECTION);
        header.push(channel::AVI_FILE_INDEX.to_string());
        header.push(channel::AVI_SYNC_TIME.to_string());

        if let Some(first) = work
            .lines_mut(COLUMN_NAMES_SECTION)
            .and_then(|lines| lines.first_mut())
        {
            let mut names = separator.split(first);
            names.retain(|n| !is_sync_column(n));
            names.push(channel::AVI_FILE_INDEX);
            names.push(channel::AVI_SYNC_TIME);
            *first = separator.join(&names);
        }

        work.insert(
            AVI_SECTION,
            vec![self.session_name.clone(), self.container.name().to_string()],
        );

        let sep = separator.as_str();
        if let Some(data) = work.lines_mut(DATA_SECTION) {
            for (i, line) in data.iter_mut().enumerate() {
                let offset = line_offset(self.offset_ms, interval, i);
                line.push_str(sep);
                line.push_str(VIDEO_SEGMENT_TAG);
                line.push_str(sep);
                line.push_str(&format_sync_time(offset));
            }
        }

        *store = work;
        Ok(())
    }
}

fn is_sync_column(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case(channel::AVI_FILE_INDEX)
        || name.eq_ignore_ascii_case(channel::AVI_SYNC_TIME)
}

/// Header positions of existing sync columns, ascending
fn sync_positions(header: &[String]) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .filter(|(_, name)| is_sync_column(name))
        .map(|(idx, _)| idx)
        .collect()
}

/// Remove sync columns at `positions` from the header and every data line
fn strip_sync_columns(store: &mut SectionStore, positions: &[usize], separator: Separator) {
    if positions.is_empty() {
        return;
    }

    if let Some(header) = store.lines_mut(HEADER_SECTION) {
        let mut idx = 0;
        header.retain(|_| {
            let keep = !positions.contains(&idx);
            idx += 1;
            keep
        });
    }

    if let Some(data) = store.lines_mut(DATA_SECTION) {
        for line in data.iter_mut() {
            let fields: Vec<&str> = separator
                .split(line)
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| !positions.contains(idx))
                .map(|(_, f)| f)
                .collect();
            *line = separator.join(&fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::millis_to_vbo_time;

    fn store(lines: usize) -> SectionStore {
        let mut store = SectionStore::new();
        store.insert("header", vec!["satellites".into(), "time".into()]);
        store.insert("column names", vec!["sats time".into()]);
        let data = (0..lines as u64)
            .map(|i| format!("008 {}", &millis_to_vbo_time(36_000_000 + i * 100)[..9]))
            .collect();
        store.insert("data", data);
        store
    }

    fn sync_field(store: &SectionStore, line: usize) -> String {
        store.data().unwrap()[line]
            .rsplit(' ')
            .next()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_format_sync_time() {
        assert_eq!(format_sync_time(2000), "00002000");
        assert_eq!(format_sync_time(20), "00000020");
        assert_eq!(format_sync_time(-1), "-00000001");
        assert_eq!(format_sync_time(0), "00000000");
    }

    #[test]
    fn test_line_offset_regimes() {
        use GpsDataInterval::{Hz10, Hz5};
        assert_eq!(line_offset(2000, Hz10, 0), 2000);
        assert_eq!(line_offset(2000, Hz10, 1), 2100);
        assert_eq!(line_offset(-2020, Hz10, 19), NO_VIDEO_SYNC_TIME);
        assert_eq!(line_offset(-2020, Hz10, 20), 20);
        assert_eq!(line_offset(-2020, Hz10, 21), 120);
        assert_eq!(line_offset(-20, Hz10, 0), 20);
        assert_eq!(line_offset(-20, Hz10, 1), 120);
        assert_eq!(line_offset(0, Hz5, 3), 600);
    }

    #[test]
    fn test_line_offset_extremes() {
        use GpsDataInterval::{Hz1, Hz20};
        assert_eq!(line_offset(i32::MAX, Hz20, 1), 2_147_483_697);
        assert_eq!(line_offset(i32::MAX, Hz1, usize::MAX), i64::MAX);

        // 2_147_483_648 ms lead at 50 ms: 42_949_672 lines without video
        assert_eq!(line_offset(i32::MIN, Hz20, 42_949_671), NO_VIDEO_SYNC_TIME);
        assert_eq!(line_offset(i32::MIN, Hz20, 42_949_672), 48);
        assert_eq!(line_offset(i32::MIN, Hz20, 42_949_673), 98);
    }

    #[test]
    fn test_align_extreme_offsets() {
        let mut s = store(25);
        VideoSync::new(i32::MAX, "s", VideoContainer::Mp4)
            .interval(GpsDataInterval::Hz10)
            .align(&mut s)
            .unwrap();
        assert_eq!(sync_field(&s, 0), "2147483647");
        assert_eq!(sync_field(&s, 24), "2147486047");

        let mut s = store(25);
        VideoSync::new(i32::MIN, "s", VideoContainer::Mp4)
            .interval(GpsDataInterval::Hz10)
            .align(&mut s)
            .unwrap();
        assert!(s.data().unwrap().iter().all(|l| l.ends_with(" 0001 -00000001")));
    }

    #[test]
    fn test_align_positive() {
        let mut s = store(25);
        VideoSync::new(2000, "my-session", VideoContainer::Mp4)
            .align(&mut s)
            .unwrap();

        assert_eq!(s.data().unwrap()[0], "008 100000.00 0001 00002000");
        assert_eq!(sync_field(&s, 1), "00002100");
        assert_eq!(
            s.header().unwrap(),
            &["satellites", "time", "avifileindex", "avisynctime"]
        );
        assert_eq!(
            s.lines("column names").unwrap(),
            &["sats time avifileindex avisynctime"]
        );
        assert_eq!(s.lines("avi").unwrap(), &["my-session", "MP4"]);
    }

    #[test]
    fn test_align_negative() {
        let mut s = store(30);
        VideoSync::new(-2020, "s", VideoContainer::Avi)
            .align(&mut s)
            .unwrap();

        for i in 0..20 {
            assert!(s.data().unwrap()[i].ends_with(" 0001 -00000001"), "line {i}");
        }
        assert_eq!(sync_field(&s, 20), "00000020");
        assert_eq!(sync_field(&s, 21), "00000120");
    }

    #[test]
    fn test_align_negative_below_interval() {
        let mut s = store(25);
        VideoSync::new(-20, "s", VideoContainer::Mp4)
            .align(&mut s)
            .unwrap();

        assert_eq!(sync_field(&s, 0), "00000020");
        assert_eq!(sync_field(&s, 1), "00000120");
    }

    #[test]
    fn test_strict_rejects_synchronized_input() {
        let mut s = store(25);
        VideoSync::new(0, "s", VideoContainer::Mp4)
            .align(&mut s)
            .unwrap();
        let before = s.clone();

        let err = VideoSync::new(0, "s", VideoContainer::Mp4)
            .mode(SyncMode::Strict)
            .align(&mut s)
            .unwrap_err();
        assert_eq!(err, VboError::AlreadySynchronized);
        assert_eq!(s, before);
    }

    #[test]
    fn test_lenient_replaces_columns() {
        let mut s = store(25);
        VideoSync::new(0, "first", VideoContainer::Mp4)
            .align(&mut s)
            .unwrap();
        VideoSync::new(500, "second", VideoContainer::Avi)
            .align(&mut s)
            .unwrap();

        assert_eq!(s.header().unwrap().len(), 4);
        assert_eq!(s.data().unwrap()[0], "008 100000.00 0001 00000500");
        assert_eq!(
            s.lines("column names").unwrap(),
            &["sats time avifileindex avisynctime"]
        );
        assert_eq!(s.lines("avi").unwrap(), &["second", "AVI"]);
    }

    #[test]
    fn test_explicit_interval_skips_estimation() {
        let mut s = store(3);
        VideoSync::new(0, "s", VideoContainer::Mp4)
            .interval(GpsDataInterval::Hz5)
            .align(&mut s)
            .unwrap();
        assert_eq!(sync_field(&s, 2), "00000400");
    }

    #[test]
    fn test_too_few_lines_to_estimate() {
        let mut s = store(5);
        let err = VideoSync::new(0, "s", VideoContainer::Mp4)
            .align(&mut s)
            .unwrap_err();
        assert!(matches!(err, VboError::InsufficientSamples { .. }));
    }

    #[test]
    fn test_video_container() {
        assert_eq!("MP4".parse::<VideoContainer>().unwrap(), VideoContainer::Mp4);
        assert_eq!(VideoContainer::from_path("clip.Avi").unwrap(), VideoContainer::Avi);
        assert_eq!(
            VideoContainer::from_path("clip.mkv"),
            Err(VboError::UnsupportedVideoContainer("mkv".to_string()))
        );
        assert!(VideoContainer::from_path("clip").is_err());
    }
}
