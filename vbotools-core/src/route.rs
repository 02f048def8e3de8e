//! Traveled route extraction and map projection

use crate::error::VboError;
use crate::interval::{estimate, GpsDataInterval};
use crate::types::{GpsSample, SectionStore};
use crate::vbo::detect_separator;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::debug;

/// A position fix on the traveled route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    /// Latitude (VBO minutes)
    pub latitude: f64,
    /// Longitude (VBO minutes)
    pub longitude: f64,
    /// Milliseconds since local midnight
    pub time_ms: u64,
    /// Speed in km/h
    pub speed_kmh: f64,
    /// Sampling interval of the file the point came from
    pub interval: GpsDataInterval,
}

impl RoutePoint {
    fn from_sample(sample: &GpsSample, interval: GpsDataInterval) -> Self {
        Self {
            latitude: sample.latitude,
            longitude: sample.longitude,
            time_ms: sample.time_ms,
            speed_kmh: sample.speed_kmh,
            interval,
        }
    }
}

/// A route point placed on a pixel canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePixel {
    /// Column, from the left edge
    pub x: i32,
    /// Row, from the top edge
    pub y: i32,
    /// Milliseconds since local midnight
    pub time_ms: u64,
    /// Speed in whole km/h
    pub speed_kmh: u32,
}

/// Whether a position is a real fix rather than a cold-start artifact
pub fn is_valid_fix(satellites: u8, latitude: f64, longitude: f64) -> bool {
    satellites > 0 && !(latitude == 0.0 && longitude == 0.0)
}

/// Ordered sequence of valid fixes from one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<RoutePoint>,
}

impl Route {
    /// Extract the route from a parsed VBO file
    ///
    /// Lines with no satellites or with a (0, 0) position are dropped before
    /// their time is read. The store is not modified.
    pub fn extract(store: &SectionStore) -> Result<Self, VboError> {
        let separator = detect_separator(store)?;
        let interval = estimate(store, separator)?;

        let points: Vec<RoutePoint> = store
            .samples_where(separator, is_valid_fix)?
            .iter()
            .map(|s| RoutePoint::from_sample(s, interval))
            .collect();

        #[cfg(feature = "logging")]
        debug!(
            "Route has {} points ({} lines dropped)",
            points.len(),
            store.data().map_or(0, |d| d.len()) - points.len()
        );

        Ok(Self { points })
    }

    /// Points in file order
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the route has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume the route, returning its points
    pub fn into_points(self) -> Vec<RoutePoint> {
        self.points
    }

    /// Fit the route into a `width` x `height` canvas
    ///
    /// Coordinates are treated as flat over the extent of a track. The route
    /// is scaled uniformly to fit inside `padding` pixels on each side, then
    /// centered. Both axes are inverted because pixel rows grow downward and
    /// VBO longitudes grow westward.
    pub fn project(&self, width: u32, height: u32, padding: u32) -> Vec<RoutePixel> {
        let Some(first) = self.points.first() else {
            return Vec::new();
        };

        let radians: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| (p.longitude.to_radians(), p.latitude.to_radians()))
            .collect();

        let (min_x, min_y) = radians.iter().fold(
            (first.longitude.to_radians(), first.latitude.to_radians()),
            |(mx, my), &(x, y)| (mx.min(x), my.min(y)),
        );
        let (max_x, max_y) = radians
            .iter()
            .fold((0.0f64, 0.0f64), |(mx, my), &(x, y)| {
                (mx.max(x - min_x), my.max(y - min_y))
            });

        let width = f64::from(width);
        let height = f64::from(height);
        let padding = f64::from(padding) * 2.0;

        let ratio = |space: f64, extent: f64| {
            if extent > 0.0 {
                space / extent
            } else {
                f64::INFINITY
            }
        };
        let scale = ratio(width - padding, max_x).min(ratio(height - padding, max_y));
        let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };

        let pad_x = (width - scale * max_x) / 2.0;
        let pad_y = (height - scale * max_y) / 2.0;

        self.points
            .iter()
            .zip(&radians)
            .map(|(point, &(x, y))| RoutePixel {
                x: (width - pad_x - (x - min_x) * scale).round() as i32,
                y: (height - pad_y - (y - min_y) * scale).round() as i32,
                time_ms: point.time_ms,
                speed_kmh: point.speed_kmh as u32,
            })
            .collect()
    }
}

impl IntoIterator for Route {
    type Item = RoutePoint;
    type IntoIter = std::vec::IntoIter<RoutePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a RoutePoint;
    type IntoIter = core::slice::Iter<'a, RoutePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::millis_to_vbo_time;

    fn store(rows: &[(u8, f64, f64)]) -> SectionStore {
        let mut store = SectionStore::new();
        store.insert(
            "header",
            ["satellites", "time", "latitude", "longitude", "velocity kmh"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let data = rows
            .iter()
            .enumerate()
            .map(|(i, (sats, lat, lon))| {
                let time = millis_to_vbo_time(36_000_000 + i as u64 * 100);
                format!("{sats:03} {} {lat:+.5} {lon:+.5} 050.000", &time[..9])
            })
            .collect();
        store.insert("data", data);
        store
    }

    fn track(len: usize) -> Vec<(u8, f64, f64)> {
        (0..len)
            .map(|i| (8, 2279.0 + i as f64 * 0.001, -1401.0 - i as f64 * 0.001))
            .collect()
    }

    #[test]
    fn test_filters_cold_start_artifacts() {
        let mut rows = track(25);
        rows[0] = (0, 2279.0, -1401.0);
        rows[5] = (8, 0.0, 0.0);
        rows[24] = (0, 0.0, 0.0);

        let route = Route::extract(&store(&rows)).unwrap();
        assert_eq!(route.len(), 22);
        assert!(route
            .points()
            .iter()
            .all(|p| p.latitude != 0.0 || p.longitude != 0.0));
        assert!(route.points().iter().all(|p| p.interval == GpsDataInterval::Hz10));
        assert_eq!(route.points()[0].time_ms, 36_000_100);
    }

    #[test]
    fn test_keeps_single_zero_axis() {
        let mut rows = track(25);
        rows[3] = (8, 0.0, -1401.0);
        let route = Route::extract(&store(&rows)).unwrap();
        assert_eq!(route.len(), 25);
    }

    #[test]
    fn test_cold_start_time_is_not_read() {
        let mut rows = track(25);
        rows[0] = (0, 0.0, 0.0);
        let mut s = store(&rows);
        s.lines_mut("data").unwrap()[0] = "000 ------.-- +0.00000 +0.00000 000.000".to_string();

        let route = Route::extract(&s).unwrap();
        assert_eq!(route.len(), 24);
        assert_eq!(route.points()[0].time_ms, 36_000_100);
    }

    #[test]
    fn test_extract_does_not_mutate() {
        let s = store(&track(25));
        let before = s.clone();
        let a = Route::extract(&s).unwrap();
        let b = Route::extract(&s).unwrap();
        assert_eq!(a, b);
        assert_eq!(s, before);
    }

    fn route(coords: &[(f64, f64)]) -> Route {
        Route {
            points: coords
                .iter()
                .map(|&(latitude, longitude)| RoutePoint {
                    latitude,
                    longitude,
                    time_ms: 0,
                    speed_kmh: 42.9,
                    interval: GpsDataInterval::Hz10,
                })
                .collect(),
        }
    }

    #[test]
    fn test_project_fits_and_inverts() {
        // a square extent: corners land on the padded box
        let r = route(&[(0.0, 0.0), (1.0, 1.0)]);
        let pixels = r.project(200, 200, 50);

        assert_eq!(pixels.len(), 2);
        assert_eq!((pixels[0].x, pixels[0].y), (150, 150));
        assert_eq!((pixels[1].x, pixels[1].y), (50, 50));
        assert_eq!(pixels[0].speed_kmh, 42);
    }

    #[test]
    fn test_project_centers_narrow_axis() {
        let r = route(&[(0.0, 0.0), (0.0, 2.0)]);
        let pixels = r.project(300, 200, 50);

        // horizontal extent drives the scale, the flat axis sits mid-canvas
        assert_eq!(pixels[0].y, 100);
        assert_eq!(pixels[1].y, 100);
        assert_eq!(pixels[0].x, 250);
        assert_eq!(pixels[1].x, 50);
    }

    #[test]
    fn test_project_degenerate() {
        assert!(Route::default().project(100, 100, 10).is_empty());

        let pixels = route(&[(5.0, 5.0)]).project(100, 80, 10);
        assert_eq!((pixels[0].x, pixels[0].y), (50, 40));
    }
}
