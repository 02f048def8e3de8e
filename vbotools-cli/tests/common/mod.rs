//! Shared fixtures for the command tests

use std::fs;
use std::path::{Path, PathBuf};

/// A 10 Hz logger file with `lines` samples; the first two have no fix
pub fn logger_vbo(lines: usize) -> String {
    let mut text = String::from(
        "File created on 03/09/2021 at 11:20:00\n\
\n\
[header]\n\
satellites\n\
time\n\
latitude\n\
longitude\n\
velocity kmh\n\
heading\n\
height\n\
\n\
[column names]\n\
sats time lat long velocity heading height\n\
\n\
[data]\n",
    );
    for i in 0..lines {
        let centis = 4_080_000 + i * 10;
        let (sats, lat, lon) = if i < 2 {
            (0, 0.0, 0.0)
        } else {
            (7, 2300.5 + i as f64 * 0.0002, -1400.25 - i as f64 * 0.0001)
        };
        let speed = 120.0 - i as f64 * 0.5;
        text.push_str(&format!(
            "{:03} {:02}{:02}{:02}.{:02} {:+012.5} {:+012.5} {:07.3} 090.00 +00010.00\n",
            sats,
            centis / 360_000,
            centis / 6_000 % 60,
            centis / 100 % 60,
            centis % 100,
            lat,
            lon,
            speed,
        ));
    }
    text
}

/// Write `text` to `dir/name`, returning the path as a string
pub fn write(dir: &Path, name: &str, text: &str) -> String {
    let path: PathBuf = dir.join(name);
    fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

/// Path `dir/name` as a string
pub fn path(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}
