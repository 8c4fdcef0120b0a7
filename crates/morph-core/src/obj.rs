//! Wavefront OBJ position reader.
//!
//! Only the data a morph target needs is read: `v` positions and `f` faces.
//! Faces are triangulated as fans and expanded into a non-indexed coordinate
//! list. Each `o`/`g` statement starts a new object; the last object that has
//! faces provides the result.

use glam::Vec3;

/// Extracts the flat triangle-soup position list from OBJ text.
///
/// Returns an empty list when the text has no usable faces. Malformed numbers
/// read as `0.0` and out-of-range face indices are skipped.
pub fn parse_positions(text: &str) -> Vec<f32> {
    let mut points: Vec<Vec3> = Vec::new();
    let mut current: Vec<f32> = Vec::new();
    let mut last_complete: Vec<f32> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut coord = || {
                    parts
                        .next()
                        .and_then(|s| s.parse::<f32>().ok())
                        .unwrap_or(0.0)
                };
                let x = coord();
                let y = coord();
                let z = coord();
                points.push(Vec3::new(x, y, z));
            }
            Some("f") => {
                let corners: Vec<Vec3> = parts
                    .filter_map(|s| resolve_index(s, points.len()))
                    .map(|i| points[i])
                    .collect();
                if corners.len() < 3 {
                    continue;
                }
                for i in 1..corners.len() - 1 {
                    for p in [corners[0], corners[i], corners[i + 1]] {
                        current.extend_from_slice(&p.to_array());
                    }
                }
            }
            Some("o") | Some("g") => {
                if !current.is_empty() {
                    last_complete = std::mem::take(&mut current);
                }
            }
            _ => {}
        }
    }

    if current.is_empty() {
        last_complete
    } else {
        current
    }
}

/// Resolves a face corner like `3`, `3/1`, `3//2` or `-1` into a zero-based index.
fn resolve_index(corner: &str, count: usize) -> Option<usize> {
    let raw: i64 = corner.split('/').next()?.parse().ok()?;
    let index = if raw < 0 {
        count as i64 + raw
    } else {
        raw - 1
    };
    if index >= 0 && (index as usize) < count {
        Some(index as usize)
    } else {
        None
    }
}
