//! PLYXYZ: minimal reader for ASCII PLY point clouds.
//!
//! Only vertex positions are read. Everything else in the header is skipped,
//! and there is no binary encoding support.
//!
//! File layout (text, one record per line):
//!   ply                         magic, must be the first line
//!   ...                         free-form header lines (format, comment, property ...)
//!   element vertex <N>          vertex count; the last occurrence wins
//!   ...
//!   end_header
//!   x y z [extra tokens]        N body lines, extra tokens ignored
//!
//! A load is all-or-nothing: either every declared vertex parses and a
//! [`PointCloud`] is returned, or a [`FormatError`] is, never a partial cloud.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

pub const PLY_MAGIC: &str = "ply";
pub const END_HEADER: &str = "end_header";

/// Upper bound for the up-front allocation; larger clouds grow as they parse.
const MAX_PREALLOC_POINTS: usize = 1 << 20;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("not a PLY file: first line must be `ply`")]
    BadMagic,

    #[error("truncated PLY: header declares {expected} vertices, found {found}")]
    Truncated { expected: u32, found: u32 },

    #[error("invalid vertex count in header line `{line}`")]
    BadVertexCount { line: String },

    #[error("vertex row {row} is not `x y z`: `{line}`")]
    BadCoordinate { row: u32, line: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One vertex of the cloud. `row_index` is its 0-based position in the file body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: [f64; 3],
    pub row_index: u32,
}

/// Axis-aligned bounding box. All-zero for an empty cloud.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Bounds {
    fn seeded(p: [f64; 3]) -> Self {
        Self { min: p, max: p }
    }

    fn fold(&mut self, p: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    #[inline]
    pub fn extent(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    #[inline]
    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        ]
    }
}

/// Narrows a position to `f32` for GPU-facing buffers.
#[inline]
pub fn narrow(v: [f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}

/// An immutable, fully loaded point cloud in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    points: Vec<Point>,
    bounds: Bounds,
}

impl PointCloud {
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Returns the vertex count if `line` is an `element vertex <N>` declaration.
fn vertex_count_decl(line: &str) -> Result<Option<u32>, FormatError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("element") || tokens.next() != Some("vertex") {
        return Ok(None);
    }

    tokens
        .next()
        .and_then(|t| t.parse::<u32>().ok())
        .map(Some)
        .ok_or_else(|| FormatError::BadVertexCount {
            line: line.to_owned(),
        })
}

fn parse_xyz(line: &str, row: u32) -> Result<[f64; 3], FormatError> {
    let bad = || FormatError::BadCoordinate {
        row,
        line: line.to_owned(),
    };

    let mut tokens = line.split_whitespace();
    let mut xyz = [0.0f64; 3];
    for v in xyz.iter_mut() {
        *v = tokens
            .next()
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(bad)?;
    }
    Ok(xyz)
}

/// Parse an ASCII PLY stream. This is the single source of truth for parsing.
pub fn parse_ply<R: BufRead>(reader: R) -> Result<PointCloud, FormatError> {
    let mut lines = reader.lines();

    // Magic
    match lines.next().transpose()? {
        Some(first) if first.trim_end() == PLY_MAGIC => {}
        _ => return Err(FormatError::BadMagic),
    }

    // Header: only `element vertex` matters.
    let mut expected: u32 = 0;
    let mut terminated = false;
    for line in lines.by_ref() {
        let line = line?;
        let line = line.trim_end();
        if line == END_HEADER {
            terminated = true;
            break;
        }
        if let Some(n) = vertex_count_decl(line)? {
            expected = n;
        }
    }

    if !terminated {
        return Err(FormatError::Truncated { expected, found: 0 });
    }

    if expected == 0 {
        return Ok(PointCloud::default());
    }

    // Body
    let mut points = Vec::with_capacity((expected as usize).min(MAX_PREALLOC_POINTS));
    let mut bounds = Bounds::default();

    for row in 0..expected {
        let line = match lines.next().transpose()? {
            Some(line) => line,
            None => {
                return Err(FormatError::Truncated {
                    expected,
                    found: row,
                })
            }
        };

        let position = parse_xyz(&line, row)?;
        if row == 0 {
            bounds = Bounds::seeded(position);
        } else {
            bounds.fold(position);
        }

        points.push(Point {
            position,
            row_index: row,
        });
    }

    log::debug!(
        "PLY: pts={}, bounds=min({:.3},{:.3},{:.3}) max({:.3},{:.3},{:.3})",
        points.len(),
        bounds.min[0], bounds.min[1], bounds.min[2],
        bounds.max[0], bounds.max[1], bounds.max[2],
    );

    Ok(PointCloud { points, bounds })
}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<PointCloud, FormatError> {
    let file = File::open(path)?;
    parse_ply(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<PointCloud, FormatError> {
        parse_ply(text.as_bytes())
    }

    #[test]
    fn loads_declared_points_with_bounds() {
        let cloud = parse(
            "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nend_header\n\
             1 2 3\n-1 5 0.5 99 99\n0 -2 7\n",
        )
        .unwrap();

        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.bounds().min, [-1.0, -2.0, 0.5]);
        assert_eq!(cloud.bounds().max, [1.0, 5.0, 7.0]);

        for (i, p) in cloud.points().iter().enumerate() {
            assert_eq!(p.row_index, i as u32);
            for axis in 0..3 {
                assert!(cloud.bounds().min[axis] <= p.position[axis]);
                assert!(p.position[axis] <= cloud.bounds().max[axis]);
            }
        }
        assert_eq!(cloud.points()[1].position, [-1.0, 5.0, 0.5]);
    }

    #[test]
    fn bounds_seed_from_first_point() {
        // All coordinates positive: a zero-seeded box would wrongly include the origin.
        let cloud = parse("ply\nelement vertex 2\nend_header\n2 3 4\n5 6 7\n").unwrap();
        assert_eq!(cloud.bounds().min, [2.0, 3.0, 4.0]);
        assert_eq!(cloud.bounds().max, [5.0, 6.0, 7.0]);
    }

    #[test]
    fn bounds_extent_and_center() {
        let cloud = parse("ply\nelement vertex 2\nend_header\n-1 0 2\n3 4 2\n").unwrap();
        let bounds = cloud.bounds();
        assert_eq!(bounds.extent(), [4.0, 4.0, 0.0]);
        assert_eq!(bounds.center(), [1.0, 2.0, 2.0]);

        assert_eq!(Bounds::default().extent(), [0.0; 3]);
        assert_eq!(Bounds::default().center(), [0.0; 3]);
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(matches!(parse("PLY\nend_header\n"), Err(FormatError::BadMagic)));
        assert!(matches!(parse(""), Err(FormatError::BadMagic)));
        assert!(matches!(parse("plyx\nelement vertex 0\nend_header\n"), Err(FormatError::BadMagic)));
    }

    #[test]
    fn rejects_short_body() {
        let err = parse("ply\nelement vertex 3\nend_header\n0 0 0\n1 1 1\n").unwrap_err();
        assert!(matches!(err, FormatError::Truncated { expected: 3, found: 2 }));
    }

    #[test]
    fn rejects_unterminated_header() {
        let err = parse("ply\nelement vertex 2\n").unwrap_err();
        assert!(matches!(err, FormatError::Truncated { expected: 2, found: 0 }));
    }

    #[test]
    fn last_vertex_declaration_wins() {
        let cloud =
            parse("ply\nelement vertex 5\nelement vertex 1\nend_header\n4 4 4\n").unwrap();
        assert_eq!(cloud.len(), 1);
    }

    #[test]
    fn zero_vertices_is_empty_with_sentinel_bounds() {
        let cloud = parse("ply\nelement vertex 0\nend_header\n").unwrap();
        assert!(cloud.is_empty());
        assert_eq!(cloud.bounds(), Bounds::default());

        let cloud = parse("ply\ncomment no vertices\nend_header\n").unwrap();
        assert!(cloud.is_empty());
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        let err = parse("ply\nelement vertex 2\nend_header\n0 0 0\n1 abc 2\n").unwrap_err();
        match err {
            FormatError::BadCoordinate { row, line } => {
                assert_eq!(row, 1);
                assert_eq!(line, "1 abc 2");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = parse("ply\nelement vertex 1\nend_header\n1 2\n").unwrap_err();
        assert!(matches!(err, FormatError::BadCoordinate { row: 0, .. }));

        let err = parse("ply\nelement vertex 1\nend_header\nnan 0 0\n").unwrap_err();
        assert!(matches!(err, FormatError::BadCoordinate { row: 0, .. }));
    }

    #[test]
    fn rejects_bad_vertex_count() {
        let err = parse("ply\nelement vertex lots\nend_header\n").unwrap_err();
        assert!(matches!(err, FormatError::BadVertexCount { .. }));

        let err = parse("ply\nelement vertex -4\nend_header\n").unwrap_err();
        assert!(matches!(err, FormatError::BadVertexCount { .. }));
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let cloud = parse("ply\r\nelement vertex 1\r\nend_header\r\n1 2 3\r\n").unwrap();
        assert_eq!(cloud.points()[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn reads_from_disk() {
        let path = std::env::temp_dir().join(format!("plyxyz-read-{}.ply", std::process::id()));
        std::fs::write(&path, "ply\nelement vertex 1\nend_header\n0.5 0.25 -1\n").unwrap();

        let cloud = read_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cloud.len(), 1);
        assert_eq!(narrow(cloud.points()[0].position), [0.5f32, 0.25, -1.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_file("/definitely/not/here.ply").unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }
}
