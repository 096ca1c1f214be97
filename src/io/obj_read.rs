//! Wavefront OBJ reader.
//!
//! Minimal streaming parser for the constructs the scene loader needs
//! (v, vn, f). Triangulates polygon faces with a fan from the first
//! vertex. Faces with out-of-range indices are reported and skipped;
//! a face-level anomaly never fails the whole mesh.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use log::warn;

/// Parsed mesh: raw positions plus fan-triangulated index triples.
#[derive(Debug, Clone, Default)]
pub struct ObjMesh {
    pub positions: Vec<Vec3>,
    /// Parsed but unused by the tracer; kept for completeness.
    pub normals: Vec<Vec3>,
    /// Triangulated faces as position-index triples.
    pub faces: Vec<[u32; 3]>,
}

impl ObjMesh {
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Vertices of triangle `i` in parse order.
    pub fn triangle(&self, i: usize) -> Option<(Vec3, Vec3, Vec3)> {
        let [a, b, c] = *self.faces.get(i)?;
        Some((
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ))
    }
}

/// OBJ face indices are 1-based; negative values count from the end.
fn index_fix(idx: i32, len: usize) -> Option<usize> {
    let resolved = if idx > 0 {
        idx as i64 - 1
    } else if idx < 0 {
        len as i64 + idx as i64
    } else {
        return None;
    };
    if resolved >= 0 && (resolved as usize) < len {
        Some(resolved as usize)
    } else {
        None
    }
}

/// First slot of a `v/vt/vn` token (`vt` may be empty).
fn parse_position_index(tok: &str) -> Option<i32> {
    tok.split('/').next()?.parse::<i32>().ok()
}

fn parse_vec3(mut it: std::str::SplitWhitespace<'_>) -> Option<Vec3> {
    let x = it.next()?.parse().ok()?;
    let y = it.next()?.parse().ok()?;
    let z = it.next()?.parse().ok()?;
    Some(Vec3::new(x, y, z))
}

/// Parse OBJ source text.
pub fn read_obj_str(source: &str, origin: &str) -> Result<ObjMesh> {
    let mut mesh = ObjMesh::default();

    for (line_no, line) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let mut it = s.split_whitespace();
        let tag = it.next().unwrap_or("");
        match tag {
            "v" => match parse_vec3(it) {
                Some(p) => mesh.positions.push(p),
                None => warn!("{origin}:{line_no}: malformed vertex line, skipped"),
            },
            "vn" => match parse_vec3(it) {
                Some(n) => mesh.normals.push(n),
                None => warn!("{origin}:{line_no}: malformed normal line, skipped"),
            },
            "f" => {
                let mut corners = Vec::new();
                let mut valid = true;
                for tok in it {
                    let resolved = parse_position_index(tok)
                        .and_then(|idx| index_fix(idx, mesh.positions.len()));
                    match resolved {
                        Some(i) => corners.push(i as u32),
                        None => {
                            warn!("{origin}:{line_no}: invalid face index {tok:?}, face skipped");
                            valid = false;
                            break;
                        }
                    }
                }
                if !valid {
                    continue;
                }
                if corners.len() < 3 {
                    warn!("{origin}:{line_no}: face with fewer than 3 vertices, skipped");
                    continue;
                }
                // Fan triangulation from the first vertex.
                for i in 1..corners.len() - 1 {
                    mesh.faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    Ok(mesh)
}

/// Read and parse an OBJ file from disk.
pub fn read_obj<P: AsRef<Path>>(path: P) -> Result<ObjMesh> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading mesh file {}", path.display()))?;
    read_obj_str(&source, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_fan_triangulated() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = read_obj_str(src, "quad.obj").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn face_tokens_with_empty_texcoord_slot() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = read_obj_str(src, "tri.obj").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.normals.len(), 1);
    }

    #[test]
    fn negative_indices_resolve_from_end() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = read_obj_str(src, "neg.obj").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn out_of_range_face_is_skipped() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\nf 1 2 3\n";
        let mesh = read_obj_str(src, "bad.obj").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }
}
