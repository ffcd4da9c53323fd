//! Portable float map (PFM) codec for single-channel disparity maps.
//!
//! Layout: an identifier line (`Pf`), a `width height` line and a scale line
//! whose sign encodes the byte order (negative = little endian), followed by
//! `width * height` 32-bit floats stored bottom row first. Lines starting
//! with `#` inside the header are skipped. Decoded values are multiplied by
//! `|scale|`.
use super::ImageF32;
use crate::error::EvalError;
use std::fs;
use std::path::Path;
use thiserror::Error;

const IDENTIFIER: &str = "Pf";
const PRINT_LIMIT: usize = 30;

/// Header and payload failures, kept distinct so submission validation can
/// report exactly what is wrong with a file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PfmError {
    #[error("Unknown identifier. Expected: \"{IDENTIFIER}\", got: \"{0}\".")]
    UnknownIdentifier(String),

    #[error("Could not parse dimensions: \"{0}\". Expected \"width height\", e.g. \"512 512\".")]
    InvalidDimensions(String),

    #[error("Could not parse max value / endianess information: \"{0}\". Should be a non-zero number.")]
    InvalidScale(String),

    #[error("Invalid binary values. Could not create {height}x{width} array from input.")]
    InvalidData { height: usize, width: usize },

    #[error("Incomplete file.")]
    Incomplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Decode a PFM byte buffer into a top-row-first raster.
pub fn decode_pfm(bytes: &[u8]) -> Result<ImageF32, PfmError> {
    let mut cursor = 0usize;

    let identifier = next_header_line(bytes, &mut cursor)?;
    if identifier != IDENTIFIER {
        return Err(PfmError::UnknownIdentifier(truncate(&identifier)));
    }

    let line_dimensions = next_header_line(bytes, &mut cursor)?;
    let (width, height) = parse_dimensions(&line_dimensions)
        .ok_or_else(|| PfmError::InvalidDimensions(truncate(&line_dimensions)))?;

    let line_scale = next_header_line(bytes, &mut cursor)?;
    let scale = line_scale
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|s| *s != 0.0 && !s.is_nan())
        .ok_or_else(|| PfmError::InvalidScale(truncate(&line_scale)))?;
    let endianness = if scale < 0.0 {
        Endianness::Little
    } else {
        Endianness::Big
    };

    let payload = &bytes[cursor..];
    let invalid = || PfmError::InvalidData { height, width };
    let expected = width.checked_mul(height).ok_or_else(invalid)?;
    if payload.len() != expected * 4 {
        return Err(invalid());
    }

    let factor = scale.abs();
    let data = payload
        .chunks_exact(4)
        .map(|chunk| {
            let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let v = match endianness {
                Endianness::Little => f32::from_le_bytes(raw),
                Endianness::Big => f32::from_be_bytes(raw),
            };
            v * factor
        })
        .collect();

    let img = ImageF32::from_vec(width, height, data).ok_or_else(invalid)?;
    Ok(img.flipped_vertically())
}

/// Encode a raster as PFM with unit scale in the given byte order.
pub fn encode_pfm(img: &ImageF32, endianness: Endianness) -> Vec<u8> {
    let scale = match endianness {
        Endianness::Little => -1,
        Endianness::Big => 1,
    };
    let header = format!("{IDENTIFIER}\n{} {}\n{scale}\n", img.w, img.h);
    let mut out = Vec::with_capacity(header.len() + img.w * img.h * 4);
    out.extend_from_slice(header.as_bytes());

    let flipped = img.flipped_vertically();
    for &v in &flipped.data {
        match endianness {
            Endianness::Little => out.extend_from_slice(&v.to_le_bytes()),
            Endianness::Big => out.extend_from_slice(&v.to_be_bytes()),
        }
    }
    out
}

/// Read a PFM disparity map from disk.
pub fn read_pfm(path: &Path) -> Result<ImageF32, EvalError> {
    let bytes = fs::read(path).map_err(|e| EvalError::io(path, e))?;
    decode_pfm(&bytes).map_err(|source| EvalError::Pfm {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a little-endian PFM, creating parent directories.
pub fn write_pfm(path: &Path, img: &ImageF32) -> Result<(), EvalError> {
    write_pfm_with(path, img, Endianness::Little)
}

pub fn write_pfm_with(path: &Path, img: &ImageF32, endianness: Endianness) -> Result<(), EvalError> {
    super::io::ensure_parent_dir(path)?;
    fs::write(path, encode_pfm(img, endianness)).map_err(|e| EvalError::io(path, e))
}

fn next_header_line(bytes: &[u8], cursor: &mut usize) -> Result<String, PfmError> {
    loop {
        if *cursor >= bytes.len() {
            return Err(PfmError::Incomplete);
        }
        let rest = &bytes[*cursor..];
        let end = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(PfmError::Incomplete)?;
        *cursor += end + 1;
        let line = String::from_utf8_lossy(&rest[..end]).trim_end().to_string();
        if !line.starts_with('#') {
            return Ok(line);
        }
    }
}

fn parse_dimensions(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    Some((width, height))
}

fn truncate(line: &str) -> String {
    line.chars().take(PRINT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(body: &str) -> Vec<u8> {
        body.as_bytes().to_vec()
    }

    #[test]
    fn rejects_color_identifier() {
        let err = decode_pfm(&header("PF\n2 2\n-1\n")).unwrap_err();
        assert!(matches!(err, PfmError::UnknownIdentifier(ref id) if id == "PF"));
    }

    #[test]
    fn rejects_bad_dimensions_and_scale() {
        assert!(matches!(
            decode_pfm(&header("Pf\n512\n-1\n")).unwrap_err(),
            PfmError::InvalidDimensions(_)
        ));
        assert!(matches!(
            decode_pfm(&header("Pf\n2 2\n0\n")).unwrap_err(),
            PfmError::InvalidScale(_)
        ));
        assert!(matches!(
            decode_pfm(&header("Pf\n2 2\nabc\n")).unwrap_err(),
            PfmError::InvalidScale(_)
        ));
    }

    #[test]
    fn rejects_short_payload_and_truncated_header() {
        let mut bytes = header("Pf\n2 2\n-1\n");
        bytes.extend_from_slice(&[0u8; 12]);
        assert_eq!(
            decode_pfm(&bytes).unwrap_err(),
            PfmError::InvalidData {
                height: 2,
                width: 2
            }
        );
        assert_eq!(decode_pfm(&header("Pf\n2 2")).unwrap_err(), PfmError::Incomplete);
    }

    #[test]
    fn skips_comments_and_applies_scale() {
        let mut bytes = header("Pf\n# produced by a test\n1 2\n-2.0\n");
        // bottom row first
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&0.25f32.to_le_bytes());
        let img = decode_pfm(&bytes).unwrap();
        assert_eq!(img.shape(), (2, 1));
        assert_eq!(img.get(0, 0), 0.5);
        assert_eq!(img.get(0, 1), 3.0);
    }

    #[test]
    fn big_endian_payload_decodes() {
        let img = ImageF32::from_fn(3, 2, |x, y| x as f32 - 0.5 * y as f32);
        let bytes = encode_pfm(&img, Endianness::Big);
        assert!(bytes.starts_with(b"Pf\n3 2\n1\n"));
        assert_eq!(decode_pfm(&bytes).unwrap(), img);
    }
}
