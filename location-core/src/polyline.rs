//! Decoder for the flexible polyline encoding used in routing responses.
//!
//! Layout: an unsigned varint version (always 1), an unsigned varint header
//! (`precision` in bits 0..4, third dimension kind in bits 4..7, third
//! dimension precision in bits 7..11), then zig-zag varint deltas for
//! lat, lng and the optional third value.

use crate::error::{Error, Result};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const FORMAT_VERSION: u64 = 1;

/// A decoded vertex. `z` is set when the polyline carries a third dimension
/// (altitude, elevation, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
    pub z: Option<f64>,
}

pub fn decode(encoded: &str) -> Result<Vec<Point>> {
    let mut values = encoded.bytes().map(char_value);

    let version = next_unsigned(&mut values)?
        .ok_or_else(|| Error::Decode("empty polyline".to_string()))?;
    if version != FORMAT_VERSION {
        return Err(Error::Decode(format!("unsupported polyline version {version}")));
    }

    let header = next_unsigned(&mut values)?
        .ok_or_else(|| Error::Decode("polyline header missing".to_string()))?;
    let precision = (header & 0x0f) as i32;
    let has_third = (header >> 4) & 0x07 != 0;
    let third_precision = ((header >> 7) & 0x0f) as i32;

    let scale = 10f64.powi(precision);
    let third_scale = 10f64.powi(third_precision);

    let (mut lat, mut lng, mut z) = (0i64, 0i64, 0i64);
    let mut points = Vec::new();

    while let Some(d_lat) = next_signed(&mut values)? {
        let d_lng = next_signed(&mut values)?
            .ok_or_else(|| Error::Decode("polyline ended mid-coordinate".to_string()))?;
        lat = accumulate(lat, d_lat)?;
        lng = accumulate(lng, d_lng)?;

        let third = if has_third {
            let d_z = next_signed(&mut values)?
                .ok_or_else(|| Error::Decode("polyline ended mid-coordinate".to_string()))?;
            z = accumulate(z, d_z)?;
            Some(z as f64 / third_scale)
        } else {
            None
        };

        points.push(Point { lat: lat as f64 / scale, lng: lng as f64 / scale, z: third });
    }

    Ok(points)
}

fn accumulate(current: i64, delta: i64) -> Result<i64> {
    current
        .checked_add(delta)
        .ok_or_else(|| Error::Decode("polyline coordinate overflow".to_string()))
}

fn char_value(b: u8) -> Result<u64> {
    ALPHABET
        .iter()
        .position(|&c| c == b)
        .map(|i| i as u64)
        .ok_or_else(|| Error::Decode(format!("invalid polyline character '{}'", b as char)))
}

fn next_unsigned<I>(values: &mut I) -> Result<Option<u64>>
where
    I: Iterator<Item = Result<u64>>,
{
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let v = match values.next() {
            Some(v) => v?,
            None if shift == 0 => return Ok(None),
            None => return Err(Error::Decode("truncated polyline value".to_string())),
        };
        // The 13th chunk has only 4 bits left in a u64.
        if shift > 60 || (shift == 60 && v & 0x10 != 0) {
            return Err(Error::Decode("polyline value overflow".to_string()));
        }
        result |= (v & 0x1f) << shift;
        if v & 0x20 == 0 {
            return Ok(Some(result));
        }
        shift += 5;
    }
}

fn next_signed<I>(values: &mut I) -> Result<Option<i64>>
where
    I: Iterator<Item = Result<u64>>,
{
    Ok(next_unsigned(values)?.map(|u| {
        let magnitude = (u >> 1) as i64;
        if u & 1 == 1 { !magnitude } else { magnitude }
    }))
}
