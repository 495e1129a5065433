//! Nearest-color matching against the destination palette.
//!
//! Distance is CIEDE2000 over Lab, not RGB Euclidean distance: whether a
//! human reads two colors as "matching" is a perceptual question.

use std::collections::BTreeMap;

use palette::color_difference::Ciede2000;
use palette::{FromColor, Lab, Srgb};

use crate::error::{CalBridgeError, CalBridgeResult};

/// Parse a `#RRGGBB` string into an sRGB color.
pub fn parse_hex(color: &str) -> CalBridgeResult<Srgb<f32>> {
    let digits = color
        .strip_prefix('#')
        .ok_or_else(|| CalBridgeError::InvalidColor(color.to_string()))?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CalBridgeError::InvalidColor(color.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| -> CalBridgeResult<f32> {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| CalBridgeError::InvalidColor(color.to_string()))
    };

    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Return the palette id whose color is perceptually closest to `target`.
///
/// The palette maps destination color ids to `#RRGGBB` values. Ties are
/// broken deterministically: the palette is walked in key order and the
/// sort is stable, so the smallest id among exact ties wins.
pub fn closest_color_id(
    target: &str,
    palette: &BTreeMap<String, String>,
) -> CalBridgeResult<String> {
    if palette.is_empty() {
        return Err(CalBridgeError::NoPalette);
    }

    let target_lab = Lab::from_color(parse_hex(target)?);

    let mut ranked: Vec<(&String, f32)> = Vec::with_capacity(palette.len());
    for (id, hex) in palette {
        let candidate_lab = Lab::from_color(parse_hex(hex)?);
        ranked.push((id, target_lab.difference(candidate_lab)));
    }
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    Ok(ranked[0].0.clone())
}
