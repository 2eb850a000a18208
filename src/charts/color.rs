//! Rt value to marker colour.

use crate::config::ColorScale;

/// Maps a value onto the scale as an `rgb(r, g, b)` string.
///
/// Non-finite values get the midpoint colour.
pub fn value_color(value: f64, scale: &ColorScale) -> String {
    let [r, g, b] = value_rgb(value, scale);
    format!("rgb({r}, {g}, {b})")
}

pub fn value_rgb(value: f64, scale: &ColorScale) -> [u8; 3] {
    if !value.is_finite() {
        return scale.mid_color;
    }
    if value <= scale.cmid {
        let t = fraction(value, scale.cmin, scale.cmid);
        mix(scale.low_color, scale.mid_color, t)
    } else {
        let t = fraction(value, scale.cmid, scale.cmax);
        mix(scale.mid_color, scale.high_color, t)
    }
}

fn fraction(value: f64, from: f64, to: f64) -> f64 {
    if to <= from {
        return 1.0;
    }
    ((value - from) / (to - from)).clamp(0.0, 1.0)
}

fn mix(a: [u8; 3], b: [u8; 3], t: f64) -> [u8; 3] {
    let mut out = [0u8; 3];
    for i in 0..3 {
        let v = a[i] as f64 + (b[i] as f64 - a[i] as f64) * t;
        out[i] = v.round_ties_even() as u8;
    }
    out
}
