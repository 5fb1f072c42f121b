use crate::core::scoring::thresholds::Thresholds;
use palette::{Mix, Srgb};

/// Colour of strongly destabilized cells.
pub const DESTABILIZED: Srgb<f64> = Srgb::new(1.0, 0.44313725, 0.15686274509);
/// Colour of unchanged cells.
pub const NEUTRAL: Srgb<f64> = Srgb::new(1.0, 0.92156862745, 0.51764705882);
/// Colour of strongly stabilized cells.
pub const STABILIZED: Srgb<f64> = Srgb::new(0.5725490196, 0.81568627451, 0.31372549019);
/// Colour of missing cells.
pub const MISSING: Srgb<f64> = Srgb::new(1.0, 1.0, 1.0);

const MARGIN: f64 = 0.1;

/// Maps a normalized ratio onto the destabilized, neutral, stabilized gradient.
///
/// The gradient saturates `0.1` beyond each threshold. Below 1.0 the colour blends from the
/// destabilized anchor to neutral; above it from neutral to the stabilized anchor.
pub fn colour_for(ratio: f64, thresholds: Thresholds) -> Srgb<f64> {
    if ratio.is_nan() {
        return MISSING;
    }
    let low = thresholds.min - MARGIN;
    let high = thresholds.max + MARGIN;

    if ratio < low {
        DESTABILIZED
    } else if ratio < 1.0 {
        DESTABILIZED.mix(NEUTRAL, blend_factor(ratio - low, 1.0 - low))
    } else if ratio < high {
        NEUTRAL.mix(STABILIZED, blend_factor(ratio - 1.0, high - 1.0))
    } else {
        STABILIZED
    }
}

fn blend_factor(offset: f64, span: f64) -> f64 {
    if span > 0.0 {
        (offset / span).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Renders a colour as `#rrggbb`, truncating each channel to eight bits.
pub fn to_hex(colour: Srgb<f64>) -> String {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0) as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(colour.red),
        channel(colour.green),
        channel(colour.blue)
    )
}
