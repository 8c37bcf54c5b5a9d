use anyhow::Result;
use log::error;
use plotters::prelude::RGBColor;

pub static FONT_SIZE: u32 = 20;
pub static LEGEND_FONT_SIZE: u32 = 20;
pub static STROKE_WIDTH: u32 = 3;
pub static MARKER_SIZE: u32 = 10;

/// Resolve a color label to an RGB value. Accepts the named labels below or
/// a `#rrggbb` hex string.
pub fn get_color_from_label(label: &str) -> Result<RGBColor> {
    if let Some(hex_str) = label.strip_prefix('#') {
        return parse_hex_color(hex_str);
    }

    match label {
        "orange" | "kayak" => Ok(RGBColor(255, 165, 0)),
        "blue" | "pyxis" => Ok(RGBColor(0, 0, 255)),
        "black" => Ok(RGBColor(0, 0, 0)),
        "dark-red" => Ok(RGBColor(130, 1, 1)),
        "dark-blue" => Ok(RGBColor(1, 6, 130)),
        "dark-green" => Ok(RGBColor(0, 97, 29)),
        "dark-orange" => Ok(RGBColor(163, 99, 2)),
        "dark-yellow" => Ok(RGBColor(179, 176, 0)),
        _ => {
            error!("unrecognized label for color (label={label})");
            anyhow::bail!("unrecognized label (label={label})");
        }
    }
}

fn parse_hex_color(hex_str: &str) -> Result<RGBColor> {
    let bytes = hex::decode(hex_str).map_err(|e| {
        let reason = format!("invalid hex color (color=#{hex_str}, error={e:?})");
        error!("{reason}");
        anyhow::anyhow!(reason)
    })?;

    match bytes.as_slice() {
        [r, g, b] => Ok(RGBColor(*r, *g, *b)),
        _ => {
            let reason = format!("hex color must have three components (color=#{hex_str})");
            error!("{reason}");
            anyhow::bail!(reason);
        }
    }
}
