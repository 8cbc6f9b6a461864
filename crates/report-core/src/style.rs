//! Severity colors

use inspection_types::Severity;
use lopdf::Object;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Color components as PDF operands (0-1 range)
    pub fn operands(&self) -> Vec<Object> {
        [self.0, self.1, self.2]
            .iter()
            .map(|c| Object::Real(*c as f32 / 255.0))
            .collect()
    }
}

/// Colors used for one severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityPalette {
    /// Light tint behind the section banner
    pub banner: Rgb,
    /// Saturated color of the table-of-contents marker
    pub marker: Rgb,
}

pub fn palette(severity: Severity) -> SeverityPalette {
    match severity {
        Severity::Critical => SeverityPalette {
            banner: Rgb(255, 200, 200),
            marker: Rgb(200, 30, 30),
        },
        Severity::Warning => SeverityPalette {
            banner: Rgb(255, 243, 200),
            marker: Rgb(230, 160, 0),
        },
        Severity::Ok => SeverityPalette {
            banner: Rgb(200, 255, 200),
            marker: Rgb(40, 160, 60),
        },
    }
}

/// Parse hex color string (e.g., "#FF0000" or "FF0000")
pub fn parse_hex_color(color: &str) -> Option<Rgb> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_total_and_distinct() {
        let banners: Vec<Rgb> = Severity::ALL.iter().map(|s| palette(*s).banner).collect();
        assert_eq!(banners.len(), 3);
        assert_ne!(banners[0], banners[1]);
        assert_ne!(banners[1], banners[2]);
        assert_ne!(banners[0], banners[2]);
    }

    #[test]
    fn test_banner_colors() {
        assert_eq!(palette(Severity::Critical).banner, Rgb(255, 200, 200));
        assert_eq!(palette(Severity::Warning).banner, Rgb(255, 243, 200));
        assert_eq!(palette(Severity::Ok).banner, Rgb(200, 255, 200));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF8000"), Some(Rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("00ff00"), Some(Rgb(0, 255, 0)));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn test_operands_are_normalized() {
        let ops = Rgb::WHITE.operands();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], Object::Real(v) if (v - 1.0).abs() < f32::EPSILON));
    }
}
