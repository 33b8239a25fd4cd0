use core::fmt;

/// An RGBA color with components between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Color> {
        let hex = s.strip_prefix('#')?;
        let channel = |i: usize, len: usize| {
            let v = u8::from_str_radix(hex.get(i..i + len)?, 16).ok()?;
            let v = if len == 1 { v * 17 } else { v };
            Some(f64::from(v) / 255.)
        };

        match hex.len() {
            3 => Some(Color::rgba(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 1.)),
            6 => Some(Color::rgba(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, 1.)),
            8 => Some(Color::rgba(
                channel(0, 2)?,
                channel(2, 2)?,
                channel(4, 2)?,
                channel(6, 2)?,
            )),
            _ => None,
        }
    }
}

/// Formats as `#rrggbbaa`, the form native backends parse.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let byte = |c: f64| (c.max(0.).min(1.) * 255.).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }
}

#[test]
fn test_color_hex() {
    assert_eq!(Color::from_hex("#fff"), Some(Color::rgba(1., 1., 1., 1.)));
    assert_eq!(Color::from_hex("#000000"), Some(Color::rgba(0., 0., 0., 1.)));
    assert_eq!(Color::from_hex("#ff000080").map(|c| c.to_string()), Some("#ff000080".into()));
    assert_eq!(Color::from_hex("fff"), None);
    assert_eq!(Color::from_hex("#ggg"), None);
}
