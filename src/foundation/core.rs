use std::{fmt, str::FromStr};

use crate::foundation::error::{BackdropError, BackdropResult};

/// 8-bit-per-channel RGB color.
///
/// Serialized as a `#rrggbb` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb(c.to_array())
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = BackdropError;

    /// Accepts `#rgb`, `#rrggbb` and the 16-bit `#rrrrggggbbbb` form.
    fn from_str(s: &str) -> BackdropResult<Self> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| BackdropError::validation(format!("color '{s}' must start with '#'")))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BackdropError::validation(format!(
                "color '{s}' contains non-hex digits"
            )));
        }

        let digits = match hex.len() {
            3 | 6 | 12 => hex.len() / 3,
            _ => {
                return Err(BackdropError::validation(format!(
                    "color '{s}' must have 3, 6 or 12 hex digits"
                )));
            }
        };

        let channel = |idx: usize| -> BackdropResult<u8> {
            let part = &hex[idx * digits..(idx + 1) * digits];
            let v = u16::from_str_radix(part, 16)
                .map_err(|e| BackdropError::validation(format!("color '{s}': {e}")))?;
            Ok(match digits {
                1 => (v * 17) as u8,
                2 => v as u8,
                _ => (v >> 8) as u8,
            })
        };

        Ok(Self::new(channel(0)?, channel(1)?, channel(2)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = BackdropError;

    fn try_from(s: String) -> BackdropResult<Self> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`.
impl FromStr for Size {
    type Err = BackdropError;

    fn from_str(s: &str) -> BackdropResult<Self> {
        let parse = |v: &str| v.trim().parse::<u32>().ok();
        let (w, h) = s
            .split_once(['x', 'X'])
            .and_then(|(w, h)| Some((parse(w)?, parse(h)?)))
            .ok_or_else(|| BackdropError::validation(format!("invalid size '{s}', expected WxH")))?;
        Ok(Self::new(w, h))
    }
}

/// Target rectangle of a renderer, relative to its surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
