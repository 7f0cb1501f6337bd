/// Straight-alpha RGBA color with `f32` components in `[0, 1]`.
///
/// Game code mostly passes CSS-style strings (`"#0ff"`, `"#ff8800cc"`,
/// `"rgba(255, 0, 0, 0.5)"`); those convert through [`Color::parse`], which
/// never fails: anything it does not recognize becomes opaque white.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`,
    /// `white` and `black`.
    ///
    /// `rgb()` channels are 0–255, the `rgba()` alpha is 0–1. Unrecognized or
    /// malformed input yields [`Color::WHITE`].
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let parsed = if let Some(hex) = s.strip_prefix('#') {
            parse_hex(hex)
        } else if s.starts_with("rgb") {
            parse_rgb_fn(s)
        } else {
            match s {
                "white" => Some(Color::WHITE),
                "black" => Some(Color::BLACK),
                _ => None,
            }
        };
        parsed.unwrap_or(Color::WHITE)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Relative luminance (Rec. 709 weights) of the RGB channels.
    ///
    /// Bloom extraction uses the same weights to decide what glows.
    #[inline]
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Color::parse(s)
    }
}

impl From<&String> for Color {
    fn from(s: &String) -> Self {
        Color::parse(s)
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Color::rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<[f32; 3]> for Color {
    fn from(c: [f32; 3]) -> Self {
        Color::rgb(c[0], c[1], c[2])
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let nibble = |i: usize| -> Option<f32> {
        let v = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
        Some(v as f32 / 15.0)
    };
    let byte = |i: usize| -> Option<f32> {
        let v = u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()?;
        Some(v as f32 / 255.0)
    };

    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_fn(s: &str) -> Option<Color> {
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    if close <= open {
        return None;
    }

    let mut parts = s[open + 1..close].split(',').map(|p| p.trim().parse::<f32>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    let a = match parts.next() {
        Some(a) => a.ok()?,
        None => 1.0,
    };
    if parts.next().is_some() {
        return None;
    }

    Some(Color::rgba(r / 255.0, g / 255.0, b / 255.0, a))
}
