//! Brushes and colors

use std::fmt;

/// RGBA color, every channel in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Opaque color; channels are clamped to `[0, 1]`
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Channels are clamped to `[0, 1]`; NaN becomes 0
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: unit(r),
            g: unit(g),
            b: unit(b),
            a: unit(a),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f64) -> Color {
        let t = unit(t);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Paint applied to a surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Brush {
    Solid(Color),
}

impl Brush {
    pub const TRANSPARENT: Brush = Brush::Solid(Color::TRANSPARENT);
    pub const RED: Brush = Brush::Solid(Color::RED);

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Brush::Solid(Color::rgb(r, g, b))
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Brush::Solid(Color::rgba(r, g, b, a))
    }

    pub fn color(&self) -> Color {
        match self {
            Brush::Solid(color) => *color,
        }
    }

    pub fn lerp(a: &Brush, b: &Brush, t: f64) -> Brush {
        Brush::Solid(Color::lerp(&a.color(), &b.color(), t))
    }
}

impl Default for Brush {
    fn default() -> Self {
        Brush::TRANSPARENT
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

impl fmt::Display for Brush {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Color { r, g, b, a } = self.color();
        write!(f, "rgba({r}, {g}, {b}, {a})")
    }
}
