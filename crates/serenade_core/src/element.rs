//! Element handles, animatable properties and their values

use slotmap::new_key_type;

new_key_type! {
    /// Handle to an element in the host document
    pub struct ElementId;
}

/// A visual property the runtime is allowed to write
///
/// Output is limited to transform, opacity, filter, colour and position;
/// nothing here feeds back into layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// Horizontal translation in pixels
    X,
    /// Vertical translation in pixels
    Y,
    /// Horizontal translation as a percentage of the element's width
    XPercent,
    /// Vertical translation as a percentage of the element's height
    YPercent,
    /// Uniform scale factor
    Scale,
    /// Rotation in degrees
    Rotation,
    /// Opacity in `[0, 1]`
    Opacity,
    /// Blur filter radius in pixels
    Blur,
    /// Foreground colour
    Color,
    /// Text glow (shadow) radius in pixels
    GlowRadius,
    /// Gradient centre x in viewport pixels
    SpotlightX,
    /// Gradient centre y in viewport pixels
    SpotlightY,
}

impl Property {
    /// Value an element shows when the property has never been written
    pub fn initial(self) -> Value {
        match self {
            Property::Scale | Property::Opacity => Value::Number(1.0),
            Property::Color => Value::Color(Color::WHITE),
            _ => Value::Number(0.0),
        }
    }
}

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Linear interpolation between two colors
    ///
    /// `t` is not clamped so overshooting easings extrapolate.
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
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
        Self::BLACK
    }
}

/// A property value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Number(f32),
    Color(Color),
}

impl Value {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Number(_) => None,
        }
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

/// Position lock applied to a pinned element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PinLock {
    /// Element flows normally (scroll is before the pin range)
    #[default]
    None,
    /// Element is fixed at `top` pixels from the viewport top
    Fixed { top: f32 },
    /// Pin range has passed; element is pushed down by `offset` pixels of pin spacing
    Released { offset: f32 },
}

impl PinLock {
    pub fn is_fixed(&self) -> bool {
        matches!(self, PinLock::Fixed { .. })
    }
}
