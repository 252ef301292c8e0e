//! Animatable value types
//!
//! Provides the interpolation trait and the small property sets that
//! timeline segments animate from and to.

use serenade_core::{Color, Property, Value};
use smallvec::SmallVec;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

impl Interpolate for Value {
    /// Mismatched kinds cannot blend; they switch at the end of the span.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Value::Number(Interpolate::lerp(a, b, t)),
            (Value::Color(a), Value::Color(b)) => Value::Color(Interpolate::lerp(a, b, t)),
            _ if t >= 1.0 => *other,
            _ => *self,
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Interpolate::approx_eq(a, b, epsilon),
            (Value::Color(a), Value::Color(b)) => Interpolate::approx_eq(a, b, epsilon),
            _ => false,
        }
    }
}

/// A small ordered set of property values
///
/// Setting a property that is already present replaces its value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySet {
    entries: SmallVec<[(Property, Value); 4]>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric property (builder pattern)
    pub fn with(mut self, prop: Property, value: f32) -> Self {
        self.set(prop, Value::Number(value));
        self
    }

    /// Add a colour property (builder pattern)
    pub fn with_color(mut self, prop: Property, color: Color) -> Self {
        self.set(prop, Value::Color(color));
        self
    }

    pub fn set(&mut self, prop: Property, value: Value) {
        match self.entries.iter_mut().find(|(p, _)| *p == prop) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((prop, value)),
        }
    }

    pub fn get(&self, prop: Property) -> Option<Value> {
        self.entries
            .iter()
            .find(|(p, _)| *p == prop)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, prop: Property) -> bool {
        self.get(prop).is_some()
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, Value)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Property, Value)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (Property, Value)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (prop, value) in iter {
            set.set(prop, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_lerp() {
        assert_eq!(Interpolate::lerp(&0.0f32, &100.0, 0.25), 25.0);
        assert_eq!(Interpolate::lerp(&80.0f32, &0.0, 1.0), 0.0);
    }

    #[test]
    fn test_value_lerp_numbers_and_colors() {
        let a = Value::Number(0.0);
        let b = Value::Number(1.0);
        assert_eq!(a.lerp(&b, 0.5), Value::Number(0.5));

        let c = Value::Color(Color::BLACK);
        let d = Value::Color(Color::WHITE);
        assert!(c.lerp(&d, 0.5).approx_eq(&Value::Color(Color::rgb(0.5, 0.5, 0.5)), 1e-6));
    }

    #[test]
    fn test_value_lerp_mismatched_kinds_switch_at_end() {
        let a = Value::Number(1.0);
        let b = Value::Color(Color::WHITE);
        assert_eq!(a.lerp(&b, 0.99), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_property_set_replaces_existing() {
        let set = PropertySet::new()
            .with(Property::Y, 80.0)
            .with(Property::Opacity, 0.0)
            .with(Property::Y, 40.0);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(Property::Y), Some(Value::Number(40.0)));
        assert!(!set.contains(Property::Scale));
        assert_eq!(
            set.properties().collect::<Vec<_>>(),
            vec![Property::Y, Property::Opacity]
        );
    }
}
