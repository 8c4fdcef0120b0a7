//! # Types Module
//!
//! Shared data types used across the engine.
//!
//! ## Key Types
//! - `Color`: Float-based RGBA color.
//! - `Transform3`: Position, Euler rotation and scale of a scene node.
//! - `Viewport`: Current output size, used to normalise pointer input.
//! - `NodeId`: Type alias for arena indices (`usize`).

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A unique identifier for a node in the scene graph.
pub type NodeId = usize;

/// Represents a RGBA color in float format (0.0 - 1.0).
///
/// Deserializes from `{ "r", "g", "b", "a"? }`, a `0xRRGGBB` number or a
/// `"#rrggbb"` string.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorValue")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Accepted serialized forms of [`Color`].
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Hex(u32),
    Text(String),
    Rgba {
        r: f32,
        g: f32,
        b: f32,
        #[serde(default = "Color::opaque")]
        a: f32,
    },
}

impl TryFrom<ColorValue> for Color {
    type Error = String;

    fn try_from(value: ColorValue) -> Result<Self, Self::Error> {
        match value {
            ColorValue::Hex(hex) if hex <= 0xff_ffff => Ok(Color::from_hex(hex)),
            ColorValue::Hex(hex) => Err(format!("color 0x{:x} is out of range", hex)),
            ColorValue::Text(text) => {
                let digits = text.trim_start_matches('#');
                if digits.len() != 6 {
                    return Err(format!("expected \"#rrggbb\", got \"{}\"", text));
                }
                u32::from_str_radix(digits, 16)
                    .map(Color::from_hex)
                    .map_err(|e| format!("invalid color \"{}\": {}", text, e))
            }
            ColorValue::Rgba { r, g, b, a } => Ok(Color { r, g, b, a }),
        }
    }
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds an opaque color from a `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    fn opaque() -> f32 {
        1.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Position, rotation (Euler XYZ, radians) and scale of a scene node.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3 {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform3 {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }

    /// Local matrix (scale, then XYZ rotation, then translation).
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::new()
    }
}

/// Output surface size in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_reads_every_form() {
        let forms = [
            r#"{ "r": 1.0, "g": 0.0, "b": 0.2 }"#,
            "16711731",
            r##""#ff0033""##,
        ];
        for form in forms {
            let color: Color = serde_json::from_str(form).unwrap();
            assert_eq!(color.r, 1.0, "{}", form);
            assert_eq!(color.g, 0.0, "{}", form);
            assert!((color.b - 0.2).abs() < 1e-6, "{}", form);
            assert_eq!(color.a, 1.0, "{}", form);
        }
    }

    #[test]
    fn color_round_trips_as_rgba() {
        let color = Color::new(0.25, 0.5, 0.75, 0.5);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(serde_json::from_str::<Color>(&json).unwrap(), color);
    }

    #[test]
    fn bad_colors_are_rejected() {
        assert!(serde_json::from_str::<Color>(r##""#fff""##).is_err());
        assert!(serde_json::from_str::<Color>(r##""#gg0000""##).is_err());
        assert!(serde_json::from_str::<Color>("16777216").is_err());
    }
}
