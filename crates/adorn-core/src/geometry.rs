//! Parametric stand-in shapes.
//!
//! Products without a packaged 3D asset (and products whose asset fails
//! to load) render one of these recipes instead. Dimensions are in
//! pre-scale accessory units; the per-face scale factor normalises them
//! against the subject's face width.

use crate::types::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Material parameters ---
const METAL_METALNESS: f32 = 0.85;
const METAL_ROUGHNESS: f32 = 0.25;
const BEAD_METALNESS: f32 = 0.2;
const BEAD_ROUGHNESS: f32 = 0.6;
const GEM_METALNESS: f32 = 0.5;
const GEM_ROUGHNESS: f32 = 0.1;
const GEM_EMISSIVE: f32 = 0.2;

/// Linear RGB color in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    /// Parse a `#rrggbb` hex string; the leading `#` is optional.
    pub fn from_hex(raw: &str) -> Option<Color> {
        let hex = raw.strip_prefix('#').unwrap_or(raw);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| -> Option<f32> {
            u8::from_str_radix(&hex[range], 16).ok().map(|v| v as f32 / 255.0)
        };
        Some(Color { r: channel(0..2)?, g: channel(2..4)?, b: channel(4..6)? })
    }
}

/// Shape recipes in the stand-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Thin necklace loop with a row of beads.
    Strand,
    /// Thick close-fitting loop.
    Choker,
    /// Stem with an emissive gem.
    Pendant,
    /// Cone-and-cap earring drop.
    Drop,
    /// Plain ring of metal, the catch-all default.
    #[default]
    Torus,
}

impl ShapeKind {
    pub fn parse(raw: &str) -> Option<ShapeKind> {
        match raw.to_lowercase().as_str() {
            "strand" => Some(ShapeKind::Strand),
            "choker" => Some(ShapeKind::Choker),
            "pendant" => Some(ShapeKind::Pendant),
            "drop" => Some(ShapeKind::Drop),
            "torus" => Some(ShapeKind::Torus),
            _ => None,
        }
    }

    pub const fn all() -> [ShapeKind; 5] {
        [ShapeKind::Strand, ShapeKind::Choker, ShapeKind::Pendant, ShapeKind::Drop, ShapeKind::Torus]
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Strand => "strand",
            ShapeKind::Choker => "choker",
            ShapeKind::Pendant => "pendant",
            ShapeKind::Drop => "drop",
            ShapeKind::Torus => "torus",
        };
        f.write_str(name)
    }
}

/// Reduced PBR surface description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive_intensity: f32,
}

impl Material {
    fn metal(color: Color) -> Material {
        Material {
            color,
            metalness: METAL_METALNESS,
            roughness: METAL_ROUGHNESS,
            emissive_intensity: 0.0,
        }
    }

    fn bead() -> Material {
        Material {
            color: Color::WHITE,
            metalness: BEAD_METALNESS,
            roughness: BEAD_ROUGHNESS,
            emissive_intensity: 0.0,
        }
    }

    fn gem(color: Color) -> Material {
        Material {
            color,
            metalness: GEM_METALNESS,
            roughness: GEM_ROUGHNESS,
            emissive_intensity: GEM_EMISSIVE,
        }
    }
}

/// Render primitives understood by scene renderers. Segment counts are
/// tessellation hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Torus { radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32 },
    Sphere { radius: f32, segments: u32 },
    Cylinder { radius: f32, height: f32, radial_segments: u32 },
    Cone { radius: f32, height: f32, radial_segments: u32 },
}

/// One positioned primitive within a shape recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePart {
    pub primitive: Primitive,
    pub position: Vec3,
    pub material: Material,
}

/// A complete stand-in shape, ready for a renderer to instantiate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProceduralShape {
    pub kind: ShapeKind,
    pub parts: Vec<ShapePart>,
}

/// Build a stand-in shape in the accessory's metal color.
pub fn build_shape(kind: ShapeKind, color: Color) -> ProceduralShape {
    let metal = Material::metal(color);
    let parts = match kind {
        ShapeKind::Strand => {
            let mut parts = vec![ShapePart {
                primitive: Primitive::Torus {
                    radius: 35.0,
                    tube: 1.6,
                    radial_segments: 20,
                    tubular_segments: 120,
                },
                position: Vec3::ZERO,
                material: metal,
            }];
            for i in -3i32..=3 {
                parts.push(ShapePart {
                    primitive: Primitive::Sphere { radius: 2.4, segments: 24 },
                    position: Vec3::new(i as f32 * 4.0, -6.0, 0.0),
                    material: Material::bead(),
                });
            }
            parts
        }
        ShapeKind::Choker => vec![ShapePart {
            primitive: Primitive::Torus {
                radius: 28.0,
                tube: 3.5,
                radial_segments: 24,
                tubular_segments: 120,
            },
            position: Vec3::ZERO,
            material: metal,
        }],
        ShapeKind::Pendant => vec![
            ShapePart {
                primitive: Primitive::Cylinder { radius: 1.2, height: 16.0, radial_segments: 16 },
                position: Vec3::new(0.0, 6.0, 0.0),
                material: metal,
            },
            ShapePart {
                primitive: Primitive::Sphere { radius: 4.5, segments: 32 },
                position: Vec3::new(0.0, -2.0, 0.0),
                material: Material::gem(color),
            },
        ],
        ShapeKind::Drop => vec![
            ShapePart {
                primitive: Primitive::Cone { radius: 4.0, height: 10.0, radial_segments: 24 },
                position: Vec3::new(0.0, -4.0, 0.0),
                material: metal,
            },
            ShapePart {
                primitive: Primitive::Sphere { radius: 3.0, segments: 24 },
                position: Vec3::new(0.0, 2.0, 0.0),
                material: metal,
            },
        ],
        ShapeKind::Torus => vec![ShapePart {
            primitive: Primitive::Torus {
                radius: 40.0,
                tube: 3.0,
                radial_segments: 24,
                tubular_segments: 140,
            },
            position: Vec3::ZERO,
            material: metal,
        }],
    };
    ProceduralShape { kind, parts }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        let c = Color::from_hex("#ffd88b").unwrap();
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 216.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 139.0 / 255.0).abs() < 1e-6);
        assert_eq!(Color::from_hex("ffffff"), Some(Color::WHITE));
    }

    #[test]
    fn test_hex_parse_rejects_garbage() {
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::from_hex(""), None);
    }

    #[test]
    fn test_strand_has_loop_and_seven_beads() {
        let shape = build_shape(ShapeKind::Strand, Color::WHITE);
        assert_eq!(shape.parts.len(), 8);
        assert!(matches!(shape.parts[0].primitive, Primitive::Torus { radius, .. } if radius == 35.0));
        // Beads sit in a row below the loop
        for (i, part) in shape.parts[1..].iter().enumerate() {
            assert_eq!(part.position.x, (i as f32 - 3.0) * 4.0);
            assert_eq!(part.position.y, -6.0);
        }
    }

    #[test]
    fn test_pendant_gem_is_emissive() {
        let shape = build_shape(ShapeKind::Pendant, Color::from_hex("#ffd88b").unwrap());
        assert_eq!(shape.parts.len(), 2);
        let gem = &shape.parts[1];
        assert!(matches!(gem.primitive, Primitive::Sphere { radius, .. } if radius == 4.5));
        assert!((gem.material.emissive_intensity - 0.2).abs() < 1e-6);
        assert!(shape.parts[0].material.emissive_intensity == 0.0);
    }

    #[test]
    fn test_default_shape_is_plain_torus() {
        let shape = build_shape(ShapeKind::default(), Color::WHITE);
        assert_eq!(shape.kind, ShapeKind::Torus);
        assert_eq!(shape.parts.len(), 1);
        assert!(matches!(
            shape.parts[0].primitive,
            Primitive::Torus { radius, tube, .. } if radius == 40.0 && tube == 3.0
        ));
    }

    #[test]
    fn test_shape_kind_parse() {
        assert_eq!(ShapeKind::parse("strand"), Some(ShapeKind::Strand));
        assert_eq!(ShapeKind::parse("Choker"), Some(ShapeKind::Choker));
        assert_eq!(ShapeKind::parse("cube"), None);
    }
}
