use crate::math::vec4::Vec4;

/// Surface parameters of a model. Only `color` affects flat rendering; the
/// reflectance coefficients are carried for editing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// 0-255 RGB.
    pub color: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub shininess: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec4::rgb(255.0, 255.0, 255.0),
            ambient: Vec4::rgb(0.2, 0.2, 0.2),
            diffuse: Vec4::rgb(0.8, 0.8, 0.8),
            specular: Vec4::rgb(1.0, 1.0, 1.0),
            shininess: 1.0,
        }
    }
}

impl Material {
    pub fn with_color(color: Vec4) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}
