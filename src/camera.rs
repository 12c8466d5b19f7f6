use nalgebra::{Matrix4, Orthographic3};

/// Fixed 2D projection for a pixel-addressed surface: origin at the
/// bottom-left, y up, like the classic `glOrtho(0, w, 0, h)` setup.
///
/// All quads sit at z = 0, which both the GL-style [-1, 1] depth range and
/// wgpu's [0, 1] range map to 0, so no depth-range correction is needed.
pub struct ScreenProjection {
    width: f32,
    height: f32,
}

impl ScreenProjection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Orthographic3::new(0.0, self.width, 0.0, self.height, -1.0, 1.0).into_inner()
    }

    /// Column-major array form, as WGSL expects a `mat4x4<f32>` uniform.
    pub fn uniform(&self) -> [[f32; 4]; 4] {
        self.matrix().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn surface_corners_map_to_ndc_corners() {
        let projection = ScreenProjection::new(500, 500).matrix();

        let bottom_left = projection.transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert!((bottom_left.x + 1.0).abs() < 1e-5);
        assert!((bottom_left.y + 1.0).abs() < 1e-5);

        let top_right = projection.transform_point(&Point3::new(500.0, 500.0, 0.0));
        assert!((top_right.x - 1.0).abs() < 1e-5);
        assert!((top_right.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn y_axis_points_up() {
        let projection = ScreenProjection::new(200, 100).matrix();
        let low = projection.transform_point(&Point3::new(0.0, 10.0, 0.0));
        let high = projection.transform_point(&Point3::new(0.0, 90.0, 0.0));
        assert!(high.y > low.y);
    }
}
