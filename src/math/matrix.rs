use super::Vec3;

/// 4x4 matrix for camera transforms (column-major for WebGL)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Mat4 {
    /// Perspective projection matrix
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        Self {
            data: [
                f / aspect, 0.0, 0.0, 0.0,
                0.0, f, 0.0, 0.0,
                0.0, 0.0, (far + near) * nf, -1.0,
                0.0, 0.0, 2.0 * far * near * nf, 0.0,
            ],
        }
    }

    /// Look-at view matrix
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).try_normalize().unwrap_or(-Vec3::FORWARD);
        let r = f.cross(&up).try_normalize().unwrap_or(Vec3::RIGHT);
        let u = r.cross(&f);

        Self {
            data: [
                r.x, u.x, -f.x, 0.0,
                r.y, u.y, -f.y, 0.0,
                r.z, u.z, -f.z, 0.0,
                -r.dot(&eye), -u.dot(&eye), f.dot(&eye), 1.0,
            ],
        }
    }

    /// Matrix multiplication
    pub fn mul(&self, other: &Mat4) -> Self {
        let mut result = [0.0f32; 16];

        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.data[row + k * 4] * other.data[k + col * 4];
                }
                result[row + col * 4] = sum;
            }
        }

        Self { data: result }
    }

    /// Transform a point (applies translation, no perspective divide)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.data[0] * p.x + self.data[4] * p.y + self.data[8] * p.z + self.data[12],
            self.data[1] * p.x + self.data[5] * p.y + self.data[9] * p.z + self.data[13],
            self.data[2] * p.x + self.data[6] * p.y + self.data[10] * p.z + self.data[14],
        )
    }

    /// Transform a point into normalized device coordinates.
    /// Returns `None` for points on or behind the eye plane.
    pub fn project_point(&self, p: Vec3) -> Option<Vec3> {
        let w = self.data[3] * p.x + self.data[7] * p.y + self.data[11] * p.z + self.data[15];
        if w <= f32::EPSILON {
            return None;
        }
        Some(self.transform_point(p).scale(1.0 / w))
    }

    pub fn as_slice(&self) -> &[f32; 16] {
        &self.data
    }
}
