//! Pointer ray construction and ray/point proximity
//!
//! Everything here is recomputed every frame from the current pointer and
//! camera; nothing is cached between frames.

use crate::math::{Mat4, Vec3};

/// Near and far clip planes shared by the projection and the renderer
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// A half-line with a unit-length direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Returns `None` when the origin is not finite or the direction has no length
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        if !origin.is_finite() {
            return None;
        }
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction.scale(t)
    }

    /// Express this world-space ray in a frame placed at `offset` and
    /// rotated by `rotation_y` about the vertical axis.
    pub fn to_local(&self, offset: Vec3, rotation_y: f32) -> Ray {
        Ray {
            origin: (self.origin - offset).rotate_y(-rotation_y),
            direction: self.direction.rotate_y(-rotation_y),
        }
    }
}

/// Where a point sits relative to a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approach {
    /// Foot of the perpendicular from the point onto the ray
    pub closest_point: Vec3,
    /// `point - closest_point`, perpendicular to the ray
    pub offset: Vec3,
    pub distance_sq: f32,
    /// Signed distance of `closest_point` along the ray
    pub projection: f32,
}

/// Perpendicular approach of `point` to `ray`.
/// Points level with or behind the ray origin yield `None`.
pub fn closest_approach(ray: &Ray, point: Vec3) -> Option<Approach> {
    let projection = (point - ray.origin).dot(&ray.direction);
    if projection.is_nan() || projection <= 0.0 {
        return None;
    }

    let closest_point = ray.at(projection);
    let offset = point - closest_point;

    Some(Approach {
        closest_point,
        offset,
        distance_sq: offset.length_squared(),
        projection,
    })
}

/// Camera pose and lens the probe casts from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Viewport width / height
    pub aspect: f32,
}

impl CameraState {
    /// Orthonormal (forward, right, up) basis, `None` if eye and target
    /// coincide or the view is parallel to `up`
    pub fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = (self.target - self.eye).try_normalize()?;
        let right = forward.cross(&self.up).try_normalize()?;
        let up = right.cross(&forward);
        Some((forward, right, up))
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.aspect, NEAR_PLANE, FAR_PLANE)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix().mul(&self.view_matrix())
    }
}

/// Convert a pixel position to normalized device coordinates (y up)
pub fn pixel_to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    ((2.0 * x / width) - 1.0, 1.0 - (2.0 * y / height))
}

/// World-space ray from the camera eye through the pointer
pub fn ray_from_pointer(pointer_ndc: (f32, f32), camera: &CameraState) -> Option<Ray> {
    let (ndc_x, ndc_y) = pointer_ndc;
    if !ndc_x.is_finite() || !ndc_y.is_finite() {
        return None;
    }

    let (forward, right, up) = camera.basis()?;
    let half_height = (camera.fov_y / 2.0).tan();
    let half_width = half_height * camera.aspect;

    let direction = forward + right.scale(ndc_x * half_width) + up.scale(ndc_y * half_height);
    Ray::new(camera.eye, direction)
}
