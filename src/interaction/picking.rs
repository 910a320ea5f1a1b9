use crate::math::Vec3;
use super::probe::Ray;

/// Information about a ray/instance intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    pub index: usize,
    pub distance: f32,
    pub hit_point: Vec3,
}

/// Find the instance whose bounding sphere the ray enters first.
///
/// `spheres` yields `(center, radius)` per instance, in index order. When
/// several spheres overlap along the ray the one nearest the ray origin wins.
pub fn pick_nearest<I>(ray: &Ray, spheres: I) -> Option<HitInfo>
where
    I: IntoIterator<Item = (Vec3, f32)>,
{
    let mut closest: Option<HitInfo> = None;
    let mut min_dist = f32::MAX;

    for (index, (center, radius)) in spheres.into_iter().enumerate() {
        if let Some(dist) = ray_sphere_intersect(ray.origin(), ray.direction(), center, radius) {
            if dist < min_dist {
                min_dist = dist;
                closest = Some(HitInfo {
                    index,
                    distance: dist,
                    hit_point: ray.at(dist),
                });
            }
        }
    }

    closest
}

/// Ray-sphere intersection test against a unit-length direction.
/// Returns the distance to the first crossing in front of the origin.
fn ray_sphere_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    sphere_center: Vec3,
    sphere_radius: f32,
) -> Option<f32> {
    if sphere_radius.is_nan() || sphere_radius <= 0.0 {
        return None;
    }

    let oc = ray_origin - sphere_center;

    let b = oc.dot(&ray_dir);
    let c = oc.dot(&oc) - sphere_radius * sphere_radius;

    let discriminant = b * b - c;

    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t = -b - root;

    if t > 0.0 {
        Some(t)
    } else {
        let t2 = -b + root;
        if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }
}
