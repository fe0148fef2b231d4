use rapier3d::prelude::*;
use std::f32::consts::PI;

/*
Velocity of a point of rigidbody
# Arguments

* `x` - x coordinates relative to rigid body
* `y` - y coordinates relative to rigid body
* `z` - z coordinates relative to rigid body
* `body` - rigidbody
*/
pub fn get_velocity_at_point(x: f32, y: f32, z: f32, rigid_body: &RigidBody) -> Vector<Real> {
    let point_relative = Point::new(x, y, z);
    let point_world = rigid_body.position() * point_relative;
    rigid_body.velocity_at_point(&point_world)
}

/// Wrap angle in range ]-PI,PI]
pub fn angle_wrapping(angle: f32) -> f32 {
    let mut angle_res = angle;
    loop {
        if angle_res > PI {
            angle_res += -2.0 * PI
        } else if angle_res <= -PI {
            angle_res += 2.0 * PI
        } else {
            break;
        }
    }
    angle_res
}

/// Build a tangent for a surface hit point from its normal alone.
///
/// Physics contacts carry no tangent direction, so one is synthesized by
/// crossing the normal with the world up axis. When the normal is parallel
/// to up (a top-down or bottom-up hit) that cross product collapses and the
/// world forward axis is used instead; without the fallback such hits would
/// produce a zero or unstable stamp frame.
pub fn tangent_from_normal(normal: &Vector<Real>) -> Vector<Real> {
    let normal = match normal.try_normalize(1.0e-6) {
        Some(normal) => normal,
        // Zero normal, nothing sensible to derive. Any unit vector keeps
        // downstream math finite.
        None => return Vector::x(),
    };
    let tangent = normal.cross(&Vector::y());
    if tangent.norm_squared() < 0.01 {
        normal.cross(&Vector::z()).normalize()
    } else {
        tangent.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn test_angle_wrapping() {
        let mut result = angle_wrapping(PI);
        assert_eq!(result, PI);
        result = angle_wrapping(-PI);
        assert_eq!(result, PI);
        result = angle_wrapping(-2.0 * PI);
        assert_eq!(result, 0.0);
        result = angle_wrapping(-4.0 * PI);
        assert_eq!(result, 0.0);
        result = angle_wrapping(4.0 * PI);
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_tangent_for_up_normal_uses_fallback() {
        // Parallel to the up axis, the primary cross product collapses.
        let tangent = tangent_from_normal(&Vector::y());
        assert!(tangent.norm() > 0.0);
        assert_float_eq!(tangent.norm(), 1.0, abs <= 1.0e-5);
        assert_float_eq!(tangent.dot(&Vector::y()), 0.0, abs <= 1.0e-5);
    }

    #[test]
    fn test_tangent_for_right_normal_uses_primary_axis() {
        let normal = Vector::x();
        let tangent = tangent_from_normal(&normal);
        // Primary path: normal x up, unit length, perpendicular to normal.
        assert_float_eq!(tangent.norm(), 1.0, abs <= 1.0e-5);
        assert_float_eq!(tangent.dot(&normal), 0.0, abs <= 1.0e-5);
        assert_float_eq!(tangent.dot(&Vector::z()), 1.0, abs <= 1.0e-5);
    }

    #[test]
    fn test_tangent_not_normalized_input() {
        let tangent = tangent_from_normal(&(Vector::y() * 25.0));
        assert_float_eq!(tangent.norm(), 1.0, abs <= 1.0e-5);
    }

    #[test]
    fn test_tangent_zero_normal_is_finite() {
        let tangent = tangent_from_normal(&Vector::zeros());
        assert!(tangent.norm() > 0.0);
    }
}
