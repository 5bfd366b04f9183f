//! Planar geometry on the toroidal arena: wrapping, capsules and convex polygons.

use glam::Vec2;

/// Tolerance used when a zero-radius sweep must register a touching segment.
const CONTACT_EPSILON: f32 = 1.0e-3;

/// Wraps a single coordinate into `[0, extent)`.
pub(crate) fn wrap_coordinate(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid rounds tiny negative inputs up to `extent` itself.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// Wraps a position into the `width` by `height` arena.
pub(crate) fn wrap_position(position: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        wrap_coordinate(position.x, width),
        wrap_coordinate(position.y, height),
    )
}

/// Shortest offset from `from` to `to` on the torus.
pub(crate) fn shortest_delta(from: Vec2, to: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        shortest_axis(to.x - from.x, width),
        shortest_axis(to.y - from.y, height),
    )
}

fn shortest_axis(delta: f32, extent: f32) -> f32 {
    let half = extent * 0.5;
    if delta > half {
        delta - extent
    } else if delta < -half {
        delta + extent
    } else {
        delta
    }
}

/// Normalises an angle in degrees into `[0, 360)`.
pub(crate) fn normalize_degrees(degrees: f32) -> f32 {
    wrap_coordinate(degrees, 360.0)
}

/// Signed difference `to - from` in degrees, folded into `[-180, 180)`.
pub(crate) fn angle_difference(from: f32, to: f32) -> f32 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Unit vector pointing along a heading given in degrees.
pub(crate) fn heading_vector(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Heading in degrees of the provided direction.
pub(crate) fn bearing_of(direction: Vec2) -> f32 {
    normalize_degrees(direction.y.atan2(direction.x).to_degrees())
}

/// Segment with rounded ends, used for ship hulls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Capsule {
    pub(crate) start: Vec2,
    pub(crate) end: Vec2,
    pub(crate) radius: f32,
}

impl Capsule {
    /// Hull centred on `center` whose axis follows `heading`.
    pub(crate) fn hull(center: Vec2, heading: f32, half_length: f32, radius: f32) -> Self {
        let axis = heading_vector(heading) * half_length;
        Self {
            start: center - axis,
            end: center + axis,
            radius,
        }
    }

    /// Returns the capsule shifted by `offset`.
    pub(crate) fn translated(self, offset: Vec2) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            radius: self.radius,
        }
    }

    /// Reports whether two capsules intersect.
    pub(crate) fn overlaps(&self, other: &Capsule) -> bool {
        let (_, _, distance_sq) =
            closest_segment_params(self.start, self.end, other.start, other.end);
        let reach = self.radius + other.radius;
        distance_sq <= reach * reach
    }

    /// Reports whether the capsule intersects the convex polygon.
    pub(crate) fn overlaps_polygon(&self, vertices: &[Vec2]) -> bool {
        if point_in_convex_polygon(self.start, vertices)
            || point_in_convex_polygon(self.end, vertices)
        {
            return true;
        }
        let radius_sq = self.radius * self.radius;
        polygon_edges(vertices).any(|(a, b)| {
            let (_, _, distance_sq) = closest_segment_params(self.start, self.end, a, b);
            distance_sq <= radius_sq
        })
    }

    /// Parameter along `from -> to` at which a point inflated by `inflate`
    /// first touches the capsule. A sweep that starts inside reports zero.
    pub(crate) fn sweep(&self, from: Vec2, to: Vec2, inflate: f32) -> Option<f32> {
        let reach = self.radius + inflate + CONTACT_EPSILON;
        let (_, _, inside_sq) = closest_segment_params(from, from, self.start, self.end);
        if inside_sq <= reach * reach {
            return Some(0.0);
        }

        // The boundary is two end caps joined by two sides parallel to the axis.
        let side = (self.end - self.start).perp().normalize_or_zero() * reach;
        let caps = [self.start, self.end]
            .into_iter()
            .filter_map(|center| circle_entry(from, to, center, reach));
        let sides = [side, -side]
            .into_iter()
            .filter(|offset| *offset != Vec2::ZERO)
            .filter_map(|offset| {
                segment_crossing(from, to, self.start + offset, self.end + offset)
            });

        caps.chain(sides).min_by(f32::total_cmp)
    }
}

/// Parameter along `from -> to` at which the segment enters the circle.
fn circle_entry(from: Vec2, to: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let direction = to - from;
    let a = direction.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let offset = from - center;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / a;
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Parameter along `from -> to` at which it crosses the segment `a -> b`.
fn segment_crossing(from: Vec2, to: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    let travel = to - from;
    let edge = b - a;
    let denom = travel.perp_dot(edge);
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let start = a - from;
    let t = start.perp_dot(edge) / denom;
    let u = start.perp_dot(travel) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then_some(t)
}

/// Parameter along `from -> to` at which a point inflated by `inflate` first
/// touches the convex polygon. A sweep that starts inside reports zero.
pub(crate) fn sweep_polygon(from: Vec2, to: Vec2, vertices: &[Vec2], inflate: f32) -> Option<f32> {
    if point_in_convex_polygon(from, vertices) {
        return Some(0.0);
    }
    let reach = inflate + CONTACT_EPSILON;
    polygon_edges(vertices)
        .filter_map(|(a, b)| {
            let (s, _, distance_sq) = closest_segment_params(from, to, a, b);
            (distance_sq <= reach * reach).then_some(s)
        })
        .min_by(f32::total_cmp)
}

/// Reports whether `point` lies inside or on the convex polygon.
///
/// Vertices may wind in either direction.
pub(crate) fn point_in_convex_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut sign = 0.0_f32;
    for (a, b) in polygon_edges(vertices) {
        let cross = (b - a).perp_dot(point - a);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

fn polygon_edges(vertices: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
}

/// Closest points between segments `p1 -> q1` and `p2 -> q2`.
///
/// Returns the parameter along each segment and the squared distance between
/// the two closest points.
pub(crate) fn closest_segment_params(p1: Vec2, q1: Vec2, p2: Vec2, q2: Vec2) -> (f32, f32, f32) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= f32::EPSILON && e <= f32::EPSILON {
        (0.0, 0.0)
    } else if a <= f32::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= f32::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > f32::EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    let closest_a = p1 + d1 * s;
    let closest_b = p2 + d2 * t;
    (s, t, closest_a.distance_squared(closest_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(center: Vec2, half: f32) -> Vec<Vec2> {
        vec![
            center + Vec2::new(-half, -half),
            center + Vec2::new(half, -half),
            center + Vec2::new(half, half),
            center + Vec2::new(-half, half),
        ]
    }

    #[test]
    fn wrapping_maps_extent_to_zero() {
        assert_eq!(wrap_coordinate(800.0, 800.0), 0.0);
        assert_eq!(wrap_coordinate(0.0, 800.0), 0.0);
        let near_edge = wrap_coordinate(-0.5, 800.0);
        assert!((near_edge - 799.5).abs() < 1.0e-3);
        assert!(wrap_coordinate(-1.0e-9, 800.0) < 800.0);
    }

    #[test]
    fn wrapping_is_idempotent_in_bounds() {
        for value in [0.0, 0.25, 399.0, 799.99] {
            assert_eq!(wrap_coordinate(value, 800.0), value);
        }
        let position = wrap_position(Vec2::new(-10.0, 610.0), 800.0, 600.0);
        assert_eq!(wrap_position(position, 800.0, 600.0), position);
    }

    #[test]
    fn shortest_delta_crosses_the_seam() {
        let delta = shortest_delta(Vec2::new(790.0, 10.0), Vec2::new(10.0, 590.0), 800.0, 600.0);
        assert!((delta - Vec2::new(20.0, -20.0)).length() < 1.0e-3);
    }

    #[test]
    fn angle_difference_folds_to_half_turn() {
        assert_eq!(angle_difference(350.0, 10.0), 20.0);
        assert_eq!(angle_difference(10.0, 350.0), -20.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
    }

    #[test]
    fn point_in_polygon_accepts_either_winding() {
        let mut vertices = square(Vec2::ZERO, 10.0);
        assert!(point_in_convex_polygon(Vec2::new(3.0, -4.0), &vertices));
        vertices.reverse();
        assert!(point_in_convex_polygon(Vec2::new(3.0, -4.0), &vertices));
        assert!(!point_in_convex_polygon(Vec2::new(11.0, 0.0), &vertices));
    }

    #[test]
    fn sweep_finds_capsule_between_endpoints() {
        let hull = Capsule::hull(Vec2::new(500.0, 500.0), 90.0, 15.0, 7.5);
        let from = Vec2::new(480.0, 500.0);
        let to = Vec2::new(520.0, 500.0);

        assert!(hull.sweep(from, from, 5.0).is_none());
        assert!(hull.sweep(to, to, 5.0).is_none());
        let s = hull.sweep(from, to, 5.0).expect("swept contact");
        assert!((from.lerp(to, s).x - 487.5).abs() < 1.0e-2, "enters at the inflated side");
    }

    #[test]
    fn sweep_stops_at_the_hull_surface() {
        let upright = Capsule::hull(Vec2::new(300.0, 400.0), 90.0, 15.0, 7.5);
        let from = Vec2::new(100.0, 400.0);
        let to = Vec2::new(500.0, 400.0);
        let s = upright.sweep(from, to, 0.0).expect("beam crosses the side");
        assert!((from.lerp(to, s).x - 292.5).abs() < 1.0e-2);

        let level = Capsule::hull(Vec2::new(300.0, 400.0), 0.0, 15.0, 7.5);
        let s = level.sweep(from, to, 0.0).expect("beam meets the end cap");
        assert!((from.lerp(to, s).x - 277.5).abs() < 1.0e-2);

        let grazing = level.sweep(Vec2::new(280.0, 370.0), Vec2::new(280.0, 430.0), 0.0);
        assert!(grazing.is_some(), "the rounded cap still catches a glancing pass");
        assert_eq!(upright.sweep(Vec2::new(302.0, 400.0), to, 0.0), Some(0.0));
    }

    #[test]
    fn sweep_reports_earliest_polygon_edge() {
        let vertices = square(Vec2::new(100.0, 0.0), 10.0);
        let s = sweep_polygon(Vec2::ZERO, Vec2::new(200.0, 0.0), &vertices, 0.0)
            .expect("beam crosses square");
        assert!((s * 200.0 - 90.0).abs() < 1.0e-2);
        assert_eq!(
            sweep_polygon(Vec2::new(100.0, 0.0), Vec2::new(300.0, 0.0), &vertices, 0.0),
            Some(0.0)
        );
    }

    #[test]
    fn capsules_overlap_when_hulls_touch() {
        let left = Capsule::hull(Vec2::new(0.0, 0.0), 90.0, 15.0, 7.5);
        let right = Capsule::hull(Vec2::new(14.0, 0.0), 90.0, 15.0, 7.5);
        let far = right.translated(Vec2::new(10.0, 0.0));
        assert!(left.overlaps(&right));
        assert!(!left.overlaps(&far));
    }

    #[test]
    fn capsule_touches_polygon_edge() {
        let vertices = square(Vec2::ZERO, 10.0);
        let touching = Capsule::hull(Vec2::new(15.0, 0.0), 90.0, 15.0, 7.5);
        let clear = Capsule::hull(Vec2::new(30.0, 0.0), 90.0, 15.0, 7.5);
        assert!(touching.overlaps_polygon(&vertices));
        assert!(!clear.overlaps_polygon(&vertices));
    }
}
