//! Centripetal Catmull-Rom spline with arc-length parameterisation.
//!
//! The curve passes through every control point. Phantom end points are
//! extrapolated by reflecting the neighbouring point, and knot spacing uses
//! the square root of chord length (alpha = 0.5), which avoids cusps and
//! self-intersections on unevenly spaced points.

use glam::Vec3;

use broadside_core::constants::CURVE_ARC_DIVISIONS;

/// Chord spacings below this are treated as 1 to avoid division blow-ups.
const MIN_KNOT_SPACING: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct CatmullRomCurve {
    points: Vec<Vec3>,
    /// Cumulative length at each of `CURVE_ARC_DIVISIONS + 1` evenly spaced parameters.
    arc_lengths: Vec<f32>,
}

impl CatmullRomCurve {
    /// Build a curve through `points`. At least two points are required.
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let mut curve = Self {
            points,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.measure(CURVE_ARC_DIVISIONS);
        Some(curve)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Total arc length.
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at curve parameter `t` in [0, 1]. Not uniform in distance.
    pub fn point(&self, t: f32) -> Vec3 {
        let pts = &self.points;
        let l = pts.len();
        let p = (l - 1) as f32 * t.clamp(0.0, 1.0);
        let mut index = (p.floor() as usize).min(l - 1);
        let mut weight = p - index as f32;
        if index == l - 1 {
            index = l - 2;
            weight = 1.0;
        }

        let p0 = if index > 0 {
            pts[index - 1]
        } else {
            2.0 * pts[0] - pts[1]
        };
        let p1 = pts[index];
        let p2 = pts[index + 1];
        let p3 = if index + 2 < l {
            pts[index + 2]
        } else {
            2.0 * pts[l - 1] - pts[l - 2]
        };

        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);
        if dt1 < MIN_KNOT_SPACING {
            dt1 = 1.0;
        }
        if dt0 < MIN_KNOT_SPACING {
            dt0 = dt1;
        }
        if dt2 < MIN_KNOT_SPACING {
            dt2 = dt1;
        }

        // Tangents for a nonuniform spline, rescaled to the [0, 1] segment.
        let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        hermite(p1, p2, t1, t2, weight)
    }

    /// Point at arc-length fraction `u` in [0, 1]: equal steps in `u` cover equal distance.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.arc_fraction_to_t(u))
    }

    /// `segments + 1` points evenly spaced along the curve.
    pub fn sample(&self, segments: usize) -> Vec<Vec3> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }

    fn measure(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(sum);
        for i in 1..=divisions {
            let current = self.point(i as f32 / divisions as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }

    fn arc_fraction_to_t(&self, u: f32) -> f32 {
        let lengths = &self.arc_lengths;
        let n = lengths.len();
        if n < 2 {
            return 0.0;
        }
        let target = u.clamp(0.0, 1.0) * lengths[n - 1];

        // Last index whose cumulative length does not exceed the target.
        let i = lengths.partition_point(|&len| len <= target).saturating_sub(1);
        if i >= n - 1 {
            return 1.0;
        }

        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        if segment <= 0.0 {
            return i as f32 / (n - 1) as f32;
        }
        (i as f32 + (target - before) / segment) / (n - 1) as f32
    }
}

fn hermite(p1: Vec3, p2: Vec3, t1: Vec3, t2: Vec3, w: f32) -> Vec3 {
    let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2;
    let c3 = 2.0 * p1 - 2.0 * p2 + t1 + t2;
    p1 + t1 * w + c2 * (w * w) + c3 * (w * w * w)
}
