//! Path following along Catmull-Rom splines
//!
//! A path is a list of points the target's `x`/`y` pass through. Each pair
//! of neighbouring points forms one segment; the outer control points of the
//! first and last segments are clamped to the path ends.

use tideon_core::{with_target, PropertyValue, SharedTarget};

use crate::easing::Easing;

/// Keeps the segment index below the segment count when `t` reaches 1
const SEGMENT_EPSILON: f32 = 1e-5;

/// A 2D point on a path
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Evaluate the uniform Catmull-Rom segment between `p1` and `p2`
pub fn catmull_rom(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let axis = |a: f32, b: f32, c: f32, d: f32| {
        0.5 * (2.0 * b
            + (-a + c) * t
            + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
            + (-a + 3.0 * b - 3.0 * c + d) * t3)
    };
    Point {
        x: axis(p0.x, p1.x, p2.x, p3.x),
        y: axis(p0.y, p1.y, p2.y, p3.y),
    }
}

/// A spline through two or more points
#[derive(Clone, Debug, PartialEq)]
pub struct CurvePath {
    points: Vec<Point>,
}

impl CurvePath {
    /// Build a path, `None` when fewer than two points are given
    pub fn new(points: Vec<Point>) -> Option<Self> {
        (points.len() >= 2).then_some(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Last point of the path
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Sample the path at overall progress `t`
    ///
    /// Progress outside `[0, 1]` (from overshooting easings) is clamped onto
    /// the first or last segment.
    pub fn sample(&self, t: f32) -> Point {
        let segments = self.segment_count();
        let last = self.points.len() - 1;
        let seg_t = (t * segments as f32)
            .min(segments as f32 - SEGMENT_EPSILON)
            .max(0.0);
        let index = (seg_t.floor() as usize).min(segments - 1);
        let local = seg_t - index as f32;

        let p0 = self.points[index.saturating_sub(1)];
        let p1 = self.points[index];
        let p2 = self.points[index + 1];
        let p3 = self.points[(index + 2).min(last)];
        catmull_rom(p0, p1, p2, p3, local)
    }
}

/// Moves a target's `x` and `y` along a path
pub(crate) struct PathFollow {
    pub(crate) target: SharedTarget,
    pub(crate) path: CurvePath,
    pub(crate) easing: Easing,
}

impl PathFollow {
    pub(crate) fn apply_frame(&self, frame: u32, duration: u32) {
        let pos = if frame + 1 >= duration {
            self.path.end()
        } else {
            self.path
                .sample(self.easing.apply(frame as f32 / duration as f32))
        };

        let written = with_target(&self.target, |t| {
            t.set("x", PropertyValue::Number(pos.x));
            t.set("y", PropertyValue::Number(pos.y));
        });
        if written.is_err() {
            tracing::trace!("Path target unavailable, frame skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_requires_two_points() {
        assert!(CurvePath::new(vec![]).is_none());
        assert!(CurvePath::new(vec![Point::new(1.0, 1.0)]).is_none());
        assert!(CurvePath::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_some());
    }

    #[test]
    fn test_segment_passes_through_control_points() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(20.0, -5.0),
            Point::new(30.0, 0.0),
        ];
        assert!(close(catmull_rom(p[0], p[1], p[2], p[3], 0.0), p[1]));
        assert!(close(catmull_rom(p[0], p[1], p[2], p[3], 1.0), p[2]));
    }

    #[test]
    fn test_straight_line_midpoint() {
        let path = CurvePath::new(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)])
            .expect("two points");

        assert!(close(path.sample(0.0), Point::new(0.0, 0.0)));
        assert!(close(path.sample(0.5), Point::new(50.0, 0.0)));
        // t = 1 lands just shy of the end, on the final segment
        assert!((path.sample(1.0).x - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_sample_hits_interior_points() {
        let path = CurvePath::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 0.0),
        ])
        .expect("three points");

        assert!(close(path.sample(0.5), Point::new(10.0, 10.0)));
        assert_eq!(path.end(), Point::new(20.0, 0.0));
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let path = CurvePath::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
            .expect("two points");

        assert!(close(path.sample(-0.5), Point::new(0.0, 0.0)));
        assert!((path.sample(1.5).x - 10.0).abs() < 0.01);
    }
}
