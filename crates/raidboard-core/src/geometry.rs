//! Distance and midpoint helpers in stage coordinates.

use kurbo::Point;

/// Euclidean distance between two points, rounded to the nearest whole pixel.
///
/// Used for both the ruler label and the circle marker radius so the two
/// always agree for the same drag.
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y).round()
}

/// Midpoint of the segment `a`-`b`.
pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Format a distance the way the ruler label shows it, e.g. `"5 px"`.
pub fn format_distance(d: f64) -> String {
    format!("{} px", d as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_three_four_five() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let pairs = [
            (Point::new(0.0, 0.0), Point::new(10.5, -3.2)),
            (Point::new(-100.0, 40.0), Point::new(250.0, 999.0)),
            (Point::new(1e6, -1e6), Point::new(-1e6, 1e6)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance(a, b), distance(b, a));
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Point::new(-42.0, 17.5);
        assert_eq!(distance(p, p), 0.0);
    }

    #[test]
    fn test_distance_rounds() {
        // sqrt(2) ~ 1.414
        assert_eq!(distance(Point::ZERO, Point::new(1.0, 1.0)), 1.0);
        // sqrt(2.25 + 2.25) ~ 2.12
        assert_eq!(distance(Point::ZERO, Point::new(1.5, 1.5)), 2.0);
    }

    #[test]
    fn test_midpoint() {
        let m = midpoint(Point::new(0.0, 0.0), Point::new(10.0, -4.0));
        assert_eq!(m, Point::new(5.0, -2.0));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(5.0), "5 px");
        assert_eq!(format_distance(0.0), "0 px");
    }
}
