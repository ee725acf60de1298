// Heading arithmetic on the [0, 360) circle

/// Wrap an angle in degrees into [0, 360)
pub fn normalize_deg(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}

/// Signed shortest-arc error from `current` toward `target`, in (-180, 180].
///
/// Positive means the heading must increase (pass through 360 -> 0 if
/// needed), negative means it must decrease. Using the signed error makes
/// wraparound direction selection symmetric on both sides of the 0/360 seam.
pub fn heading_error(current: f32, target: f32) -> f32 {
    let diff = (target - current).rem_euclid(360.0);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

/// Magnitude of the shortest angular distance between two headings, <= 180
pub fn shortest_arc_delta(a: f32, b: f32) -> f32 {
    heading_error(a, b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_wraps_both_ways() {
        assert_eq!(normalize_deg(0.0), 0.0);
        assert_eq!(normalize_deg(360.0), 0.0);
        assert_eq!(normalize_deg(365.0), 5.0);
        assert_eq!(normalize_deg(-10.0), 350.0);
    }

    #[test]
    fn test_shortest_arc_across_seam() {
        // 355 -> 5 is 10 degrees through the seam, not 350 the long way
        assert_eq!(shortest_arc_delta(355.0, 5.0), 10.0);
        assert_eq!(shortest_arc_delta(5.0, 355.0), 10.0);
        // 200 -> 10: |200 - 10| = 190, shortest arc is 360 - 190 = 170
        assert_eq!(shortest_arc_delta(200.0, 10.0), 170.0);
    }

    #[test]
    fn test_error_sign_picks_short_direction() {
        // plain case, no wraparound
        assert_eq!(heading_error(0.0, 90.0), 90.0);
        assert_eq!(heading_error(90.0, 0.0), -90.0);
        // heading just below the seam, target just above it
        assert_eq!(heading_error(355.0, 5.0), 10.0);
        // and the mirrored configuration
        assert_eq!(heading_error(5.0, 355.0), -10.0);
        // 200 -> 10 must go up through 360, not down the 190-degree way
        assert_eq!(heading_error(200.0, 10.0), 170.0);
        // antipodal targets resolve to +180, never -180
        assert_eq!(heading_error(0.0, 180.0), 180.0);
    }
}
