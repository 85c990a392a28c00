//! Vertical stacking and screen placement for active annotations.
//!
//! Collision resolution walks stacking levels bottom-up: any two active
//! annotations whose azimuths sit closer than one view-width of each other
//! cannot share a level, so the farther one is pushed up. The pass is
//! O(n²) per level over active annotations; callers bound it through
//! `max_visible_annotations` and `max_vertical_level`.

use crate::algorithms::geomath::{angular_delta, degrees_to_pixels, pixels_to_degrees};
use crate::core::constants::{
    H_PIXELS_PER_DEGREE, MIN_COLLISION_DEGREES, NORTH_REGION_SPAN_DEGREES,
};
use crate::core::types::Annotation;

/// Geometry inputs for placement, fixed per reload cycle
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    /// Overlay pixels per degree of azimuth
    pub pixels_per_degree: f64,
    /// Width of one annotation view in pixels
    pub view_width_px: f64,
    /// Height of one annotation view in pixels
    pub view_height_px: f64,
    /// Highest stacking level that still renders
    pub max_vertical_level: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            pixels_per_degree: H_PIXELS_PER_DEGREE,
            view_width_px: 150.0,
            view_height_px: 50.0,
            max_vertical_level: 5,
        }
    }
}

impl LayoutParams {
    /// Width of the full virtual overlay strip (360° of azimuth) in pixels
    pub fn overlay_width_px(&self) -> f64 {
        degrees_to_pixels(360.0, self.pixels_per_degree)
    }

    /// Angular width attributed to one annotation view when testing for
    /// collisions, floored at [`MIN_COLLISION_DEGREES`]
    pub fn collision_threshold_degrees(&self) -> f64 {
        pixels_to_degrees(self.view_width_px, self.pixels_per_degree).max(MIN_COLLISION_DEGREES)
    }
}

/// Viewport dimensions in pixels, supplied by the presentation layer each
/// frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Degrees of azimuth the viewport spans at the given pixel density
    pub fn width_degrees(&self, pixels_per_degree: f64) -> f64 {
        pixels_to_degrees(self.width, pixels_per_degree)
    }
}

/// Screen-space placement of one annotation view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPosition {
    pub x: f64,
    pub y: f64,
}

/// Heading band relative to the 0°/360° seam.
///
/// The x wraparound correction changes discontinuously when the heading
/// crosses between these bands, so the caller repositions all views on a
/// region change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingRegion {
    /// Heading within the span west of north (> 320°)
    NorthLeft,
    /// Heading within the span east of north (< 40°)
    NorthRight,
    Neutral,
}

impl HeadingRegion {
    pub fn from_heading(heading: f64) -> Self {
        if heading > 360.0 - NORTH_REGION_SPAN_DEGREES {
            HeadingRegion::NorthLeft
        } else if heading < NORTH_REGION_SPAN_DEGREES {
            HeadingRegion::NorthRight
        } else {
            HeadingRegion::Neutral
        }
    }
}

/// Classification callback assigning each active annotation its starting
/// stacking tier before collision resolution
pub type TierClassifier = dyn Fn(&Annotation) -> u32;

/// Assign starting vertical levels for a reload cycle.
///
/// Inactive annotations are parked past `max_vertical_level` so they never
/// render; active ones get the classifier's tier. Ties within a tier keep
/// their current (distance-sorted) order.
pub fn set_initial_vertical_levels(
    annotations: &mut [Annotation],
    max_vertical_level: u32,
    classifier: &TierClassifier,
) {
    for annotation in annotations.iter_mut() {
        annotation.vertical_level = if annotation.active {
            classifier(annotation)
        } else {
            max_vertical_level + 1
        };
    }
}

/// Resolve horizontal collisions among active annotations by pushing the
/// farther member of each colliding pair one level up.
///
/// Levels are processed from 0 upward; an annotation pushed out of level L
/// takes no further part in L's comparisons and is reconsidered when L+1 is
/// processed. Equal distances push the second member of the pair, so the
/// outcome is deterministic for a stable input order. Afterwards the levels
/// in use are shifted down so the frontmost active tier is always 0.
pub fn calculate_vertical_levels(
    annotations: &mut [Annotation],
    max_vertical_level: u32,
    collision_threshold_degrees: f64,
) {
    let active: Vec<usize> = (0..annotations.len())
        .filter(|&i| annotations[i].active)
        .collect();
    if active.is_empty() {
        return;
    }

    for level in 0..=max_vertical_level {
        let bucket: Vec<usize> = active
            .iter()
            .copied()
            .filter(|&i| annotations[i].vertical_level == level)
            .collect();
        let mut pushed = vec![false; bucket.len()];

        for bi in 0..bucket.len() {
            if pushed[bi] {
                continue;
            }
            for bj in (bi + 1)..bucket.len() {
                if pushed[bj] {
                    continue;
                }
                let i = bucket[bi];
                let j = bucket[bj];
                let delta = angular_delta(annotations[i].azimuth, annotations[j].azimuth).abs();
                if delta > collision_threshold_degrees {
                    continue;
                }

                // Push the farther member; ties push the second one
                let loser = if annotations[i].distance_from_user > annotations[j].distance_from_user
                {
                    bi
                } else {
                    bj
                };
                annotations[bucket[loser]].vertical_level += 1;
                pushed[loser] = true;
                if loser == bi {
                    break;
                }
            }
        }
    }

    // Normalize so the frontmost surviving tier sits at level 0; without
    // this, a pass that pushed every annotation up would leave a false gap
    // above the horizon line.
    let min_level = active
        .iter()
        .map(|&i| annotations[i].vertical_level)
        .min()
        .unwrap_or(0);
    if min_level > 0 {
        for &i in &active {
            annotations[i].vertical_level -= min_level;
        }
    }
}

/// Screen position for one annotation view.
///
/// The x coordinate lives on the virtual overlay strip; when the smoothed
/// heading and the annotation's azimuth straddle the 0°/360° seam (both
/// within the north band, opposite sides) the position is shifted by a full
/// overlay width so the view does not fly across the screen.
pub fn position(
    annotation: &Annotation,
    smoothed_heading: f64,
    viewport: &Viewport,
    params: &LayoutParams,
) -> ScreenPosition {
    let span = NORTH_REGION_SPAN_DEGREES;
    let mut x = degrees_to_pixels(annotation.azimuth, params.pixels_per_degree)
        - params.view_width_px / 2.0;

    if smoothed_heading < span && annotation.azimuth > 360.0 - span {
        x -= params.overlay_width_px();
    } else if smoothed_heading > 360.0 - span && annotation.azimuth < span {
        x += params.overlay_width_px();
    }

    let level = f64::from(annotation.vertical_level);
    let y = viewport.height * 0.65 - params.view_height_px * level - 4.0 * level * level;

    ScreenPosition { x, y }
}

/// Whether the annotation's view should be attached this frame.
///
/// Runs every tick, independent of the collision pass: the view is visible
/// when its azimuth lies within one viewport-width of the heading and its
/// level still renders.
pub fn is_visible(
    annotation: &Annotation,
    smoothed_heading: f64,
    viewport: &Viewport,
    params: &LayoutParams,
) -> bool {
    annotation.vertical_level <= params.max_vertical_level
        && angular_delta(smoothed_heading, annotation.azimuth).abs()
            < viewport.width_degrees(params.pixels_per_degree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Location;

    fn annotation(azimuth: f64, distance: f64) -> Annotation {
        let mut a = Annotation::new("poi", Location::new(45.0, 16.0));
        a.azimuth = azimuth;
        a.distance_from_user = distance;
        a.active = true;
        a
    }

    fn levels(annotations: &[Annotation]) -> Vec<u32> {
        annotations.iter().map(|a| a.vertical_level).collect()
    }

    #[test]
    fn test_initial_levels_park_inactive_past_max() {
        let mut annotations = vec![annotation(10.0, 5.0), annotation(20.0, 5.0)];
        annotations[1].active = false;

        set_initial_vertical_levels(&mut annotations, 5, &|_| 0);

        assert_eq!(annotations[0].vertical_level, 0);
        assert_eq!(annotations[1].vertical_level, 6);
    }

    #[test]
    fn test_initial_levels_use_classifier_tier() {
        let mut annotations = vec![annotation(10.0, 5.0), annotation(20.0, 50.0)];

        set_initial_vertical_levels(&mut annotations, 5, &|a| {
            if a.distance_from_user > 10.0 {
                3
            } else {
                1
            }
        });

        assert_eq!(annotations[0].vertical_level, 1);
        assert_eq!(annotations[1].vertical_level, 3);
    }

    #[test]
    fn test_collision_pushes_farther_annotation() {
        // Identical azimuth, 10 m vs 20 m: the nearer one keeps level 0
        let mut annotations = vec![annotation(90.0, 10.0), annotation(90.0, 20.0)];

        calculate_vertical_levels(&mut annotations, 5, 5.0);

        assert_eq!(levels(&annotations), vec![0, 1]);
    }

    #[test]
    fn test_no_collision_when_angularly_separated() {
        let mut annotations = vec![annotation(90.0, 10.0), annotation(120.0, 20.0)];

        calculate_vertical_levels(&mut annotations, 5, 5.0);

        assert_eq!(levels(&annotations), vec![0, 0]);
    }

    #[test]
    fn test_collision_across_the_seam() {
        // 358° and 3° are 5° apart, which collides at the default floor
        let mut annotations = vec![annotation(358.0, 10.0), annotation(3.0, 20.0)];

        calculate_vertical_levels(&mut annotations, 5, 5.0);

        assert_eq!(levels(&annotations), vec![0, 1]);
    }

    #[test]
    fn test_equal_distance_pushes_second_member() {
        let mut annotations = vec![annotation(45.0, 15.0), annotation(45.0, 15.0)];

        calculate_vertical_levels(&mut annotations, 5, 5.0);

        assert_eq!(levels(&annotations), vec![0, 1]);
    }

    #[test]
    fn test_three_way_pileup_stacks_by_distance() {
        let mut annotations = vec![
            annotation(180.0, 30.0),
            annotation(181.0, 10.0),
            annotation(182.0, 20.0),
        ];

        calculate_vertical_levels(&mut annotations, 5, 5.0);

        // Nearest stays in front, the others stack above it
        assert_eq!(annotations[1].vertical_level, 0);
        assert_eq!(annotations[2].vertical_level, 1);
        assert_eq!(annotations[0].vertical_level, 2);
    }

    #[test]
    fn test_normalization_keeps_front_tier_at_zero() {
        let mut annotations = vec![annotation(10.0, 5.0), annotation(200.0, 8.0)];
        annotations[0].vertical_level = 2;
        annotations[1].vertical_level = 3;

        calculate_vertical_levels(&mut annotations, 5, 5.0);

        let min = annotations.iter().map(|a| a.vertical_level).min().unwrap();
        assert_eq!(min, 0);
        assert_eq!(levels(&annotations), vec![0, 1]);
    }

    #[test]
    fn test_calculate_vertical_levels_is_idempotent() {
        let mut annotations = vec![
            annotation(90.0, 10.0),
            annotation(91.0, 20.0),
            annotation(92.0, 30.0),
            annotation(150.0, 5.0),
            annotation(150.5, 5.0),
        ];

        calculate_vertical_levels(&mut annotations, 5, 5.0);
        let first = levels(&annotations);
        calculate_vertical_levels(&mut annotations, 5, 5.0);

        assert_eq!(levels(&annotations), first);
    }

    #[test]
    fn test_inactive_annotations_are_untouched() {
        let mut annotations = vec![annotation(90.0, 10.0), annotation(90.0, 20.0)];
        annotations[1].active = false;
        annotations[1].vertical_level = 6;

        calculate_vertical_levels(&mut annotations, 5, 5.0);

        assert_eq!(annotations[0].vertical_level, 0);
        assert_eq!(annotations[1].vertical_level, 6);
    }

    #[test]
    fn test_pileup_can_push_past_max_level() {
        // Seven identical azimuths with max level 5: the two farthest end
        // up past the renderable range and wait for the next selection pass
        let mut annotations: Vec<Annotation> =
            (0..7).map(|i| annotation(90.0, 10.0 + i as f64)).collect();

        calculate_vertical_levels(&mut annotations, 5, 5.0);

        assert_eq!(levels(&annotations), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_position_centers_view_on_azimuth() {
        let params = LayoutParams::default();
        let viewport = Viewport::new(375.0, 667.0);
        let a = annotation(90.0, 10.0);

        let pos = position(&a, 90.0, &viewport, &params);

        assert!((pos.x - (90.0 * 14.0 - 75.0)).abs() < 1e-9);
        assert!((pos.y - 667.0 * 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_position_y_quadratic_spacing() {
        let params = LayoutParams::default();
        let viewport = Viewport::new(375.0, 667.0);
        let mut a = annotation(90.0, 10.0);
        a.vertical_level = 3;

        let pos = position(&a, 90.0, &viewport, &params);

        let expected = 667.0 * 0.65 - 50.0 * 3.0 - 4.0 * 9.0;
        assert!((pos.y - expected).abs() < 1e-9);
    }

    #[test]
    fn test_position_wraparound_heading_near_zero() {
        // Looking just east of north at a marker just west of it: the view
        // must shift a full overlay width left instead of sitting at the
        // far right of the strip.
        let params = LayoutParams::default();
        let viewport = Viewport::new(375.0, 667.0);
        let a = annotation(350.0, 10.0);

        let pos = position(&a, 5.0, &viewport, &params);

        let uncorrected = 350.0 * 14.0 - 75.0;
        assert!((pos.x - (uncorrected - params.overlay_width_px())).abs() < 1e-9);
    }

    #[test]
    fn test_position_wraparound_heading_near_360() {
        let params = LayoutParams::default();
        let viewport = Viewport::new(375.0, 667.0);
        let a = annotation(10.0, 10.0);

        let pos = position(&a, 355.0, &viewport, &params);

        let uncorrected = 10.0 * 14.0 - 75.0;
        assert!((pos.x - (uncorrected + params.overlay_width_px())).abs() < 1e-9);
    }

    #[test]
    fn test_no_wraparound_away_from_seam() {
        let params = LayoutParams::default();
        let viewport = Viewport::new(375.0, 667.0);
        let a = annotation(100.0, 10.0);

        let pos = position(&a, 120.0, &viewport, &params);

        assert!((pos.x - (100.0 * 14.0 - 75.0)).abs() < 1e-9);
    }

    #[test]
    fn test_visibility_culling() {
        let params = LayoutParams::default();
        let viewport = Viewport::new(375.0, 667.0);
        // 375 px at 14 px/deg is ~26.8° of viewport
        let near = annotation(100.0, 10.0);
        let far = annotation(150.0, 10.0);

        assert!(is_visible(&near, 110.0, &viewport, &params));
        assert!(!is_visible(&far, 110.0, &viewport, &params));
    }

    #[test]
    fn test_visibility_respects_max_level() {
        let params = LayoutParams::default();
        let viewport = Viewport::new(375.0, 667.0);
        let mut a = annotation(100.0, 10.0);
        a.vertical_level = params.max_vertical_level + 1;

        assert!(!is_visible(&a, 100.0, &viewport, &params));
    }

    #[test]
    fn test_visibility_across_seam() {
        let params = LayoutParams::default();
        let viewport = Viewport::new(375.0, 667.0);
        let a = annotation(5.0, 10.0);

        assert!(is_visible(&a, 355.0, &viewport, &params));
    }

    #[test]
    fn test_heading_regions() {
        assert_eq!(HeadingRegion::from_heading(350.0), HeadingRegion::NorthLeft);
        assert_eq!(HeadingRegion::from_heading(10.0), HeadingRegion::NorthRight);
        assert_eq!(HeadingRegion::from_heading(180.0), HeadingRegion::Neutral);
        assert_eq!(HeadingRegion::from_heading(40.0), HeadingRegion::Neutral);
        assert_eq!(HeadingRegion::from_heading(320.0), HeadingRegion::Neutral);
    }

    #[test]
    fn test_collision_threshold_floor() {
        let mut params = LayoutParams::default();
        params.view_width_px = 14.0; // 1° at 14 px/deg, well under the floor
        assert!((params.collision_threshold_degrees() - 5.0).abs() < 1e-9);

        params.view_width_px = 140.0; // 10°
        assert!((params.collision_threshold_degrees() - 10.0).abs() < 1e-9);
    }
}
