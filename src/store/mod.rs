//! Annotation candidate set and the active-subset selection.
//!
//! The store owns every annotation the host supplied plus their derived
//! fields. The master ordering is significant: a sorting recompute orders
//! by distance, and `select_active` walks that order when applying the
//! visibility cap, so nearer annotations win the slots.

use tracing::debug;

use crate::algorithms::geomath;
use crate::core::types::{Annotation, Location};

/// Which annotations a distance/azimuth recompute touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeScope {
    All,
    ActiveOnly,
}

/// Holds the full candidate set and the computed active subset
#[derive(Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    /// Location the derived fields were last computed against; `None`
    /// until a recompute happens, which keeps everything inactive
    derived_for: Option<Location>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set. Entries with invalid coordinates are
    /// dropped; the survivors get fresh ids and cleared derived state.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        let total = annotations.len();
        self.annotations = annotations
            .into_iter()
            .filter(|a| a.location.is_valid())
            .collect();

        let dropped = total - self.annotations.len();
        if dropped > 0 {
            debug!(dropped, total, "rejected annotations with invalid coordinates");
        }

        for (id, annotation) in self.annotations.iter_mut().enumerate() {
            annotation.id = id as u32;
            annotation.reset_derived();
        }
        self.derived_for = None;
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Mutable access for the layout passes; ordering must be preserved
    /// by callers (only `recompute_distance_and_azimuth` may reorder)
    pub fn annotations_mut(&mut self) -> &mut [Annotation] {
        &mut self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Location the current derived fields were computed against
    pub fn derived_for(&self) -> Option<Location> {
        self.derived_for
    }

    /// Recompute distance and azimuth against `user`.
    ///
    /// With `sort` set, the full master list is stable-sorted ascending by
    /// distance afterwards. Non-sorting calls never reorder the list.
    pub fn recompute_distance_and_azimuth(
        &mut self,
        user: &Location,
        sort: bool,
        scope: RecomputeScope,
    ) {
        for annotation in self.annotations.iter_mut() {
            if scope == RecomputeScope::ActiveOnly && !annotation.active {
                continue;
            }
            annotation.distance_from_user = geomath::distance(user, &annotation.location);
            annotation.azimuth = geomath::azimuth(user, &annotation.location);
        }
        self.derived_for = Some(*user);

        if sort {
            self.annotations.sort_by(|a, b| {
                a.distance_from_user
                    .partial_cmp(&b.distance_from_user)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }

    /// Mark up to `max_visible` annotations active, walking the master
    /// order. An annotation activates only while the cap has not been
    /// reached and it passes the level and distance filters; the count
    /// advances only on activation. Returns the active indices in order.
    ///
    /// Until a recompute has supplied a user location, nothing can
    /// activate and the result is empty.
    pub fn select_active(
        &mut self,
        max_visible: usize,
        max_vertical_level: u32,
        max_distance_m: f64,
    ) -> Vec<usize> {
        if self.derived_for.is_none() {
            self.deactivate_all();
            return Vec::new();
        }

        let mut active = Vec::new();
        for (index, annotation) in self.annotations.iter_mut().enumerate() {
            let passes = active.len() < max_visible
                && annotation.vertical_level <= max_vertical_level
                && (max_distance_m <= 0.0 || annotation.distance_from_user <= max_distance_m);

            annotation.active = passes;
            if passes {
                active.push(index);
            }
        }
        active
    }

    /// Mark every annotation inactive
    pub fn deactivate_all(&mut self) {
        for annotation in self.annotations.iter_mut() {
            annotation.active = false;
        }
    }
}
