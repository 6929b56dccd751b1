//! Height band ("biotope") color classification.
//!
//! Biotopes are kept in ascending order and must tile [0, 1] without gaps:
//! every band starts where the previous one ends. The boundary setters move
//! a shared edge and update both neighbors so that invariant survives any
//! sequence of edits.

use serde::{Deserialize, Serialize};

use crate::core::{Lerp, Rgba};

/// A contiguous height band mapped to a representative color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Biotope {
    pub color: Rgba,
    pub start_height: f32,
    pub end_height: f32,
}

impl Biotope {
    pub fn new(color: Rgba, start_height: f32, end_height: f32) -> Self {
        Self {
            color,
            start_height,
            end_height,
        }
    }

    pub fn contains(&self, height: f32) -> bool {
        self.start_height <= height && self.end_height >= height
    }

    pub fn width(&self) -> f32 {
        self.end_height - self.start_height
    }
}

impl Default for Biotope {
    fn default() -> Self {
        Self::new(Rgba::BLACK, 0.0, 1.0)
    }
}

/// Ordered biotope sequence plus the global cross-fade amount.
#[derive(Clone, Debug, PartialEq)]
pub struct BiotopeSet {
    biotopes: Vec<Biotope>,
    interpolation: f32,
}

impl BiotopeSet {
    /// Build a set, pinning the first band to start at 0 and the last to
    /// end at 1.
    pub fn new(biotopes: Vec<Biotope>, interpolation: f32) -> Self {
        let mut set = Self {
            biotopes,
            interpolation: 0.0,
        };
        set.set_interpolation(interpolation);
        set.clamp_outer_bounds();
        set
    }

    pub fn biotopes(&self) -> &[Biotope] {
        &self.biotopes
    }

    pub fn get(&self, index: usize) -> Option<&Biotope> {
        self.biotopes.get(index)
    }

    pub fn len(&self) -> usize {
        self.biotopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biotopes.is_empty()
    }

    pub fn interpolation(&self) -> f32 {
        self.interpolation
    }

    /// Set the cross-fade amount, clamped to [0, 1].
    pub fn set_interpolation(&mut self, interpolation: f32) {
        self.interpolation = if interpolation.is_nan() {
            0.0
        } else {
            interpolation.clamp(0.0, 1.0)
        };
    }

    fn clamp_outer_bounds(&mut self) {
        if let Some(first) = self.biotopes.first_mut() {
            first.start_height = 0.0;
        }
        if let Some(last) = self.biotopes.last_mut() {
            last.end_height = 1.0;
        }
    }

    /// Index of the first band containing `height`.
    pub fn index_of(&self, height: f32) -> Option<usize> {
        self.biotopes.iter().position(|b| b.contains(height))
    }

    /// Blended color for a normalized height. White when no band matches.
    pub fn classify(&self, height: f32) -> Rgba {
        let Some(index) = self.index_of(height) else {
            return Rgba::WHITE;
        };

        let band = &self.biotopes[index];
        let color = band.color;
        let previous = if index > 0 {
            self.biotopes[index - 1].color
        } else {
            color
        };
        let next = self
            .biotopes
            .get(index + 1)
            .map(|b| b.color)
            .unwrap_or(color);

        // zero-width band: skip both blend terms
        let width = band.width();
        let (to_previous, to_next) = if width > 0.0 {
            (
                self.interpolation * (1.0 - (height - band.start_height) / width),
                self.interpolation * (1.0 - (band.end_height - height) / width),
            )
        } else {
            (0.0, 0.0)
        };

        let towards_previous = color.lerp_clamped(&previous, to_previous);
        let towards_next = color.lerp_clamped(&next, to_next);
        towards_previous.lerp(&towards_next, 0.5)
    }

    /// Move the lower edge of band `index` and the upper edge of the band
    /// before it. The first band always starts at 0.
    ///
    /// The edge may move down to the previous band's start and up to this
    /// band's end. Returns `false` for an unknown index.
    pub fn set_start_height(&mut self, index: usize, value: f32) -> bool {
        if index >= self.biotopes.len() {
            return false;
        }
        if index == 0 {
            self.biotopes[0].start_height = 0.0;
            return true;
        }

        let lower = self.biotopes[index - 1].start_height;
        let upper = self.biotopes[index].end_height.max(lower);
        let start = value.max(lower).min(upper);
        if start != value {
            log::warn!("Biotope {} start height {} clamped to {}", index, value, start);
        }
        self.biotopes[index].start_height = start;
        self.biotopes[index - 1].end_height = start;
        true
    }

    /// Move the upper edge of band `index` and the lower edge of the band
    /// after it. The last band always ends at 1.
    ///
    /// The edge is clamped to the next band's current start, so it can only
    /// move down (never past this band's own start). Returns `false` for an
    /// unknown index.
    pub fn set_end_height(&mut self, index: usize, value: f32) -> bool {
        let len = self.biotopes.len();
        if index >= len {
            return false;
        }
        if index == len - 1 {
            self.biotopes[index].end_height = 1.0;
            return true;
        }

        let lower = self.biotopes[index].start_height;
        let upper = self.biotopes[index + 1].start_height;
        let end = value.min(upper).max(lower.min(upper));
        if end != value {
            log::warn!("Biotope {} end height {} clamped to {}", index, value, end);
        }
        self.biotopes[index].end_height = end;
        self.biotopes[index + 1].start_height = end;
        true
    }

    pub fn set_color(&mut self, index: usize, color: Rgba) -> bool {
        match self.biotopes.get_mut(index) {
            Some(b) => {
                b.color = color;
                true
            }
            None => false,
        }
    }

    /// Append a band starting where the current last band ends.
    pub fn push(&mut self) -> usize {
        let start = self.biotopes.last().map(|b| b.end_height).unwrap_or(0.0);
        self.biotopes.push(Biotope::new(Rgba::BLACK, start, 1.0));
        self.biotopes.len() - 1
    }

    /// Remove the last band; the new last band is stretched to end at 1.
    pub fn pop(&mut self) -> Option<Biotope> {
        let removed = self.biotopes.pop();
        self.clamp_outer_bounds();
        removed
    }

    /// Whether every band starts exactly where the previous one ends.
    pub fn is_contiguous(&self) -> bool {
        self.biotopes
            .windows(2)
            .all(|pair| pair[1].start_height == pair[0].end_height)
    }
}

impl Default for BiotopeSet {
    fn default() -> Self {
        Self::new(Vec::new(), 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAND: Rgba = Rgba::rgb(0.9, 0.8, 0.5);
    const GRASS: Rgba = Rgba::rgb(0.2, 0.6, 0.2);
    const ROCK: Rgba = Rgba::rgb(0.4, 0.4, 0.4);

    fn three_bands(interpolation: f32) -> BiotopeSet {
        BiotopeSet::new(
            vec![
                Biotope::new(SAND, 0.0, 0.3),
                Biotope::new(GRASS, 0.3, 0.7),
                Biotope::new(ROCK, 0.7, 1.0),
            ],
            interpolation,
        )
    }

    fn approx_color(a: Rgba, b: Rgba) -> bool {
        (a.r - b.r).abs() < 1e-5
            && (a.g - b.g).abs() < 1e-5
            && (a.b - b.b).abs() < 1e-5
            && (a.a - b.a).abs() < 1e-5
    }

    #[test]
    fn test_classify_without_interpolation() {
        let set = three_bands(0.0);
        assert_eq!(set.classify(0.5), GRASS);
        assert_eq!(set.classify(0.1), SAND);
        assert_eq!(set.classify(0.95), ROCK);
    }

    #[test]
    fn test_first_match_wins_on_shared_edge() {
        let set = three_bands(0.0);
        assert_eq!(set.index_of(0.3), Some(0));
        assert_eq!(set.index_of(0.7), Some(1));
    }

    #[test]
    fn test_no_match_is_white() {
        let set = BiotopeSet::new(
            vec![Biotope::new(SAND, 0.0, 0.3), Biotope::new(ROCK, 0.6, 1.0)],
            0.5,
        );
        assert_eq!(set.classify(0.45), Rgba::WHITE);
        assert_eq!(BiotopeSet::default().classify(0.5), Rgba::WHITE);
    }

    #[test]
    fn test_interpolation_blends_towards_neighbors() {
        let set = three_bands(1.0);
        // Band center: both neighbors pulled in by half
        let center = set.classify(0.5);
        let expected = GRASS
            .lerp(&SAND, 0.5)
            .lerp(&GRASS.lerp(&ROCK, 0.5), 0.5);
        assert!(approx_color(center, expected));

        // Near the lower edge the previous band dominates
        let low = set.classify(0.3 + 1e-4);
        let high = set.classify(0.7 - 1e-4);
        assert!((low.r - SAND.r).abs() < (high.r - SAND.r).abs());
    }

    #[test]
    fn test_edge_bands_use_themselves_as_neighbor() {
        let set = three_bands(1.0);
        let bottom = set.classify(0.0);
        // previous = itself, next weight is 0 at the very bottom
        assert!(approx_color(bottom, SAND));
        let top = set.classify(1.0);
        assert!(approx_color(top, ROCK));
    }

    #[test]
    fn test_zero_width_band_is_not_nan() {
        let set = BiotopeSet::new(
            vec![Biotope::new(GRASS, 0.0, 0.0), Biotope::new(ROCK, 0.0, 1.0)],
            1.0,
        );
        let c = set.classify(0.0);
        assert_eq!(c, GRASS);
        assert!(!c.r.is_nan() && !c.g.is_nan() && !c.b.is_nan());
    }

    #[test]
    fn test_outer_bounds_clamped() {
        let set = BiotopeSet::new(
            vec![Biotope::new(SAND, 0.2, 0.5), Biotope::new(ROCK, 0.5, 0.8)],
            0.5,
        );
        assert_eq!(set.biotopes()[0].start_height, 0.0);
        assert_eq!(set.biotopes()[1].end_height, 1.0);
    }

    #[test]
    fn test_set_end_height_clamps_to_next_start() {
        let mut set = three_bands(0.5);
        assert!(set.set_end_height(0, 0.9));
        assert_eq!(set.biotopes()[0].end_height, 0.3);
        assert_eq!(set.biotopes()[1].start_height, 0.3);
        assert!(set.is_contiguous());
    }

    #[test]
    fn test_set_end_height_moves_edge_down() {
        let mut set = three_bands(0.5);
        set.set_end_height(1, 0.6);
        assert_eq!(set.biotopes()[1].end_height, 0.6);
        assert_eq!(set.biotopes()[2].start_height, 0.6);
        assert!(set.is_contiguous());
    }

    #[test]
    fn test_set_start_height_moves_shared_edge() {
        let mut set = three_bands(0.5);
        set.set_start_height(1, 0.4);
        assert_eq!(set.biotopes()[1].start_height, 0.4);
        assert_eq!(set.biotopes()[0].end_height, 0.4);

        // Cannot go below the previous band's start
        set.set_start_height(2, -1.0);
        assert_eq!(set.biotopes()[2].start_height, 0.4);
        assert_eq!(set.biotopes()[1].end_height, 0.4);
        assert!(set.is_contiguous());
    }

    #[test]
    fn test_last_and_first_edges_pinned() {
        let mut set = three_bands(0.5);
        set.set_start_height(0, 0.2);
        set.set_end_height(2, 0.8);
        assert_eq!(set.biotopes()[0].start_height, 0.0);
        assert_eq!(set.biotopes()[2].end_height, 1.0);
    }

    #[test]
    fn test_contiguity_survives_edit_sequence() {
        let mut set = three_bands(0.5);
        let edits = [
            (true, 1, 0.1), (false, 0, 0.05), (true, 2, 0.95), (false, 1, 0.99),
            (true, 1, 0.8), (false, 0, 0.0), (true, 2, 0.2), (false, 1, 0.5),
        ];
        for (is_start, index, value) in edits {
            if is_start {
                set.set_start_height(index, value);
            } else {
                set.set_end_height(index, value);
            }
            assert!(set.is_contiguous());
            for b in set.biotopes() {
                assert!(b.start_height <= b.end_height);
            }
        }
    }

    #[test]
    fn test_unknown_index_ignored() {
        let mut set = three_bands(0.5);
        assert!(!set.set_start_height(5, 0.1));
        assert!(!set.set_end_height(3, 0.1));
        assert!(!set.set_color(9, SAND));
        assert_eq!(set, three_bands(0.5));
    }

    #[test]
    fn test_push_and_pop() {
        let mut set = BiotopeSet::default();
        assert_eq!(set.push(), 0);
        assert_eq!(set.biotopes()[0].start_height, 0.0);
        set.set_end_height(0, 0.5);
        assert_eq!(set.biotopes()[0].end_height, 1.0);

        let mut set = three_bands(0.5);
        let index = set.push();
        assert_eq!(index, 3);
        assert!(set.is_contiguous());
        set.pop();
        set.pop();
        assert_eq!(set.len(), 2);
        assert_eq!(set.biotopes()[1].end_height, 1.0);
    }

    #[test]
    fn test_interpolation_clamped() {
        let mut set = three_bands(3.0);
        assert_eq!(set.interpolation(), 1.0);
        set.set_interpolation(-1.0);
        assert_eq!(set.interpolation(), 0.0);
    }
}
