use std::collections::HashMap;

/// Spatial index for geographic features using conservative approximation.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// guaranteeing no false negatives while allowing false positives
/// (eliminated by the caller's bbox or polygon checks).
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes (min_lon, min_lat, max_lon, max_lat),
    /// indexed by position in the iterator
    pub fn build(bboxes: impl Iterator<Item = (f64, f64, f64, f64)>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, (min_lon, min_lat, max_lon, max_lat)) in bboxes.enumerate() {
            let min_cell = grid.to_cell(min_lon, min_lat);
            let max_cell = grid.to_cell(max_lon, max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Append feature indices for the given bounds into results vec.
    /// May contain duplicates; caller should dedup after all queries.
    pub fn query_into(&self, min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64, results: &mut Vec<usize>) {
        // Clamp so a zoomed-out viewport doesn't walk thousands of empty cells
        let min_cell = self.to_cell(min_lon.max(-180.0), min_lat.max(-90.0));
        let max_cell = self.to_cell(max_lon.min(180.0), max_lat.min(90.0));
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_feature_spans_cells() {
        let grid = FeatureGrid::build(
            [(-30.0, -5.0, 30.0, 5.0), (100.0, 40.0, 101.0, 41.0)].into_iter(),
            10.0,
        );

        let mut hits = Vec::new();
        grid.query_into(25.0, 0.0, 26.0, 1.0, &mut hits);
        assert_eq!(hits, vec![0]);

        hits.clear();
        grid.query_into(-180.0, -90.0, 180.0, 90.0, &mut hits);
        hits.sort_unstable();
        hits.dedup();
        assert_eq!(hits, vec![0, 1]);

        hits.clear();
        grid.query_into(60.0, 60.0, 61.0, 61.0, &mut hits);
        assert!(hits.is_empty());
    }
}
