//! Banded rolling-row engine for min-cost alignment recurrences.
//!
//! DTW, WDTW, ERP, MSM and TWE differ only in the cost of a single step, so
//! they share this loop. The engine owns band clipping, the two rolling rows,
//! early abandoning and the propagation of each cell's warping reach.

use crate::constraint::BandConstraint;

/// Accumulated cost of a grid cell and the widest `|i - j|` on its chosen predecessor chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cell {
    pub(crate) cost: f64,
    pub(crate) reach: usize,
}

impl Cell {
    pub(crate) const UNREACHABLE: Self = Self {
        cost: f64::INFINITY,
        reach: 0,
    };
}

/// Which predecessor a cell extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Diagonal,
    Up,
    Left,
}

/// Pick the cheapest of three candidate costs; diagonal wins ties, then up.
pub(crate) fn prefer_diagonal(diag: f64, up: f64, left: f64) -> (f64, Step) {
    if diag <= up && diag <= left {
        (diag, Step::Diagonal)
    } else if up <= left {
        (up, Step::Up)
    } else {
        (left, Step::Left)
    }
}

/// Alignment grid of `rows x cols` cells restricted by a band.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Grid {
    rows: usize,
    cols: usize,
    constraint: BandConstraint,
}

impl Grid {
    pub(crate) fn new(rows: usize, cols: usize, constraint: BandConstraint) -> Self {
        debug_assert!(rows > 0 && cols > 0);
        Self {
            rows,
            cols,
            constraint,
        }
    }

    /// Evaluate a min-cost recurrence and return the final cell `(rows-1, cols-1)`.
    ///
    /// `origin` is the cost of cell `(0, 0)`. For every other admitted cell,
    /// `step(i, j, diag, up, left)` receives the accumulated costs of the three
    /// predecessors (`f64::INFINITY` when a predecessor is outside the grid or
    /// the band) and returns the cell's accumulated cost together with the
    /// predecessor it extends.
    ///
    /// Every path crosses every row, and step costs are non-negative, so a
    /// completed row whose minimum is `>= cutoff` proves the result is too.
    /// The final cell is checked against `cutoff` as well: a finite cost is
    /// returned only when it is strictly below the cutoff.
    pub(crate) fn min_cost<F>(&self, origin: f64, cutoff: f64, mut step: F) -> Cell
    where
        F: FnMut(usize, usize, f64, f64, f64) -> (f64, Step),
    {
        let mut prev = vec![Cell::UNREACHABLE; self.cols];
        let mut curr = vec![Cell::UNREACHABLE; self.cols];
        let mut prev_range = 0..0;

        for i in 0..self.rows {
            let range = self.constraint.column_range(i, self.cols);
            let mut row_min = f64::INFINITY;

            for j in range.clone() {
                let cell = if i == 0 && j == 0 {
                    Cell {
                        cost: origin,
                        reach: 0,
                    }
                } else {
                    let diag = if i > 0 && j > 0 && prev_range.contains(&(j - 1)) {
                        prev[j - 1]
                    } else {
                        Cell::UNREACHABLE
                    };
                    let up = if i > 0 && prev_range.contains(&j) {
                        prev[j]
                    } else {
                        Cell::UNREACHABLE
                    };
                    let left = if j > range.start {
                        curr[j - 1]
                    } else {
                        Cell::UNREACHABLE
                    };

                    let (cost, from) = step(i, j, diag.cost, up.cost, left.cost);
                    let parent = match from {
                        Step::Diagonal => diag,
                        Step::Up => up,
                        Step::Left => left,
                    };
                    Cell {
                        cost,
                        reach: parent.reach.max(i.abs_diff(j)),
                    }
                };
                curr[j] = cell;
                row_min = row_min.min(cell.cost);
            }

            if row_min >= cutoff {
                return Cell::UNREACHABLE;
            }

            prev_range = range;
            std::mem::swap(&mut prev, &mut curr);
        }

        // After the final swap, `prev` holds the last completed row.
        let last = self.cols - 1;
        if !prev_range.contains(&last) {
            return Cell::UNREACHABLE;
        }
        let end = prev[last];
        if end.cost >= cutoff {
            return Cell::UNREACHABLE;
        }
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squared(a: &[f64], b: &[f64], constraint: BandConstraint, cutoff: f64) -> Cell {
        Grid::new(a.len(), b.len(), constraint).min_cost((a[0] - b[0]).powi(2), cutoff, |i, j, d, u, l| {
            let (best, from) = prefer_diagonal(d, u, l);
            (best + (a[i] - b[j]).powi(2), from)
        })
    }

    #[test]
    fn tie_break_prefers_diagonal_then_up() {
        assert_eq!(prefer_diagonal(1.0, 1.0, 1.0), (1.0, Step::Diagonal));
        assert_eq!(prefer_diagonal(2.0, 1.0, 1.0), (1.0, Step::Up));
        assert_eq!(prefer_diagonal(2.0, 3.0, 1.0), (1.0, Step::Left));
    }

    #[test]
    fn diagonal_only_band_sums_lockstep_costs() {
        let cell = squared(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], BandConstraint::SakoeChibaRadius(0), f64::INFINITY);
        assert_eq!(cell, Cell { cost: 3.0, reach: 0 });
    }

    #[test]
    fn unreachable_end_cell_is_infinite() {
        // |n - m| = 2 exceeds the band radius of 1.
        let cell = squared(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0], BandConstraint::SakoeChibaRadius(1), f64::INFINITY);
        assert_eq!(cell.cost, f64::INFINITY);
    }

    #[test]
    fn abandons_when_row_minimum_reaches_cutoff() {
        let a = [0.0, 0.0, 0.0, 0.0];
        let b = [5.0, 5.0, 5.0, 5.0];
        let cell = squared(&a, &b, BandConstraint::Unconstrained, 25.0);
        assert_eq!(cell.cost, f64::INFINITY);
    }

    #[test]
    fn reach_follows_chosen_predecessors() {
        let a = [0.0, 1.0, 0.0, 0.0];
        let b = [0.0, 0.0, 1.0, 0.0];
        let cell = squared(&a, &b, BandConstraint::Unconstrained, f64::INFINITY);
        assert_eq!(cell, Cell { cost: 0.0, reach: 1 });
    }
}
