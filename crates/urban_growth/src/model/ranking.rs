//! Ordinal ranking and top-N allocation.
//!
//! Cells are ranked by descending utility with ranks `1..=len`. Ties keep scan order
//! (row-major index), which a stable sort gives for free, so identical inputs always
//! produce identical ranks. Ineligible cells behave as if their utility were
//! [`INELIGIBLE_UTILITY`]: they rank after every eligible cell, again in scan order.
//!
//! Eligible cells must carry a finite utility; a NaN or infinity there is rejected
//! with [`Error::NonFiniteUtility`] instead of being ranked.
//!
//! Allocation never manufactures eligible cells. When more cells are requested than are
//! eligible, every eligible cell is assigned and the shortfall is reported on the
//! [`Allocation`].
use crate::error::{Error, Result};
use crate::grid::Raster;

/// Utility an ineligible cell is treated as having: below any finite utility.
pub const INELIGIBLE_UTILITY: f64 = f64::NEG_INFINITY;

/// Rank value of a cell that was not selected.
pub const NOT_SELECTED: usize = 0;

/// Per-cell ordinal ranks of the selected cells, [`NOT_SELECTED`] elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankResult {
    ranks: Vec<usize>,
}

impl RankResult {
    pub fn as_slice(&self) -> &[usize] {
        &self.ranks
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.ranks.get(index).is_some_and(|r| *r != NOT_SELECTED)
    }
}

/// Outcome of a top-N selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    /// Cells that received the new label.
    pub assigned: Raster<bool>,
    /// Number of cells asked for.
    pub requested: usize,
    /// Number of cells actually assigned.
    pub assigned_count: usize,
    /// Number of eligible cells that were available.
    pub eligible_count: usize,
}

impl Allocation {
    /// Requested cells that could not be placed.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.assigned_count)
    }

    pub fn is_under_allocated(&self) -> bool {
        self.shortfall() > 0
    }
}

/// Cell indices ordered best first: eligible cells by descending utility, then the rest.
///
/// Utilities of eligible cells are expected to be finite.
pub fn ranked_order(utility: &[f64], eligible: &[bool]) -> Vec<usize> {
    debug_assert_eq!(utility.len(), eligible.len());
    let mut order: Vec<usize> = (0..utility.len()).collect();
    order.sort_by(|&a, &b| {
        eligible[b]
            .cmp(&eligible[a])
            .then_with(|| match (eligible[a], eligible[b]) {
                // `+ 0.0` folds -0.0 into 0.0 so signed zeros tie.
                (true, true) => (utility[b] + 0.0).total_cmp(&(utility[a] + 0.0)),
                _ => std::cmp::Ordering::Equal,
            })
    });
    order
}

/// Ordinal rank (1 = best) of every cell, ties broken by scan order.
pub fn ordinal_ranks(utility: &[f64], eligible: &[bool]) -> Vec<usize> {
    let mut ranks = vec![0; utility.len()];
    for (pos, idx) in ranked_order(utility, eligible).into_iter().enumerate() {
        ranks[idx] = pos + 1;
    }
    ranks
}

/// Keep the ranks of the first `n` eligible cells, mark everything else [`NOT_SELECTED`].
pub fn rank_top_n(utility: &Raster<f64>, eligible: &Raster<bool>, n: usize) -> Result<RankResult> {
    eligible.ensure_shape("eligibility", utility.shape())?;
    let mask = eligible.as_slice();
    if let Some(i) = utility
        .as_slice()
        .iter()
        .zip(mask)
        .position(|(u, &ok)| ok && !u.is_finite())
    {
        let (row, col) = utility.shape().coords(i);
        return Err(Error::NonFiniteUtility {
            category: None,
            row,
            col,
        });
    }
    let ranks = ordinal_ranks(utility.as_slice(), mask)
        .into_iter()
        .zip(mask)
        .map(|(rank, &ok)| if ok && rank <= n { rank } else { NOT_SELECTED })
        .collect();
    Ok(RankResult { ranks })
}

/// Assign the `n` best eligible cells by utility.
pub fn select_top_n(utility: &Raster<f64>, eligible: &Raster<bool>, n: usize) -> Result<Allocation> {
    let ranks = rank_top_n(utility, eligible, n)?;
    let assigned = Raster::from_vec(
        utility.shape(),
        (0..utility.len()).map(|i| ranks.is_selected(i)).collect(),
    )?;
    let assigned_count = assigned.count(|v| *v);
    Ok(Allocation {
        assigned,
        requested: n,
        assigned_count,
        eligible_count: eligible.count(|v| *v),
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{RngExt, SeedableRng};

    use super::*;
    use crate::grid::GridShape;

    fn raster<T>(rows: usize, cols: usize, data: Vec<T>) -> Raster<T> {
        Raster::from_vec(GridShape::new(rows, cols), data).unwrap()
    }

    #[test]
    fn ordinal_ranks_break_ties_by_scan_order() {
        let ranks = ordinal_ranks(&[1.0, 3.0, 3.0, 2.0, 3.0], &[true; 5]);
        assert_eq!(ranks, vec![5, 1, 2, 4, 3]);
    }

    #[test]
    fn signed_zeros_tie() {
        assert_eq!(ordinal_ranks(&[0.0, -0.0], &[true; 2]), vec![1, 2]);
    }

    #[test]
    fn non_finite_utility_only_matters_where_eligible() {
        let utility = raster(2, 2, vec![1.0, f64::NAN, 0.5, f64::INFINITY]);
        let masked = raster(2, 2, vec![true, false, true, false]);
        let allocation = select_top_n(&utility, &masked, 1).unwrap();
        assert_eq!(allocation.assigned.as_slice(), &[true, false, false, false]);

        let open = raster(2, 2, vec![true, false, true, true]);
        let err = select_top_n(&utility, &open, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::NonFiniteUtility {
                category: None,
                row: 1,
                col: 1
            }
        ));
    }

    #[test]
    fn ineligible_cells_rank_last() {
        let ranks = ordinal_ranks(&[9.0, 1.0, 5.0], &[false, true, true]);
        assert_eq!(ranks, vec![3, 2, 1]);
    }

    #[test]
    fn selects_exactly_n_best() {
        let utility = raster(2, 3, vec![0.1, 0.9, 0.5, 0.7, 0.3, 0.8]);
        let eligible = Raster::filled(GridShape::new(2, 3), true);
        let alloc = select_top_n(&utility, &eligible, 3).unwrap();
        assert_eq!(
            alloc.assigned.as_slice(),
            &[false, true, false, true, false, true]
        );
        assert_eq!(alloc.assigned_count, 3);
        assert!(!alloc.is_under_allocated());
    }

    #[test]
    fn zero_request_assigns_nothing() {
        let utility = raster(1, 3, vec![1.0, 2.0, 3.0]);
        let eligible = Raster::filled(GridShape::new(1, 3), true);
        let alloc = select_top_n(&utility, &eligible, 0).unwrap();
        assert_eq!(alloc.assigned_count, 0);
    }

    #[test]
    fn over_request_assigns_only_eligible() {
        let utility = raster(1, 4, vec![5.0, -2000.0, 1.0, 7.0]);
        let eligible = raster(1, 4, vec![true, true, false, false]);
        let alloc = select_top_n(&utility, &eligible, 10).unwrap();
        assert_eq!(alloc.assigned.as_slice(), &[true, true, false, false]);
        assert_eq!(alloc.eligible_count, 2);
        assert_eq!(alloc.shortfall(), 8);
    }

    #[test]
    fn rank_result_marks_unselected_cells() {
        let utility = raster(1, 4, vec![1.0, 4.0, 3.0, 2.0]);
        let eligible = Raster::filled(GridShape::new(1, 4), true);
        let ranks = rank_top_n(&utility, &eligible, 2).unwrap();
        assert_eq!(ranks.as_slice(), &[NOT_SELECTED, 1, 2, NOT_SELECTED]);
    }

    #[test]
    fn mismatched_mask_is_rejected() {
        let utility = raster(1, 2, vec![1.0, 2.0]);
        let eligible = Raster::filled(GridShape::new(2, 1), true);
        let err = select_top_n(&utility, &eligible, 1).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn random_fields_respect_utility_order() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let shape = GridShape::new(12, 9);
        for n in [0usize, 1, 17, 40] {
            let utility = Raster::from_fn(shape, |_, _| (rng.random::<f64>() * 8.0).floor());
            let eligible = Raster::from_fn(shape, |_, _| rng.random::<f64>() < 0.6);
            let alloc = select_top_n(&utility, &eligible, n).unwrap();

            let expected = n.min(alloc.eligible_count);
            assert_eq!(alloc.assigned_count, expected);

            let u = utility.as_slice();
            let e = eligible.as_slice();
            let a = alloc.assigned.as_slice();
            let worst_assigned = (0..u.len())
                .filter(|&i| a[i])
                .map(|i| u[i])
                .fold(f64::INFINITY, f64::min);
            for i in 0..u.len() {
                assert!(!a[i] || e[i], "assigned an ineligible cell");
                if e[i] && !a[i] {
                    assert!(u[i] <= worst_assigned);
                }
            }
        }
    }
}
