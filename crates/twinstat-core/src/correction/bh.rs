//! Benjamini–Hochberg step-up FDR adjustment.

/// Adjusted p-values and rejection mask, both in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BhOutcome {
    pub adjusted: Vec<f64>,
    pub rejected: Vec<bool>,
}

impl BhOutcome {
    pub fn n_rejected(&self) -> usize {
        self.rejected.iter().filter(|&&r| r).count()
    }
}

/// Indices of `pvalues` sorted ascending by value, ties broken by position.
pub fn rank_order(pvalues: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pvalues.len()).collect();
    order.sort_by(|&i, &j| pvalues[i].total_cmp(&pvalues[j]).then(i.cmp(&j)));
    order
}

/// Apply Benjamini–Hochberg to `pvalues` at significance level `alpha`.
///
/// For rank `k` of `n`, `p_adj(k) = min_{j >= k} p(j) * n / j`, capped at 1.
/// A test is rejected when its adjusted value is `<= alpha`.
pub fn benjamini_hochberg(pvalues: &[f64], alpha: f64) -> BhOutcome {
    let n = pvalues.len();
    let mut adjusted = vec![1.0; n];

    let mut running = 1.0_f64;
    for (rank0, &idx) in rank_order(pvalues).iter().enumerate().rev() {
        let rank = rank0 + 1;
        let scaled = (pvalues[idx] * n as f64 / rank as f64).min(1.0);
        running = running.min(scaled);
        adjusted[idx] = running;
    }

    let rejected = adjusted.iter().map(|&q| q <= alpha).collect();
    BhOutcome { adjusted, rejected }
}
