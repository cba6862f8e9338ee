/// Computes the binomial coefficient, the number of ways to choose `k` items out of `n`.
///
/// This is used to size the space of minimal samples, for example when enumerating the
/// correspondence subsets a sample consensus estimator may draw.
///
/// Choosing nothing is always possible in exactly one way, so `k == 0` gives `1` for every
/// `n` (including `n == 0`). Otherwise `n < k` gives `0`.
///
/// The coefficient is accumulated as `r = r * (n - d + 1) / d` for `d` in `1..=k`; each
/// partial product is a binomial coefficient itself, so every division is exact. The
/// accumulator wraps silently once an intermediate product exceeds `u64`, which happens
/// well before `C(n, k)` itself would (roughly `C(n, k) * k > u64::MAX`).
///
/// ```
/// assert_eq!(sfm_core::n_choose_k(5, 2), 10);
/// assert_eq!(sfm_core::n_choose_k(3, 5), 0);
/// ```
pub fn n_choose_k(n: u64, k: u64) -> u64 {
    if k == 0 {
        return 1;
    }
    if n < k {
        return 0;
    }
    // C(n, k) == C(n, n - k), and the shorter loop overflows later.
    let k = k.min(n - k);
    let mut r: u64 = 1;
    for d in 1..=k {
        r = r.wrapping_mul(n - d + 1);
        r /= d;
    }
    r
}
