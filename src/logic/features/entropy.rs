//! Shannon entropy over a character sequence

use std::collections::BTreeMap;

use crate::error::AppError;

/// Shannon entropy (base 2) of `s`.
///
/// For each distinct character `c` with probability `p_c = count(c) / len(s)`,
/// returns `-Σ p_c · log2(p_c)`. Undefined for the empty string; callers must
/// guarantee non-empty input or substitute 0.
pub fn entropy(s: &str) -> Result<f64, AppError> {
    if s.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }

    let total = total as f64;
    let sum: f64 = counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            p * p.log2()
        })
        .sum();

    Ok(-sum)
}
