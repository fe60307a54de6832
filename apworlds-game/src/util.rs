use std::cmp::Ordering;

/// Scales `weights` into non-negative integers summing to exactly `total`.
///
/// Each positive weight first receives the floor of its share. The units still missing
/// go to the entries with the largest fractional remainders; entries with equal
/// remainders are served in input order. Non-positive weights always receive 0. If no
/// weight is positive, every entry is 0.
pub fn build_weighted_int_list(weights: &[f64], total: usize) -> Vec<usize> {
    let weight_sum: f64 = weights.iter().filter(|&&w| w > 0.0).sum();
    if total == 0 || weight_sum <= 0.0 {
        return vec![0; weights.len()];
    }

    let scaled: Vec<f64> = weights
        .iter()
        .map(|&w| {
            if w > 0.0 {
                w * total as f64 / weight_sum
            } else {
                0.0
            }
        })
        .collect();
    let mut out: Vec<usize> = scaled.iter().map(|x| x.floor() as usize).collect();

    // Stable sort, so ties stay in input order:
    let mut order: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        let ra = scaled[a] - scaled[a].floor();
        let rb = scaled[b] - scaled[b].floor();
        rb.partial_cmp(&ra).unwrap_or(Ordering::Equal)
    });

    let assigned: usize = out.iter().sum();
    if assigned <= total {
        for &i in order.iter().cycle().take(total - assigned) {
            out[i] += 1;
        }
    } else {
        // Only reachable through floating-point drift on huge totals.
        let mut excess = assigned - total;
        for &i in order.iter().rev().cycle() {
            if excess == 0 {
                break;
            }
            if out[i] > 0 {
                out[i] -= 1;
                excess -= 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_total() {
        let weights = [0.55, 0.3, 0.1, 0.05];
        for total in 0..200 {
            let out = build_weighted_int_list(&weights, total);
            assert_eq!(out.iter().sum::<usize>(), total, "total={total}");
        }
    }

    #[test]
    fn test_largest_remainder() {
        // Shares: 3.5, 3.5, 3.0 -> one leftover unit, first tied entry wins.
        assert_eq!(build_weighted_int_list(&[0.35, 0.35, 0.3], 10), vec![4, 3, 3]);
        // Shares: 1.2, 2.7, 6.1 -> leftover goes to the .7 remainder.
        assert_eq!(build_weighted_int_list(&[0.12, 0.27, 0.61], 10), vec![1, 3, 6]);
    }

    #[test]
    fn test_zero_weights() {
        assert_eq!(build_weighted_int_list(&[0.0, 1.0, 0.0], 7), vec![0, 7, 0]);
        assert_eq!(build_weighted_int_list(&[0.0, 0.0], 7), vec![0, 0]);
        assert_eq!(build_weighted_int_list(&[], 0), Vec::<usize>::new());
    }

    #[test]
    fn test_unnormalized_weights() {
        assert_eq!(build_weighted_int_list(&[6.0, 3.0, 1.0], 20), vec![12, 6, 2]);
    }
}
