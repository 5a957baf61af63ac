use txload_model::Budget;

/// Split `total` transactions over `workers`.
///
/// Every worker gets `total / workers`; worker 0 also takes the remainder. A `total` of zero
/// means "no limit" and every worker gets [`Budget::Unlimited`].
pub fn split_budgets(total: u64, workers: usize) -> Vec<Budget> {
    if workers == 0 {
        return Vec::new();
    }
    if total == 0 {
        return vec![Budget::Unlimited; workers];
    }

    let n = workers as u64;
    let base = total / n;
    let remainder = total % n;
    (0..workers)
        .map(|i| {
            if i == 0 {
                Budget::Fixed(base + remainder)
            } else {
                Budget::Fixed(base)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_sum(budgets: &[Budget]) -> u64 {
        budgets
            .iter()
            .map(|b| match b {
                Budget::Fixed(n) => *n,
                Budget::Unlimited => panic!("unexpected unlimited budget"),
            })
            .sum()
    }

    #[test]
    fn sum_matches_total_for_many_shapes() {
        for total in 1..=50u64 {
            for workers in 1..=12usize {
                let budgets = split_budgets(total, workers);
                assert_eq!(budgets.len(), workers);
                assert_eq!(fixed_sum(&budgets), total, "total={total} workers={workers}");

                let base = total / workers as u64;
                let rem = total % workers as u64;
                assert_eq!(budgets[0], Budget::Fixed(base + rem));
                assert!(budgets[1..].iter().all(|b| *b == Budget::Fixed(base)));
            }
        }
    }

    #[test]
    fn zero_total_is_unlimited_everywhere() {
        let budgets = split_budgets(0, 4);
        assert_eq!(budgets, vec![Budget::Unlimited; 4]);
    }

    #[test]
    fn more_workers_than_transactions_leaves_empty_budgets() {
        let budgets = split_budgets(2, 5);
        assert_eq!(budgets[0], Budget::Fixed(2));
        assert!(budgets[1..].iter().all(Budget::is_empty));
    }

    #[test]
    fn no_workers_no_budgets() {
        assert!(split_budgets(10, 0).is_empty());
    }
}
