use super::*;

#[test]
fn defaults_are_all_zero() {
    assert_eq!(defaults(&[3, 2]), vec![0, 0]);
    assert!(defaults(&[]).is_empty());
}

#[test]
fn single_overrides_vary_one_group() {
    let combos: Vec<Combo> = single_overrides(&[3, 2]).collect();
    assert_eq!(combos, vec![vec![1, 0], vec![2, 0], vec![0, 1]]);
}

#[test]
fn single_overrides_skip_one_option_groups() {
    assert_eq!(single_overrides(&[1, 1]).count(), 0);
}

#[test]
fn pairwise_moves_both_groups_off_default() {
    let combos: Vec<Combo> = pairwise(&[3, 2, 2]).collect();
    assert_eq!(
        combos,
        vec![
            vec![1, 1, 0],
            vec![2, 1, 0],
            vec![1, 0, 1],
            vec![2, 0, 1],
            vec![0, 1, 1],
        ]
    );
}

#[test]
fn pairwise_needs_two_groups() {
    assert_eq!(pairwise(&[5]).count(), 0);
    assert_eq!(pairwise(&[]).count(), 0);
}

#[test]
fn budget_runs_out() {
    let mut budget = PairBudget::new(2);
    assert!(budget.take());
    assert!(budget.take());
    assert!(!budget.take());
    assert_eq!(budget.remaining(), 0);
}
