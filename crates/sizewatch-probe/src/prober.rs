//! Interactive availability probing: select options, then judge the page.

use sizewatch_core::{AvailabilityMode, ProbeSettings, SizeTally};

use crate::combos::{self, Combo, PairBudget};
use crate::decision::is_purchasable;
use crate::error::PageError;
use crate::groups::ClassifiedGroups;
use crate::options::{apply_option, enumerate_options, VariantOption};
use crate::page::PageSession;

/// Probe every size by interaction, in the configured availability mode.
///
/// # Errors
///
/// Returns [`PageError`] if options cannot be enumerated. Failed selections
/// are not errors.
pub async fn probe_interactively<'p, P: PageSession + ?Sized>(
    page: &'p P,
    groups: &ClassifiedGroups<'p>,
    settings: &ProbeSettings,
) -> Result<SizeTally, PageError> {
    let sizes = enumerate_options(page, &groups.size, None, settings).await?;
    let mut others: Vec<Vec<VariantOption<'p>>> = Vec::with_capacity(groups.others.len());
    for group in &groups.others {
        let options =
            enumerate_options(page, group, Some(settings.max_options_per_group), settings).await?;
        if !options.is_empty() {
            others.push(options);
        }
    }

    tracing::debug!(
        mode = %settings.mode,
        sizes = sizes.len(),
        other_groups = others.len(),
        "probing interactively"
    );

    let tally = match settings.mode {
        AvailabilityMode::Simple => probe_simple(page, &sizes, &others, settings).await,
        AvailabilityMode::Union => probe_union(page, &sizes, &others, settings).await,
    };
    Ok(tally)
}

async fn probe_simple<P: PageSession + ?Sized>(
    page: &P,
    sizes: &[VariantOption<'_>],
    others: &[Vec<VariantOption<'_>>],
    settings: &ProbeSettings,
) -> SizeTally {
    apply_combo(page, others, &first_available(others), settings).await;

    let mut tally = SizeTally::new();
    for size in sizes {
        apply_option(page, size, settings).await;
        let available = is_purchasable(page, settings).await;
        tally.record(&size.text, available);
    }
    tally
}

/// Per group, the first option not flagged unavailable in the markup, or
/// the first option when every one is flagged.
fn first_available(others: &[Vec<VariantOption<'_>>]) -> Combo {
    others
        .iter()
        .map(|options| options.iter().position(|o| o.available).unwrap_or(0))
        .collect()
}

async fn probe_union<P: PageSession + ?Sized>(
    page: &P,
    sizes: &[VariantOption<'_>],
    others: &[Vec<VariantOption<'_>>],
    settings: &ProbeSettings,
) -> SizeTally {
    let counts: Vec<usize> = others.iter().map(Vec::len).collect();
    let mut budget = PairBudget::new(settings.max_pair_attempts);
    let mut tally = SizeTally::new();

    for size in sizes {
        let available = union_available(page, size, others, &counts, &mut budget, settings).await;
        tracing::debug!(size = %size.text, available, "size probed");
        tally.record(&size.text, available);
    }
    tally
}

/// OR over defaults, then single overrides, then pairs while the shared
/// budget lasts. Stops at the first combination that proves availability.
async fn union_available<P: PageSession + ?Sized>(
    page: &P,
    size: &VariantOption<'_>,
    others: &[Vec<VariantOption<'_>>],
    counts: &[usize],
    budget: &mut PairBudget,
    settings: &ProbeSettings,
) -> bool {
    if try_combo(page, size, others, &combos::defaults(counts), settings).await {
        return true;
    }
    for combo in combos::single_overrides(counts) {
        if try_combo(page, size, others, &combo, settings).await {
            return true;
        }
    }
    for combo in combos::pairwise(counts) {
        if !budget.take() {
            tracing::debug!(size = %size.text, "pairwise budget exhausted");
            return false;
        }
        if try_combo(page, size, others, &combo, settings).await {
            return true;
        }
    }
    false
}

/// Set the other groups, then the size, then judge.
async fn try_combo<P: PageSession + ?Sized>(
    page: &P,
    size: &VariantOption<'_>,
    others: &[Vec<VariantOption<'_>>],
    combo: &[usize],
    settings: &ProbeSettings,
) -> bool {
    apply_combo(page, others, combo, settings).await;
    apply_option(page, size, settings).await;
    is_purchasable(page, settings).await
}

async fn apply_combo<P: PageSession + ?Sized>(
    page: &P,
    others: &[Vec<VariantOption<'_>>],
    combo: &[usize],
    settings: &ProbeSettings,
) {
    for (options, &index) in others.iter().zip(combo) {
        if let Some(option) = options.get(index) {
            apply_option(page, option, settings).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionPayload;
    use crate::page::Node;

    fn option(text: &str, key: usize, available: bool) -> VariantOption<'static> {
        VariantOption {
            text: text.to_string(),
            payload: OptionPayload::Click(Node::from_key(key)),
            available,
        }
    }

    #[test]
    fn first_available_skips_flagged_options() {
        let others = vec![
            vec![option("Czarny", 1, false), option("Niebieski", 2, true)],
            vec![option("Regular", 3, true), option("Slim", 4, true)],
            vec![option("A", 5, false), option("B", 6, false)],
        ];
        assert_eq!(first_available(&others), vec![1, 0, 0]);
    }
}
