use crate::constants::NOT_AVAILABLE;
use crate::types::ContactFallback;

/// Number of enrichment fields that feed the confidence score
pub const SCORED_FIELD_COUNT: usize = 6;

/// A value is informative when it is non-empty, not the "N/A" sentinel and not one of the
/// excluded fallback values. Comparison is exact; no trimming or case folding.
pub fn is_informative(value: &str, exclusions: &[&str]) -> bool {
    !value.is_empty()
        && value != NOT_AVAILABLE
        && !exclusions.iter().any(|excluded| *excluded == value)
}

/// Fraction of informative fields, rounded to two decimals.
///
/// Registry fields are tested against no fallback pool; contact fields are tested against the
/// values the contact lookup substitutes when it finds nothing.
pub fn confidence_score(
    registry_fields: &[&str],
    contact_fields: &[&str],
    fallback: &ContactFallback,
) -> f64 {
    let pool = fallback.exclusion_pool();
    let good = registry_fields
        .iter()
        .filter(|value| is_informative(value, &[]))
        .count()
        + contact_fields
            .iter()
            .filter(|value| is_informative(value, &pool))
            .count();

    round_to_cents(good as f64 / SCORED_FIELD_COUNT as f64)
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
