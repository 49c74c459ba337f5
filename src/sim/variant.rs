//! Weighted obstacle variant selection

use rand::Rng;

use crate::chapter::VariantConfig;

/// Pick a variant id with probability proportional to its weight.
///
/// An empty pool yields `default_id`; a pool whose weights sum to zero yields
/// its first entry.
pub fn pick_variant<'a, R: Rng>(
    variants: &'a [VariantConfig],
    default_id: &'a str,
    rng: &mut R,
) -> &'a str {
    let Some(first) = variants.first() else {
        return default_id;
    };

    // Summed in f64 so large finite weights cannot overflow to infinity
    let total: f64 = variants.iter().map(weight_of).sum();
    if !(total > 0.0 && total.is_finite()) {
        return &first.id;
    }

    let mut remaining = rng.random_range(0.0..total);
    for variant in variants {
        let weight = weight_of(variant);
        if remaining < weight {
            return &variant.id;
        }
        remaining -= weight;
    }

    // Float rounding can leave a sliver past the last weight
    variants
        .iter()
        .rev()
        .find(|v| weight_of(v) > 0.0)
        .map(|v| v.id.as_str())
        .unwrap_or(&first.id)
}

fn weight_of(variant: &VariantConfig) -> f64 {
    let weight = variant.weight as f64;
    if weight.is_finite() {
        weight.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn variant(id: &str, weight: f32) -> VariantConfig {
        VariantConfig {
            id: id.to_string(),
            weight,
            hazard: false,
        }
    }

    #[test]
    fn test_weighted_frequency() {
        let pool = [variant("a", 3.0), variant("b", 1.0)];
        let mut rng = Pcg32::seed_from_u64(7);
        let runs = 10_000;
        let hits = (0..runs)
            .filter(|_| pick_variant(&pool, "x", &mut rng) == "a")
            .count();
        let freq = hits as f32 / runs as f32;
        assert!((freq - 0.75).abs() < 0.03, "observed {freq}");
    }

    #[test]
    fn test_empty_pool_returns_default() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(pick_variant(&[], "chimney", &mut rng), "chimney");
        }
    }

    #[test]
    fn test_all_zero_weights_returns_first() {
        let pool = [variant("a", 0.0), variant("b", 0.0)];
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(pick_variant(&pool, "x", &mut rng), "a");
    }

    #[test]
    fn test_zero_weight_entry_never_picked() {
        let pool = [variant("never", 0.0), variant("always", 2.0)];
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..1000 {
            assert_eq!(pick_variant(&pool, "x", &mut rng), "always");
        }
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let pool = [variant("a", 3.0e38), variant("b", 3.0e38)];
        let mut rng = Pcg32::seed_from_u64(9);
        let hits = (0..2000)
            .filter(|_| pick_variant(&pool, "x", &mut rng) == "a")
            .count();
        assert!(hits > 800 && hits < 1200, "observed {hits}");
    }

    #[test]
    fn test_non_finite_weights_ignored() {
        let pool = [
            variant("inf", f32::INFINITY),
            variant("nan", f32::NAN),
            variant("ok", 1.0),
        ];
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..100 {
            assert_eq!(pick_variant(&pool, "x", &mut rng), "ok");
        }
    }
}
