use rand::Rng;

use crate::row::{Row, RowKey};

/// Substances reported in the table, in display order.
pub const SUBSTANCES: [&str; 13] = [
    "Atrazine (ppb)",
    "Barium (ppm)",
    "Chlorine (ppm)",
    "Chlorite (ppm)",
    "Fluoride (ppm)",
    "Haloacetic acids [HAAs] - Stage 2",
    "Nitrate (ppm)",
    "Sodium (ppm)",
    "Total Coliform Bacteria (positive samples)",
    "Total Organic Carrbon [TOC] (ppm)",
    "TTHMs [Total trihalomethanes] - Stage 2 (ppb)",
    "Turbidity (NTU)",
    "Turbidity (lowest monthly percent of samples meeting limit)",
];

pub const TYPICAL_SOURCE: &str = "Runoff from herbicide used on row crops";

const FIRST_YEAR: u32 = 2020;
const YEAR_SPAN: u32 = 5;

/// Random decimal in `[min, max)` formatted with two decimals.
pub fn random_decimal<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> String {
    format!("{:.2}", rng.gen_range(min..max))
}

fn random_violation<R: Rng + ?Sized>(rng: &mut R) -> String {
    let flag = if rng.gen_bool(0.5) { "Yes" } else { "No" };
    flag.to_string()
}

/// Build one row per substance with randomized measurements.
///
/// The shape is fixed (same substances, same order, keys `"0"..`), only the
/// values vary between calls.
pub fn generate_rows<R: Rng + ?Sized>(rng: &mut R) -> Vec<Row> {
    SUBSTANCES
        .iter()
        .enumerate()
        .map(|(index, substance)| Row {
            key: RowKey::from_index(index),
            substance: substance.to_string(),
            unit: random_decimal(rng, 1.0, 5.0),
            year: (FIRST_YEAR + rng.gen_range(0..YEAR_SPAN)).to_string(),
            mcl: random_decimal(rng, 1.0, 10.0),
            mclg: random_decimal(rng, 1.0, 10.0),
            amount_detected: random_decimal(rng, 0.0, 5.0),
            range: format!(
                "{}–{}",
                random_decimal(rng, 0.0, 1.0),
                random_decimal(rng, 1.0, 5.0)
            ),
            violation: random_violation(rng),
            typical_source: TYPICAL_SOURCE.to_string(),
        })
        .collect()
}

pub fn generate_table() -> Vec<Row> {
    generate_rows(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn in_range(value: &str, min: f64, max: f64) -> bool {
        let parsed: f64 = value.parse().unwrap();
        parsed >= min && parsed <= max
    }

    #[test]
    fn one_row_per_substance_with_unique_keys() {
        let rows = generate_table();
        assert_eq!(rows.len(), SUBSTANCES.len());

        let keys: HashSet<_> = rows.iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys.len(), rows.len());

        for (index, row) in rows.iter().enumerate() {
            assert_eq!(row.key.as_str(), index.to_string());
            assert_eq!(row.substance, SUBSTANCES[index]);
            assert_eq!(row.typical_source, TYPICAL_SOURCE);
        }
    }

    #[test]
    fn values_stay_within_documented_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            for row in generate_rows(&mut rng) {
                assert!(in_range(&row.unit, 1.0, 5.0), "unit {}", row.unit);
                assert!(in_range(&row.mcl, 1.0, 10.0), "mcl {}", row.mcl);
                assert!(in_range(&row.mclg, 1.0, 10.0), "mclg {}", row.mclg);
                assert!(in_range(&row.amount_detected, 0.0, 5.0));

                let year: u32 = row.year.parse().unwrap();
                assert!((2020..=2024).contains(&year));

                let (low, high) = row.range.split_once('–').unwrap();
                assert!(in_range(low, 0.0, 1.0));
                assert!(in_range(high, 1.0, 5.0));

                assert!(row.violation == "Yes" || row.violation == "No");
            }
        }
    }

    #[test]
    fn decimals_have_two_places() {
        let mut rng = StdRng::seed_from_u64(1);
        let value = random_decimal(&mut rng, 1.0, 10.0);
        let (_, fraction) = value.split_once('.').unwrap();
        assert_eq!(fraction.len(), 2);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = generate_rows(&mut StdRng::seed_from_u64(42));
        let second = generate_rows(&mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}
