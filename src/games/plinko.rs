//! Plinko slot walk and payout tables
//!
//! A ball falling through `rows` pegs lands in one of `rows + 1` slots with
//! binomial probability. The slot is found by accumulating the Pascal row
//! `C(rows, i) / 2^rows` term by term until it passes the drawn float.

use super::types::{Hundredths, RiskTier};

pub const MIN_ROWS: u8 = 8;
pub const MAX_ROWS: u8 = 16;

/// Slot index for a float in `[0, 1)`
pub fn binomial_slot(rows: u8, e: f64) -> u8 {
    let rows_f = f64::from(rows);
    let mut chance = 0.5f64.powi(i32::from(rows));
    let mut cumulative = chance;
    let mut slot = 0u8;

    while cumulative <= e && slot < rows {
        slot += 1;
        chance = chance * (rows_f - f64::from(slot) + 1.0) / f64::from(slot);
        cumulative += chance;
    }

    slot
}

/// Payout multiplier for a slot, or `None` outside the supported rows
pub fn multiplier(rows: u8, risk: RiskTier, slot: u8) -> Option<Hundredths> {
    table(rows, risk)?
        .get(usize::from(slot))
        .map(|&hundredths| Hundredths(u64::from(hundredths)))
}

/// Multiplier table in hundredths, `rows + 1` entries, symmetric
pub fn table(rows: u8, risk: RiskTier) -> Option<&'static [u32]> {
    let index = usize::from(rows.checked_sub(MIN_ROWS)?);
    let tiers = TABLES.get(index)?;
    Some(match risk {
        RiskTier::Low => tiers[0],
        RiskTier::Medium => tiers[1],
        RiskTier::High => tiers[2],
    })
}

const TABLES: [[&[u32]; 3]; 9] = [
    // 8 rows
    [
        &[560, 210, 110, 100, 50, 100, 110, 210, 560],
        &[1300, 300, 130, 70, 40, 70, 130, 300, 1300],
        &[2900, 400, 150, 30, 20, 30, 150, 400, 2900],
    ],
    // 9 rows
    [
        &[560, 200, 160, 100, 70, 70, 100, 160, 200, 560],
        &[1800, 400, 170, 90, 50, 50, 90, 170, 400, 1800],
        &[4300, 700, 200, 60, 20, 20, 60, 200, 700, 4300],
    ],
    // 10 rows
    [
        &[890, 300, 140, 110, 100, 50, 100, 110, 140, 300, 890],
        &[2200, 500, 200, 140, 60, 40, 60, 140, 200, 500, 2200],
        &[7600, 1000, 300, 90, 30, 20, 30, 90, 300, 1000, 7600],
    ],
    // 11 rows
    [
        &[840, 300, 190, 130, 100, 70, 70, 100, 130, 190, 300, 840],
        &[2400, 600, 300, 180, 70, 50, 50, 70, 180, 300, 600, 2400],
        &[12000, 1400, 520, 140, 40, 20, 20, 40, 140, 520, 1400, 12000],
    ],
    // 12 rows
    [
        &[1000, 300, 160, 140, 110, 100, 50, 100, 110, 140, 160, 300, 1000],
        &[3300, 1100, 400, 200, 110, 60, 30, 60, 110, 200, 400, 1100, 3300],
        &[17000, 2400, 810, 200, 70, 20, 20, 20, 70, 200, 810, 2400, 17000],
    ],
    // 13 rows
    [
        &[810, 400, 300, 190, 120, 90, 70, 70, 90, 120, 190, 300, 400, 810],
        &[4300, 1300, 600, 300, 130, 70, 40, 40, 70, 130, 300, 600, 1300, 4300],
        &[26000, 3700, 1100, 400, 100, 20, 20, 20, 20, 100, 400, 1100, 3700, 26000],
    ],
    // 14 rows
    [
        &[710, 400, 190, 140, 130, 110, 100, 50, 100, 110, 130, 140, 190, 400, 710],
        &[5800, 1500, 700, 400, 190, 100, 50, 20, 50, 100, 190, 400, 700, 1500, 5800],
        &[42000, 5600, 1800, 500, 190, 30, 20, 20, 20, 30, 190, 500, 1800, 5600, 42000],
    ],
    // 15 rows
    [
        &[1500, 800, 300, 200, 150, 110, 100, 70, 70, 100, 110, 150, 200, 300, 800, 1500],
        &[8800, 1800, 1100, 500, 300, 130, 50, 30, 30, 50, 130, 300, 500, 1100, 1800, 8800],
        &[62000, 8300, 2700, 800, 300, 50, 20, 20, 20, 20, 50, 300, 800, 2700, 8300, 62000],
    ],
    // 16 rows
    [
        &[1600, 900, 200, 140, 140, 120, 110, 100, 50, 100, 110, 120, 140, 140, 200, 900, 1600],
        &[11000, 4100, 1000, 500, 300, 150, 100, 50, 30, 50, 100, 150, 300, 500, 1000, 4100, 11000],
        &[100000, 13000, 2600, 900, 400, 200, 20, 20, 20, 20, 20, 200, 400, 900, 2600, 13000, 100000],
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_have_one_entry_per_slot_and_are_symmetric() {
        for rows in MIN_ROWS..=MAX_ROWS {
            for risk in [RiskTier::Low, RiskTier::Medium, RiskTier::High] {
                let entries = table(rows, risk).unwrap();
                assert_eq!(entries.len(), usize::from(rows) + 1, "rows {} {:?}", rows, risk);

                let reversed: Vec<u32> = entries.iter().rev().copied().collect();
                assert_eq!(entries, &reversed[..], "rows {} {:?}", rows, risk);
            }
        }
        assert!(table(7, RiskTier::Low).is_none());
        assert!(table(17, RiskTier::Low).is_none());
    }

    #[test]
    fn test_slot_walk_edges() {
        assert_eq!(binomial_slot(8, 0.0), 0);
        assert_eq!(binomial_slot(8, 0.999_999), 8);
        // 1/256 + 8/256 = 0.03515625 is the end of slot 1
        assert_eq!(binomial_slot(8, 0.035), 1);
        assert_eq!(binomial_slot(8, 0.036), 2);
        assert_eq!(binomial_slot(8, 0.5), 4);
    }

    #[test]
    fn test_slot_never_exceeds_rows() {
        for rows in MIN_ROWS..=MAX_ROWS {
            assert!(binomial_slot(rows, 1.0 - f64::EPSILON) <= rows);
        }
    }

    #[test]
    fn test_multiplier_lookup() {
        assert_eq!(multiplier(8, RiskTier::Low, 0), Some(Hundredths(560)));
        assert_eq!(multiplier(16, RiskTier::High, 8), Some(Hundredths(20)));
        assert_eq!(multiplier(8, RiskTier::Low, 9), None);
    }
}
