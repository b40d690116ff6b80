//! Load math: estimated one-rep max, RPE table lookups and weight rounding.
//!
//! The RPE table maps a rep target and an RPE bucket to a percentage of the
//! estimated 1RM. Columns run from RPE 10 down to RPE 6 in half steps, so
//! whole RPE values land on the even columns.

use crate::{Error, LoadingSet, Result};

/// Lowest rep target covered by the table
pub const MIN_TABLE_REPS: u32 = 1;
/// Highest rep target covered by the table
pub const MAX_TABLE_REPS: u32 = 19;

/// Percentage of 1RM indexed by `[reps - 1][rpe bucket]`
///
/// Buckets: 0 = RPE 10, 1 = 9.5, 2 = 9, 3 = 8.5, 4 = 8, 5 = 7.5, 6 = 7, 7 = 6.5, 8 = 6
pub static RPE_TABLE: [[f64; 9]; 19] = [
    [100.0, 97.8, 95.5, 93.9, 92.2, 90.7, 89.2, 87.8, 86.3], // 1
    [95.5, 93.9, 92.2, 90.7, 89.2, 87.8, 86.3, 85.0, 83.7],  // 2
    [92.2, 90.7, 89.2, 87.8, 86.3, 85.0, 83.7, 82.4, 81.1],  // 3
    [89.2, 87.8, 86.3, 85.0, 83.7, 82.4, 81.1, 79.9, 78.6],  // 4
    [86.3, 85.0, 83.7, 82.4, 81.1, 79.9, 78.6, 77.4, 76.2],  // 5
    [83.7, 82.4, 81.1, 79.9, 78.6, 77.4, 76.2, 75.1, 73.9],  // 6
    [81.1, 79.9, 78.6, 77.4, 76.2, 75.1, 73.9, 72.3, 70.7],  // 7
    [78.6, 77.4, 76.2, 75.1, 73.9, 72.3, 70.7, 69.4, 68.0],  // 8
    [76.2, 75.1, 73.9, 72.3, 70.7, 69.4, 68.0, 66.7, 65.3],  // 9
    [73.9, 72.3, 70.7, 69.4, 68.0, 66.7, 65.3, 64.0, 62.6],  // 10
    [70.7, 69.4, 68.0, 66.7, 65.3, 64.0, 62.6, 61.3, 59.9],  // 11
    [68.0, 66.7, 65.3, 64.0, 62.6, 61.3, 59.9, 58.6, 57.4],  // 12
    [65.3, 64.0, 62.6, 61.3, 59.9, 58.6, 57.4, 56.2, 55.1],  // 13
    [62.6, 61.3, 59.9, 58.6, 57.4, 56.2, 55.1, 54.0, 52.9],  // 14
    [59.9, 58.6, 57.4, 56.2, 55.1, 54.0, 52.9, 51.8, 50.8],  // 15
    [57.4, 56.2, 55.1, 54.0, 52.9, 51.8, 50.8, 49.8, 48.8],  // 16
    [55.1, 54.0, 52.9, 51.8, 50.8, 49.8, 48.8, 47.8, 46.9],  // 17
    [52.9, 51.8, 50.8, 49.8, 48.8, 47.8, 46.9, 46.0, 45.1],  // 18
    [50.8, 49.8, 48.8, 47.8, 46.9, 46.0, 45.1, 44.2, 43.4],  // 19
];

/// Epley estimate of the one-rep max
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + reps as f64 / 30.0)
}

/// Map a whole RPE value to its table column
fn rpe_bucket(rpe: u8) -> Result<usize> {
    match rpe {
        10 => Ok(0),
        9 => Ok(2),
        8 => Ok(4),
        7 => Ok(6),
        6 => Ok(8),
        other => Err(Error::InvalidRpe(other)),
    }
}

/// Percentage of 1RM for a rep target at a given RPE
pub fn percentage_of_max(reps: u32, rpe: u8) -> Result<f64> {
    let bucket = rpe_bucket(rpe)?;
    if !(MIN_TABLE_REPS..=MAX_TABLE_REPS).contains(&reps) {
        return Err(Error::InvalidReps(reps));
    }
    Ok(RPE_TABLE[(reps - 1) as usize][bucket])
}

/// Working weight for a rep target and RPE, derived from a loading set
///
/// The result is floored, so it is always a whole number.
pub fn weight_for_target(
    loading_set: &LoadingSet,
    target_reps: u32,
    target_rpe: u8,
    user_coefficient: f64,
) -> Result<f64> {
    let pct = percentage_of_max(target_reps, target_rpe)?;
    let one_rep_max = estimate_one_rep_max(loading_set.weight, loading_set.reps);
    let weight = (one_rep_max * pct / 100.0 * user_coefficient).floor();

    tracing::debug!(
        "Weight for {} reps @ RPE {}: {} ({}% of {:.1})",
        target_reps,
        target_rpe,
        weight,
        pct,
        one_rep_max
    );
    Ok(weight)
}

/// Rep target whose table percentage is closest to the given weight's share of 1RM
///
/// Ties resolve to the lowest rep count.
pub fn reps_for_target(loading_set: &LoadingSet, target_weight: f64, target_rpe: u8) -> Result<u32> {
    let bucket = rpe_bucket(target_rpe)?;
    let one_rep_max = estimate_one_rep_max(loading_set.weight, loading_set.reps);
    let pct = target_weight / one_rep_max * 100.0;

    let mut best_reps = MIN_TABLE_REPS;
    let mut best_diff = f64::INFINITY;
    for reps in MIN_TABLE_REPS..=MAX_TABLE_REPS {
        let diff = (RPE_TABLE[(reps - 1) as usize][bucket] - pct).abs();
        if diff < best_diff {
            best_diff = diff;
            best_reps = reps;
        }
    }

    Ok(best_reps)
}

/// Round a weight to something loadable
///
/// Rounds to the nearest integer; from 20 upward the result is further
/// rounded down to an even number.
pub fn round_prescribed_weight(weight: f64) -> f64 {
    let rounded = weight.round();
    if rounded >= 20.0 {
        rounded - rounded.rem_euclid(2.0)
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_epley_estimate() {
        let e1rm = estimate_one_rep_max(20.0, 8);
        assert!((e1rm - 25.333).abs() < 0.001);
        assert_eq!(estimate_one_rep_max(100.0, 0), 100.0);
    }

    #[test]
    fn test_weight_for_target_scenario() {
        let set = LoadingSet {
            weight: 20.0,
            reps: 8,
        };
        let weight = weight_for_target(&set, 10, 7, 1.0).unwrap();
        assert_eq!(weight.fract(), 0.0);
        assert!(weight <= estimate_one_rep_max(20.0, 8));
        assert_eq!(weight, 16.0);
    }

    #[test]
    fn test_weight_for_target_integer_matrix() {
        let loading_sets = [
            LoadingSet { weight: 20.0, reps: 8 },
            LoadingSet { weight: 42.5, reps: 5 },
            LoadingSet { weight: 7.25, reps: 13 },
            LoadingSet { weight: 140.0, reps: 1 },
        ];
        let coefficients = [0.5, 0.85, 1.0, 1.1, 2.0];

        for set in &loading_sets {
            for reps in MIN_TABLE_REPS..=MAX_TABLE_REPS {
                for rpe in 6..=10u8 {
                    for coefficient in coefficients {
                        let weight = weight_for_target(set, reps, rpe, coefficient).unwrap();
                        assert_eq!(
                            weight.fract(),
                            0.0,
                            "non-integer weight {} for {:?} reps={} rpe={} coef={}",
                            weight,
                            set,
                            reps,
                            rpe,
                            coefficient
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_invalid_rpe_rejected() {
        let set = LoadingSet { weight: 50.0, reps: 10 };
        assert!(matches!(
            weight_for_target(&set, 10, 5, 1.0),
            Err(Error::InvalidRpe(5))
        ));
        assert!(matches!(
            weight_for_target(&set, 10, 11, 1.0),
            Err(Error::InvalidRpe(11))
        ));
        assert!(matches!(
            reps_for_target(&set, 40.0, 4),
            Err(Error::InvalidRpe(4))
        ));
    }

    #[test]
    fn test_invalid_reps_rejected() {
        let set = LoadingSet { weight: 50.0, reps: 10 };
        assert!(matches!(
            weight_for_target(&set, 0, 8, 1.0),
            Err(Error::InvalidReps(0))
        ));
        assert!(matches!(
            weight_for_target(&set, 20, 8, 1.0),
            Err(Error::InvalidReps(20))
        ));
    }

    #[test]
    fn test_reps_for_target_inverts_table() {
        // 1RM of 100 makes the percentage equal to the weight
        let set = LoadingSet { weight: 100.0, reps: 0 };
        assert_eq!(reps_for_target(&set, 68.0, 8).unwrap(), 10);
        assert_eq!(reps_for_target(&set, 92.2, 8).unwrap(), 1);
        assert_eq!(reps_for_target(&set, 99.0, 10).unwrap(), 1);
        assert_eq!(reps_for_target(&set, 10.0, 8).unwrap(), 19);
    }

    #[test]
    fn test_round_prescribed_weight_examples() {
        assert_eq!(round_prescribed_weight(7.4), 7.0);
        assert_eq!(round_prescribed_weight(7.5), 8.0);
        assert_eq!(round_prescribed_weight(19.4), 19.0);
        assert_eq!(round_prescribed_weight(19.6), 20.0);
        assert_eq!(round_prescribed_weight(21.0), 20.0);
        assert_eq!(round_prescribed_weight(22.4), 22.0);
        assert_eq!(round_prescribed_weight(23.5), 24.0);
        assert_eq!(round_prescribed_weight(0.2), 0.0);
    }

    #[test]
    fn test_round_prescribed_weight_property() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut samples: Vec<f64> = (0..20_000).map(|_| rng.gen_range(0.0..500.0)).collect();
        for base in [18.0, 19.0, 20.0, 21.0, 22.0, 99.0, 100.0] {
            for delta in [-0.5001, -0.5, -0.4999, 0.0, 0.4999, 0.5, 0.5001] {
                samples.push(base + delta);
            }
        }

        for weight in samples {
            let rounded = round_prescribed_weight(weight);
            assert_eq!(rounded.fract(), 0.0, "{} -> {}", weight, rounded);
            if rounded >= 20.0 {
                assert_eq!(rounded % 2.0, 0.0, "{} -> {} is odd", weight, rounded);
            }
            assert!((rounded - weight).abs() <= 2.0);
        }
    }
}
