//! Weight rounding policies
//!
//! Block generation snaps loads to 2.5 kg (the smallest pair of change plates
//! most gyms stock). Copying a block snaps to 0.5 kg. The two are kept as
//! separately named functions so one can't be passed where the other belongs.

const TRAINING_INCREMENT_KG: f64 = 2.5;
const FINE_STEPS_PER_KG: f64 = 2.0;

/// Round half up, matching the tie behaviour loads have always been rounded with
/// (107.5 / 2.5 = 43.0 stays, 93.75 / 2.5 = 37.5 goes to 38).
///
/// `x - floor(x)` is exact, so values a hair below a tie are not pushed over it.
fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Nearest 2.5 kg. Used for every generated progression and deload week.
pub fn round_to_training_increment(weight: f64) -> f64 {
    round_half_up(weight / TRAINING_INCREMENT_KG) * TRAINING_INCREMENT_KG
}

/// Nearest 0.5 kg. Used only when scaling an existing block into a copy.
pub fn round_to_fine_increment(weight: f64) -> f64 {
    round_half_up(weight * FINE_STEPS_PER_KG) / FINE_STEPS_PER_KG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_increment_rounds_to_nearest() {
        assert_eq!(round_to_training_increment(115.5625), 115.0);
        assert_eq!(round_to_training_increment(124.2296875), 125.0);
        assert_eq!(round_to_training_increment(93.5), 92.5);
        assert_eq!(round_to_training_increment(136.65265625), 137.5);
    }

    #[test]
    fn test_training_increment_ties_round_up() {
        // 38.75 / 2.5 = 15.5
        assert_eq!(round_to_training_increment(38.75), 40.0);
        // 1.25 / 2.5 = 0.5
        assert_eq!(round_to_training_increment(1.25), 2.5);
    }

    #[test]
    fn test_fine_increment_rounds_to_half_kilo() {
        assert_eq!(round_to_fine_increment(110.00000000000001), 110.0);
        assert_eq!(round_to_fine_increment(132.0), 132.0);
        assert_eq!(round_to_fine_increment(61.2), 61.0);
        assert_eq!(round_to_fine_increment(61.3), 61.5);
        // tie: 61.25 * 2 = 122.5
        assert_eq!(round_to_fine_increment(61.25), 61.5);
    }

    #[test]
    fn test_rounding_is_idempotent() {
        for i in 0..2000 {
            let x = i as f64 * 0.37 - 50.0;
            let coarse = round_to_training_increment(x);
            assert_eq!(round_to_training_increment(coarse), coarse, "x = {}", x);
            let fine = round_to_fine_increment(x);
            assert_eq!(round_to_fine_increment(fine), fine, "x = {}", x);
        }
    }

    #[test]
    fn test_policies_differ() {
        assert_ne!(round_to_training_increment(101.0), round_to_fine_increment(101.0));
    }

    #[test]
    fn test_just_below_tie_rounds_down() {
        assert_eq!(round_to_fine_increment(0.24999999999999997), 0.0);
        assert_eq!(round_to_fine_increment(0.25), 0.5);
        assert_eq!(round_to_training_increment(1.2499999999999998), 0.0);
    }
}
