use crate::models::series::QualityFlag;
use rand::Rng;
use rand::rngs::SmallRng;

/// Target shares of suspect and bad readings; the rest are good.
pub const SUSPECT_SHARE: f64 = 0.015;
pub const BAD_SHARE: f64 = 0.005;

/// Draws one flag per point, independently of value, time and metric.
pub fn assign_quality_flags(len: usize, rng: &mut SmallRng) -> Vec<QualityFlag> {
    (0..len).map(|_| sample_flag(rng.random::<f64>())).collect()
}

fn sample_flag(u: f64) -> QualityFlag {
    if u < 1.0 - SUSPECT_SHARE - BAD_SHARE {
        QualityFlag::Good
    } else if u < 1.0 - BAD_SHARE {
        QualityFlag::Suspect
    } else {
        QualityFlag::Bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn thresholds_split_the_unit_interval() {
        assert_eq!(sample_flag(0.0), QualityFlag::Good);
        assert_eq!(sample_flag(0.979), QualityFlag::Good);
        assert_eq!(sample_flag(0.985), QualityFlag::Suspect);
        assert_eq!(sample_flag(0.996), QualityFlag::Bad);
    }

    #[test]
    fn observed_shares_match_targets() {
        let mut rng = SmallRng::seed_from_u64(42);
        let flags = assign_quality_flags(200_000, &mut rng);
        let share = |flag| flags.iter().filter(|f| **f == flag).count() as f64 / flags.len() as f64;
        assert!((share(QualityFlag::Good) - 0.98).abs() < 0.002);
        assert!((share(QualityFlag::Suspect) - 0.015).abs() < 0.002);
        assert!((share(QualityFlag::Bad) - 0.005).abs() < 0.001);
    }
}
