pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum: f32 = samples.iter().sum();
        sum / samples.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_sequence_is_zero() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
        assert_eq!(StatsHelper::mean(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn mean_averages_values() {
        assert_eq!(StatsHelper::mean(&[4.0]), 4.0);
        assert_eq!(StatsHelper::mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
    }
}
