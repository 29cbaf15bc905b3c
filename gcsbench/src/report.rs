//! Aggregation and reporting of throughput samples.

use bytesize::ByteSize;
use yansi::Paint;

/// Prints the mean and the spread of the throughput samples of a run.
pub fn print_summary(samples: &[f64]) {
    if samples.is_empty() {
        return;
    }

    let mean = mean(samples);
    let deviation = population_std_dev(samples);
    println!(
        "{} {}/s\t{} {}/s",
        "avg speed".bold(),
        ByteSize::b(mean as u64).bold().green(),
        "std dev".bold(),
        ByteSize::b(deviation as u64),
    );
}

fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population (not sample) standard deviation: the run observes every
/// repetition, there is no sampling correction to apply.
fn population_std_dev(samples: &[f64]) -> f64 {
    let mean = mean(samples);
    let variance = samples
        .iter()
        .map(|sample| (sample - mean) * (sample - mean))
        .sum::<f64>()
        / samples.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_samples() {
        assert_eq!(mean(&[10.0, 20.0, 30.0]), 20.0);
    }

    #[test]
    fn population_std_dev_of_samples() {
        let deviation = population_std_dev(&[10.0, 20.0, 30.0]);
        assert!((deviation - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((deviation - 8.165).abs() < 1e-3);
    }

    #[test]
    fn zero_spread_for_identical_samples() {
        assert_eq!(population_std_dev(&[42.0, 42.0, 42.0]), 0.0);
    }
}
