use crate::distributions::{
    check_probability, standard_normal, students_t, two_sided_critical, two_sided_p,
};
use crate::error::AnalyticsError;
use crate::report::{GroupSummary, TestKind, TestResult};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Which two-sample t-test to run on continuous metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TTestKind {
    /// Pooled-variance Student's t-test.
    #[default]
    Student,
    Welch,
}

/// Pooled two-proportion z-test of `x_a / n_a` against `x_b / n_b`.
pub fn two_proportion_z_test(
    x_a: u64,
    n_a: u64,
    x_b: u64,
    n_b: u64,
    confidence_level: f64,
) -> Result<TestResult, AnalyticsError> {
    check_probability("confidence level", confidence_level)?;
    for (label, x, n) in [("A", x_a, n_a), ("B", x_b, n_b)] {
        if n == 0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "group {label} has a sample size of zero"
            )));
        }
        if x > n {
            return Err(AnalyticsError::InvalidInput(format!(
                "group {label} has {x} successes but only {n} observations"
            )));
        }
    }

    let (na, nb) = (n_a as f64, n_b as f64);
    let p_a = x_a as f64 / na;
    let p_b = x_b as f64 / nb;
    let pooled = (x_a + x_b) as f64 / (na + nb);
    let se = (pooled * (1.0 - pooled) * (1.0 / na + 1.0 / nb)).sqrt();
    if se.is_nan() || se <= 0.0 {
        return Err(AnalyticsError::DegenerateVariance(format!(
            "pooled rate {pooled} leaves no variance to test against"
        )));
    }

    let z = (p_a - p_b) / se;
    let normal = standard_normal()?;
    let p_value = two_sided_p(&normal, z);

    // Unpooled Wald interval for the difference B - A.
    let difference = p_b - p_a;
    let se_diff = (p_a * (1.0 - p_a) / na + p_b * (1.0 - p_b) / nb).sqrt();
    let margin = two_sided_critical(&normal, confidence_level) * se_diff;

    tracing::debug!(z, p_value, pooled, "Two-proportion z-test");

    Ok(TestResult {
        kind: TestKind::TwoProportionZ,
        group_a: proportion_summary(x_a, n_a, p_a),
        group_b: proportion_summary(x_b, n_b, p_b),
        statistic: z,
        p_value,
        degrees_of_freedom: None,
        difference,
        confidence_interval: (difference - margin, difference + margin),
        confidence_level,
    })
}

fn proportion_summary(x: u64, n: u64, rate: f64) -> GroupSummary {
    GroupSummary {
        n,
        mean: rate,
        successes: Some(x),
        std_dev: (rate * (1.0 - rate)).sqrt(),
    }
}

/// Independent two-sample t-test over raw observations.
///
/// Each sample needs at least two observations. If both samples are constant the
/// statistic is undefined and `DegenerateVariance` is returned instead of NaN.
pub fn two_sample_t_test(
    a: &[f64],
    b: &[f64],
    kind: TTestKind,
    confidence_level: f64,
) -> Result<TestResult, AnalyticsError> {
    check_probability("confidence level", confidence_level)?;
    for (label, sample) in [("A", a), ("B", b)] {
        if sample.len() < 2 {
            return Err(AnalyticsError::InsufficientData {
                what: format!("variance of group {label}"),
                required: 2,
                actual: sample.len(),
            });
        }
        if let Some(bad) = sample.iter().find(|v| !v.is_finite()) {
            return Err(AnalyticsError::InvalidInput(format!(
                "group {label} contains a non-finite value ({bad})"
            )));
        }
    }
    if is_constant(a) && is_constant(b) {
        return Err(AnalyticsError::DegenerateVariance(
            "both samples have zero variance; the t statistic is undefined".to_string(),
        ));
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (mean_a, mean_b) = (a.iter().mean(), b.iter().mean());
    let (var_a, var_b) = (sample_variance(a), sample_variance(b));

    let (se, df) = match kind {
        TTestKind::Student => {
            let df = na + nb - 2.0;
            let pooled = ((na - 1.0) * var_a + (nb - 1.0) * var_b) / df;
            ((pooled * (1.0 / na + 1.0 / nb)).sqrt(), df)
        }
        TTestKind::Welch => {
            let (qa, qb) = (var_a / na, var_b / nb);
            let se2 = qa + qb;
            let df = se2 * se2 / (qa * qa / (na - 1.0) + qb * qb / (nb - 1.0));
            (se2.sqrt(), df)
        }
    };
    if !se.is_finite() || se <= 0.0 || !df.is_finite() {
        return Err(AnalyticsError::DegenerateVariance(format!(
            "standard error {se} with {df} degrees of freedom"
        )));
    }

    let t = (mean_a - mean_b) / se;
    let dist = students_t(df)?;
    let p_value = two_sided_p(&dist, t);
    let difference = mean_b - mean_a;
    let margin = two_sided_critical(&dist, confidence_level) * se;

    tracing::debug!(t, df, p_value, ?kind, "Two-sample t-test");

    Ok(TestResult {
        kind: match kind {
            TTestKind::Student => TestKind::StudentT,
            TTestKind::Welch => TestKind::WelchT,
        },
        group_a: mean_summary(a.len(), mean_a, var_a),
        group_b: mean_summary(b.len(), mean_b, var_b),
        statistic: t,
        p_value,
        degrees_of_freedom: Some(df),
        difference,
        confidence_interval: (difference - margin, difference + margin),
        confidence_level,
    })
}

fn mean_summary(n: usize, mean: f64, variance: f64) -> GroupSummary {
    GroupSummary {
        n: n as u64,
        mean,
        successes: None,
        std_dev: variance.sqrt(),
    }
}

fn is_constant(sample: &[f64]) -> bool {
    sample.windows(2).all(|w| w[0] == w[1])
}

/// Unbiased sample variance; exactly zero for a constant sample.
fn sample_variance(sample: &[f64]) -> f64 {
    if is_constant(sample) {
        0.0
    } else {
        sample.iter().variance()
    }
}
