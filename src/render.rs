//! Terminal rendering of analysis results.

use analytics::{ConversionTiming, ImpactProjection, PowerEstimate, SegmentLift, TestResult};
use analyzer::{ExperimentReport, MetricResult};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use configuration::DesignSettings;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn pct(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

fn signed(value: f64) -> String {
    format!("{value:+.4}")
}

fn verdict(significant: bool) -> Cell {
    let text = if significant { "yes" } else { "no" };
    Cell::new(text).set_alignment(CellAlignment::Center)
}

pub fn power_table(estimate: &PowerEstimate) -> Table {
    let input = &estimate.input;
    let mut table = table(vec!["Baseline", "MDE", "n per arm", "Alpha", "Effect size", "Power"]);
    table.add_row(vec![
        Cell::new(pct(input.baseline_rate)),
        Cell::new(pct(input.minimum_detectable_effect)),
        Cell::new(input.sample_size_per_arm),
        Cell::new(input.alpha),
        Cell::new(format!("{:.4}", estimate.effect_size)),
        Cell::new(pct(estimate.power)),
    ]);
    table
}

pub fn sample_size_table(design: &DesignSettings, n: u64) -> Table {
    let mut table = table(vec!["Baseline", "MDE", "Alpha", "Target power", "n per arm", "Total"]);
    table.add_row(vec![
        Cell::new(pct(design.baseline_rate)),
        Cell::new(pct(design.minimum_detectable_effect)),
        Cell::new(design.alpha),
        Cell::new(pct(design.target_power)),
        Cell::new(n),
        Cell::new(n.saturating_mul(2)),
    ]);
    table
}

fn metric_row(result: &MetricResult) -> Vec<Cell> {
    let test: &TestResult = &result.test;
    let (low, high) = test.confidence_interval;
    vec![
        Cell::new(result.metric),
        Cell::new(format!("{:.4}", test.group_a.mean)),
        Cell::new(format!("{:.4}", test.group_b.mean)),
        Cell::new(signed(test.difference)),
        Cell::new(format!("[{}, {}]", signed(low), signed(high))),
        Cell::new(format!("{:.3}", test.statistic)),
        Cell::new(format!("{:.4}", test.p_value)),
        verdict(result.significant),
    ]
}

pub fn metrics_table(report: &ExperimentReport) -> Table {
    let ci = format!("{:.0}% CI", report.confidence_level * 100.0);
    let mut table = table(vec![
        "Metric", "Control", "Treatment", "Diff", ci.as_str(), "Statistic", "p-value", "Significant",
    ]);
    table.add_row(metric_row(&report.primary));
    for result in &report.secondary {
        table.add_row(metric_row(result));
    }
    for skipped in &report.skipped_metrics {
        table.add_row(vec![
            Cell::new(&skipped.name),
            Cell::new(format!("skipped: {}", skipped.reason)),
        ]);
    }
    table
}

pub fn segments_table(lifts: &[SegmentLift]) -> Table {
    let mut table = table(vec![
        "Segment", "n control", "n treatment", "Control", "Treatment", "Lift", "p-value",
    ]);
    for lift in lifts {
        let lift_pct = if lift.lift_defined {
            format!("{:+.2}%", lift.lift_pct)
        } else {
            "undefined".to_string()
        };
        let p_value = match (&lift.test, &lift.test_error) {
            (Some(test), _) => format!("{:.4}", test.p_value),
            (None, Some(reason)) => format!("untestable: {reason}"),
            (None, None) => "not tested".to_string(),
        };
        table.add_row(vec![
            Cell::new(&lift.segment),
            Cell::new(lift.control.n),
            Cell::new(lift.treatment.n),
            Cell::new(pct(lift.control.rate)),
            Cell::new(pct(lift.treatment.rate)),
            Cell::new(lift_pct),
            Cell::new(p_value),
        ]);
    }
    table
}

pub fn timing_table(timing: &[ConversionTiming]) -> Table {
    let mut table = table(vec!["Arm", "Dated converters", "Mean days", "Median days"]);
    for arm in timing {
        table.add_row(vec![
            Cell::new(arm.variant),
            Cell::new(arm.converters),
            Cell::new(format!("{:.1}", arm.mean_days)),
            Cell::new(format!("{:.1}", arm.median_days)),
        ]);
    }
    table
}

pub fn impact_table(impact: &ImpactProjection) -> Table {
    let mut table = table(vec![
        "Monthly trials", "Value / conversion", "Abs. lift", "Conversions / year", "Annual value",
    ]);
    table.add_row(vec![
        Cell::new(impact.monthly_trials),
        Cell::new(impact.value_per_conversion),
        Cell::new(signed(impact.absolute_lift)),
        Cell::new(impact.additional_conversions_per_year),
        Cell::new(impact.projected_annual_value),
    ]);
    table
}

pub fn print_report(report: &ExperimentReport) {
    println!("Run {} ({} users)", report.run_id, report.records);
    println!();
    println!("Design power");
    println!("{}", power_table(&report.power));

    let ratio = &report.sample_ratio;
    println!(
        "Arms: control {} / treatment {} (chi-square {:.3}, p = {:.4}){}",
        ratio.control,
        ratio.treatment,
        ratio.chi_square,
        ratio.p_value,
        if report.sample_ratio_mismatch { "  SAMPLE RATIO MISMATCH" } else { "" }
    );
    println!();
    println!("Metrics (alpha = {})", report.alpha);
    println!("{}", metrics_table(report));

    if !report.segments.is_empty() {
        println!("Segments");
        println!("{}", segments_table(&report.segments));
    }
    if !report.grid.is_empty() {
        println!("Channel x device");
        println!("{}", segments_table(&report.grid));
    }
    for skipped in &report.skipped_segments {
        println!("Skipped segment {}: {}", skipped.name, skipped.reason);
    }
    if !report.time_to_convert.is_empty() {
        println!("Time to convert");
        println!("{}", timing_table(&report.time_to_convert));
    }
    if let Some(impact) = &report.impact {
        println!("Projected impact");
        println!("{}", impact_table(impact));
    }
}
