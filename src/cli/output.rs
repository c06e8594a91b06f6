//! Plain text rendering of query results. One record per line, fields separated by tabs.

use ansi_term::Colour;
use chrono::Duration;

use crate::{
    domain::{
        burn_up::BurnUpQueryResult,
        estimate::EstimateQueryResult,
        recent_activities::RecentActivitiesQueryResult,
        report::{ReportEntry, ReportQueryResult, ReportScope, UNCATEGORIZED},
        statistics::StatisticsQueryResult,
        timesheet::TimesheetQueryResult,
    },
    utils::time::format_duration,
};

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

pub fn recent_activities_lines(result: &RecentActivitiesQueryResult) -> Vec<String> {
    let mut lines = vec![];
    for day in &result.working_days {
        lines.push(day.date.format("%A, %x").to_string());
        for activity in &day.activities {
            lines.push(format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                activity.date_time.format("%H:%M"),
                format_duration(activity.duration),
                activity.client,
                activity.project,
                activity.task,
                activity.notes.as_deref().unwrap_or_default()
            ));
        }
        lines.push(String::new());
    }
    let summary = result.time_summary;
    lines.push(format!("Hours Today\t{}", format_duration(summary.hours_today)));
    lines.push(format!(
        "Hours Yesterday\t{}",
        format_duration(summary.hours_yesterday)
    ));
    lines.push(format!(
        "Hours this Week\t{}",
        format_duration(summary.hours_this_week)
    ));
    lines.push(format!(
        "Hours this Month\t{}",
        format_duration(summary.hours_this_month)
    ));
    lines
}

pub fn print_recent_activities(result: &RecentActivitiesQueryResult) {
    print_lines(recent_activities_lines(result));
}

fn report_labels(scope: ReportScope, entry: &ReportEntry) -> Vec<&str> {
    match scope {
        ReportScope::Clients => vec![entry.client.as_str()],
        ReportScope::Projects => vec![entry.project.as_str(), entry.client.as_str()],
        ReportScope::Tasks => vec![
            entry.task.as_str(),
            entry.project.as_str(),
            entry.client.as_str(),
            entry.category.as_str(),
        ],
        ReportScope::Categories => vec![entry.category.as_str()],
    }
}

pub fn report_lines(scope: ReportScope, result: &ReportQueryResult) -> Vec<String> {
    let mut lines = result
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                entry.start,
                entry.finish,
                report_labels(scope, entry).join("\t"),
                format_duration(entry.hours),
                entry.cycle_time
            )
        })
        .collect::<Vec<_>>();
    lines.push(format!("Total\t{}", format_duration(result.total_hours)));
    lines
}

pub fn print_report(scope: ReportScope, result: &ReportQueryResult) {
    print_lines(report_lines(scope, result));
}

pub fn statistics_lines(result: &StatisticsQueryResult) -> Vec<String> {
    let histogram = &result.histogram;
    let mut lines = vec![format!(
        "{}\t{}",
        histogram.x_axis_label, histogram.y_axis_label
    )];
    for (bin, frequency) in histogram
        .bin_edges
        .windows(2)
        .zip(&histogram.frequencies)
    {
        lines.push(format!("{} - {}\t{frequency}", bin[0], bin[1]));
    }
    let median = result.median;
    lines.push(format!(
        "Median\t{}\t{}\t{}\t{}\t{}",
        median.edge0, median.edge25, median.edge50, median.edge75, median.edge100
    ));
    lines.push(format!("Total\t{}", result.total_count));
    lines.push(format!("Categories\t{}", category_list(&result.categories)));
    lines
}

pub fn print_statistics(result: &StatisticsQueryResult) {
    print_lines(statistics_lines(result));
}

fn category_list(categories: &[std::sync::Arc<str>]) -> String {
    categories
        .iter()
        .map(|category| match &**category {
            "" => UNCATEGORIZED,
            category => category,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn estimate_lines(result: &EstimateQueryResult) -> Vec<String> {
    let mut lines = result
        .cycle_times
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\t{}\t{}",
                entry.cycle_time,
                entry.frequency,
                percent(entry.probability),
                percent(entry.cumulative_probability)
            )
        })
        .collect::<Vec<_>>();
    lines.push(format!("Total\t{}", result.total_count));
    lines.push(format!("Categories\t{}", category_list(&result.categories)));
    lines
}

pub fn print_estimate(result: &EstimateQueryResult) {
    print_lines(estimate_lines(result));
}

pub fn burn_up_lines(result: &BurnUpQueryResult) -> Vec<String> {
    let mut lines = result
        .data
        .iter()
        .map(|point| {
            format!(
                "{}\t{}\t{}",
                point.date, point.throughput, point.cumulative_throughput
            )
        })
        .collect::<Vec<_>>();
    lines.push(format!("Total\t{}", result.total_throughput));
    lines
}

pub fn print_burn_up(result: &BurnUpQueryResult) {
    print_lines(burn_up_lines(result));
}

fn offset(value: Duration, colored: bool) -> String {
    let formatted = format_duration(value);
    if colored && value < Duration::zero() {
        Colour::Red.paint(formatted).to_string()
    } else {
        formatted
    }
}

/// `colored` highlights a negative offset.
pub fn timesheet_lines(result: &TimesheetQueryResult, colored: bool) -> Vec<String> {
    let mut lines = result
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                entry.date,
                entry.client,
                entry.project,
                entry.task,
                format_duration(entry.hours)
            )
        })
        .collect::<Vec<_>>();
    lines.push(format!("Total\t{}", format_duration(result.total_hours)));
    lines.push(format!(
        "Capacity\t{}",
        format_duration(result.capacity.hours)
    ));
    lines.push(format!(
        "Offset\t{}",
        offset(result.capacity.offset, colored)
    ));
    lines
}

pub fn print_timesheet(result: &TimesheetQueryResult) {
    print_lines(timesheet_lines(result, true));
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{report_lines, statistics_lines, timesheet_lines};
    use crate::domain::{
        events::test_events::date,
        report::{ReportEntry, ReportQueryResult, ReportScope},
        statistics::{Histogram, Median, StatisticsQueryResult},
        timesheet::{Capacity, TimesheetEntry, TimesheetQueryResult},
    };

    #[test]
    fn report_shows_scope_labels() {
        let result = ReportQueryResult {
            entries: vec![ReportEntry {
                start: date("2025-06-02"),
                finish: date("2025-06-04"),
                client: "Client 1, Client 2".into(),
                project: "Project A".into(),
                task: String::new(),
                category: String::new(),
                hours: Duration::minutes(510),
                cycle_time: 3,
            }],
            total_hours: Duration::minutes(510),
        };

        assert_eq!(
            report_lines(ReportScope::Projects, &result),
            vec![
                "2025-06-02\t2025-06-04\tProject A\tClient 1, Client 2\t8h30m\t3",
                "Total\t8h30m",
            ]
        );
    }

    #[test]
    fn statistics_list_bins_and_median() {
        let result = StatisticsQueryResult {
            histogram: Histogram {
                bin_edges: vec!["0".into(), "0.5".into(), "1".into()],
                frequencies: vec![2, 1],
                x_axis_label: "Duration (days)".into(),
                y_axis_label: "Number of Tasks".into(),
            },
            median: Median {
                edge0: 0.0,
                edge25: 0.5,
                edge50: 0.5,
                edge75: 0.8,
                edge100: 1.0,
            },
            categories: vec!["".into(), "Feature".into()],
            total_count: 3,
        };

        assert_eq!(
            statistics_lines(&result),
            vec![
                "Duration (days)\tNumber of Tasks",
                "0 - 0.5\t2",
                "0.5 - 1\t1",
                "Median\t0\t0.5\t0.5\t0.8\t1",
                "Total\t3",
                "Categories\tN/A, Feature",
            ]
        );
    }

    #[test]
    fn timesheet_shows_capacity() {
        let result = TimesheetQueryResult {
            entries: vec![TimesheetEntry {
                date: date("2025-06-09"),
                client: "Test client".into(),
                project: "Test project".into(),
                task: "Test task".into(),
                hours: Duration::hours(8),
            }],
            total_hours: Duration::hours(8),
            capacity: Capacity {
                hours: Duration::hours(40),
                offset: Duration::hours(-8),
            },
        };

        let lines = timesheet_lines(&result, false);

        assert_eq!(
            lines,
            vec![
                "2025-06-09\tTest client\tTest project\tTest task\t8h",
                "Total\t8h",
                "Capacity\t40h",
                "Offset\t-8h",
            ]
        );
        assert!(timesheet_lines(&result, true)[3].contains("\u{1b}["));
    }
}
