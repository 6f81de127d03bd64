//! Plain-text work reports over a set of entries.
//!
//! Reports are Markdown-flavoured and fully deterministic for a given input:
//! tag counts break ties by name, days are listed newest first, and entries
//! keep the order they were given in.

use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::defaults::REPORT_SUMMARY_LIMIT;
use crate::models::Entry;
use crate::temporal::DateRange;

/// Text returned when there is nothing to report.
pub const EMPTY_REPORT: &str = "没有找到符合条件的记录。";

/// Layout of a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Totals, per-tag counts and the first few summaries.
    #[default]
    Summary,
    /// Every entry, grouped by day.
    Detailed,
    /// One bullet per entry.
    Bullet,
}

impl ReportFormat {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Summary => "工作摘要",
            Self::Detailed => "详细报告",
            Self::Bullet => "要点列表",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Detailed => write!(f, "detailed"),
            Self::Bullet => write!(f, "bullet"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "detailed" => Ok(Self::Detailed),
            "bullet" => Ok(Self::Bullet),
            _ => Err(format!("Invalid report format: {}", s)),
        }
    }
}

/// Render a report for `entries`, titled with the range's display name.
pub fn generate_report(entries: &[Entry], format: ReportFormat, range: &DateRange) -> String {
    if entries.is_empty() {
        return EMPTY_REPORT.to_string();
    }

    let title = range.display_name();
    match format {
        ReportFormat::Summary => summary_report(entries, title),
        ReportFormat::Detailed => detailed_report(entries, title),
        ReportFormat::Bullet => bullet_report(entries, title),
    }
}

fn summary_report(entries: &[Entry], title: &str) -> String {
    let mut report = format!("## {}工作汇报\n\n", title);
    report.push_str(&format!("共完成 {} 项工作记录。\n\n", entries.len()));

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in entries.iter().flat_map(|e| e.tags.iter()) {
        *counts.entry(tag.name.as_str()).or_default() += 1;
    }
    if !counts.is_empty() {
        // BTreeMap iteration is name-ascending; the stable sort keeps that
        // order among equal counts.
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        report.push_str("### 工作分类\n");
        for (name, count) in ranked {
            report.push_str(&format!("- {}: {} 项\n", name, count));
        }
        report.push('\n');
    }

    report.push_str("### 主要内容\n");
    for entry in entries.iter().take(REPORT_SUMMARY_LIMIT) {
        report.push_str(&format!("- {}\n", entry.summary()));
    }
    if entries.len() > REPORT_SUMMARY_LIMIT {
        report.push_str(&format!(
            "- ...等 {} 项\n",
            entries.len() - REPORT_SUMMARY_LIMIT
        ));
    }
    report
}

fn detailed_report(entries: &[Entry], title: &str) -> String {
    let mut report = format!("## {}详细工作报告\n\n", title);

    let mut days: BTreeMap<String, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        let day = entry
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d")
            .to_string();
        days.entry(day).or_default().push(entry);
    }

    for (day, day_entries) in days.iter().rev() {
        report.push_str(&format!("### {}\n\n", day));
        for entry in day_entries {
            report.push_str(&format!("- {}\n", entry.content));
            if !entry.tags.is_empty() {
                let names: Vec<&str> = entry.tags.iter().map(|t| t.name.as_str()).collect();
                report.push_str(&format!("  标签: {}\n", names.join(", ")));
            }
            report.push('\n');
        }
    }
    report
}

fn bullet_report(entries: &[Entry], title: &str) -> String {
    let mut report = format!("## {}工作要点\n\n", title);
    for entry in entries {
        report.push_str(&format!("• {}\n", entry.summary()));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;
    use chrono::{TimeZone, Utc};

    fn entry(content: &str, tags: &[&Tag]) -> Entry {
        Entry::new(content, tags.iter().map(|t| (*t).clone()).collect())
    }

    #[test]
    fn test_empty_input() {
        for format in [ReportFormat::Summary, ReportFormat::Detailed, ReportFormat::Bullet] {
            assert_eq!(generate_report(&[], format, &DateRange::All), EMPTY_REPORT);
        }
    }

    #[test]
    fn test_summary_report_counts_and_overflow() {
        let dev = Tag::named("开发");
        let meeting = Tag::named("会议");
        let entries = vec![
            entry("实现登录接口", &[&dev]),
            entry("参加周会", &[&meeting]),
            entry("修复分页问题", &[&dev]),
            entry("重构配置模块", &[&dev]),
            entry("需求评审", &[&meeting]),
            entry("编写单元测试", &[&dev]),
        ];

        let report = generate_report(&entries, ReportFormat::Summary, &DateRange::ThisWeek);

        assert!(report.starts_with("## 本周工作汇报\n\n共完成 6 项工作记录。\n\n"));
        let dev_pos = report.find("- 开发: 4 项").unwrap();
        let meeting_pos = report.find("- 会议: 2 项").unwrap();
        assert!(dev_pos < meeting_pos);

        let main = &report[report.find("### 主要内容\n").unwrap()..];
        let lines: Vec<&str> = main.lines().skip(1).collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "- 实现登录接口");
        assert_eq!(lines[4], "- 需求评审");
        assert_eq!(lines[5], "- ...等 1 项");
    }

    #[test]
    fn test_summary_report_ties_sorted_by_name() {
        let b = Tag::named("b");
        let a = Tag::named("a");
        let entries = vec![entry("x", &[&b]), entry("y", &[&a])];
        let report = generate_report(&entries, ReportFormat::Summary, &DateRange::All);
        assert!(report.contains("### 工作分类\n- a: 1 项\n- b: 1 项\n\n"));
    }

    #[test]
    fn test_summary_report_without_tags_skips_section() {
        let entries = vec![entry("写周报", &[])];
        let report = generate_report(&entries, ReportFormat::Summary, &DateRange::Today);
        assert_eq!(
            report,
            "## 今天工作汇报\n\n共完成 1 项工作记录。\n\n### 主要内容\n- 写周报\n"
        );
    }

    #[test]
    fn test_detailed_report_groups_by_day_descending() {
        let dev = Tag::named("开发");
        let doc = Tag::named("文档");
        let day1 = Local
            .with_ymd_and_hms(2025, 3, 1, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let day2 = Local
            .with_ymd_and_hms(2025, 3, 2, 9, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let entries = vec![
            Entry::created_at("第二天的工作", vec![dev.clone(), doc.clone()], day2),
            Entry::created_at("第一天的工作", vec![], day1),
        ];

        let report = generate_report(&entries, ReportFormat::Detailed, &DateRange::All);
        assert_eq!(
            report,
            "## 全部详细工作报告\n\n\
             ### 2025-03-02\n\n- 第二天的工作\n  标签: 开发, 文档\n\n\
             ### 2025-03-01\n\n- 第一天的工作\n\n"
        );
    }

    #[test]
    fn test_bullet_report_uses_summaries() {
        let entries = vec![entry("第一行\n第二行", &[]), entry("另一条", &[])];
        let report = generate_report(&entries, ReportFormat::Bullet, &DateRange::ThisMonth);
        assert_eq!(report, "## 本月工作要点\n\n• 第一行\n• 另一条\n");
    }

    #[test]
    fn test_report_format_parse_and_display() {
        assert_eq!("Detailed".parse::<ReportFormat>().unwrap(), ReportFormat::Detailed);
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Bullet.to_string(), "bullet");
        assert_eq!(ReportFormat::Summary.display_name(), "工作摘要");
        assert_eq!(ReportFormat::Detailed.display_name(), "详细报告");
        assert_eq!(ReportFormat::Bullet.display_name(), "要点列表");
    }
}
