//! Plain-text views printed by the CLI.

use std::collections::HashMap;

use tally_core::{
    Budget, BudgetProgress, BudgetStatus, CategoryRegistry, Kind, MonthlySummary, RecurrenceRule, Settings,
    Transaction, TrendPoint, YearMonth, format_amount,
};

const BAR_WIDTH: usize = 20;

fn bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0)) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn signed(t: &Transaction, currency: &str) -> String {
    let sign = if t.is_income() { "+" } else { "-" };
    format!("{sign}{}", format_amount(t.amount, currency))
}

pub fn transactions(list: &[&Transaction], currency: &str) {
    if list.is_empty() {
        println!("No transactions.");
        return;
    }
    for t in list {
        let note = t
            .description
            .as_deref()
            .unwrap_or_else(|| t.payment_method.as_str());
        println!(
            "{}  {} {:<14} {:>14}  {:<30}  {}",
            t.date,
            t.icon,
            t.category_name,
            signed(t, currency),
            note,
            t.id
        );
    }
    println!("\n{} transaction(s)", list.len());
}

pub fn summary(month: YearMonth, s: &MonthlySummary, currency: &str) {
    println!("# {month}\n");
    println!("Income:   {:>14}", format_amount(s.income, currency));
    println!("Expenses: {:>14}", format_amount(s.expense, currency));
    println!("Net:      {:>14}", format_amount(s.net, currency));
}

pub fn breakdown(
    month: YearMonth,
    kind: Kind,
    totals: &HashMap<String, f64>,
    registry: &CategoryRegistry,
    currency: &str,
) {
    println!("# {kind} by category, {month}\n");
    if totals.is_empty() {
        println!("Nothing recorded.");
        return;
    }

    let grand: f64 = totals.values().sum();
    let mut rows: Vec<(&String, f64)> = totals.iter().map(|(id, v)| (id, *v)).collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    for (id, total) in rows {
        let (icon, name) = registry
            .get(kind, id)
            .map(|c| (c.icon.as_str(), c.name.as_str()))
            .unwrap_or(("", id.as_str()));
        let share = if grand > 0.0 { total / grand } else { 0.0 };
        println!(
            "{icon} {name:<14} {:>14}  {} {:>5.1}%",
            format_amount(total, currency),
            bar(share),
            share * 100.0
        );
    }
}

pub fn trend(points: &[TrendPoint], currency: &str) {
    let peak = points
        .iter()
        .flat_map(|p| [p.income, p.expense])
        .fold(0.0_f64, f64::max);

    for p in points {
        let scale = |v: f64| if peak > 0.0 { v / peak } else { 0.0 };
        println!(
            "{}  in  {:>14} {}\n         out {:>14} {}",
            p.month,
            format_amount(p.income, currency),
            bar(scale(p.income)),
            format_amount(p.expense, currency),
            bar(scale(p.expense)),
        );
    }
}

pub fn budgets(month: YearMonth, report: &[(&Budget, BudgetProgress)], currency: &str) {
    println!("# Budgets, {month}\n");
    if report.is_empty() {
        println!("No budgets set");
        return;
    }
    for (b, p) in report {
        let flag = match p.status {
            BudgetStatus::Normal => "",
            BudgetStatus::Warning => "  (warning)",
            BudgetStatus::OverBudget => "  (over budget)",
        };
        println!(
            "{} {:<14} {} {:>5.1}%  spent {} of {}, remaining {}{flag}",
            b.icon,
            b.category_name,
            bar(p.percentage / 100.0),
            p.percentage,
            format_amount(p.spent, currency),
            format_amount(b.limit, currency),
            format_amount(p.remaining, currency),
        );
    }
}

pub fn rules(rules: &[RecurrenceRule], today: chrono::NaiveDate, currency: &str) {
    if rules.is_empty() {
        println!("No recurring transactions.");
        return;
    }
    for r in rules {
        let due = if r.is_due(today) { "due" } else { "up to date" };
        println!(
            "{:<8} {:<8} {:<14} {:>14}  last {}  [{due}]  {}",
            r.frequency.as_str(),
            r.kind.as_str(),
            r.category_name,
            format_amount(r.amount, currency),
            r.last_generated,
            r.id
        );
    }
}

pub fn categories(registry: &CategoryRegistry) {
    let mut current: Option<Kind> = None;
    for (kind, c) in registry.iter() {
        if current != Some(kind) {
            println!("{}## {kind}", if current.is_some() { "\n" } else { "" });
            current = Some(kind);
        }
        println!("{} {:<16} {:<14} {}", c.icon, c.id, c.name, c.color);
    }
}

pub fn settings(s: &Settings) {
    println!("currency: {}", s.currency);
    println!("theme:    {:?}", s.theme);
    println!(
        "language: {}{}",
        s.language,
        if s.language.is_rtl() { " (rtl)" } else { "" }
    );
    if s.exchange_rates.is_empty() {
        println!("exchange rates: none");
    } else {
        println!("exchange rates (per 1 {}):", s.currency);
        for (code, rate) in &s.exchange_rates {
            println!("  {code}: {rate}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_clamps() {
        assert_eq!(bar(0.0), ".".repeat(BAR_WIDTH));
        assert_eq!(bar(1.5), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(0.5).matches('#').count(), BAR_WIDTH / 2);
    }
}
