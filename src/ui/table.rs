use tabled::{settings::Style, Table, Tabled};

use crate::option::{PrimaryOption, SecondaryOption};

#[derive(Tabled)]
struct PrimaryRow {
    #[tabled(rename = "Command")]
    label: String,
    #[tabled(rename = "Key")]
    value: String,
}

#[derive(Tabled)]
struct SecondaryRow {
    #[tabled(rename = "Option")]
    label: String,
    #[tabled(rename = "Usage")]
    usage: String,
    #[tabled(rename = "Note")]
    note: String,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn rounded<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn primary_table(options: &[PrimaryOption]) -> String {
    let rows: Vec<_> = options
        .iter()
        .map(|o| PrimaryRow {
            label: o.label.clone(),
            value: o.value.clone(),
        })
        .collect();
    rounded(&rows)
}

pub fn secondary_table(options: &[SecondaryOption]) -> String {
    let rows: Vec<_> = options
        .iter()
        .map(|o| SecondaryRow {
            label: o.label.clone(),
            usage: o.usage.clone(),
            note: o.note.clone(),
        })
        .collect();
    rounded(&rows)
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let rows: Vec<_> = stats
        .iter()
        .map(|(metric, value)| StatsRow {
            metric: metric.to_string(),
            value: value.to_string(),
        })
        .collect();
    rounded(&rows)
}
