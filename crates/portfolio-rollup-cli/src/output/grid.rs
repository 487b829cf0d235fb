use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Rendering target for rollup cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Two-decimal money, percentage margins, "n/a" for undefined
    Display,
    /// Full precision, margin as a ratio, empty for undefined
    Raw,
}

/// A rectangular rendering of a rollup: one row per (project, metric).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

const METRICS: [(&str, &str); 4] = [
    ("revenue", "Revenue"),
    ("cost", "Cost"),
    ("adjustments", "Adjustments"),
    ("margin", "Margin"),
];

/// Build a grid from a serialized rollup, or `None` if `result` is not one.
pub fn rollup_grid(result: &Value, style: CellStyle) -> Option<Grid> {
    let buckets = result.get("buckets")?.as_array()?;
    let rows = result.get("rows")?.as_array()?;
    let portfolio = result.get("portfolio")?;

    let mut headers = vec!["Project".to_string(), "Metric".to_string()];
    headers.extend(buckets.iter().map(|b| {
        b.get("label")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }));
    headers.extend(["Total", "Margin %", "Note"].map(String::from));

    let mut lines = Vec::with_capacity((rows.len() + 1) * METRICS.len());
    for row in rows {
        let name = row
            .pointer("/entity/name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let note = ["date_error", "rate_error"]
            .iter()
            .find_map(|key| row.get(*key).and_then(Value::as_str))
            .unwrap_or_default();
        push_block(&mut lines, name, row, note, style);
    }
    push_block(&mut lines, "Portfolio", portfolio, "", style);

    Some(Grid {
        headers,
        rows: lines,
    })
}

fn push_block(
    lines: &mut Vec<Vec<String>>,
    name: &str,
    node: &Value,
    note: &str,
    style: CellStyle,
) {
    let by_bucket = node.get("amounts_by_bucket").and_then(Value::as_array);

    for (i, (key, label)) in METRICS.iter().enumerate() {
        let first = i == 0;
        let mut line = vec![
            if first { name } else { "" }.to_string(),
            label.to_string(),
        ];
        if let Some(cells) = by_bucket {
            line.extend(cells.iter().map(|a| money(a.get(*key), style)));
        }
        line.push(money(node.pointer(&format!("/total/{key}")), style));
        line.push(if *key == "margin" {
            pct(node.get("margin_pct"), style)
        } else {
            String::new()
        });
        line.push(if first { note } else { "" }.to_string());
        lines.push(line);
    }
}

fn decimal(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn money(value: Option<&Value>, style: CellStyle) -> String {
    match (decimal(value), style) {
        (Some(d), CellStyle::Display) => format!("{:.2}", d.round_dp(2)),
        (Some(d), CellStyle::Raw) => d.normalize().to_string(),
        (None, _) => String::new(),
    }
}

fn pct(value: Option<&Value>, style: CellStyle) -> String {
    match (decimal(value), style) {
        (Some(d), CellStyle::Display) => match d.checked_mul(Decimal::ONE_HUNDRED) {
            Some(pct) => format!("{:.1}%", pct.round_dp(1)),
            None => d.normalize().to_string(),
        },
        (Some(d), CellStyle::Raw) => d.normalize().to_string(),
        (None, CellStyle::Display) => "n/a".to_string(),
        (None, CellStyle::Raw) => String::new(),
    }
}
