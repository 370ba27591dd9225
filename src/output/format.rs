/// Whole-unit currency with thousands separators, e.g. `$12,500`.
pub fn format_currency(value: f64, symbol: &str) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{symbol}{}", group_thousands(rounded.abs() as u64))
}

pub fn format_number(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// Currency, or "-" for zero values that would only add noise.
pub fn currency_or_dash(value: f64, symbol: &str) -> String {
    if value > 0.0 {
        format_currency(value, symbol)
    } else {
        "-".to_string()
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
