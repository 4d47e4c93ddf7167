//! Helpers for presenting fixed-point balances and counters.

/// Format a fixed-point token balance with thousands separators.
///
/// Fractional digits are trimmed of trailing zeros; a whole amount has no
/// decimal point.
pub fn token_balance(amount: u64, decimals: u8) -> String {
    let scale = 10u64.checked_pow(u32::from(decimals));
    let (whole, fraction) = match scale {
        Some(scale) => (amount / scale, amount % scale),
        None => (0, amount),
    };

    let mut rendered = group_thousands(whole);
    if fraction > 0 {
        let digits = format!("{fraction:0width$}", width = usize::from(decimals));
        rendered.push('.');
        rendered.push_str(digits.trim_end_matches('0'));
    }
    rendered
}

/// Format an ICP amount given in e8s with a fixed number of fractional digits.
///
/// Digits beyond `precision` are truncated, never rounded up.
pub fn icp_amount(e8s: u64, precision: usize) -> String {
    const E8S_PER_ICP: u64 = 100_000_000;
    let whole = e8s / E8S_PER_ICP;
    if precision == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:08}", e8s % E8S_PER_ICP);
    let precision = precision.min(fraction.len());
    format!("{whole}.{}", &fraction[..precision])
}

/// Abbreviate large counts (`1.2K`, `3.4M`).
pub fn compact_count(value: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];

    for (threshold, suffix) in UNITS {
        if value >= threshold {
            let tenths = value / (threshold / 10);
            let (whole, fraction) = (tenths / 10, tenths % 10);
            return if fraction == 0 || whole >= 100 {
                format!("{whole}{suffix}")
            } else {
                format!("{whole}.{fraction}{suffix}")
            };
        }
    }
    value.to_string()
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
