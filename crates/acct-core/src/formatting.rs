use crate::models::{Metric, TimeUnit};

/// Convert a canonical CPU-seconds value to the requested output unit.
///
/// `Percent` is returned unchanged here: percentage is a property of the
/// whole table (each row relative to the grand total) and is applied by the
/// engine in a second pass, not per value.
pub fn convert_cpu_seconds(seconds: f64, unit: TimeUnit) -> f64 {
    match unit {
        TimeUnit::Hours => seconds / 3600.0,
        TimeUnit::Minutes => seconds / 60.0,
        TimeUnit::Seconds | TimeUnit::Percent => seconds,
    }
}

/// Render one metric value for display.
///
/// Job counts are printed with two decimals as well: the equal split across
/// affiliations makes fractional job counts expected output, not an error.
pub fn format_value(value: f64, metric: Metric, unit: TimeUnit) -> String {
    match metric {
        Metric::CpuTime => format_number(convert_cpu_seconds(value, unit), 2),
        Metric::Jobs => format_number(value, 2),
    }
}

/// Header label of the metric column.
pub fn value_column_label(metric: Metric, unit: TimeUnit) -> String {
    match metric {
        Metric::Jobs => "Jobs".to_string(),
        Metric::CpuTime => {
            let suffix = match unit {
                TimeUnit::Hours => "h",
                TimeUnit::Minutes => "min",
                TimeUnit::Seconds => "s",
                TimeUnit::Percent => "%",
            };
            format!("CPU time ({})", suffix)
        }
    }
}

/// Format a floating-point number with thousands separators and a fixed
/// number of decimal places.
///
/// # Examples
///
/// ```
/// use acct_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Round to the requested decimal places. Add a tiny epsilon (half ULP at
    // the target precision) before rounding to avoid IEEE 754
    // binary-representation issues at exact midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // Format the fractional part to the exact number of decimals;
        // `frac_str` starts with "0.", strip the leading "0".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        let decimal_digits = &frac_str[1..];
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Insert `,` separators into a plain integer string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
