/// Unit codes for the byte-size scaler, padded the way the reports align.
const SIZE_CODES: [&str; 6] = [" b ", " KB", " MB", " GB", " TB", " PB"];

/// Scale a byte count into a human unit: divide by 1024 while the value is
/// strictly greater than 1024, rounding the mantissa to 2 decimals after
/// each division. Below the first threshold the count prints as a grouped
/// integer with no decimal.
pub fn data_size_pretty(bytes: f64) -> String {
    let mut size = bytes;
    let mut measure = 0;
    while size > 1024.0 && measure < SIZE_CODES.len() - 1 {
        size = round2(size / 1024.0);
        measure += 1;
    }
    if measure == 0 {
        format!("{}{}", group_digits(size as u64), SIZE_CODES[0])
    } else {
        format!("{}{}", group_float(size), SIZE_CODES[measure])
    }
}

/// Thousands-grouped integer, for document counts.
pub fn count_pretty(count: u64) -> String {
    group_digits(count)
}

/// Humanize a duration in seconds: hours past one hour, minutes past one
/// minute, seconds otherwise.
pub fn pretty_time(seconds: f64) -> String {
    if seconds >= 3600.0 {
        format!("{} hours", min_one_decimal(round1(seconds / 3600.0)))
    } else if seconds >= 60.0 {
        format!("{} minutes", min_one_decimal(round1(seconds / 60.0)))
    } else {
        format!("{} seconds", min_one_decimal(round2(seconds)))
    }
}

fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Grouped float with at least one decimal place, e.g. `1,023.5 KB`.
fn group_float(x: f64) -> String {
    let whole = x.trunc() as u64;
    let s = min_one_decimal(x);
    let frac = s.split_once('.').map(|(_, f)| f).unwrap_or("0");
    format!("{}.{}", group_digits(whole), frac)
}

/// Shortest decimal form, but never bare: `2` renders as `2.0`.
fn min_one_decimal(x: f64) -> String {
    let s = format!("{}", x);
    if s.contains('.') { s } else { format!("{}.0", s) }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
