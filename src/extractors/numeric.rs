// src/extractors/numeric.rs

/// Converts raw cell text into a number.
///
/// Every character other than ASCII digits, `.` and `-` is dropped first, so currency
/// symbols, units and thousands separators disappear: `"€1,250.50"` reads as `1250.5`.
/// The longest leading float of the remainder is then parsed (`"42.5."` reads as `42.5`).
/// Returns `None` when nothing numeric is left.
///
/// Comma decimals are not recognised: `"45,20"` reads as `4520`.
pub fn normalize_number(text: &str) -> Option<f64> {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let number = leading_float(&stripped)?;
    let value = number.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Returns the `-?digits[.digits]` prefix of `s`, normalised so `str::parse` accepts it.
fn leading_float(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut idx = 0;
    let mut out = String::new();

    if bytes.first() == Some(&b'-') {
        out.push('-');
        idx += 1;
    }

    let int_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    let int_part = &s[int_start..idx];

    let mut frac_part = "";
    if idx < bytes.len() && bytes[idx] == b'.' {
        let frac_start = idx + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        frac_part = &s[frac_start..end];
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    out.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    Some(out)
}
