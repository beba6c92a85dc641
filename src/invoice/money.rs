/// Format an amount as Costa Rican colones, `es-CR` style: `₡1 234 567,89`.
///
/// The group separator is a no-break space. Missing and non-finite amounts
/// format as zero. Rounding is half away from zero on the exact value of
/// the `f64`, so `1.115` (stored as 1.11499…) shows `₡1,11`.
pub fn format_crc(amount: Option<f64>) -> String {
    let value = amount.filter(|v| v.is_finite()).unwrap_or(0.0);
    let (whole, frac) = round_to_cents(value.abs());
    let negative = value < 0.0 && (frac != "00" || whole.bytes().any(|b| b != b'0'));

    format!(
        "{}₡{},{}",
        if negative { "-" } else { "" },
        group_thousands(&whole),
        frac
    )
}

/// Whole and two-digit fraction parts of a non-negative amount, as decimal
/// strings. No integer cast, so amounts past `u64::MAX` cents keep every digit.
fn round_to_cents(abs: f64) -> (String, String) {
    // `{:.2}` already rounds the exact binary value, but breaks exact ties
    // to even; those are detected from the full expansion and rounded up.
    let exact = format!("{abs:.60}");
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let tie = frac_part.len() > 3
        && frac_part.as_bytes()[2] == b'5'
        && frac_part[3..].bytes().all(|b| b == b'0');

    if tie {
        let cents = increment(&format!("{int_part}{}", &frac_part[..2]));
        let (whole, frac) = cents.split_at(cents.len() - 2);
        return (whole.to_string(), frac.to_string());
    }

    let fixed = format!("{abs:.2}");
    match fixed.split_once('.') {
        Some((whole, frac)) => (whole.to_string(), frac.to_string()),
        None => (fixed, "00".to_string()),
    }
}

/// Add one to a string of decimal digits
fn increment(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    let mut i = bytes.len();
    loop {
        if i == 0 {
            bytes.insert(0, b'1');
            break;
        }
        i -= 1;
        if bytes[i] == b'9' {
            bytes[i] = b'0';
        } else {
            bytes[i] += 1;
            break;
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 2);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('\u{a0}');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}
