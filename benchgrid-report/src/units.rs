//! Units and Number Formatting

/// Scale factor and SI prefix such that `1 <= num * scale < 1000`.
///
/// Values below a femtosecond or above a terasecond clamp to the ends of the
/// ladder.
pub fn best_units(num: f64) -> (f64, &'static str) {
    if num < 1e-12 {
        (1e15, "f")
    } else if num < 1e-9 {
        (1e12, "p")
    } else if num < 1e-6 {
        (1e9, "n")
    } else if num < 1e-3 {
        (1e6, "u")
    } else if num < 1.0 {
        (1e3, "m")
    } else if num < 1e3 {
        (1.0, "")
    } else if num < 1e6 {
        (1e-3, "k")
    } else if num < 1e9 {
        (1e-6, "M")
    } else if num < 1e12 {
        (1e-9, "G")
    } else {
        (1e-12, "T")
    }
}

/// Format with `digits` significant digits, like C's `%.Ng`.
///
/// Trailing zeros are dropped; scientific notation is used when the exponent
/// is below -4 or at least `digits`.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }

    let digits = digits.max(1);
    // Round first, then read the exponent back so 999.7 -> 1e+03 is handled
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exp.unsigned_abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
