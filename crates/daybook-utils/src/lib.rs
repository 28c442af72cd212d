//! Utility functions and helpers

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T, separator: &str) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    format!("{}{}", sign, result.chars().rev().collect::<String>())
}

/// Format an amount with fixed decimals and grouped integer digits
pub fn format_amount(value: f64, decimal_places: u32, separator: &str) -> String {
    let fixed = format!("{:.*}", decimal_places as usize, value);
    // -0.00 reads as 0.00
    let fixed = if fixed.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        fixed.trim_start_matches('-').to_string()
    } else {
        fixed
    };

    match fixed.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", format_number(int_part, separator), frac),
        None => format_number(fixed, separator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567, ","), "1,234,567");
        assert_eq!(format_number(123, ","), "123");
        assert_eq!(format_number(-1234, ","), "-1,234");
        assert_eq!(format_number(1234, ""), "1234");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100.0, 2, ","), "100.00");
        assert_eq!(format_amount(1234.5, 2, ","), "1,234.50");
        assert_eq!(format_amount(-50.0, 2, ","), "-50.00");
        assert_eq!(format_amount(999999.999, 2, " "), "1 000 000.00");
        assert_eq!(format_amount(42.0, 0, ","), "42");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(format_amount(-0.0, 2, ","), "0.00");
        assert_eq!(format_amount(-0.001, 2, ","), "0.00");
    }
}
