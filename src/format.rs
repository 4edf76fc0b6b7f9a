//! Display formatting layered on top of the core's numbers

use rust_decimal::Decimal;

/// Group the integer part in thousands, keeping any fractional digits
pub fn group_thousands(value: Decimal) -> String {
    let s = value.normalize().to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Distance with thousands separators and a `km` suffix, e.g. `1,150km`
pub fn format_km(value: Decimal) -> String {
    format!("{}km", group_thousands(value))
}

/// Plain distance for machine-readable output, without trailing zeros
pub fn plain(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(dec!(0)), "0");
        assert_eq!(group_thousands(dec!(150)), "150");
        assert_eq!(group_thousands(dec!(1150)), "1,150");
        assert_eq!(group_thousands(dec!(123456)), "123,456");
        assert_eq!(group_thousands(dec!(1234567.50)), "1,234,567.5");
        assert_eq!(group_thousands(dec!(-2500)), "-2,500");
    }

    #[test]
    fn km_suffix() {
        assert_eq!(format_km(dec!(1150)), "1,150km");
        assert_eq!(format_km(dec!(0)), "0km");
    }

    #[test]
    fn plain_drops_trailing_zeros() {
        assert_eq!(plain(dec!(150.00)), "150");
        assert_eq!(plain(dec!(12.50)), "12.5");
    }
}
