//! Text formatting for names and amounts

/// "MILK, WHOLE" -> "Milk, whole"
pub fn sentence_case(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Upper-case the first letter, leave the rest alone
pub fn capitalize(s: &str) -> String {
    let s = s.trim();
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "chicken tikka masala" -> "Chicken Tikka Masala"
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(sentence_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Amount rounded to two decimals, without trailing zeros
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_case() {
        assert_eq!(sentence_case("OATS, ROLLED"), "Oats, rolled");
        assert_eq!(sentence_case("tofu"), "Tofu");
        assert_eq!(sentence_case(""), "");
    }

    #[test]
    fn test_capitalize_keeps_rest() {
        assert_eq!(capitalize("salt"), "Salt");
        assert_eq!(capitalize("Milk, whole"), "Milk, whole");
        assert_eq!(capitalize("pH strips"), "PH strips");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("chicken tikka  masala"), "Chicken Tikka Masala");
        assert_eq!(title_case("eat out"), "Eat Out");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(4.0), "4");
        assert_eq!(format_amount(0.5), "0.5");
        assert_eq!(format_amount(1.0 / 3.0), "0.33");
        assert_eq!(format_amount(349.999), "350");
    }
}
