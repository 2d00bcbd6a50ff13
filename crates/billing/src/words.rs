//! Amount in words, Indian numbering (crore / lakh / thousand / hundred).

use rust_decimal::Decimal;
use shopkeep_core::whole_units;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// 1..=99 in words; empty for 0.
fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        return ONES[n].to_string();
    }
    match n % 10 {
        0 => TENS[n / 10].to_string(),
        units => format!("{} {}", TENS[n / 10], ONES[units]),
    }
}

/// Spell a non-negative integer.
///
/// Groups are crore (which recurses past 99), lakh, thousand, hundred and
/// tens-and-units; only non-zero groups are emitted, joined by single spaces.
pub fn amount_in_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    let crore = n / 10_000_000;
    let rest = n % 10_000_000;
    if crore > 0 {
        parts.push(format!("{} Crore", amount_in_words(crore)));
    }

    let lakh = rest / 100_000;
    let thousand = (rest / 1_000) % 100;
    let hundred = (rest / 100) % 10;
    let units = rest % 100;

    if lakh > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousand)));
    }
    if hundred > 0 {
        parts.push(format!("{} Hundred", ONES[hundred as usize]));
    }
    if units > 0 {
        parts.push(below_hundred(units));
    }

    parts.join(" ")
}

/// `Rupees … Only` for an amount rounded to the nearest rupee.
pub fn rupees_in_words(amount: Decimal) -> String {
    format!("Rupees {} Only", amount_in_words(whole_units(amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    /// Inverse of `amount_in_words`, used to check nothing is dropped.
    fn parse_words(text: &str) -> u64 {
        if text == "Zero" {
            return 0;
        }
        let mut total: u64 = 0;
        let mut group: u64 = 0;
        for word in text.split(' ') {
            if let Some(i) = ONES.iter().position(|w| *w == word).filter(|i| *i > 0) {
                group += i as u64;
            } else if let Some(i) = TENS.iter().position(|w| *w == word).filter(|i| *i > 1) {
                group += 10 * i as u64;
            } else {
                match word {
                    "Hundred" => group *= 100,
                    "Thousand" => {
                        total += group * 1_000;
                        group = 0;
                    }
                    "Lakh" => {
                        total += group * 100_000;
                        group = 0;
                    }
                    "Crore" => {
                        total = (total + group) * 10_000_000;
                        group = 0;
                    }
                    other => panic!("unexpected word {other:?}"),
                }
            }
        }
        total + group
    }

    #[test]
    fn known_values() {
        assert_eq!(amount_in_words(0), "Zero");
        assert_eq!(amount_in_words(7), "Seven");
        assert_eq!(amount_in_words(40), "Forty");
        assert_eq!(amount_in_words(115), "One Hundred Fifteen");
        assert_eq!(amount_in_words(100000), "One Lakh");
        assert_eq!(
            amount_in_words(1234567),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven"
        );
        assert_eq!(amount_in_words(10_000_000), "One Crore");
        assert_eq!(
            amount_in_words(1_000_000_000),
            "One Hundred Crore"
        );
        assert_eq!(amount_in_words(20_00_05_001), "Twenty Crore Five Thousand One");
    }

    #[test]
    fn rupee_amount_rounds_to_nearest_unit() {
        assert_eq!(rupees_in_words(dec!(1499.50)), "Rupees One Thousand Five Hundred Only");
        assert_eq!(rupees_in_words(dec!(0.40)), "Rupees Zero Only");
    }

    proptest! {
        #[test]
        fn words_are_single_spaced(n in 0u64..1_000_000_000_000u64) {
            let words = amount_in_words(n);
            prop_assert!(!words.contains("  "));
            prop_assert_eq!(words.trim(), words.as_str());
        }

        #[test]
        fn words_parse_back_to_the_same_number(n in 0u64..100_000_000_000u64) {
            prop_assert_eq!(parse_words(&amount_in_words(n)), n);
        }
    }
}
