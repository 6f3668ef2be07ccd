//! Input masks applied while the user types, plus display helpers.

use regex::Regex;
use std::sync::LazyLock;

static THREE_THEN_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{3})(\d)").unwrap());
static CPF_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{3})(\d{1,2})$").unwrap());
static TWO_THEN_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{2})(\d)").unwrap());
static FOUR_THEN_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4})(\d)").unwrap());
static FIVE_THEN_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{5})(\d)").unwrap());
static PLATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{3})([A-Z0-9])").unwrap());

fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// `12345678901` → `123.456.789-01`. Input longer than a CPF is cut to its first 11 digits.
pub fn format_cpf(value: &str) -> String {
    let numbers = digits(value);
    if numbers.len() > 11 {
        return truncate(&numbers, 11);
    }
    let masked = THREE_THEN_DIGIT.replace(&numbers, "$1.$2");
    let masked = THREE_THEN_DIGIT.replace(&masked, "$1.$2");
    CPF_TAIL.replace(&masked, "$1-$2").into_owned()
}

/// Landlines as `(11) 3456-7890`, mobiles as `(11) 98765-4321`.
pub fn format_phone(value: &str) -> String {
    let numbers = digits(value);
    let masked = TWO_THEN_DIGIT.replace(&numbers, "($1) $2");
    if numbers.len() <= 10 {
        FOUR_THEN_DIGIT.replace(&masked, "$1-$2").into_owned()
    } else {
        truncate(&FIVE_THEN_DIGIT.replace(&masked, "$1-$2"), 15)
    }
}

/// `01012000` → `01/01/2000`.
pub fn format_date(value: &str) -> String {
    let numbers = digits(value);
    let masked = TWO_THEN_DIGIT.replace(&numbers, "$1/$2");
    let masked = TWO_THEN_DIGIT.replace(&masked, "$1/$2");
    truncate(&masked, 10)
}

/// Uppercases and inserts the dash after the three letters: `abc1d23` → `ABC-1D23`.
pub fn format_plate(value: &str) -> String {
    let cleaned: String = value
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect();
    truncate(&PLATE_PREFIX.replace(&cleaned, "$1-$2"), 8)
}

/// `01310100` → `01310-100`.
pub fn format_postal_code(value: &str) -> String {
    let numbers = digits(value);
    truncate(&FIVE_THEN_DIGIT.replace(&numbers, "$1-$2"), 9)
}

/// Amount in reais with two decimals, e.g. `R$ 3315.00`.
pub fn format_currency(amount: f64) -> String {
    format!("R$ {amount:.2}")
}
