//! Fixed regexes used by the normalizers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Currency marks stripped from amounts before parsing
    pub static ref CURRENCY_MARKS: Regex = Regex::new(
        r"(?i)US\$|C\$|A\$|[$€£¥]|zł|usd|eur|gbp|pln|cad|aud|jpy|chf"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Bare ISO 4217 style code
    pub static ref CURRENCY_CODE: Regex = Regex::new(r"^[A-Za-z]{3}$").unwrap();

    // Leading/trailing minus or accounting parentheses
    pub static ref NEGATIVE_AMOUNT: Regex = Regex::new(r"^\s*-|^\s*\(.*\)\s*$|-\s*$").unwrap();
}
