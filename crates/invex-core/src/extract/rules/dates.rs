//! Date normalization (DATE, DUE_DATE).
//!
//! Pattern definitions describe their date layout with the familiar
//! `yyyy`/`MM`/`d` token notation. Those tokens are translated into a
//! chrono format string before parsing.

use chrono::NaiveDate;

use crate::error::NormalizeError;

/// Translate a token format such as `MMMM d, yyyy` into chrono's `%B %d, %Y`.
///
/// Text in single quotes is literal (`''` is a quote). Letters other than
/// `y`, `M`, `d` and `E` are kept as literals.
pub fn translate_format(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            // Skip closing quote
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        match c {
            'y' => out.push_str(if run == 2 { "%y" } else { "%Y" }),
            'M' => out.push_str(match run {
                1 | 2 => "%m",
                3 => "%b",
                _ => "%B",
            }),
            'd' => out.push_str("%d"),
            'E' => out.push_str(if run <= 3 { "%a" } else { "%A" }),
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
            }
        }
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Parse a captured date with the pattern's token format.
pub fn parse_date(raw: &str, format: &str) -> Result<NaiveDate, NormalizeError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(NormalizeError::Empty);
    }

    NaiveDate::parse_from_str(value, &translate_format(format)).map_err(|_| {
        NormalizeError::InvalidDate {
            value: value.to_string(),
            format: format.to_string(),
        }
    })
}
