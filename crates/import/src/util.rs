//! Number, date and text helpers shared by every dialect.

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a free-form Brazilian or plain decimal amount.
///
/// Separator resolution:
/// - `,` and `.` both present: every `.` groups thousands, the `,` is the decimal point.
/// - only `,`: decimal point.
/// - a single `.` followed by exactly three digits: thousands grouping, unless the
///   integer part is zero (`0.500` stays 0.5).
/// - several `.` in three-digit groups: thousands grouping.
/// - any other lone `.`: decimal point.
/// - no separator: integer.
///
/// Returns `None` for anything unparseable so callers can skip the record.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s = raw.trim();
    let mut negative = false;

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    s = take_sign(s, &mut negative);
    for prefix in ["R$", "US$", "$"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim_start();
            break;
        }
    }
    s = take_sign(s, &mut negative);
    if let Some(rest) = s.strip_suffix('-') {
        negative = !negative;
        s = rest.trim_end();
    }

    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty()
        || !s.chars().any(|c| c.is_ascii_digit())
        || !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    let canonical = match (commas, dots) {
        (0, 0) => s,
        (1, _) => s.replace('.', "").replace(',', "."),
        (_, _) if commas > 1 => return None,
        (0, 1) => {
            let (int_part, frac_part) = s.split_once('.')?;
            if frac_part.len() == 3 && int_part.trim_start_matches('0').len() > 0 {
                format!("{int_part}{frac_part}")
            } else {
                s
            }
        }
        (0, _) => {
            let mut groups = s.split('.');
            let head = groups.next()?;
            if head.is_empty() || head.len() > 3 || !groups.all(|g| g.len() == 3) {
                return None;
            }
            s.replace('.', "")
        }
        _ => return None,
    };

    let value = Decimal::from_str(&canonical).ok()?;
    Some(if negative { -value } else { value })
}

fn take_sign<'a>(s: &'a str, negative: &mut bool) -> &'a str {
    if let Some(rest) = s.strip_prefix('-') {
        *negative = !*negative;
        rest.trim_start()
    } else if let Some(rest) = s.strip_prefix('+') {
        rest.trim_start()
    } else {
        s
    }
}

/// `DD/MM/YYYY` or `DD/MM/YY`; anything after the first whitespace (a time) is ignored.
pub fn parse_br_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    let mut parts = token.split('/');
    let day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let all_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if !all_digits(day) || !all_digits(month) || !all_digits(year) {
        return None;
    }
    if day.len() > 2 || month.len() > 2 || !(year.len() == 2 || year.len() == 4) {
        return None;
    }

    let d: u32 = day.parse().ok()?;
    let m: u32 = month.parse().ok()?;
    let mut y: i32 = year.parse().ok()?;
    if year.len() == 2 {
        y += 2000;
    }
    if !(1..=31).contains(&d) || !(1..=12).contains(&m) {
        return None;
    }
    NaiveDate::from_ymd_opt(y, m, d)
}

/// `YYYYMMDD[HHMMSS[.XXX]][[offset:TZ]]`, only the calendar date is kept.
pub fn parse_ofx_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let s = s.split('[').next().unwrap_or(s).trim();
    if s.len() < 8 || !s.is_char_boundary(8) {
        return None;
    }
    let digits = &s[..8];
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let y: i32 = digits[0..4].parse().ok()?;
    let m: u32 = digits[4..6].parse().ok()?;
    let d: u32 = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// `YYYY-MM-DD`, as written by the Nubank card export.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
}

/// Decodes uploaded bytes: UTF-8 when valid, Windows-1252 otherwise (the
/// `CHARSET:1252` of BB exports). Drops a UTF-8 BOM.
pub fn decode_content(data: &[u8]) -> String {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
    if let Ok(text) = std::str::from_utf8(data) {
        return text.to_string();
    }
    let (decoded, _, _) = WINDOWS_1252.decode(data);
    decoded.into_owned()
}

/// Lowercases and strips Portuguese diacritics so keyword checks survive
/// inconsistent accents across exports (`Lançamento` / `Lancamento`).
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

pub fn contains_any(folded: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| folded.contains(n))
}

pub fn has_extension(filename: &str, ext: &str) -> bool {
    std::path::Path::new(filename.trim())
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
