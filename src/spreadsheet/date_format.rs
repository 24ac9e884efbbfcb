//! Date format inference.
//!
//! A value is parsed leniently, then each date component found in the parse is located in
//! the original text and replaced by its pattern token (`YYYY`, `MMM`, `DD`, ...). At most
//! one token per component group is substituted, in a fixed priority order that prefers
//! the more specific rendering (four digit years before two digit years, month names
//! before numeric months, ordinal days before plain days).
use crate::model::region::parse_region;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::datetime::{self, ParsedDateTime, MONTH_NAMES, WEEKDAY_NAMES};
use crate::spreadsheet::is_blank;
use chrono::Weekday;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

/// Component a pattern token belongs to. Only one token per group ends up in a format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateGroup {
    Year,
    Month,
    Day,
    Weekday,
    Hour,
    Minute,
    Second,
    Meridiem,
}

/// Pattern tokens, declared in substitution priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DateToken {
    Year4,
    Year2,
    MonthName,
    MonthAbbr,
    Month2,
    Month,
    DayOrdinal,
    Day2,
    Day,
    WeekdayName,
    WeekdayAbbr,
    Hour24Padded,
    Hour24,
    Hour12Padded,
    Hour12,
    Minute2,
    Minute,
    Second2,
    Second,
    Meridiem,
}

const PRIORITY: [DateToken; 20] = [
    DateToken::Year4,
    DateToken::Year2,
    DateToken::MonthName,
    DateToken::MonthAbbr,
    DateToken::Month2,
    DateToken::Month,
    DateToken::DayOrdinal,
    DateToken::Day2,
    DateToken::Day,
    DateToken::WeekdayName,
    DateToken::WeekdayAbbr,
    DateToken::Hour24Padded,
    DateToken::Hour24,
    DateToken::Hour12Padded,
    DateToken::Hour12,
    DateToken::Minute2,
    DateToken::Minute,
    DateToken::Second2,
    DateToken::Second,
    DateToken::Meridiem,
];

impl DateToken {
    pub const fn pattern(&self) -> &'static str {
        match self {
            DateToken::Year4 => "YYYY",
            DateToken::Year2 => "YY",
            DateToken::MonthName => "MMMM",
            DateToken::MonthAbbr => "MMM",
            DateToken::Month2 => "MM",
            DateToken::Month => "M",
            DateToken::DayOrdinal => "Do",
            DateToken::Day2 => "DD",
            DateToken::Day => "D",
            DateToken::WeekdayName => "dddd",
            DateToken::WeekdayAbbr => "ddd",
            DateToken::Hour24Padded => "HH",
            DateToken::Hour24 => "H",
            DateToken::Hour12Padded => "hh",
            DateToken::Hour12 => "h",
            DateToken::Minute2 => "mm",
            DateToken::Minute => "m",
            DateToken::Second2 => "ss",
            DateToken::Second => "s",
            DateToken::Meridiem => "A",
        }
    }

    pub const fn group(&self) -> DateGroup {
        match self {
            DateToken::Year4 | DateToken::Year2 => DateGroup::Year,
            DateToken::MonthName | DateToken::MonthAbbr | DateToken::Month2 | DateToken::Month => DateGroup::Month,
            DateToken::DayOrdinal | DateToken::Day2 | DateToken::Day => DateGroup::Day,
            DateToken::WeekdayName | DateToken::WeekdayAbbr => DateGroup::Weekday,
            DateToken::Hour24Padded | DateToken::Hour24 | DateToken::Hour12Padded | DateToken::Hour12 => DateGroup::Hour,
            DateToken::Minute2 | DateToken::Minute => DateGroup::Minute,
            DateToken::Second2 | DateToken::Second => DateGroup::Second,
            DateToken::Meridiem => DateGroup::Meridiem,
        }
    }

    /// Month and weekday names cannot be confused with one another.
    const fn is_named(&self) -> bool {
        matches!(
            self,
            DateToken::MonthName | DateToken::MonthAbbr | DateToken::WeekdayName | DateToken::WeekdayAbbr
        )
    }

    const fn is_numeric_day_or_month(&self) -> bool {
        matches!(self, DateToken::Day2 | DateToken::Day | DateToken::Month2 | DateToken::Month)
    }

    /// Renders the parsed component the way this token would print it.
    fn render(&self, parsed: &ParsedDateTime) -> Option<String> {
        let hour12 = || parsed.hour.map(|hour| if hour % 12 == 0 { 12 } else { hour % 12 });
        match self {
            DateToken::Year4 => parsed.year.map(|year| format!("{year:04}")),
            DateToken::Year2 => parsed.year.map(|year| format!("{:02}", year.rem_euclid(100))),
            DateToken::MonthName => parsed.month.map(|month| MONTH_NAMES[month as usize - 1].to_owned()),
            DateToken::MonthAbbr => parsed.month.map(|month| MONTH_NAMES[month as usize - 1][..3].to_owned()),
            DateToken::Month2 => parsed.month.map(|month| format!("{month:02}")),
            DateToken::Month => parsed.month.map(|month| month.to_string()),
            DateToken::DayOrdinal => parsed.day.map(|day| format!("{day}{}", ordinal_suffix(day))),
            DateToken::Day2 => parsed.day.map(|day| format!("{day:02}")),
            DateToken::Day => parsed.day.map(|day| day.to_string()),
            DateToken::WeekdayName => parsed.weekday().map(|weekday| weekday_name(weekday).to_owned()),
            DateToken::WeekdayAbbr => parsed.weekday().map(|weekday| weekday_name(weekday)[..3].to_owned()),
            DateToken::Hour24Padded => parsed.hour.map(|hour| format!("{hour:02}")),
            DateToken::Hour24 => parsed.hour.map(|hour| hour.to_string()),
            DateToken::Hour12Padded => hour12().map(|hour| format!("{hour:02}")),
            DateToken::Hour12 => hour12().map(|hour| hour.to_string()),
            DateToken::Minute2 => parsed.minute.map(|minute| format!("{minute:02}")),
            DateToken::Minute => parsed.minute.map(|minute| minute.to_string()),
            DateToken::Second2 => parsed.second.map(|second| format!("{second:02}")),
            DateToken::Second => parsed.second.map(|second| second.to_string()),
            DateToken::Meridiem => parsed.hour.map(|hour| if hour >= 12 { "PM" } else { "AM" }.to_owned()),
        }
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// A derived date format such as `DD MMM 'YY`, with the tokens it was built from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DateFormatSpec {
    pub pattern: String,
    pub tokens: Vec<DateToken>,
}

impl DateFormatSpec {
    pub fn has_group(&self, group: DateGroup) -> bool {
        self.tokens.iter().any(|token| token.group() == group)
    }

    /// True when the format pins down year, month and day.
    pub fn has_full_date(&self) -> bool {
        self.has_group(DateGroup::Year) && self.has_group(DateGroup::Month) && self.has_group(DateGroup::Day)
    }
}

/// Outcome of date format inference.
///
/// `canonical` is only set when the format is complete and unambiguous; `best_effort` is
/// set whenever the value parsed at all. Both None means the value is not a date.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DateFormatDetection {
    pub canonical: Option<DateFormatSpec>,
    pub best_effort: Option<DateFormatSpec>,
}

impl DateFormatDetection {
    /// The value parsed but day and month order cannot be decided.
    pub fn is_ambiguous(&self) -> bool {
        self.canonical.is_none() && self.best_effort.is_some()
    }
}

/// Finds `needle` in `haystack` ignoring ASCII case, skipping matches glued to a run of
/// the same character class (so "3" never matches inside "2023"). Plain day numbers also
/// skip matches carrying an ordinal suffix, which are left to the ordinal tokens.
fn find_value(haystack: &str, needle: &str, skip_ordinal: bool) -> Option<usize> {
    let first = needle.chars().next()?;
    let last = needle.chars().next_back()?;
    let same_class = |a: char, b: char| {
        (a.is_ascii_digit() && b.is_ascii_digit()) || (a.is_alphabetic() && b.is_alphabetic())
    };
    let has_ordinal_suffix = |rest: &str| {
        rest.get(..2)
            .map(|suffix| ["st", "nd", "rd", "th"].iter().any(|ordinal| suffix.eq_ignore_ascii_case(ordinal)))
            .unwrap_or(false)
            && !rest[2..].chars().next().map(char::is_alphabetic).unwrap_or(false)
    };
    haystack.char_indices().map(|(start, _)| start).find(|&start| {
        let end = start + needle.len();
        end <= haystack.len()
            && haystack.is_char_boundary(end)
            && haystack[start..end].eq_ignore_ascii_case(needle)
            && !haystack[..start].chars().next_back().map(|prev| same_class(prev, first)).unwrap_or(false)
            && !haystack[end..].chars().next().map(|next| same_class(next, last)).unwrap_or(false)
            && !(skip_ordinal && has_ordinal_suffix(&haystack[end..]))
    })
}

fn substitute(working: &mut String, value: &str, token: DateToken) -> bool {
    let skip_ordinal = matches!(token, DateToken::Day2 | DateToken::Day);
    if let Some(start) = find_value(working, value, skip_ordinal) {
        working.replace_range(start..start + value.len(), token.pattern());
        true
    } else {
        false
    }
}

/// Infers the date format of `text`.
///
/// Purely numeric day/month pairs that could be read either way (both parsed values at
/// most 12, no month or weekday name present) yield no canonical format.
pub fn detect_date_format(text: &str) -> DateFormatDetection {
    let parsed = match datetime::parse(text, true) {
        Some(parsed) => parsed,
        None => return DateFormatDetection::default(),
    };

    let mut working = text.to_owned();
    let mut tokens: Vec<DateToken> = Vec::new();
    for token in PRIORITY {
        if tokens.iter().any(|used| used.group() == token.group()) {
            continue;
        }
        if let Some(value) = token.render(&parsed) {
            if substitute(&mut working, &value, token) {
                tokens.push(token);
            }
        }
    }

    // Ordinal days written with an unexpected suffix ("22th", "1ST")
    if let Some(day) = parsed.day.filter(|_| !tokens.iter().any(|used| used.group() == DateGroup::Day)) {
        for suffix in ["st", "nd", "rd", "th"] {
            if substitute(&mut working, &format!("{day}{suffix}"), DateToken::DayOrdinal) {
                tokens.push(DateToken::DayOrdinal);
                break;
            }
        }
    }

    let format_spec = DateFormatSpec {
        pattern: working,
        tokens,
    };
    let is_named = format_spec.tokens.iter().any(DateToken::is_named);
    let numeric_day_month = format_spec.tokens.iter().filter(|token| token.is_numeric_day_or_month()).count();
    // Compares the parsed values rather than the substituted text
    let is_ambiguous = !is_named
        && numeric_day_month >= 2
        && parsed.day.map(|day| day <= 12).unwrap_or(false)
        && parsed.month.map(|month| month <= 12).unwrap_or(false);

    if !is_ambiguous && format_spec.has_full_date() {
        DateFormatDetection {
            canonical: Some(format_spec.clone()),
            best_effort: Some(format_spec),
        }
    } else {
        DateFormatDetection {
            canonical: None,
            best_effort: Some(format_spec),
        }
    }
}

/// Checks that the first data rows of `region` hold dates with day, month and year.
///
/// Fails closed: a malformed region, a region without any sampled value, or a single
/// value whose best-effort format lacks a date component all return false.
pub fn region_is_all_valid_dates(grid: &[Vec<String>], region: &str, attribute: &str, criteria: &Criteria) -> bool {
    let region = match parse_region(region) {
        Ok(region) => region,
        Err(error) => {
            warn!(attribute, %error, "Cannot validate dates of unparsable region");
            return false;
        }
    };

    let samples: Vec<&str> = grid
        .iter()
        .enumerate()
        .skip(region.row_lower_bound)
        .take_while(|(row, _)| *row <= region.row_upper_bound)
        .map(|(_, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(col, value)| region.contains(region.row_lower_bound, *col) && !is_blank(value))
                .map(|(_, value)| value.as_str())
                .collect::<Vec<&str>>()
        })
        .filter(|values| !values.is_empty())
        .take(criteria.date_sample_rows)
        .flatten()
        .collect();

    if samples.is_empty() {
        debug!(attribute, %region, "No values to validate as dates");
        return false;
    }
    samples.into_iter().all(|value| {
        let valid = detect_date_format(value)
            .best_effort
            .map(|format_spec| format_spec.has_full_date())
            .unwrap_or(false);
        if !valid {
            debug!(attribute, value, "Value is not a complete date");
        }
        valid
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect()
    }

    fn pattern(format_spec: &Option<DateFormatSpec>) -> Option<&str> {
        format_spec.as_ref().map(|format_spec| format_spec.pattern.as_str())
    }

    #[test]
    fn month_name_is_canonical() {
        let detection = detect_date_format("14 Nov '23");
        assert_eq!(pattern(&detection.canonical), Some("DD MMM 'YY"));
        assert_eq!(pattern(&detection.best_effort), Some("DD MMM 'YY"));
        assert!(detection.canonical.unwrap().has_full_date());
    }

    #[test]
    fn ambiguous_numeric_date() {
        let detection = detect_date_format("03/04/2023");
        assert!(detection.is_ambiguous());
        assert_eq!(detection.canonical, None);
        assert_eq!(pattern(&detection.best_effort), Some("MM/DD/YYYY"));
    }

    #[test]
    fn day_above_twelve_is_canonical() {
        let detection = detect_date_format("14/11/2023");
        assert_eq!(pattern(&detection.canonical), Some("DD/MM/YYYY"));
        let detection = detect_date_format("2023-11-14");
        assert_eq!(pattern(&detection.canonical), Some("YYYY-MM-DD"));
    }

    #[test]
    fn iso_date_with_small_day_is_ambiguous() {
        let detection = detect_date_format("2024-01-05");
        assert_eq!(detection.canonical, None);
        assert_eq!(pattern(&detection.best_effort), Some("YYYY-MM-DD"));
    }

    #[test]
    fn ordinal_and_weekday() {
        let detection = detect_date_format("Monday, November 13th 2023");
        assert_eq!(pattern(&detection.canonical), Some("dddd, MMMM Do YYYY"));
        let detection = detect_date_format("Nov 22TH 2023");
        assert_eq!(pattern(&detection.canonical), Some("MMM Do YYYY"));
        let detection = detect_date_format("Nov 22th 2023");
        assert_eq!(pattern(&detection.canonical), Some("MMM Do YYYY"));
    }

    #[test]
    fn date_with_time() {
        let detection = detect_date_format("2023-11-14 09:05:30");
        assert_eq!(pattern(&detection.canonical), Some("YYYY-MM-DD HH:mm:ss"));
        let detection = detect_date_format("14 Nov 2023 3:05 PM");
        assert_eq!(pattern(&detection.canonical), Some("DD MMM YYYY h:mm A"));
    }

    #[test]
    fn partial_dates_are_not_canonical() {
        let detection = detect_date_format("November 2023");
        assert_eq!(detection.canonical, None);
        assert_eq!(pattern(&detection.best_effort), Some("MMMM YYYY"));
        let detection = detect_date_format("10:30");
        assert_eq!(pattern(&detection.best_effort), Some("HH:mm"));
    }

    #[test]
    fn fuzzy_text_keeps_surrounding_words() {
        let detection = detect_date_format("As of 31 Dec 2023");
        assert_eq!(pattern(&detection.canonical), Some("As of DD MMM YYYY"));
    }

    #[test]
    fn not_a_date() {
        assert_eq!(detect_date_format("Amount"), DateFormatDetection::default());
        assert_eq!(detect_date_format(""), DateFormatDetection::default());
    }

    #[test]
    fn region_dates_valid() {
        let grid = grid(&[
            &["Date", "Amount"],
            &["2024-01-01", "100"],
            &["2024-01-02", "-50"],
            &["", ""],
            &["14 Nov '23", "7"],
        ]);
        let criteria = Criteria::default();
        assert!(region_is_all_valid_dates(&grid, "A2:A5", "date", &criteria));
        assert!(!region_is_all_valid_dates(&grid, "B2:B5", "amount", &criteria));
        assert!(!region_is_all_valid_dates(&grid, "A1:A3", "date", &criteria));
    }

    #[test]
    fn region_dates_fail_closed() {
        let grid = grid(&[&["Month"], &["November 2023"], &[""]]);
        let criteria = Criteria::default();
        assert!(!region_is_all_valid_dates(&grid, "A2:A3", "month", &criteria));
        assert!(!region_is_all_valid_dates(&grid, "A3:A3", "month", &criteria));
        assert!(!region_is_all_valid_dates(&grid, "not a region", "month", &criteria));
        assert!(!region_is_all_valid_dates(&grid, "A10:A20", "month", &criteria));
    }

    #[test]
    fn region_dates_sample_limit() {
        let mut rows: Vec<Vec<String>> = (1..=5).map(|day| vec![format!("2024-03-{day:02}")]).collect();
        rows.push(vec!["not a date".to_owned()]);
        let criteria = Criteria::default();
        assert!(region_is_all_valid_dates(&rows, "A1:A6", "date", &criteria));
        let criteria = Criteria {
            date_sample_rows: 6,
            ..Criteria::default()
        };
        assert!(!region_is_all_valid_dates(&rows, "A1:A6", "date", &criteria));
    }
}
