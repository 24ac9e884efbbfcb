//! Lenient date/time parser for raw cell text.
//!
//! Accepts the shapes commonly found in exported sheets: ISO dates, slash/dash/dot separated
//! numeric dates, English month and weekday names, ordinal days, apostrophe years and
//! `hh:mm[:ss]` times with an optional meridiem. Ambiguous numeric dates are read month
//! first. In fuzzy mode unknown words and punctuation are skipped instead of rejected.
use chrono::Datelike;
use chrono::NaiveDate;
use chrono::Weekday;

pub(crate) const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub(crate) const WEEKDAY_NAMES: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun,
];

/// Words that may sit between date components without meaning anything.
const SKIPPED_WORDS: [&str; 8] = ["at", "on", "and", "of", "t", "z", "utc", "gmt"];

/// Separators tolerated in strict mode.
const SEPARATORS: [char; 7] = [',', '.', '/', '-', '\'', ';', ':'];

/// Two-digit years below this pivot land in the 2000s, the rest in the 1900s.
const CENTURY_PIVOT: i32 = 69;

/// Components recovered from a date/time string. Missing components stay `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ParsedDateTime {
    pub(crate) year: Option<i32>,
    pub(crate) month: Option<u32>,
    pub(crate) day: Option<u32>,
    pub(crate) weekday: Option<Weekday>,
    /// 24-hour clock
    pub(crate) hour: Option<u32>,
    pub(crate) minute: Option<u32>,
    pub(crate) second: Option<u32>,
    /// Some(true) for PM, Some(false) for AM
    pub(crate) is_pm: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(String),
    Word(String),
    Separator(char),
}

/// A bare number waiting to be assigned to year, month or day.
#[derive(Copy, Clone, Debug)]
struct DateNumber {
    value: u32,
    digits: usize,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(char) = chars.next() {
        if char.is_whitespace() {
            continue;
        }
        let mut run = String::from(char);
        if char.is_ascii_digit() {
            while let Some(next) = chars.next_if(char::is_ascii_digit) {
                run.push(next);
            }
            tokens.push(Token::Number(run));
        } else if char.is_alphabetic() {
            while let Some(next) = chars.next_if(|next| next.is_alphabetic()) {
                run.push(next);
            }
            tokens.push(Token::Word(run.to_lowercase()));
        } else {
            tokens.push(Token::Separator(char));
        }
    }
    tokens
}

/// Looks up an English month by full name, three-letter abbreviation or "sept".
pub(crate) fn month_from_name(word: &str) -> Option<u32> {
    if word == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|name| {
            let name = name.to_ascii_lowercase();
            word == name || (word.len() == 3 && name.starts_with(word))
        })
        .map(|index| index as u32 + 1)
}

fn weekday_from_name(word: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .position(|name| {
            let name = name.to_ascii_lowercase();
            word == name || (word.len() == 3 && name.starts_with(word))
        })
        .map(|index| WEEKDAYS[index])
}

fn is_ordinal_suffix(word: &str) -> bool {
    matches!(word, "st" | "nd" | "rd" | "th")
}

fn meridiem(word: &str) -> Option<bool> {
    match word {
        "am" | "a" => Some(false),
        "pm" | "p" => Some(true),
        _ => None,
    }
}

fn number_at(tokens: &[Token], index: usize) -> Option<&str> {
    match tokens.get(index) {
        Some(Token::Number(digits)) => Some(digits.as_str()),
        _ => None,
    }
}

fn word_at(tokens: &[Token], index: usize) -> Option<&str> {
    match tokens.get(index) {
        Some(Token::Word(word)) => Some(word.as_str()),
        _ => None,
    }
}

fn separator_at(tokens: &[Token], index: usize, separator: char) -> bool {
    matches!(tokens.get(index), Some(Token::Separator(char)) if *char == separator)
}

fn two_digit(digits: &str) -> Option<u32> {
    if digits.len() <= 2 {
        digits.parse().ok()
    } else {
        None
    }
}

/// Parses `text` into date/time components. Returns None if the text is not a date.
pub(crate) fn parse(text: &str, fuzzy: bool) -> Option<ParsedDateTime> {
    let tokens = tokenize(text);
    let mut parsed = ParsedDateTime::default();
    let mut numbers: Vec<DateNumber> = Vec::new();
    let mut index = 0;
    while index < tokens.len() {
        match &tokens[index] {
            Token::Number(digits) => {
                let value: u32 = match digits.parse() {
                    Ok(value) => value,
                    Err(_) if fuzzy => {
                        index += 1;
                        continue;
                    }
                    Err(_) => return None,
                };
                if separator_at(&tokens, index + 1, ':') && number_at(&tokens, index + 2).is_some() {
                    // hh:mm[:ss[.fff]]
                    if parsed.hour.is_some() {
                        return None;
                    }
                    parsed.hour = Some(two_digit(digits)?);
                    parsed.minute = Some(two_digit(number_at(&tokens, index + 2)?)?);
                    index += 3;
                    if separator_at(&tokens, index, ':') {
                        if let Some(second) = number_at(&tokens, index + 1) {
                            parsed.second = Some(two_digit(second)?);
                            index += 2;
                            if separator_at(&tokens, index, '.') && number_at(&tokens, index + 1).is_some() {
                                index += 2;
                            }
                        }
                    }
                    continue;
                }
                if word_at(&tokens, index + 1).map(is_ordinal_suffix).unwrap_or(false) {
                    if parsed.day.is_some() || digits.len() > 2 {
                        return None;
                    }
                    parsed.day = Some(value);
                    index += 2;
                    continue;
                }
                if index > 0 && separator_at(&tokens, index - 1, '\'') && digits.len() == 2 && parsed.year.is_none() {
                    parsed.year = Some(expand_year(value as i32));
                    index += 1;
                    continue;
                }
                if parsed.hour.is_none() && word_at(&tokens, index + 1).and_then(meridiem).is_some() {
                    parsed.hour = Some(two_digit(digits)?);
                    index += 1;
                    continue;
                }
                match digits.len() {
                    1..=4 => numbers.push(DateNumber {
                        value,
                        digits: digits.len(),
                    }),
                    8 if numbers.is_empty() && parsed.year.is_none() && parsed.month.is_none() && parsed.day.is_none() => {
                        parsed.year = Some((value / 10_000) as i32);
                        parsed.month = Some(value / 100 % 100);
                        parsed.day = Some(value % 100);
                    }
                    _ if fuzzy => (),
                    _ => return None,
                }
                index += 1;
            }
            Token::Word(word) => {
                if let Some(month) = month_from_name(word) {
                    if parsed.month.is_some() && !fuzzy {
                        return None;
                    }
                    parsed.month.get_or_insert(month);
                } else if let Some(weekday) = weekday_from_name(word) {
                    parsed.weekday.get_or_insert(weekday);
                } else if let Some(is_pm) = meridiem(word) {
                    // "a.m." arrives as a . m .
                    if separator_at(&tokens, index + 1, '.') && word_at(&tokens, index + 2) == Some("m") {
                        index += 2;
                    }
                    parsed.is_pm = Some(is_pm);
                } else if !SKIPPED_WORDS.contains(&word.as_str()) && !fuzzy {
                    return None;
                }
                index += 1;
            }
            Token::Separator(char) => {
                if !SEPARATORS.contains(char) && !fuzzy {
                    return None;
                }
                index += 1;
            }
        }
    }

    // AM/PM needs an hour to attach to
    if parsed.is_pm.is_some() && parsed.hour.is_none() {
        if !fuzzy {
            return None;
        }
        parsed.is_pm = None;
    }
    let anchored = parsed.year.is_some()
        || parsed.month.is_some()
        || parsed.day.is_some()
        || parsed.weekday.is_some()
        || parsed.hour.is_some();
    // A lone number among filler words is a code or a count ("T1", "at 5")
    if numbers.len() == 1 && !anchored {
        return None;
    }
    assign_numbers(&mut parsed, numbers)?;
    apply_meridiem(&mut parsed)?;
    validate(&parsed)?;
    if parsed.year.is_none() && parsed.month.is_none() && parsed.day.is_none() && parsed.hour.is_none() {
        None
    } else {
        Some(parsed)
    }
}

fn expand_year(year: i32) -> i32 {
    if year < CENTURY_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}

/// Distributes bare numbers over the year, month and day slots still open.
fn assign_numbers(parsed: &mut ParsedDateTime, mut numbers: Vec<DateNumber>) -> Option<()> {
    if numbers.len() > 3 {
        return None;
    }
    // A four digit number or anything past 31 can only be a year
    if parsed.year.is_none() {
        if let Some(position) = numbers.iter().position(|number| number.digits == 4 || number.value > 31) {
            let number = numbers.remove(position);
            parsed.year = Some(to_year(number));
        }
    }
    if numbers.len() == 3 && parsed.year.is_none() {
        let number = numbers.remove(2);
        parsed.year = Some(to_year(number));
    }
    match numbers.as_slice() {
        [] => Some(()),
        [first] => {
            if parsed.month.is_none() && first.value <= 12 {
                parsed.month = Some(first.value);
            } else if parsed.day.is_none() {
                parsed.day = Some(first.value);
            } else if parsed.year.is_none() {
                parsed.year = Some(to_year(*first));
            } else {
                return None;
            }
            Some(())
        }
        [first, second] => {
            match (parsed.year.is_none(), parsed.month.is_none(), parsed.day.is_none()) {
                (_, true, true) if first.value > 12 && second.value <= 12 => {
                    parsed.day = Some(first.value);
                    parsed.month = Some(second.value);
                }
                (_, true, true) => {
                    parsed.month = Some(first.value);
                    parsed.day = Some(second.value);
                }
                (true, true, false) => {
                    parsed.month = Some(first.value);
                    parsed.year = Some(to_year(*second));
                }
                (true, false, true) => {
                    parsed.day = Some(first.value);
                    parsed.year = Some(to_year(*second));
                }
                _ => return None,
            }
            Some(())
        }
        _ => None,
    }
}

fn to_year(number: DateNumber) -> i32 {
    if number.digits <= 2 {
        expand_year(number.value as i32)
    } else {
        number.value as i32
    }
}

fn apply_meridiem(parsed: &mut ParsedDateTime) -> Option<()> {
    if let (Some(is_pm), Some(hour)) = (parsed.is_pm, parsed.hour) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        parsed.hour = Some(match (is_pm, hour) {
            (true, 12) => 12,
            (true, hour) => hour + 12,
            (false, 12) => 0,
            (false, hour) => hour,
        });
    }
    Some(())
}

fn validate(parsed: &ParsedDateTime) -> Option<()> {
    if let Some(month) = parsed.month {
        if !(1..=12).contains(&month) {
            return None;
        }
    }
    if let Some(day) = parsed.day {
        if !(1..=31).contains(&day) {
            return None;
        }
        // Leap year stands in for a missing year so 29 February stays valid
        let year = parsed.year.unwrap_or(2000);
        let month = parsed.month.unwrap_or(1);
        NaiveDate::from_ymd_opt(year, month, day)?;
    } else if let Some(year) = parsed.year {
        NaiveDate::from_ymd_opt(year, parsed.month.unwrap_or(1), 1)?;
    }
    if parsed.hour.map(|hour| hour > 23).unwrap_or(false)
        || parsed.minute.map(|minute| minute > 59).unwrap_or(false)
        || parsed.second.map(|second| second > 59).unwrap_or(false)
    {
        return None;
    }
    Some(())
}

impl ParsedDateTime {
    /// The calendar date when year, month and day are all known.
    pub(crate) fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }

    /// Weekday named in the text, or derived from a complete date.
    pub(crate) fn weekday(&self) -> Option<Weekday> {
        self.weekday.or_else(|| self.date().map(|date| date.weekday()))
    }
}
