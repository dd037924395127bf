//! Date cell grammar.
//!
//! Patterns are tried in order; the first that matches *and* accepts the
//! input wins. A handler may decline a textual match (e.g. "2/15-17/25"
//! looks cross-month but 17 is no month) so a later, looser pattern gets a
//! chance.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::{DateSpan, ParseOptions};
use crate::error::ParseError;

type Handler = fn(&DateParser, &Captures<'_>, &str) -> Result<Option<DateSpan>, ParseError>;

struct Rule {
    name: &'static str,
    pattern: Regex,
    handler: Handler,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, handler: Handler) -> Self {
        Rule {
            name,
            pattern: Regex::new(pattern).expect("valid date pattern"),
            handler,
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // 12/30/2025 - 1/2/2026
        Rule::new(
            "full_dates",
            r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\s*-\s*(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$",
            DateParser::full_dates,
        ),
        // 8/30-9/2/2025
        Rule::new(
            "cross_month_with_year",
            r"^(\d{1,2})/(\d{1,2})\s*-\s*(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$",
            DateParser::cross_month_with_year,
        ),
        // 2/15-17/2025
        Rule::new(
            "same_month_with_long_year",
            r"^(\d{1,2})/(\d{1,2})\s*-\s*(\d{1,2})/(\d{4})$",
            DateParser::same_month_with_year,
        ),
        // 8/4-8/7
        Rule::new(
            "cross_month",
            r"^(\d{1,2})/(\d{1,2})\s*-\s*(\d{1,2})/(\d{1,2})$",
            DateParser::cross_month,
        ),
        // 2/15-17/25 (only reached when the cross-month reading was declined)
        Rule::new(
            "same_month_with_short_year",
            r"^(\d{1,2})/(\d{1,2})\s*-\s*(\d{1,2})/(\d{2})$",
            DateParser::same_month_with_year,
        ),
        // 2/15-17
        Rule::new(
            "same_month",
            r"^(\d{1,2})/(\d{1,2})\s*-\s*(\d{1,2})$",
            DateParser::same_month,
        ),
        // 8/4/25, 8/4/2025
        Rule::new(
            "single_with_year",
            r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$",
            DateParser::single_with_year,
        ),
        // 8/4
        Rule::new("single", r"^(\d{1,2})/(\d{1,2})$", DateParser::single),
    ]
});

/// Phrases that make a cell ambiguous no matter what else it contains.
const AMBIGUOUS_MARKERS: &[&str] = &["week of", " or "];

/// Ordered-grammar parser for date cells.
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    options: ParseOptions,
}

impl DateParser {
    pub fn new(options: ParseOptions) -> Self {
        DateParser { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse a date cell into an inclusive span.
    ///
    /// Single dates yield `end: None`. Ranges longer than
    /// `max_range_days` inclusive days are rejected rather than silently
    /// turned into huge all-day blocks.
    pub fn parse(&self, cell: &str) -> Result<DateSpan, ParseError> {
        let input = normalize(cell);
        if input.is_empty() {
            return Err(ParseError::UnrecognizedDate(cell.trim().to_string()));
        }

        let lowered = input.to_lowercase();
        if AMBIGUOUS_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Err(ParseError::AmbiguousDate(input));
        }

        for rule in RULES.iter() {
            let Some(caps) = rule.pattern.captures(&input) else {
                continue;
            };
            if let Some(span) = (rule.handler)(self, &caps, &input)? {
                tracing::trace!(rule = rule.name, input = %input, "date matched");
                return Ok(span);
            }
        }

        Err(ParseError::UnrecognizedDate(input))
    }

    fn full_dates(&self, caps: &Captures<'_>, input: &str) -> Result<Option<DateSpan>, ParseError> {
        let start = date(
            self.year(&caps[3]),
            number(&caps[1], input)?,
            number(&caps[2], input)?,
            input,
        )?;
        let end = date(
            self.year(&caps[6]),
            number(&caps[4], input)?,
            number(&caps[5], input)?,
            input,
        )?;
        self.checked_range(start, end, input).map(Some)
    }

    fn cross_month_with_year(
        &self,
        caps: &Captures<'_>,
        input: &str,
    ) -> Result<Option<DateSpan>, ParseError> {
        let year = self.year(&caps[5]);
        let start = (number(&caps[1], input)?, number(&caps[2], input)?);
        let end = (number(&caps[3], input)?, number(&caps[4], input)?);
        self.range(year, start, end, input).map(Some)
    }

    fn cross_month(&self, caps: &Captures<'_>, input: &str) -> Result<Option<DateSpan>, ParseError> {
        let start = (number(&caps[1], input)?, number(&caps[2], input)?);
        let end = (number(&caps[3], input)?, number(&caps[4], input)?);
        if !(1..=12).contains(&end.0) {
            return Ok(None);
        }
        self.range(self.options.default_year, start, end, input)
            .map(Some)
    }

    fn same_month_with_year(
        &self,
        caps: &Captures<'_>,
        input: &str,
    ) -> Result<Option<DateSpan>, ParseError> {
        let year = self.year(&caps[4]);
        let month = number(&caps[1], input)?;
        let start = (month, number(&caps[2], input)?);
        let end = (month, number(&caps[3], input)?);
        self.range(year, start, end, input).map(Some)
    }

    fn same_month(&self, caps: &Captures<'_>, input: &str) -> Result<Option<DateSpan>, ParseError> {
        let month = number(&caps[1], input)?;
        let start = (month, number(&caps[2], input)?);
        let end = (month, number(&caps[3], input)?);
        self.range(self.options.default_year, start, end, input)
            .map(Some)
    }

    fn single_with_year(
        &self,
        caps: &Captures<'_>,
        input: &str,
    ) -> Result<Option<DateSpan>, ParseError> {
        let day = date(
            self.year(&caps[3]),
            number(&caps[1], input)?,
            number(&caps[2], input)?,
            input,
        )?;
        Ok(Some(DateSpan::single(day)))
    }

    fn single(&self, caps: &Captures<'_>, input: &str) -> Result<Option<DateSpan>, ParseError> {
        let day = date(
            self.options.default_year,
            number(&caps[1], input)?,
            number(&caps[2], input)?,
            input,
        )?;
        Ok(Some(DateSpan::single(day)))
    }

    /// Build a range from month/day pairs sharing a base year.
    ///
    /// An end month before the start month rolls into the next year; an
    /// end day before the start day within the same month rolls into the
    /// next month.
    fn range(
        &self,
        year: i32,
        (start_month, start_day): (u32, u32),
        (end_month, end_day): (u32, u32),
        input: &str,
    ) -> Result<DateSpan, ParseError> {
        let start = date(year, start_month, start_day, input)?;

        let (end_year, end_month) = if end_month < start_month {
            (year + 1, end_month)
        } else if end_month == start_month && end_day < start_day {
            if end_month == 12 {
                (year + 1, 1)
            } else {
                (year, end_month + 1)
            }
        } else {
            (year, end_month)
        };

        let end = date(end_year, end_month, end_day, input)?;
        self.checked_range(start, end, input)
    }

    fn checked_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        input: &str,
    ) -> Result<DateSpan, ParseError> {
        if end < start {
            return Err(ParseError::ReversedRange(input.to_string()));
        }

        let days = (end - start).num_days() + 1;
        if days > self.options.max_range_days {
            return Err(ParseError::RangeTooLong {
                input: input.to_string(),
                days,
                limit: self.options.max_range_days,
            });
        }

        Ok(DateSpan {
            start,
            end: Some(end),
        })
    }

    /// Four-digit years are taken as-is; two-digit years land in the
    /// century of the default year.
    fn year(&self, text: &str) -> i32 {
        let value: i32 = text.parse().unwrap_or(self.options.default_year);
        if text.len() <= 2 {
            self.options.default_year.div_euclid(100) * 100 + value
        } else {
            value
        }
    }
}

fn normalize(cell: &str) -> String {
    cell.trim()
        .replace(['\u{2013}', '\u{2014}'], "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn number(text: &str, input: &str) -> Result<u32, ParseError> {
    text.parse()
        .map_err(|_| ParseError::UnrecognizedDate(input.to_string()))
}

fn date(year: i32, month: u32, day: u32, input: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ParseError::InvalidDate(input.to_string()))
}
