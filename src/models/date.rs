//! Datumtyper för genealogiska händelser
//!
//! GEDCOM-datum är ofta ofullständiga (bara år, eller år och månad) och kan
//! bära en kvalificerare (ABT, BEF, AFT, BET..AND). Kvalificerare bevaras
//! genom hela konverteringen och hittas aldrig på.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Månadsnamn i GEDCOM-format
const GED_MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Partiellt datum: år krävs, månad och dag är valfria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl PartialDate {
    pub fn new(year: i32, month: Option<u32>, day: Option<u32>) -> Self {
        Self { year, month, day }
    }

    pub fn year_only(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    /// Hämta NaiveDate om datumet är fullständigt och giltigt
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        match (self.month, self.day) {
            (Some(m), Some(d)) => NaiveDate::from_ymd_opt(self.year, m, d),
            _ => None,
        }
    }

    /// Kontrollera att datumet finns i kalendern
    pub fn is_valid(&self) -> bool {
        match (self.month, self.day) {
            (None, None) => true,
            (Some(m), None) => (1..=12).contains(&m),
            (Some(_), Some(_)) => self.to_naive_date().is_some(),
            (None, Some(_)) => false,
        }
    }

    /// Formatera enligt GEDCOM-grammatiken: `DD MON YYYY`, `MON YYYY` eller `YYYY`
    pub fn to_gedcom(&self) -> String {
        let month_name = self.month.and_then(month_abbrev);
        match (month_name, self.day) {
            (Some(name), Some(day)) => format!("{:02} {} {}", day, name, self.year),
            (Some(name), None) => format!("{} {}", name, self.year),
            _ => self.year.to_string(),
        }
    }

    /// Parsa en GEDCOM-datumsträng utan kvalificerare
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();

        match parts.len() {
            // "1850" - bara år
            1 => {
                let year = parts[0].parse::<i32>().ok()?;
                Some(Self::year_only(year))
            }
            // "MAY 1850" eller "1850 MAY"
            2 => {
                let (month_str, year_str) = if parts[0].parse::<i32>().is_ok() {
                    (parts[1], parts[0])
                } else {
                    (parts[0], parts[1])
                };

                let month = parse_month(month_str)?;
                let year = year_str.parse::<i32>().ok()?;
                Some(Self::new(year, Some(month), None))
            }
            // "23 MAY 1850"
            3 => {
                let day = parts[0].parse::<u32>().ok()?;
                let month = parse_month(parts[1])?;
                let year = parts[2].parse::<i32>().ok()?;
                let date = Self::new(year, Some(month), Some(day));
                date.is_valid().then_some(date)
            }
            _ => None,
        }
    }
}

/// Datumkvalificerare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateQualifier {
    /// Omkring (ABT)
    About,
    /// Före (BEF)
    Before,
    /// Efter (AFT)
    After,
    /// Mellan (BET ... AND ...)
    Between,
}

impl DateQualifier {
    pub fn gedcom_prefix(&self) -> &'static str {
        match self {
            Self::About => "ABT",
            Self::Before => "BEF",
            Self::After => "AFT",
            Self::Between => "BET",
        }
    }
}

/// Händelsedatum: ett partiellt datum med valfri kvalificerare
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDate {
    /// Kvalificerare, `None` betyder exakt datum
    pub qualifier: Option<DateQualifier>,
    pub date: PartialDate,
    /// Slutdatum för BET..AND-intervall
    pub end: Option<PartialDate>,
}

impl EventDate {
    pub fn exact(date: PartialDate) -> Self {
        Self {
            qualifier: None,
            date,
            end: None,
        }
    }

    pub fn qualified(qualifier: DateQualifier, date: PartialDate) -> Self {
        Self {
            qualifier: Some(qualifier),
            date,
            end: None,
        }
    }

    pub fn between(start: PartialDate, end: PartialDate) -> Self {
        Self {
            qualifier: Some(DateQualifier::Between),
            date: start,
            end: Some(end),
        }
    }

    /// Formatera för en GEDCOM DATE-rad
    pub fn to_gedcom(&self) -> String {
        match (self.qualifier, &self.end) {
            (Some(DateQualifier::Between), Some(end)) => {
                format!("BET {} AND {}", self.date.to_gedcom(), end.to_gedcom())
            }
            // intervall utan slutdatum renderas som exakt
            (Some(DateQualifier::Between), None) => self.date.to_gedcom(),
            (Some(q), _) => format!("{} {}", q.gedcom_prefix(), self.date.to_gedcom()),
            (None, _) => self.date.to_gedcom(),
        }
    }

    /// Parsa en GEDCOM-datumsträng, med eller utan kvalificerare
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();

        if let Some(rest) = upper.strip_prefix("BET ") {
            let (start, end) = rest.split_once(" AND ")?;
            return Some(Self::between(
                PartialDate::parse(start)?,
                PartialDate::parse(end)?,
            ));
        }

        let prefixes = [
            ("ABOUT", DateQualifier::About),
            ("ABT", DateQualifier::About),
            ("BEFORE", DateQualifier::Before),
            ("BEF", DateQualifier::Before),
            ("AFTER", DateQualifier::After),
            ("AFT", DateQualifier::After),
        ];
        for (prefix, qualifier) in prefixes {
            if let Some(rest) = upper.strip_prefix(prefix) {
                let rest = rest.strip_prefix('.').unwrap_or(rest);
                if let Some(rest) = rest.strip_prefix(' ') {
                    return Some(Self::qualified(qualifier, PartialDate::parse(rest)?));
                }
            }
        }

        PartialDate::parse(&upper).map(Self::exact)
    }
}

fn month_abbrev(month: u32) -> Option<&'static str> {
    let idx = month.checked_sub(1)? as usize;
    GED_MONTHS.get(idx).copied()
}

fn parse_month(s: &str) -> Option<u32> {
    match s.to_uppercase().as_str() {
        "JAN" | "JANUARY" => Some(1),
        "FEB" | "FEBRUARY" => Some(2),
        "MAR" | "MARCH" => Some(3),
        "APR" | "APRIL" => Some(4),
        "MAY" => Some(5),
        "JUN" | "JUNE" => Some(6),
        "JUL" | "JULY" => Some(7),
        "AUG" | "AUGUST" => Some(8),
        "SEP" | "SEPTEMBER" => Some(9),
        "OCT" | "OCTOBER" => Some(10),
        "NOV" | "NOVEMBER" => Some(11),
        "DEC" | "DECEMBER" => Some(12),
        _ => None,
    }
}
