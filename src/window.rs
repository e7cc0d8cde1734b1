use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use crate::error::{Error, Result};

// Format of `created_at` on search results, e.g. "Mon Jun 17 18:11:13 +0000 2019"
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

// Closed interval between two UTC instants, `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from > to {
            return Err(Error::InvalidWindow {
                from: from.to_rfc3339(),
                to: to.to_rfc3339(),
            });
        }
        Ok(Self { from, to })
    }

    pub fn from_api_dates(from: &str, to: &str) -> Result<Self> {
        Self::new(parse_api_date(from)?, parse_api_date(to)?)
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn span(&self) -> TimeDelta {
        self.to - self.from
    }
}

pub fn parse_api_date(s: &str) -> Result<DateTime<Utc>> {
    let malformed = || Error::MalformedDate(s.to_string());

    if s.len() != 12 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    // all ascii digits, so slicing on byte offsets is safe
    let field = |range: std::ops::Range<usize>| s[range].parse::<u32>().map_err(|_| malformed());

    let year = field(0..4)? as i32;
    let date = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?).ok_or_else(malformed)?;
    let datetime = date.and_hms_opt(field(8..10)?, field(10..12)?, 0).ok_or_else(malformed)?;

    Ok(datetime.and_utc())
}

pub fn parse_created_at(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(s, CREATED_AT_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::MalformedTimestamp(s.to_string()))
}
