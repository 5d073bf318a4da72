//! Weekly opening hours and the open-now check.
//!
//! Times are `"HH:MM"` strings in local time. `"24:00"` is accepted as a
//! closing time. A day whose close is earlier than its open does not wrap
//! past midnight, so that day never reports open.

use std::collections::BTreeMap;

use jiff::civil::{Time, Weekday};
use serde::{Deserialize, Serialize};

/// One of the seven day-of-week keys used in `weeklyHours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Monday => Self::Monday,
            Weekday::Tuesday => Self::Tuesday,
            Weekday::Wednesday => Self::Wednesday,
            Weekday::Thursday => Self::Thursday,
            Weekday::Friday => Self::Friday,
            Weekday::Saturday => Self::Saturday,
            Weekday::Sunday => Self::Sunday,
        }
    }
}

/// Opening hours for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
    #[serde(default)]
    pub closed: bool,
}

impl DayHours {
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            closed: false,
        }
    }

    /// Checks both times parse as `"HH:MM"`.
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [("open", &self.open), ("close", &self.close)] {
            if parse_clock(value).is_none() {
                return Err(format!("{label} time '{value}' is not HH:MM"));
            }
        }
        Ok(())
    }

    /// Inclusive at both ends. Unparseable times never match.
    fn contains(&self, minute: u16) -> bool {
        if self.closed {
            return false;
        }
        match (parse_clock(&self.open), parse_clock(&self.close)) {
            (Some(open), Some(close)) => open <= minute && minute <= close,
            _ => false,
        }
    }
}

/// Opening hours keyed by day of week.
///
/// Days without an entry are treated as closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyHours(BTreeMap<DayOfWeek, DayHours>);

impl WeeklyHours {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, day: DayOfWeek, hours: DayHours) {
        self.0.insert(day, hours);
    }

    pub fn get(&self, day: DayOfWeek) -> Option<&DayHours> {
        self.0.get(&day)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &DayHours)> {
        self.0.iter().map(|(day, hours)| (*day, hours))
    }

    /// Whether the truck is open on `day` at local `time`.
    pub fn is_open_at(&self, day: DayOfWeek, time: Time) -> bool {
        let Ok(hour) = u16::try_from(time.hour()) else {
            return false;
        };
        let Ok(minute) = u16::try_from(time.minute()) else {
            return false;
        };
        self.get(day)
            .is_some_and(|hours| hours.contains(hour * 60 + minute))
    }

    /// Whether the truck is open right now, in the system time zone.
    pub fn is_open_now(&self) -> bool {
        let now = jiff::Zoned::now();
        self.is_open_at(now.weekday().into(), now.time())
    }
}

/// Mon–Thu 10:00–20:00, Fri–Sat 10:00–22:00, Sun 11:00–18:00.
impl Default for WeeklyHours {
    fn default() -> Self {
        let mut hours = Self::empty();
        for day in DayOfWeek::ALL {
            let entry = match day {
                DayOfWeek::Friday | DayOfWeek::Saturday => DayHours::new("10:00", "22:00"),
                DayOfWeek::Sunday => DayHours::new("11:00", "18:00"),
                _ => DayHours::new("10:00", "20:00"),
            };
            hours.insert(day, entry);
        }
        hours
    }
}

/// Parses `"HH:MM"` into minutes since midnight.
///
/// Hours run `0..=24`; `24` is only valid as `"24:00"`.
fn parse_clock(value: &str) -> Option<u16> {
    let (hour, minute) = value.split_once(':')?;
    if hour.len() != 2 || minute.len() != 2 {
        return None;
    }
    let hour: u16 = hour.parse().ok()?;
    let minute: u16 = minute.parse().ok()?;
    if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
        return None;
    }
    Some(hour * 60 + minute)
}
