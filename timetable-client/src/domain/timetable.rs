use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Which day's timetable to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Day {
    #[default]
    Today,
    Tomorrow,
}

impl Day {
    pub fn path(self) -> &'static str {
        match self {
            Day::Today => "/api/timetable/today",
            Day::Tomorrow => "/api/timetable/tomorrow",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Day::Today => Day::Tomorrow,
            Day::Tomorrow => Day::Today,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Today => "today",
            Day::Tomorrow => "tomorrow",
        }
    }
}

/// A single class in the day's schedule.
///
/// A `subgroup` of `0` or below means the lesson applies to every subgroup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lesson {
    #[serde(deserialize_with = "null_as_default")]
    pub discipline: String,
    #[serde(deserialize_with = "null_as_default")]
    pub start_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cabinet: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subgroup: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub pair: i32,
}

impl Lesson {
    /// Whether this lesson should be shown for the given subgroup filter.
    /// A filter of `0` shows everything.
    pub fn matches_group(&self, group: u32) -> bool {
        group == 0 || self.is_shared() || i64::from(self.subgroup) == i64::from(group)
    }

    pub fn is_shared(&self) -> bool {
        self.subgroup <= 0
    }
}

/// The most recent timetable payload as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub day_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub week_day_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<Lesson>,
    pub last_update: Option<String>,
}
