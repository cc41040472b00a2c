//! Week-partitioned calendar datasets and the edit-state engine built on
//! them.

pub mod edit_state;
pub mod week_cursor;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

pub use edit_state::{Comparator, EditState, Exact, ReservationEdits, RequestEdits, SlotSet};
pub use week_cursor::{WeekCursor, WEEK_PARAM};

/* ---------------- structure ---------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day<T> {
    pub local_date: NaiveDate,
    /// Grid padding, never selectable.
    #[serde(default)]
    pub hidden:     bool,
    pub data:       Option<T>,
}

impl<T> Day<T> {
    /// Payload of a selectable day.
    pub fn editable(&self) -> Option<&T> {
        if self.hidden {
            None
        } else {
            self.data.as_ref()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week<T> {
    pub days: Vec<Day<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDataset<T> {
    pub weeks: Vec<Week<T>>,
}

impl<T> CalendarDataset<T> {
    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub fn days(&self) -> impl Iterator<Item = &Day<T>> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    /// Non-hidden days carrying a payload, in date order.
    pub fn editable_days(&self) -> impl Iterator<Item = (NaiveDate, &T)> {
        self.days().filter_map(|d| d.editable().map(|p| (d.local_date, p)))
    }

    pub fn day(&self, date: NaiveDate) -> Option<&Day<T>> {
        self.days().find(|d| d.local_date == date)
    }

    /// Dates must strictly increase through every week and across weeks.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut previous: Option<NaiveDate> = None;
        for day in self.days() {
            if let Some(prev) = previous {
                if day.local_date <= prev {
                    return Err(DatasetError::OutOfOrder { previous: prev, date: day.local_date });
                }
            }
            previous = Some(day.local_date);
        }
        Ok(())
    }
}

/// Day payloads that project to an editable value.
pub trait CalendarPayload {
    type Value: Clone;

    fn edit_value(&self) -> Self::Value;
}
