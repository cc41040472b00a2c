//! Baseline + pending edits over a calendar, with diff-only submission.
//!
//! The same engine backs the requests, reservations and override screens.
//! `C` decides when an edited value counts as a change.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use chrono::NaiveDate;
use log::debug;

use crate::calendar::{CalendarDataset, CalendarPayload};
use crate::error::{ApiError, EditError};

/* ---------------- comparateurs ------------------------------------------ */

pub trait Comparator<V> {
    fn same(a: &V, b: &V) -> bool;
}

/// Plain equality. For arrays this is positional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exact;

impl<V: PartialEq> Comparator<V> for Exact {
    fn same(a: &V, b: &V) -> bool {
        a == b
    }
}

/// Reservation slots: same non-empty user ids with the same multiplicity,
/// slot order ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotSet;

impl Comparator<Vec<String>> for SlotSet {
    fn same(a: &Vec<String>, b: &Vec<String>) -> bool {
        occupied(a) == occupied(b)
    }
}

fn occupied(slots: &[String]) -> Vec<&str> {
    let mut ids: Vec<&str> = slots.iter().map(String::as_str).filter(|id| !id.is_empty()).collect();
    ids.sort_unstable();
    ids
}

/* ---------------- état d'édition ---------------------------------------- */

pub type RequestEdits = EditState<bool, Exact>;
pub type ReservationEdits = EditState<Vec<String>, SlotSet>;

#[derive(Debug, Clone, PartialEq)]
pub struct EditState<V, C = Exact> {
    baseline:  BTreeMap<NaiveDate, V>,
    pending:   BTreeMap<NaiveDate, V>,
    /// Entries handed out by `begin_save` and not yet acknowledged.
    in_flight: Option<Vec<(NaiveDate, V)>>,
    _cmp:      PhantomData<C>,
}

impl<V, C> Default for EditState<V, C> {
    fn default() -> Self {
        Self {
            baseline:  BTreeMap::new(),
            pending:   BTreeMap::new(),
            in_flight: None,
            _cmp:      PhantomData,
        }
    }
}

impl<V: Clone, C: Comparator<V>> EditState<V, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset<P>(dataset: &CalendarDataset<P>) -> Result<Self, EditError>
    where
        P: CalendarPayload<Value = V>,
    {
        let mut state = Self::new();
        state.load(dataset)?;
        Ok(state)
    }

    /// Replaces the baseline with the selectable days of `dataset` and drops
    /// every pending edit. Hidden days never make it in.
    pub fn load<P>(&mut self, dataset: &CalendarDataset<P>) -> Result<(), EditError>
    where
        P: CalendarPayload<Value = V>,
    {
        self.baseline = Self::flatten(dataset)?;
        self.pending.clear();
        Ok(())
    }

    fn flatten<P>(dataset: &CalendarDataset<P>) -> Result<BTreeMap<NaiveDate, V>, EditError>
    where
        P: CalendarPayload<Value = V>,
    {
        dataset.validate()?;
        Ok(dataset.editable_days().map(|(date, p)| (date, p.edit_value())).collect())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.baseline.contains_key(&date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.baseline.keys().copied()
    }

    pub fn baseline_value(&self, date: NaiveDate) -> Option<&V> {
        self.baseline.get(&date)
    }

    pub fn set_value(&mut self, date: NaiveDate, value: V) -> Result<(), EditError> {
        if !self.contains(date) {
            return Err(EditError::UnknownDate(date));
        }
        self.pending.insert(date, value);
        Ok(())
    }

    /// Pending edit if any, else the baseline.
    pub fn effective_value(&self, date: NaiveDate) -> Option<&V> {
        self.pending.get(&date).or_else(|| self.baseline.get(&date))
    }

    /// Entries whose effective value differs from the baseline, by date.
    pub fn diff(&self) -> Vec<(NaiveDate, V)> {
        self.pending
            .iter()
            .filter(|&(date, value)| {
                self.baseline
                    .get(date)
                    .is_some_and(|base| !C::same(base, value))
            })
            .map(|(date, value)| (*date, value.clone()))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.diff().is_empty()
    }

    /// Drops every local edit.
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /* ---------- sauvegarde ---------- */

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Snapshots the diff for submission. Only one save may be pending.
    pub fn begin_save(&mut self) -> Result<Vec<(NaiveDate, V)>, EditError> {
        if self.is_saving() {
            return Err(EditError::SaveInFlight);
        }
        let submission = self.diff();
        debug!("saving {} changed day(s)", submission.len());
        self.in_flight = Some(submission.clone());
        Ok(submission)
    }

    /// Acknowledges a save whose response carried no dataset: the submitted
    /// entries are folded into the baseline.
    pub fn complete_save(&mut self, outcome: Result<(), ApiError>) -> Result<(), EditError> {
        let submitted = self.in_flight.take().ok_or(EditError::NoSaveInFlight)?;
        outcome?;

        for (date, value) in &submitted {
            if let Some(base) = self.baseline.get_mut(date) {
                *base = value.clone();
            }
        }
        self.settle(&submitted);
        Ok(())
    }

    /// Acknowledges a save whose response echoed the authoritative dataset:
    /// the baseline is replaced wholesale.
    pub fn complete_save_with<P>(
        &mut self,
        outcome: Result<&CalendarDataset<P>, ApiError>,
    ) -> Result<(), EditError>
    where
        P: CalendarPayload<Value = V>,
    {
        let submitted = self.in_flight.take().ok_or(EditError::NoSaveInFlight)?;
        let dataset = outcome?;

        self.baseline = Self::flatten(dataset)?;
        self.settle(&submitted);
        let baseline = &self.baseline;
        self.pending.retain(|date, _| baseline.contains_key(date));
        Ok(())
    }

    /// Clears pending edits that were submitted unchanged. Edits made while
    /// the save was in flight stay pending.
    fn settle(&mut self, submitted: &[(NaiveDate, V)]) {
        for (date, value) in submitted {
            if self.pending.get(date).is_some_and(|p| C::same(p, value)) {
                self.pending.remove(date);
            }
        }
    }
}

impl<C: Comparator<bool>> EditState<bool, C> {
    /// Flips the effective value of `date`, returning the new value.
    pub fn toggle(&mut self, date: NaiveDate) -> Result<bool, EditError> {
        let next = !self.effective_value(date).copied().ok_or(EditError::UnknownDate(date))?;
        self.set_value(date, next)?;
        Ok(next)
    }
}

impl<C: Comparator<Vec<String>>> EditState<Vec<String>, C> {
    /// Puts `user_id` (empty string = free) into slot `index` of `date`.
    pub fn set_slot(&mut self, date: NaiveDate, index: usize, user_id: &str) -> Result<(), EditError> {
        let mut slots = self.effective_value(date).cloned().ok_or(EditError::UnknownDate(date))?;
        if slots.len() <= index {
            slots.resize(index + 1, String::new());
        }
        slots[index] = user_id.to_string();
        self.set_value(date, slots)
    }
}
