//! Wire shapes of the parking API. Everything is camelCase on the wire.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarDataset, CalendarPayload, Day};

/* ---------------- demandes ---------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDay {
    pub requested: bool,
}

impl CalendarPayload for RequestDay {
    type Value = bool;

    fn edit_value(&self) -> bool {
        self.requested
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestsResponse {
    pub requests: CalendarDataset<RequestDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEdit {
    pub local_date: NaiveDate,
    pub requested:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestsPatch {
    pub requests: Vec<RequestEdit>,
}

impl RequestsPatch {
    pub fn from_diff(diff: Vec<(NaiveDate, bool)>) -> Self {
        Self {
            requests: diff
                .into_iter()
                .map(|(local_date, requested)| RequestEdit { local_date, requested })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/* ---------------- réservations ------------------------------------------ */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDay {
    pub user_ids: Vec<String>,
}

impl CalendarPayload for ReservationDay {
    type Value = Vec<String>;

    fn edit_value(&self) -> Vec<String> {
        self.user_ids.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub users:                  Vec<UserOption>,
    /// Number of slot pickers rendered per day.
    pub short_lead_time_spaces: usize,
    pub reservations:           CalendarDataset<ReservationDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationEdit {
    pub local_date: NaiveDate,
    pub user_ids:   Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationsPatch {
    pub reservations: Vec<ReservationEdit>,
}

impl ReservationsPatch {
    /// Free slots (empty ids) are not sent.
    pub fn from_diff(diff: Vec<(NaiveDate, Vec<String>)>) -> Self {
        Self {
            reservations: diff
                .into_iter()
                .map(|(local_date, mut user_ids)| {
                    user_ids.retain(|id| !id.is_empty());
                    ReservationEdit { local_date, user_ids }
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}

/* ---------------- utilisateurs ------------------------------------------ */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOption {
    pub user_id: String,
    pub name:    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersListResponse {
    pub users: Vec<UserOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id:                         String,
    pub first_name:                      String,
    pub last_name:                       String,
    pub registration_number:             Option<String>,
    pub alternative_registration_number: Option<String>,
    pub commute_distance:                Option<f64>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserBody {
    pub email_address:                   String,
    pub first_name:                      String,
    pub last_name:                       String,
    pub registration_number:             Option<String>,
    pub alternative_registration_number: Option<String>,
    pub commute_distance:                Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditUserBody {
    pub first_name:                      String,
    pub last_name:                       String,
    pub registration_number:             Option<String>,
    pub alternative_registration_number: Option<String>,
    pub commute_distance:                Option<f64>,
}

/// Form text to the optional wire value: blank means "not set".
pub fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/* ---------------- détail journalier ------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUser {
    pub name:           String,
    #[serde(default)]
    pub is_highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayInterruptedStatus {
    #[serde(default)]
    pub is_allowed: bool,
    #[serde(default)]
    pub is_set:     bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDetailData {
    #[serde(default)]
    pub allocated_users:         Vec<DailyUser>,
    #[serde(default)]
    pub interrupted_users:       Vec<DailyUser>,
    #[serde(default)]
    pub pending_users:           Vec<DailyUser>,
    pub stay_interrupted_status: Option<StayInterruptedStatus>,
}

impl DailyDetailData {
    pub fn has_any_users(&self) -> bool {
        !(self.allocated_users.is_empty()
            && self.interrupted_users.is_empty()
            && self.pending_users.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDetailsResponse {
    pub details: Vec<Day<DailyDetailData>>,
}

impl DailyDetailsResponse {
    /// Selectable dates, in the order the server sent them.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.details.iter().filter(|d| !d.hidden).map(|d| d.local_date).collect()
    }

    /// The requested date when it is selectable, otherwise the first one.
    pub fn initial_date(&self, requested: Option<NaiveDate>) -> Option<NaiveDate> {
        let available = self.available_dates();
        requested
            .filter(|date| available.contains(date))
            .or_else(|| available.first().copied())
    }

    pub fn data_for(&self, date: NaiveDate) -> Option<&DailyDetailData> {
        self.details
            .iter()
            .find(|d| d.local_date == date)
            .and_then(|d| d.data.as_ref())
    }

    /// Body flipping the stay-interrupted flag of `date`, `None` when the
    /// user may not change it there.
    pub fn toggle_stay_interrupted(&self, date: NaiveDate) -> Option<StayInterruptedPatch> {
        let status = self.data_for(date)?.stay_interrupted_status?;
        status.is_allowed.then_some(StayInterruptedPatch {
            local_date:       date,
            stay_interrupted: !status.is_set,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayInterruptedPatch {
    pub local_date:       NaiveDate,
    pub stay_interrupted: bool,
}

/* ---------------- profil ------------------------------------------------ */

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub registration_number:             Option<String>,
    pub alternative_registration_number: Option<String>,
    #[serde(default)]
    pub request_reminder_enabled:        bool,
    #[serde(default)]
    pub reservation_reminder_enabled:    bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

/* ---------------- synthèse ---------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayStatus {
    Allocated,
    Pending,
    Interrupted,
    HardInterrupted,
}

impl DayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DayStatus::Allocated => "Allocated",
            DayStatus::Pending => "Pending",
            DayStatus::Interrupted | DayStatus::HardInterrupted => "Interrupted",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            DayStatus::Allocated => "status-allocated",
            DayStatus::Pending => "status-pending",
            DayStatus::Interrupted | DayStatus::HardInterrupted => "status-interrupted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDay {
    pub status:     Option<DayStatus>,
    #[serde(default)]
    pub is_problem: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: CalendarDataset<SummaryDay>,
}

/* ---------------- immatriculations -------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationNumber {
    pub registration_number: String,
    pub name:                String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationNumbersResponse {
    pub registration_numbers: Vec<RegistrationNumber>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn requests_patch_wire_shape() {
        let patch = RequestsPatch::from_diff(vec![(date("2024-06-03"), true)]);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "requests": [{ "localDate": "2024-06-03", "requested": true }] })
        );
    }

    #[test]
    fn reservations_patch_strips_free_slots() {
        let patch = ReservationsPatch::from_diff(vec![(
            date("2024-06-04"),
            vec!["".into(), "u2".into(), "".into()],
        )]);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "reservations": [{ "localDate": "2024-06-04", "userIds": ["u2"] }] })
        );
    }

    #[test]
    fn reservations_response_reads_camel_case() {
        let body = json!({
            "users": [{ "userId": "u1", "name": "Ada Lovelace" }],
            "shortLeadTimeSpaces": 2,
            "reservations": { "weeks": [{ "days": [
                { "localDate": "2024-06-03", "data": { "userIds": ["u1"] } }
            ] }] }
        });
        let response: ReservationsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.short_lead_time_spaces, 2);
        assert_eq!(response.users[0].user_id, "u1");
        let (_, day) = response.reservations.editable_days().next().unwrap();
        assert_eq!(day.edit_value(), vec!["u1".to_string()]);
    }

    #[test]
    fn daily_details_selection() {
        let body = json!({ "details": [
            { "localDate": "2024-06-01", "hidden": true },
            { "localDate": "2024-06-03", "hidden": false, "data": {
                "allocatedUsers": [{ "name": "Ada", "isHighlighted": true }],
                "interruptedUsers": [],
                "pendingUsers": [],
                "stayInterruptedStatus": { "isAllowed": true, "isSet": false }
            } },
            { "localDate": "2024-06-04", "hidden": false, "data": {
                "allocatedUsers": [], "interruptedUsers": [], "pendingUsers": [],
                "stayInterruptedStatus": { "isAllowed": false, "isSet": false }
            } }
        ] });
        let details: DailyDetailsResponse = serde_json::from_value(body).unwrap();

        assert_eq!(details.available_dates(), vec![date("2024-06-03"), date("2024-06-04")]);
        assert_eq!(details.initial_date(None), Some(date("2024-06-03")));
        assert_eq!(details.initial_date(Some(date("2024-06-04"))), Some(date("2024-06-04")));
        assert_eq!(details.initial_date(Some(date("2024-06-01"))), Some(date("2024-06-03")));

        assert!(details.data_for(date("2024-06-03")).unwrap().has_any_users());
        assert!(!details.data_for(date("2024-06-04")).unwrap().has_any_users());

        assert_eq!(
            details.toggle_stay_interrupted(date("2024-06-03")),
            Some(StayInterruptedPatch { local_date: date("2024-06-03"), stay_interrupted: true })
        );
        assert_eq!(details.toggle_stay_interrupted(date("2024-06-04")), None);
        assert_eq!(details.toggle_stay_interrupted(date("2024-06-01")), None);
    }

    #[test]
    fn summary_status_labels() {
        let day: SummaryDay =
            serde_json::from_value(json!({ "status": "hardInterrupted", "isProblem": true })).unwrap();
        assert_eq!(day.status, Some(DayStatus::HardInterrupted));
        assert_eq!(day.status.map(|s| s.label()), Some("Interrupted"));
        assert!(day.is_problem);

        let day: SummaryDay = serde_json::from_value(json!({ "status": null })).unwrap();
        assert_eq!(day.status, None);
        assert!(!day.is_problem);
    }

    #[test]
    fn user_bodies_send_nulls_for_blank_fields() {
        let body = AddUserBody {
            email_address:                   "ada@example.com".into(),
            first_name:                      "Ada".into(),
            last_name:                       "Lovelace".into(),
            registration_number:             optional_text("  "),
            alternative_registration_number: optional_text("AB12CDE"),
            commute_distance:                None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "emailAddress": "ada@example.com",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "registrationNumber": null,
                "alternativeRegistrationNumber": "AB12CDE",
                "commuteDistance": null
            })
        );
    }
}
