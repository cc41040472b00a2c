//! Typed endpoints of the parking API.

use crate::api::models::{
    AddUserBody, DailyDetailsResponse, EditUserBody, Profile, ProfileResponse,
    RegistrationNumbersResponse, RequestsPatch, RequestsResponse, ReservationsPatch,
    ReservationsResponse, StayInterruptedPatch, SummaryResponse, UserResponse, UsersListResponse,
    UsersResponse,
};
use crate::api::{ApiClient, HttpTransport, TokenSource};
use crate::error::ApiError;

pub struct ParkingApi<T, S> {
    client: ApiClient<T, S>,
}

impl<T: HttpTransport, S: TokenSource> ParkingApi<T, S> {
    pub fn new(client: ApiClient<T, S>) -> Self {
        Self { client }
    }

    /* ---------- demandes ---------- */

    pub async fn requests(&self) -> Result<RequestsResponse, ApiError> {
        self.client.get("requests").await
    }

    pub async fn edit_requests(&self, body: &RequestsPatch) -> Result<RequestsResponse, ApiError> {
        self.client.patch("requests", body).await
    }

    pub async fn user_requests(&self, user_id: &str) -> Result<RequestsResponse, ApiError> {
        self.client.get(&format!("requests/{user_id}")).await
    }

    pub async fn edit_user_requests(
        &self,
        user_id: &str,
        body: &RequestsPatch,
    ) -> Result<RequestsResponse, ApiError> {
        self.client.patch(&format!("requests/{user_id}"), body).await
    }

    /* ---------- réservations ---------- */

    pub async fn reservations(&self) -> Result<ReservationsResponse, ApiError> {
        self.client.get("reservations").await
    }

    pub async fn edit_reservations(
        &self,
        body: &ReservationsPatch,
    ) -> Result<ReservationsResponse, ApiError> {
        self.client.patch("reservations", body).await
    }

    /* ---------- utilisateurs ---------- */

    pub async fn users(&self) -> Result<UsersResponse, ApiError> {
        self.client.get("users").await
    }

    pub async fn user(&self, user_id: &str) -> Result<UserResponse, ApiError> {
        self.client.get(&format!("users/{user_id}")).await
    }

    pub async fn add_user(&self, body: &AddUserBody) -> Result<UserResponse, ApiError> {
        self.client.post("users", body).await
    }

    pub async fn edit_user(&self, user_id: &str, body: &EditUserBody) -> Result<UserResponse, ApiError> {
        self.client.patch(&format!("users/{user_id}"), body).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("users/{user_id}")).await
    }

    pub async fn users_list(&self) -> Result<UsersListResponse, ApiError> {
        self.client.get("usersList").await
    }

    /* ---------- détail journalier ---------- */

    pub async fn daily_details(&self) -> Result<DailyDetailsResponse, ApiError> {
        self.client.get("dailyDetails").await
    }

    pub async fn stay_interrupted(&self, body: &StayInterruptedPatch) -> Result<DailyDetailsResponse, ApiError> {
        self.client.patch("dailyDetails", body).await
    }

    /* ---------- profil, synthèse ---------- */

    pub async fn profile(&self) -> Result<ProfileResponse, ApiError> {
        self.client.get("profiles").await
    }

    pub async fn edit_profile(&self, profile: &Profile) -> Result<ProfileResponse, ApiError> {
        self.client.patch("profiles", profile).await
    }

    pub async fn summary(&self) -> Result<SummaryResponse, ApiError> {
        self.client.get("summary").await
    }

    /// Searches registration numbers; `Ok(None)` when nothing searchable is
    /// left after sanitizing, in which case no request is made.
    pub async fn registration_numbers(
        &self,
        search: &str,
    ) -> Result<Option<RegistrationNumbersResponse>, ApiError> {
        let search = sanitize_search(search);
        if search.is_empty() {
            return Ok(None);
        }
        self.client.get(&format!("registrationNumbers/{search}")).await.map(Some)
    }
}

/// Keeps ASCII letters and digits only.
pub fn sanitize_search(search: &str) -> String {
    search.chars().filter(char::is_ascii_alphanumeric).collect()
}
