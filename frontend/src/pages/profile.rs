use gloo_timers::callback::Timeout;
use log::{error, info};
use parking_core::api::models::{optional_text, Profile};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::claims::use_claims;
use crate::pages::{error_alert, placeholder, success_alert, PageProps, Remote};
use crate::utils::{checkbox_value, input_value};

/// Text fields are kept raw while editing and normalized on save.
#[derive(Clone, Debug, Default, PartialEq)]
struct ProfileForm {
    registration_number:             String,
    alternative_registration_number: String,
    request_reminder_enabled:        bool,
    reservation_reminder_enabled:    bool,
}

impl ProfileForm {
    fn from_profile(profile: &Profile) -> Self {
        Self {
            registration_number:             profile.registration_number.clone().unwrap_or_default(),
            alternative_registration_number: profile.alternative_registration_number.clone().unwrap_or_default(),
            request_reminder_enabled:        profile.request_reminder_enabled,
            reservation_reminder_enabled:    profile.reservation_reminder_enabled,
        }
    }

    fn to_profile(&self) -> Profile {
        Profile {
            registration_number:             optional_text(&self.registration_number),
            alternative_registration_number: optional_text(&self.alternative_registration_number),
            request_reminder_enabled:        self.request_reminder_enabled,
            reservation_reminder_enabled:    self.reservation_reminder_enabled,
        }
    }
}

#[function_component(ProfilePage)]
pub fn profile_page(props: &PageProps) -> Html {
    let claims = use_claims();
    let form   = use_state(|| Remote::<ProfileForm>::Loading);
    let busy   = use_state(|| false);
    let error  = use_state(|| None::<String>);
    let saved  = use_state(|| false);

    {
        let services = props.services.clone();
        let form     = form.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let profile = services.api.profile().await;
                form.set(Remote::from_result(profile.map(|r| ProfileForm::from_profile(&r.profile))));
            });
            || ()
        });
    }

    let Remote::Ready(current) = &*form else {
        return placeholder("Profile", &*form, "profile").unwrap_or_default();
    };

    let edit = |apply: fn(&mut ProfileForm, String)| {
        let form    = form.clone();
        let current = current.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = current.clone();
            apply(&mut next, input_value(&e));
            form.set(Remote::Ready(next));
        })
    };
    let toggle = |apply: fn(&mut ProfileForm, bool)| {
        let form    = form.clone();
        let current = current.clone();
        Callback::from(move |e: Event| {
            let mut next = current.clone();
            apply(&mut next, checkbox_value(&e));
            form.set(Remote::Ready(next));
        })
    };

    let onsubmit = {
        let services = props.services.clone();
        let form     = form.clone();
        let busy     = busy.clone();
        let error    = error.clone();
        let saved    = saved.clone();
        let profile  = current.to_profile();
        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            busy.set(true);
            error.set(None);
            saved.set(false);

            let services = services.clone();
            let form     = form.clone();
            let busy     = busy.clone();
            let error    = error.clone();
            let saved    = saved.clone();
            let profile  = profile.clone();
            spawn_local(async move {
                match services.api.edit_profile(&profile).await {
                    Ok(response) => {
                        info!("profile saved");
                        form.set(Remote::Ready(ProfileForm::from_profile(&response.profile)));
                        saved.set(true);
                        let saved = saved.clone();
                        Timeout::new(3_000, move || saved.set(false)).forget();
                    }
                    Err(e) => {
                        error!("Error saving profile: {e}");
                        error.set(Some(e.to_string()));
                    }
                }
                busy.set(false);
            });
        })
    };

    let team_leader = claims.claims().is_some_and(|c| c.is_team_leader());

    html! {
        <div class="page">
            <h1>{"Profile"}</h1>

            <form {onsubmit}>
                <label for="registrationNumber">{"Registration number"}</label>
                <input
                    id="registrationNumber"
                    type="text"
                    value={current.registration_number.clone()}
                    oninput={edit(|f, v| f.registration_number = v)}
                    disabled={*busy}
                />

                <label for="alternativeRegistrationNumber">{"Alternative registration number"}</label>
                <input
                    id="alternativeRegistrationNumber"
                    type="text"
                    value={current.alternative_registration_number.clone()}
                    oninput={edit(|f, v| f.alternative_registration_number = v)}
                    disabled={*busy}
                />

                <label class="checkbox">
                    <input
                        type="checkbox"
                        checked={current.request_reminder_enabled}
                        onchange={toggle(|f, v| f.request_reminder_enabled = v)}
                        disabled={*busy}
                    />
                    {"Request reminder"}
                </label>

                if team_leader {
                    <label class="checkbox">
                        <input
                            type="checkbox"
                            checked={current.reservation_reminder_enabled}
                            onchange={toggle(|f, v| f.reservation_reminder_enabled = v)}
                            disabled={*busy}
                        />
                        {"Reservation reminder"}
                    </label>
                }

                { error_alert(error.as_deref()) }
                { success_alert(*saved, "Profile saved.") }

                <button type="submit" disabled={*busy}>
                    { if *busy { "Saving..." } else { "Save" } }
                </button>
            </form>
        </div>
    }
}
