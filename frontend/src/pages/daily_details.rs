use std::rc::Rc;

use chrono::NaiveDate;
use log::{error, info};
use parking_core::api::models::{DailyDetailsResponse, DailyUser};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::pages::{error_alert, placeholder, Remote};
use crate::session::Services;
use crate::utils::{day_label, input_value};

#[derive(Properties, PartialEq)]
pub struct DailyDetailsProps {
    pub services: Rc<Services>,
    /// Date from the URL; anything unparsable falls back to the first day.
    pub date: String,
}

fn user_list(title: &str, users: &[DailyUser]) -> Html {
    if users.is_empty() {
        return Html::default();
    }
    html! {
        <section class="daily-users">
            <h2>{ title }</h2>
            <ul>
                { for users.iter().map(|u| if u.is_highlighted {
                    html!(<li><strong>{ &u.name }</strong></li>)
                } else {
                    html!(<li>{ &u.name }</li>)
                }) }
            </ul>
        </section>
    }
}

#[function_component(DailyDetails)]
pub fn daily_details(props: &DailyDetailsProps) -> Html {
    let data     = use_state(|| Remote::<DailyDetailsResponse>::Loading);
    let selected = use_state(|| None::<NaiveDate>);
    let busy     = use_state(|| false);
    let error    = use_state(|| None::<String>);

    {
        let services = props.services.clone();
        let data     = data.clone();
        let selected = selected.clone();
        use_effect_with(props.date.clone(), move |date| {
            let requested = date.parse::<NaiveDate>().ok();
            spawn_local(async move {
                let details = services.api.daily_details().await;
                if let Ok(details) = &details {
                    selected.set(details.initial_date(requested));
                }
                data.set(Remote::from_result(details));
            });
            || ()
        });
    }

    if let Some(view) = placeholder("Daily Details", &*data, "details") {
        return view;
    }
    let Remote::Ready(details) = &*data else {
        return Html::default();
    };

    let available = details.available_dates();
    let Some(date) = *selected else {
        return html! {
            <div class="page">
                <h1>{"Daily Details"}</h1>
                <p>{"There are no dates to show."}</p>
            </div>
        };
    };

    let on_date = {
        let selected  = selected.clone();
        let available = available.clone();
        Callback::from(move |e: InputEvent| {
            if let Ok(date) = input_value(&e).parse::<NaiveDate>() {
                if available.contains(&date) {
                    selected.set(Some(date));
                }
            }
        })
    };

    let on_toggle = details.toggle_stay_interrupted(date).map(|patch| {
        let services = props.services.clone();
        let data     = data.clone();
        let busy     = busy.clone();
        let error    = error.clone();
        Callback::from(move |_: MouseEvent| {
            if *busy {
                return;
            }
            busy.set(true);
            error.set(None);

            let services = services.clone();
            let data     = data.clone();
            let busy     = busy.clone();
            let error    = error.clone();
            let patch    = patch.clone();
            spawn_local(async move {
                match services.api.stay_interrupted(&patch).await {
                    Ok(details) => {
                        info!("stay interrupted on {} set to {}", patch.local_date, patch.stay_interrupted);
                        data.set(Remote::Ready(details));
                    }
                    Err(e) => {
                        error!("Error updating {}: {e}", patch.local_date);
                        error.set(Some(e.to_string()));
                    }
                }
                busy.set(false);
            });
        })
    });

    let data_for_day = details.data_for(date).cloned().unwrap_or_default();
    let (weekday, label) = day_label(date);
    let min = available.first().map(|d| d.to_string()).unwrap_or_default();
    let max = available.last().map(|d| d.to_string()).unwrap_or_default();

    let body = if data_for_day.has_any_users() {
        html! {
            <>
                { user_list("Allocated", &data_for_day.allocated_users) }
                { user_list("Interrupted", &data_for_day.interrupted_users) }
                { user_list("Pending", &data_for_day.pending_users) }
            </>
        }
    } else {
        html!(<p>{"There are no requests for the selected date."}</p>)
    };

    let stay_button = match (on_toggle, data_for_day.stay_interrupted_status) {
        (Some(onclick), Some(status)) => html! {
            <div class="actions">
                <button {onclick} disabled={*busy}>
                    { if status.is_set { "Re-request space" } else { "Stay interrupted" } }
                </button>
            </div>
        },
        _ => Html::default(),
    };

    html! {
        <div class="page">
            <h1>{ format!("Daily Details: {weekday} {label}") }</h1>

            <input type="date" value={date.to_string()} {min} {max} oninput={on_date} />

            { body }
            { error_alert(error.as_deref()) }
            { stay_button }
        </div>
    }
}
