use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use gloo_dialogs::confirm;
use log::{error, info, warn};
use parking_core::api::models::{RequestDay, RequestsPatch, RequestsResponse, UserOption};
use parking_core::calendar::{CalendarDataset, RequestEdits, WeekCursor, WEEK_PARAM};
use parking_core::error::{ApiError, EditError};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::calendar::RequestsCalendar;
use crate::pages::{error_alert, placeholder, PageProps, Remote};
use crate::utils::{push_with, query_param, select_value};
use crate::Route;

const DISCARD_PROMPT: &str = "Discard your unsaved changes?";

/* -------------------------------------------------------------------------- */
/*                               helpers partagés                             */
/* -------------------------------------------------------------------------- */

type SharedEdits = Rc<RefCell<RequestEdits>>;

/// Loads `response` into the edit state, keeping the week the user was on.
fn adopt(
    response: Result<RequestsResponse, ApiError>,
    edits: &SharedEdits,
    cursor: &UseStateHandle<WeekCursor>,
    week: Option<&str>,
) -> Remote<Rc<CalendarDataset<RequestDay>>> {
    let dataset = match response {
        Ok(r) => r.requests,
        Err(e) => return Remote::Failed(e.to_string()),
    };
    let loaded = edits.borrow_mut().load(&dataset);
    match loaded {
        Ok(()) => {
            cursor.set(WeekCursor::from_query(week, dataset.week_count()));
            Remote::Ready(Rc::new(dataset))
        }
        Err(e) => Remote::Failed(e.to_string()),
    }
}

/// Numbers the per-user loads; only the latest one may land.
#[derive(Debug, Default)]
struct LoadTickets {
    latest: u64,
}

impl LoadTickets {
    fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest == ticket
    }
}

/// Snapshot of the diff as a PATCH body, or the reason it cannot be taken.
fn begin(edits: &SharedEdits) -> Result<RequestsPatch, EditError> {
    edits.borrow_mut().begin_save().map(RequestsPatch::from_diff)
}

/// Nothing changed: acknowledged locally, `send` is never polled.
async fn finish<F>(edits: &SharedEdits, unchanged: bool, send: F) -> Result<(), EditError>
where
    F: std::future::Future<Output = Result<RequestsResponse, ApiError>>,
{
    if unchanged {
        return edits.borrow_mut().complete_save(Ok(()));
    }
    match send.await {
        Ok(saved) => edits.borrow_mut().complete_save_with(Ok(&saved.requests)),
        Err(e) => edits.borrow_mut().complete_save_with::<RequestDay>(Err(e)),
    }
}

fn toggler(edits: &SharedEdits, redraw: &UseForceUpdateHandle) -> Callback<NaiveDate> {
    let edits = edits.clone();
    let redraw = redraw.clone();
    Callback::from(move |date: NaiveDate| {
        if let Err(e) = edits.borrow_mut().toggle(date) {
            warn!("toggle {date}: {e}");
        }
        redraw.force_update();
    })
}

/// Asks before throwing away local edits.
fn may_leave(edits: &SharedEdits) -> bool {
    !edits.borrow().is_dirty() || confirm(DISCARD_PROMPT)
}

fn save_label(edits: &SharedEdits) -> &'static str {
    if edits.borrow().is_saving() { "Saving..." } else { "Save" }
}

/* -------------------------------------------------------------------------- */
/*                              mes demandes                                  */
/* -------------------------------------------------------------------------- */

#[function_component(EditRequests)]
pub fn edit_requests(props: &PageProps) -> Html {
    let navigator = use_navigator();
    let location  = use_location();
    let data      = use_state(|| Remote::<Rc<CalendarDataset<RequestDay>>>::Loading);
    let edits     = use_mut_ref(RequestEdits::new);
    let cursor    = use_state(WeekCursor::default);
    let error     = use_state(|| None::<String>);
    let redraw    = use_force_update();

    /* -------------- chargement initial -------------- */
    {
        let services = props.services.clone();
        let data   = data.clone();
        let edits  = edits.clone();
        let cursor = cursor.clone();
        let week   = query_param(location.as_ref(), WEEK_PARAM);
        use_effect_with((), move |_| {
            spawn_local(async move {
                let response = services.api.requests().await;
                data.set(adopt(response, &edits, &cursor, week.as_deref()));
            });
            || ()
        });
    }

    let back_home = {
        let navigator = navigator.clone();
        let week = cursor.index().to_string();
        move || {
            if let Some(navigator) = &navigator {
                push_with(navigator, &Route::Home, WEEK_PARAM, &week);
            }
        }
    };

    let on_save = {
        let services  = props.services.clone();
        let edits     = edits.clone();
        let error     = error.clone();
        let redraw    = redraw.clone();
        let back_home = back_home.clone();
        Callback::from(move |_: MouseEvent| {
            let body = match begin(&edits) {
                Ok(body) => body,
                Err(e) => return error.set(Some(e.to_string())),
            };
            error.set(None);
            redraw.force_update();

            let services  = services.clone();
            let edits     = edits.clone();
            let error     = error.clone();
            let redraw    = redraw.clone();
            let back_home = back_home.clone();
            spawn_local(async move {
                let outcome = finish(&edits, body.is_empty(), services.api.edit_requests(&body)).await;
                redraw.force_update();
                match outcome {
                    Ok(()) => {
                        info!("requests saved");
                        back_home();
                    }
                    Err(e) => {
                        error!("Error saving requests: {e}");
                        error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let on_cancel = {
        let edits = edits.clone();
        Callback::from(move |_: MouseEvent| {
            if may_leave(&edits) {
                edits.borrow_mut().discard();
                back_home();
            }
        })
    };

    let on_week = {
        let cursor = cursor.clone();
        Callback::from(move |next: WeekCursor| cursor.set(next))
    };

    if let Some(view) = placeholder("Edit Requests", &*data, "data") {
        return view;
    }
    let Remote::Ready(dataset) = &*data else {
        return Html::default();
    };
    let saving = edits.borrow().is_saving();

    html! {
        <div class="page">
            <h1>{"Edit Requests"}</h1>

            <RequestsCalendar
                dataset={dataset.clone()}
                edits={edits.borrow().clone()}
                cursor={*cursor}
                on_toggle={toggler(&edits, &redraw)}
                {on_week}
            />

            { error_alert(error.as_deref()) }

            <div class="actions">
                <button onclick={on_save} disabled={saving}>{ save_label(&edits) }</button>
                <button class="secondary" onclick={on_cancel} disabled={saving}>{"Cancel"}</button>
            </div>
        </div>
    }
}

/* -------------------------------------------------------------------------- */
/*                     demandes d'un autre utilisateur                        */
/* -------------------------------------------------------------------------- */

#[function_component(OverrideRequests)]
pub fn override_requests(props: &PageProps) -> Html {
    let navigator = use_navigator();
    let users     = use_state(|| Remote::<Vec<UserOption>>::Loading);
    let selected  = use_state(String::new);
    let data      = use_state(|| None::<Remote<Rc<CalendarDataset<RequestDay>>>>);
    let edits     = use_mut_ref(RequestEdits::new);
    let cursor    = use_state(WeekCursor::default);
    let tickets   = use_mut_ref(LoadTickets::default);
    let error     = use_state(|| None::<String>);
    let redraw    = use_force_update();

    /* -------------- liste des utilisateurs -------------- */
    {
        let services = props.services.clone();
        let users = users.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let list = services.api.users_list().await.map(|r| r.users);
                users.set(Remote::from_result(list));
            });
            || ()
        });
    }

    /* -------------- demandes de l'utilisateur choisi -------------- */
    {
        let services = props.services.clone();
        let data     = data.clone();
        let edits    = edits.clone();
        let cursor   = cursor.clone();
        use_effect_with((*selected).clone(), move |user_id| {
            let user_id = user_id.clone();
            // toute réponse encore en vol devient obsolète
            let ticket = tickets.borrow_mut().issue();
            if user_id.is_empty() {
                data.set(None);
            } else {
                data.set(Some(Remote::Loading));
                spawn_local(async move {
                    let response = services.api.user_requests(&user_id).await;
                    if !tickets.borrow().is_latest(ticket) {
                        info!("dropping requests of {user_id}: another user was selected");
                        return;
                    }
                    data.set(Some(adopt(response, &edits, &cursor, None)));
                });
            }
            || ()
        });
    }

    let on_user = {
        let selected = selected.clone();
        let edits    = edits.clone();
        Callback::from(move |e: Event| {
            if may_leave(&edits) {
                selected.set(select_value(&e));
            }
        })
    };

    let home = {
        let navigator = navigator.clone();
        move || {
            if let Some(navigator) = &navigator {
                navigator.push(&Route::Home);
            }
        }
    };

    let on_save = {
        let services = props.services.clone();
        let edits    = edits.clone();
        let error    = error.clone();
        let redraw   = redraw.clone();
        let user_id  = (*selected).clone();
        let home     = home.clone();
        Callback::from(move |_: MouseEvent| {
            let body = match begin(&edits) {
                Ok(body) => body,
                Err(e) => return error.set(Some(e.to_string())),
            };
            error.set(None);
            redraw.force_update();

            let services = services.clone();
            let edits    = edits.clone();
            let error    = error.clone();
            let redraw   = redraw.clone();
            let user_id  = user_id.clone();
            let home     = home.clone();
            spawn_local(async move {
                let send = services.api.edit_user_requests(&user_id, &body);
                let outcome = finish(&edits, body.is_empty(), send).await;
                redraw.force_update();
                match outcome {
                    Ok(()) => {
                        info!("requests of {user_id} saved");
                        home();
                    }
                    Err(e) => {
                        error!("Error saving requests: {e}");
                        error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let on_cancel = {
        let edits = edits.clone();
        Callback::from(move |_: MouseEvent| {
            if may_leave(&edits) {
                edits.borrow_mut().discard();
                home();
            }
        })
    };

    let on_week = {
        let cursor = cursor.clone();
        Callback::from(move |next: WeekCursor| cursor.set(next))
    };

    if let Some(view) = placeholder("Override Requests", &*users, "users") {
        return view;
    }
    let Remote::Ready(options) = &*users else {
        return Html::default();
    };
    let saving = edits.borrow().is_saving();

    let calendar = match &*data {
        None => html!(<p>{"Select a user to view and edit their requests."}</p>),
        Some(Remote::Loading) => html!(<p class="loading">{"Loading requests..."}</p>),
        Some(Remote::Failed(message)) => html!(<p class="error">{ format!("Error loading requests: {message}") }</p>),
        Some(Remote::Ready(dataset)) => html! {
            <>
                <RequestsCalendar
                    dataset={dataset.clone()}
                    edits={edits.borrow().clone()}
                    cursor={*cursor}
                    on_toggle={toggler(&edits, &redraw)}
                    {on_week}
                />
                { error_alert(error.as_deref()) }
                <div class="actions">
                    <button onclick={on_save} disabled={saving}>{ save_label(&edits) }</button>
                    <button class="secondary" onclick={on_cancel} disabled={saving}>{"Cancel"}</button>
                </div>
            </>
        },
    };

    html! {
        <div class="page">
            <h1>{"Override Requests"}</h1>

            <label for="user-select">{"Select user"}</label>
            <select id="user-select" onchange={on_user} disabled={saving}>
                <option value="" selected={selected.is_empty()}>{"-- Select a user --"}</option>
                { for options.iter().map(|u| html! {
                    <option value={u.user_id.clone()} selected={u.user_id == *selected}>{ &u.name }</option>
                }) }
            </select>

            { calendar }
        </div>
    }
}
