use std::rc::Rc;

use chrono::NaiveDate;
use gloo_dialogs::confirm;
use gloo_timers::callback::Timeout;
use log::{error, info, warn};
use parking_core::api::models::{ReservationDay, ReservationsPatch, ReservationsResponse, UserOption};
use parking_core::calendar::{CalendarDataset, ReservationEdits, WeekCursor, WEEK_PARAM};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::calendar::ReservationsCalendar;
use crate::pages::{error_alert, placeholder, success_alert, PageProps, Remote};
use crate::utils::query_param;
use crate::Route;

const SUCCESS_MS: u32 = 3_000;

#[derive(Clone, PartialEq)]
struct Loaded {
    dataset: Rc<CalendarDataset<ReservationDay>>,
    users:   Rc<Vec<UserOption>>,
    spaces:  usize,
}

impl Loaded {
    fn from_response(response: ReservationsResponse) -> Self {
        Self {
            dataset: Rc::new(response.reservations),
            users:   Rc::new(response.users),
            spaces:  response.short_lead_time_spaces,
        }
    }

    /// Week shown first: the one named by the `week` parameter, else the first.
    fn opening_week(&self, week: Option<&str>) -> WeekCursor {
        WeekCursor::from_query(week, self.dataset.week_count())
    }
}

#[function_component(EditReservations)]
pub fn edit_reservations(props: &PageProps) -> Html {
    let navigator = use_navigator();
    let location  = use_location();
    let data      = use_state(|| Remote::<Loaded>::Loading);
    let edits     = use_mut_ref(ReservationEdits::new);
    let cursor    = use_state(WeekCursor::default);
    let error     = use_state(|| None::<String>);
    let saved     = use_state(|| false);
    let redraw    = use_force_update();

    {
        let services = props.services.clone();
        let data     = data.clone();
        let edits    = edits.clone();
        let cursor   = cursor.clone();
        let week     = query_param(location.as_ref(), WEEK_PARAM);
        use_effect_with((), move |_| {
            spawn_local(async move {
                let loaded = services.api.reservations().await.map_err(|e| e.to_string()).and_then(|r| {
                    edits.borrow_mut().load(&r.reservations).map_err(|e| e.to_string())?;
                    Ok(Loaded::from_response(r))
                });
                if let Ok(loaded) = &loaded {
                    cursor.set(loaded.opening_week(week.as_deref()));
                }
                data.set(Remote::from_result(loaded));
            });
            || ()
        });
    }

    let on_select = {
        let edits  = edits.clone();
        let saved  = saved.clone();
        let redraw = redraw.clone();
        Callback::from(move |(date, index, user_id): (NaiveDate, usize, String)| {
            if let Err(e) = edits.borrow_mut().set_slot(date, index, &user_id) {
                warn!("slot {index} of {date}: {e}");
            }
            saved.set(false);
            redraw.force_update();
        })
    };

    let on_save = {
        let services = props.services.clone();
        let data     = data.clone();
        let edits    = edits.clone();
        let error    = error.clone();
        let saved    = saved.clone();
        let redraw   = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            let body = match edits.borrow_mut().begin_save() {
                Ok(diff) => ReservationsPatch::from_diff(diff),
                Err(e) => return error.set(Some(e.to_string())),
            };
            error.set(None);
            saved.set(false);
            redraw.force_update();

            let services = services.clone();
            let data     = data.clone();
            let edits    = edits.clone();
            let error    = error.clone();
            let saved    = saved.clone();
            let redraw   = redraw.clone();
            spawn_local(async move {
                let outcome = if body.is_empty() {
                    edits.borrow_mut().complete_save(Ok(()))
                } else {
                    match services.api.edit_reservations(&body).await {
                        Ok(response) => {
                            let outcome = edits.borrow_mut().complete_save_with(Ok(&response.reservations));
                            if outcome.is_ok() {
                                data.set(Remote::Ready(Loaded::from_response(response)));
                            }
                            outcome
                        }
                        Err(e) => edits.borrow_mut().complete_save_with::<ReservationDay>(Err(e)),
                    }
                };
                redraw.force_update();

                match outcome {
                    Ok(()) => {
                        info!("reservations saved");
                        saved.set(true);
                        let saved = saved.clone();
                        Timeout::new(SUCCESS_MS, move || saved.set(false)).forget();
                    }
                    Err(e) => {
                        error!("Error saving reservations: {e}");
                        error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let on_cancel = {
        let edits = edits.clone();
        Callback::from(move |_: MouseEvent| {
            if !edits.borrow().is_dirty() || confirm("Discard your unsaved changes?") {
                edits.borrow_mut().discard();
                if let Some(navigator) = &navigator {
                    navigator.push(&Route::Home);
                }
            }
        })
    };

    let on_week = {
        let cursor = cursor.clone();
        Callback::from(move |next: WeekCursor| cursor.set(next))
    };

    if let Some(view) = placeholder("Edit Reservations", &*data, "reservations") {
        return view;
    }
    let Remote::Ready(loaded) = &*data else {
        return Html::default();
    };
    let saving = edits.borrow().is_saving();

    html! {
        <div class="page">
            <h1>{"Edit Reservations"}</h1>

            <ReservationsCalendar
                dataset={loaded.dataset.clone()}
                edits={edits.borrow().clone()}
                users={loaded.users.clone()}
                spaces={loaded.spaces}
                cursor={*cursor}
                {on_select}
                {on_week}
            />

            { error_alert(error.as_deref()) }
            { success_alert(*saved, "Reservations saved.") }

            <div class="actions">
                <button onclick={on_save} disabled={saving}>{ if saving { "Saving..." } else { "Save" } }</button>
                <button class="secondary" onclick={on_cancel} disabled={saving}>{"Cancel"}</button>
            </div>
        </div>
    }
}
