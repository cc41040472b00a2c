//! Grilles hebdomadaires partagées par les écrans d'édition.

use std::rc::Rc;

use chrono::NaiveDate;
use parking_core::api::models::{RequestDay, ReservationDay, UserOption};
use parking_core::calendar::{CalendarDataset, Day, RequestEdits, ReservationEdits, WeekCursor};
use yew::prelude::*;

use crate::utils::{day_label, select_value};

/* ---------------- navigation par semaine -------------------------------- */

#[derive(Properties, PartialEq)]
pub struct WeekNavProps {
    pub cursor:   WeekCursor,
    pub onchange: Callback<WeekCursor>,
}

#[function_component(WeekNav)]
pub fn week_nav(props: &WeekNavProps) -> Html {
    let step = |forward: bool| {
        let cursor = props.cursor;
        let onchange = props.onchange.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = cursor;
            if forward {
                next.next();
            } else {
                next.previous();
            }
            onchange.emit(next);
        })
    };

    html! {
        <div class="week-nav">
            <button onclick={step(false)} disabled={!props.cursor.has_previous()}>{"Previous week"}</button>
            <span>{ format!("Week {} of {}", props.cursor.index() + 1, props.cursor.count()) }</span>
            <button onclick={step(true)} disabled={!props.cursor.has_next()}>{"Next week"}</button>
        </div>
    }
}

fn day_header(date: NaiveDate) -> Html {
    let (weekday, day) = day_label(date);
    html! {
        <>
            <div class="day-of-week">{ weekday }</div>
            <div class="day-date">{ day }</div>
        </>
    }
}

fn current_days<'a, T>(dataset: &'a CalendarDataset<T>, cursor: WeekCursor) -> &'a [Day<T>] {
    cursor.current(dataset).map(|w| w.days.as_slice()).unwrap_or_default()
}

/* ---------------- demandes (cases à cocher) ------------------------------ */

#[derive(Properties, PartialEq)]
pub struct RequestsCalendarProps {
    pub dataset:   Rc<CalendarDataset<RequestDay>>,
    pub edits:     RequestEdits,
    pub cursor:    WeekCursor,
    pub on_toggle: Callback<NaiveDate>,
    pub on_week:   Callback<WeekCursor>,
}

#[function_component(RequestsCalendar)]
pub fn requests_calendar(props: &RequestsCalendarProps) -> Html {
    let cells = current_days(&props.dataset, props.cursor).iter().map(|day| {
        if day.hidden {
            return html!(<td class="day hidden"></td>);
        }
        let date = day.local_date;
        let checked = props.edits.effective_value(date).copied().unwrap_or(false);
        let changed = props.edits.baseline_value(date).is_some_and(|b| *b != checked);
        let onclick = props.on_toggle.reform(move |_: MouseEvent| date);

        html! {
            <td class={classes!("day", "selectable", changed.then_some("changed"))} {onclick}>
                { day_header(date) }
                <input type="checkbox" class="passive" checked={checked} />
            </td>
        }
    });

    html! {
        <div class="calendar">
            <WeekNav cursor={props.cursor} onchange={props.on_week.clone()} />
            <table class="calendar-table">
                <tbody><tr>{ for cells }</tr></tbody>
            </table>
        </div>
    }
}

/* ---------------- réservations (listes déroulantes) ---------------------- */

#[derive(Properties, PartialEq)]
pub struct ReservationsCalendarProps {
    pub dataset:   Rc<CalendarDataset<ReservationDay>>,
    pub edits:     ReservationEdits,
    pub users:     Rc<Vec<UserOption>>,
    pub spaces:    usize,
    pub cursor:    WeekCursor,
    pub on_select: Callback<(NaiveDate, usize, String)>,
    pub on_week:   Callback<WeekCursor>,
}

#[function_component(ReservationsCalendar)]
pub fn reservations_calendar(props: &ReservationsCalendarProps) -> Html {
    let cells = current_days(&props.dataset, props.cursor).iter().map(|day| {
        if day.hidden {
            return html!(<td class="day hidden"></td>);
        }
        let date = day.local_date;
        let slots = props.edits.effective_value(date).cloned().unwrap_or_default();

        let selects = (0..props.spaces).map(|index| {
            let selected = slots.get(index).cloned().unwrap_or_default();
            let onchange = props
                .on_select
                .reform(move |e: Event| (date, index, select_value(&e)));

            html! {
                <select {onchange}>
                    <option value="" selected={selected.is_empty()}>{"None"}</option>
                    { for props.users.iter().map(|u| html! {
                        <option value={u.user_id.clone()} selected={u.user_id == selected}>{ &u.name }</option>
                    }) }
                </select>
            }
        });

        html! {
            <td class="day">
                { day_header(date) }
                <div class="slots">{ for selects }</div>
            </td>
        }
    });

    html! {
        <div class="calendar">
            <WeekNav cursor={props.cursor} onchange={props.on_week.clone()} />
            <table class="calendar-table">
                <tbody><tr>{ for cells }</tr></tbody>
            </table>
        </div>
    }
}
