use parking_core::api::models::SummaryDay;
use parking_core::calendar::{CalendarDataset, Day, WeekCursor, WEEK_PARAM};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::calendar::WeekNav;
use crate::pages::{placeholder, PageProps, Remote};
use crate::utils::{day_label, push_with, query_param};
use crate::Route;

fn summary_cell(day: &Day<SummaryDay>, navigator: Option<&Navigator>) -> Html {
    let Some(summary) = day.editable() else {
        return html!(<td class="day hidden"></td>);
    };
    let (weekday, label) = day_label(day.local_date);
    let status = summary.status;

    let onclick = navigator.cloned().map(|navigator| {
        let date = day.local_date.to_string();
        Callback::from(move |_: MouseEvent| navigator.push(&Route::DailyDetails { date: date.clone() }))
    });

    html! {
        <td
            class={classes!(
                "day",
                "selectable",
                status.map(|s| s.css_class()),
                summary.is_problem.then_some("problem"),
            )}
            {onclick}
        >
            <div class="day-of-week">{ weekday }</div>
            <div class="day-date">{ label }</div>
            <div class="day-status">{ status.map(|s| s.label()).unwrap_or_default() }</div>
        </td>
    }
}

#[function_component(Home)]
pub fn home(props: &PageProps) -> Html {
    let navigator = use_navigator();
    let location  = use_location();
    let data      = use_state(|| Remote::<CalendarDataset<SummaryDay>>::Loading);
    let cursor    = use_state(WeekCursor::default);

    {
        let services = props.services.clone();
        let data     = data.clone();
        let cursor   = cursor.clone();
        let week     = query_param(location.as_ref(), WEEK_PARAM);
        use_effect_with((), move |_| {
            spawn_local(async move {
                let summary = services.api.summary().await.map(|r| r.summary);
                if let Ok(dataset) = &summary {
                    cursor.set(WeekCursor::from_query(week.as_deref(), dataset.week_count()));
                }
                data.set(Remote::from_result(summary));
            });
            || ()
        });
    }

    let on_week = {
        let cursor = cursor.clone();
        Callback::from(move |next: WeekCursor| cursor.set(next))
    };

    let on_edit = {
        let navigator = navigator.clone();
        let week = cursor.index().to_string();
        Callback::from(move |_: MouseEvent| {
            if let Some(navigator) = &navigator {
                push_with(navigator, &Route::EditRequests, WEEK_PARAM, &week);
            }
        })
    };

    if let Some(view) = placeholder("Summary", &*data, "summary") {
        return view;
    }
    let Remote::Ready(dataset) = &*data else {
        return Html::default();
    };

    let cells = cursor
        .current(dataset)
        .map(|week| week.days.iter().map(|day| summary_cell(day, navigator.as_ref())).collect::<Html>())
        .unwrap_or_default();

    html! {
        <div class="page">
            <h1>{"Summary"}</h1>

            <div class="calendar">
                <WeekNav cursor={*cursor} onchange={on_week} />
                <table class="calendar-table">
                    <tbody><tr>{ cells }</tr></tbody>
                </table>
            </div>

            <div class="actions">
                <button onclick={on_edit}>{"Edit Requests"}</button>
            </div>
        </div>
    }
}
