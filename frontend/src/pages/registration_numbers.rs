use log::error;
use parking_core::api::models::RegistrationNumber;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::pages::{error_alert, PageProps};
use crate::utils::input_value;

#[derive(Clone, Debug, PartialEq)]
enum Search {
    Idle,
    Searching,
    Done(Vec<RegistrationNumber>),
}

#[function_component(RegistrationNumbers)]
pub fn registration_numbers(props: &PageProps) -> Html {
    let query  = use_state(String::new);
    let search = use_state(|| Search::Idle);
    let error  = use_state(|| None::<String>);

    let oninput = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| query.set(input_value(&e)))
    };

    let onsubmit = {
        let services = props.services.clone();
        let query    = query.clone();
        let search   = search.clone();
        let error    = error.clone();
        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            error.set(None);
            search.set(Search::Searching);

            let services = services.clone();
            let query    = (*query).clone();
            let search   = search.clone();
            let error    = error.clone();
            spawn_local(async move {
                match services.api.registration_numbers(&query).await {
                    Ok(Some(found)) => search.set(Search::Done(found.registration_numbers)),
                    // rien de cherchable après nettoyage : aucun appel
                    Ok(None) => search.set(Search::Idle),
                    Err(e) => {
                        error!("Error searching registration numbers: {e}");
                        error.set(Some(e.to_string()));
                        search.set(Search::Idle);
                    }
                }
            });
        })
    };

    let results = match &*search {
        Search::Idle => Html::default(),
        Search::Searching => html!(<p class="loading">{"Searching..."}</p>),
        Search::Done(found) if found.is_empty() => html!(<p>{"No registration numbers found."}</p>),
        Search::Done(found) => html! {
            <table class="data-table">
                <thead>
                    <tr><th>{"Registration number"}</th><th>{"Name"}</th></tr>
                </thead>
                <tbody>
                    { for found.iter().map(|r| html! {
                        <tr><td>{ &r.registration_number }</td><td>{ &r.name }</td></tr>
                    }) }
                </tbody>
            </table>
        },
    };
    let searching = *search == Search::Searching;

    html! {
        <div class="page">
            <h1>{"Registration Numbers"}</h1>

            <form {onsubmit}>
                <label for="search">{"Registration number"}</label>
                <input id="search" type="text" value={(*query).clone()} {oninput} disabled={searching} />
                <button type="submit" disabled={searching}>{"Search"}</button>
            </form>

            { error_alert(error.as_deref()) }
            { results }
        </div>
    }
}
