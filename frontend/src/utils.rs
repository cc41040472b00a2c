//! Helpers simples (formulaires, URL, navigation).

pub mod logger;

use chrono::NaiveDate;
use log::error;
use parking_core::guard::{Redirect, FROM_PARAM};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;

/* ---------------- formulaires -------------------------------------------- */

pub fn input_value(e: &InputEvent) -> String {
    e.target_unchecked_into::<HtmlInputElement>().value()
}

pub fn checkbox_value(e: &Event) -> bool {
    e.target_unchecked_into::<HtmlInputElement>().checked()
}

pub fn select_value(e: &Event) -> String {
    e.target_unchecked_into::<HtmlSelectElement>().value()
}

/// "Mon 3 Jun"
pub fn day_label(date: NaiveDate) -> (String, String) {
    (date.format("%a").to_string(), date.format("%-d %b").to_string())
}

/* ---------------- URL ---------------------------------------------------- */

/// Path plus query string of the current location, as handed to `from`.
pub fn current_location(location: Option<&Location>) -> String {
    let Some(location) = location else {
        return "/".to_string();
    };
    let query = location.query_str();
    if query.is_empty() || query == "?" {
        location.path().to_string()
    } else if query.starts_with('?') {
        format!("{}{}", location.path(), query)
    } else {
        format!("{}?{}", location.path(), query)
    }
}

pub fn query_param(location: Option<&Location>, name: &str) -> Option<String> {
    let query = location?.query_str().to_string();
    query_pairs(&query)
        .into_iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

fn query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    js_sys::decode_uri_component(&raw.replace('+', " "))
        .map(String::from)
        .unwrap_or_else(|_| raw.to_string())
}

/* ---------------- navigation --------------------------------------------- */

/// Replaces the current entry with `redirect.to`, carrying `from` along.
pub fn follow(navigator: &Navigator, redirect: &Redirect) {
    let (path, query) = redirect.to.split_once('?').unwrap_or((redirect.to.as_str(), ""));
    let route = Route::recognize(path).unwrap_or(Route::NotFound);

    let mut params = query_pairs(query);
    if let Some(from) = &redirect.from {
        params.push((FROM_PARAM.to_string(), from.clone()));
    }

    if params.is_empty() {
        navigator.replace(&route);
    } else if let Err(e) = navigator.replace_with_query(&route, &params) {
        error!("navigation vers {}: {e:?}", redirect.to);
    }
}

/// `navigator.push` with a `key=value` query, e.g. `week=2`.
pub fn push_with(navigator: &Navigator, route: &Route, key: &str, value: &str) {
    if let Err(e) = navigator.push_with_query(route, &[(key, value)]) {
        error!("navigation: {e:?}");
    }
}
