//! Écrans de l'application. Toute décision est déléguée à `parking_core`.

pub mod calendar;
pub mod daily_details;
pub mod home;
pub mod misc;
pub mod profile;
pub mod registration_numbers;
pub mod requests;
pub mod reservations;
pub mod users;

use std::rc::Rc;

use yew::prelude::*;

use crate::session::Services;

#[derive(Properties, PartialEq)]
pub struct PageProps {
    pub services: Rc<Services>,
}

/// Page-level load state of one remote resource.
#[derive(Clone, Debug, PartialEq)]
pub enum Remote<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> Remote<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Remote::Ready(value),
            Err(e) => Remote::Failed(e.to_string()),
        }
    }
}

pub fn error_alert(message: Option<&str>) -> Html {
    match message {
        Some(message) => html!(<div class="alert alert-error">{ message }</div>),
        None => Html::default(),
    }
}

pub fn success_alert(visible: bool, message: &str) -> Html {
    if visible {
        html!(<div class="alert alert-success">{ message }</div>)
    } else {
        Html::default()
    }
}

/// Title plus the loading / error placeholders every page shares.
pub fn placeholder<T>(title: &str, remote: &Remote<T>, what: &str) -> Option<Html> {
    match remote {
        Remote::Loading => Some(html! {
            <div class="page">
                <h1>{ title }</h1>
                <p class="loading">{ format!("Loading {what}...") }</p>
            </div>
        }),
        Remote::Failed(message) => Some(html! {
            <div class="page">
                <h1>{ title }</h1>
                <p class="error">{ format!("Error loading {what}: {message}") }</p>
            </div>
        }),
        Remote::Ready(_) => None,
    }
}
