use std::rc::Rc;

use parking_core::Claims;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::claims::use_claims;
use crate::logout;
use crate::session::Services;
use crate::Route;

#[derive(Properties, PartialEq)]
pub struct MainLayoutProps {
    pub services: Rc<Services>,
    #[prop_or_default]
    pub children: Children,
}

/// Entries shown to everyone, then the ones gated on a permission.
fn nav_items(claims: &Claims) -> Vec<(Route, &'static str)> {
    let mut items = vec![(Route::Home, "Home"), (Route::RegistrationNumbers, "Registration Numbers")];
    if claims.is_team_leader() {
        items.push((Route::EditReservations, "Edit Reservations"));
        items.push((Route::OverrideRequests, "Override Requests"));
    }
    if claims.is_user_admin() {
        items.push((Route::Users, "Users"));
    }
    items
}

#[function_component(MainLayout)]
pub fn main_layout(props: &MainLayoutProps) -> Html {
    let claims = use_claims();
    let claims = claims.claims().cloned().unwrap_or_default();

    let profile_label = if claims.first_name.is_empty() {
        "Profile".to_string()
    } else {
        claims.first_name.clone()
    };

    html! {
        <>
            <header class="header">
                <div class="header-title">{"Parking"}</div>
                <div class="header-logout">
                    <logout::Logout services={props.services.clone()} />
                </div>
            </header>

            <nav class="nav">
                <ul class="nav-list">
                    { for nav_items(&claims).into_iter().map(|(route, label)| html! {
                        <li class="nav-item"><Link<Route> to={route}>{ label }</Link<Route>></li>
                    }) }
                    <li class="nav-item nav-profile"><Link<Route> to={Route::Profile}>{ profile_label }</Link<Route>></li>
                </ul>
            </nav>

            <main class="main-content">
                { for props.children.iter() }
            </main>
        </>
    }
}
