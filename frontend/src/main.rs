use std::rc::Rc;

use parking_core::Permission;
use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod auth;
mod claims;
mod config;
mod guard;
mod layout;
mod logout;
mod pages;
mod session;
mod utils;

use crate::guard::{PermissionGuard, SessionGuard};
use crate::layout::MainLayout;
use crate::pages::{daily_details, home, misc, profile, registration_numbers, requests, reservations, users};
use crate::session::Services;

/* -------------------- routing -------------------- */

#[derive(Routable, Clone, Debug, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/set-password")]
    SetPassword,
    #[at("/forgot-password")]
    ForgotPassword,
    #[at("/reset-password")]
    ResetPassword,
    #[at("/access-denied")]
    AccessDenied,
    #[at("/registration-numbers")]
    RegistrationNumbers,
    #[at("/edit-requests")]
    EditRequests,
    #[at("/edit-reservations")]
    EditReservations,
    #[at("/override-requests")]
    OverrideRequests,
    #[at("/daily-details/:date")]
    DailyDetails { date: String },
    #[at("/profile")]
    Profile,
    #[at("/users")]
    Users,
    #[at("/users/add")]
    AddUser,
    #[at("/users/edit/:id")]
    EditUser { id: String },
    #[at("/users/delete/:id")]
    DeleteUser { id: String },
    #[not_found]
    #[at("/404")]
    NotFound,
}

/// Signed-in page inside the main layout.
fn protected(services: &Rc<Services>, page: Html) -> Html {
    html! {
        <SessionGuard>
            <MainLayout services={services.clone()}>{ page }</MainLayout>
        </SessionGuard>
    }
}

/// Same, restricted to holders of `permission`.
fn restricted(services: &Rc<Services>, permission: Permission, page: Html) -> Html {
    protected(
        services,
        html! {
            <PermissionGuard need={vec![permission]}>{ page }</PermissionGuard>
        },
    )
}

fn switch(route: Route, services: Rc<Services>) -> Html {
    let s = services.clone();
    match route {
        Route::Login => html!(<auth::Login services={s} />),
        Route::SetPassword => html!(<auth::SetPassword services={s} />),
        Route::ForgotPassword => html!(<auth::ForgotPassword services={s} />),
        Route::ResetPassword => html!(<auth::ResetPassword services={s} />),
        Route::AccessDenied => html!(<misc::AccessDenied />),
        Route::NotFound => html!(<misc::NotFound />),

        Route::Home => protected(&services, html!(<home::Home services={s} />)),
        Route::RegistrationNumbers => {
            protected(&services, html!(<registration_numbers::RegistrationNumbers services={s} />))
        }
        Route::EditRequests => protected(&services, html!(<requests::EditRequests services={s} />)),
        Route::DailyDetails { date } => {
            protected(&services, html!(<daily_details::DailyDetails services={s} {date} />))
        }
        Route::Profile => protected(&services, html!(<profile::ProfilePage services={s} />)),

        Route::EditReservations => restricted(
            &services,
            Permission::TeamLeader,
            html!(<reservations::EditReservations services={s} />),
        ),
        Route::OverrideRequests => restricted(
            &services,
            Permission::TeamLeader,
            html!(<requests::OverrideRequests services={s} />),
        ),

        Route::Users => restricted(&services, Permission::UserAdmin, html!(<users::Users services={s} />)),
        Route::AddUser => restricted(&services, Permission::UserAdmin, html!(<users::AddUser services={s} />)),
        Route::EditUser { id } => {
            restricted(&services, Permission::UserAdmin, html!(<users::EditUser services={s} {id} />))
        }
        Route::DeleteUser { id } => {
            restricted(&services, Permission::UserAdmin, html!(<users::DeleteUser services={s} {id} />))
        }
    }
}

/* -------------------- entry point ---------------- */

#[function_component(App)]
fn app() -> Html {
    let services = use_memo((), |_| config::load().and_then(|c| Services::from_config(&c)));

    match &*services {
        Err(e) => {
            log::error!("configuration: {e}");
            html!(<misc::ConfigProblem message={e.to_string()} />)
        }
        Ok(services) => {
            let for_session = services.clone();
            let for_claims  = services.clone();
            let services    = services.clone();
            html! {
                <BrowserRouter>
                    <session::SessionProvider services={for_session}>
                        <claims::ClaimsProvider services={for_claims}>
                            <Switch<Route> render={move |route| switch(route, services.clone())} />
                        </claims::ClaimsProvider>
                    </session::SessionProvider>
                </BrowserRouter>
            }
        }
    }
}

fn main() {
    utils::logger::init();
    yew::Renderer::<App>::new().render();
}
