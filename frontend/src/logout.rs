use std::rc::Rc;

use yew::prelude::*;
use yew_router::prelude::*;

use crate::session::Services;
use crate::Route;

#[derive(Properties, PartialEq)]
pub struct LogoutProps {
    pub services: Rc<Services>,
}

#[function_component(Logout)]
pub fn logout(props: &LogoutProps) -> Html {
    let navigator = use_navigator();
    let services = props.services.clone();

    let onclick = Callback::from(move |_| {
        let navigator = navigator.clone();
        let services = services.clone();

        wasm_bindgen_futures::spawn_local(async move {
            // statut local déjà Unauthenticated au retour, même si Cognito échoue
            services.session.logout().await;

            if let Some(navigator) = navigator {
                navigator.push(&Route::Login);
            }
        });
    });

    html! { <button class="logout" {onclick}>{ "Logout" }</button> }
}
