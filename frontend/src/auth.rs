use parking_core::guard::{
    reset_page_guard, GuardDecision, LoginFlow, Redirect, FROM_PARAM, HOME_PATH, IDENTIFIER_PARAM,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::{error_alert, PageProps};
use crate::session::use_session_state;
use crate::utils::{follow, input_value, push_with, query_param};
use crate::Route;

fn value_of(node: &NodeRef) -> String {
    node.cast::<HtmlInputElement>().map(|i| i.value()).unwrap_or_default()
}

/* -------------------------------------------------------------------------- */
/*                               composant login                               */
/* -------------------------------------------------------------------------- */

#[function_component(Login)]
pub fn login(props: &PageProps) -> Html {
    let navigator    = use_navigator();
    let location     = use_location();
    let session      = use_session_state();
    let username_ref = use_node_ref();
    let password_ref = use_node_ref();
    let busy         = use_state(|| false);
    let flow = {
        let from = query_param(location.as_ref(), FROM_PARAM);
        use_state(move || LoginFlow::new(from.as_deref()))
    };

    /* ------------- déjà connecté : on repart vers `from` ----------------- */
    {
        let flow = flow.clone();
        let navigator = navigator.clone();
        use_effect_with(session, move |session| {
            if session.initialized {
                let mut next = (*flow).clone();
                if let (Some(redirect), Some(navigator)) = (next.on_visit(session.status), navigator) {
                    follow(&navigator, &redirect);
                }
                flow.set(next);
            }
            || ()
        });
    }

    /* ------------------ callback du <form onsubmit=…> --------------------- */
    let onsubmit = {
        let services     = props.services.clone();
        let username_ref = username_ref.clone();
        let password_ref = password_ref.clone();
        let flow         = flow.clone();
        let busy         = busy.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            if *busy {
                return;
            }
            busy.set(true);

            let username  = value_of(&username_ref);
            let password  = value_of(&password_ref);
            let services  = services.clone();
            let flow      = flow.clone();
            let busy      = busy.clone();
            let navigator = navigator.clone();

            spawn_local(async move {
                let outcome = services.session.login(&username, &password).await;

                let mut next = (*flow).clone();
                let redirect = next.on_sign_in(outcome);
                flow.set(next);
                busy.set(false);

                if let (Some(redirect), Some(navigator)) = (redirect, navigator) {
                    follow(&navigator, &redirect);
                }
            });
        })
    };

    html! {
        <div class="auth-container">
            <h1>{"Login"}</h1>

            <form {onsubmit}>
                <label for="username">{"Username"}</label>
                <input id="username" ref={username_ref} type="text" required=true disabled={*busy} />
                <label for="password">{"Password"}</label>
                <input id="password" ref={password_ref} type="password" required=true disabled={*busy} />

                { error_alert(flow.error()) }

                <button type="submit" disabled={*busy}>
                    { if *busy { "Logging in..." } else { "Login" } }
                </button>
                <Link<Route> to={Route::ForgotPassword}>{"Forgot password?"}</Link<Route>>
            </form>
        </div>
    }
}

/* -------------------------------------------------------------------------- */
/*                     nouveau mot de passe imposé (challenge)                 */
/* -------------------------------------------------------------------------- */

#[function_component(SetPassword)]
pub fn set_password(props: &PageProps) -> Html {
    let navigator   = use_navigator();
    let location    = use_location();
    let new_ref     = use_node_ref();
    let confirm_ref = use_node_ref();
    let busy        = use_state(|| false);
    let flow = {
        let from = query_param(location.as_ref(), FROM_PARAM);
        use_state(move || LoginFlow::new(from.as_deref()))
    };

    let onsubmit = {
        let services    = props.services.clone();
        let new_ref     = new_ref.clone();
        let confirm_ref = confirm_ref.clone();
        let flow        = flow.clone();
        let busy        = busy.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            if *busy {
                return;
            }
            busy.set(true);

            let new_password = value_of(&new_ref);
            let confirmation = value_of(&confirm_ref);
            let services     = services.clone();
            let flow         = flow.clone();
            let busy         = busy.clone();
            let navigator    = navigator.clone();

            spawn_local(async move {
                let outcome = services
                    .session
                    .set_new_password(&new_password, &confirmation, &services.breach)
                    .await;

                let mut next = (*flow).clone();
                let redirect = next.on_challenge(outcome);
                flow.set(next);
                busy.set(false);

                if let (Some(redirect), Some(navigator)) = (redirect, navigator) {
                    follow(&navigator, &redirect);
                }
            });
        })
    };

    html! {
        <div class="auth-container">
            <h1>{"Set New Password"}</h1>
            <p>{"You need to set a new password for your account."}</p>

            <form {onsubmit}>
                <label for="newPassword">{"New Password"}</label>
                <input id="newPassword" ref={new_ref} type="password" required=true disabled={*busy} />
                <label for="confirmPassword">{"Confirm Password"}</label>
                <input id="confirmPassword" ref={confirm_ref} type="password" required=true disabled={*busy} />

                { error_alert(flow.error()) }

                <button type="submit" disabled={*busy}>
                    { if *busy { "Setting password..." } else { "Set Password" } }
                </button>
            </form>
        </div>
    }
}

/* -------------------------------------------------------------------------- */
/*                               mot de passe oublié                           */
/* -------------------------------------------------------------------------- */

#[function_component(ForgotPassword)]
pub fn forgot_password(props: &PageProps) -> Html {
    let navigator = use_navigator();
    let username  = use_state(String::new);
    let error     = use_state(|| None::<String>);
    let busy      = use_state(|| false);

    let oninput = {
        let username = username.clone();
        Callback::from(move |e: InputEvent| username.set(input_value(&e)))
    };

    let onsubmit = {
        let services = props.services.clone();
        let username = username.clone();
        let error    = error.clone();
        let busy     = busy.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            error.set(None);
            busy.set(true);

            let identifier = username.trim().to_string();
            let services   = services.clone();
            let error      = error.clone();
            let busy       = busy.clone();
            let navigator  = navigator.clone();

            spawn_local(async move {
                let outcome = services.session.request_password_reset(&identifier).await;
                busy.set(false);
                match (outcome, navigator) {
                    (Ok(()), Some(navigator)) => {
                        push_with(&navigator, &Route::ResetPassword, IDENTIFIER_PARAM, &identifier)
                    }
                    (Ok(()), None) => {}
                    (Err(e), _) => error.set(Some(e.to_string())),
                }
            });
        })
    };

    html! {
        <div class="auth-container">
            <h1>{"Forgot Password"}</h1>
            <p>{"Enter your username and we'll send you a code to reset your password."}</p>

            <form {onsubmit}>
                <label for="username">{"Username"}</label>
                <input id="username" type="text" value={(*username).clone()} {oninput} required=true disabled={*busy} />

                { error_alert(error.as_deref()) }

                <button type="submit" disabled={*busy}>
                    { if *busy { "Sending code..." } else { "Send Reset Code" } }
                </button>
                <Link<Route> to={Route::Login}>{"Back to Login"}</Link<Route>>
            </form>
        </div>
    }
}

/* -------------------------------------------------------------------------- */
/*                          saisie du code de réinitialisation                 */
/* -------------------------------------------------------------------------- */

#[function_component(ResetPassword)]
pub fn reset_password(props: &PageProps) -> Html {
    let navigator   = use_navigator();
    let location    = use_location();
    let identifier  = query_param(location.as_ref(), IDENTIFIER_PARAM);
    let code_ref    = use_node_ref();
    let new_ref     = use_node_ref();
    let confirm_ref = use_node_ref();
    let error       = use_state(|| None::<String>);
    let busy        = use_state(|| false);

    let decision = reset_page_guard(identifier.as_deref());
    {
        let navigator = navigator.clone();
        use_effect_with(decision.clone(), move |decision| {
            if let (GuardDecision::Redirect(redirect), Some(navigator)) = (decision, navigator) {
                follow(&navigator, redirect);
            }
            || ()
        });
    }

    let onsubmit = {
        let services    = props.services.clone();
        let identifier  = identifier.clone().unwrap_or_default();
        let code_ref    = code_ref.clone();
        let new_ref     = new_ref.clone();
        let confirm_ref = confirm_ref.clone();
        let error       = error.clone();
        let busy        = busy.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            error.set(None);
            busy.set(true);

            let code         = value_of(&code_ref);
            let new_password = value_of(&new_ref);
            let confirmation = value_of(&confirm_ref);
            let identifier   = identifier.clone();
            let services     = services.clone();
            let error        = error.clone();
            let busy         = busy.clone();
            let navigator    = navigator.clone();

            spawn_local(async move {
                let outcome = services
                    .session
                    .reset_password(&identifier, code.trim(), &new_password, &confirmation, &services.breach)
                    .await;
                busy.set(false);
                match (outcome, navigator) {
                    (Ok(()), Some(navigator)) => follow(&navigator, &Redirect::to(HOME_PATH)),
                    (Ok(()), None) => {}
                    (Err(e), _) => error.set(Some(e.to_string())),
                }
            });
        })
    };

    if decision != GuardDecision::Render {
        return Html::default();
    }

    html! {
        <div class="auth-container">
            <h1>{"Reset Password"}</h1>
            <p>{ format!("Enter the code sent to {} and choose a new password.", identifier.unwrap_or_default()) }</p>

            <form {onsubmit}>
                <label for="code">{"Verification Code"}</label>
                <input id="code" ref={code_ref} type="text" required=true disabled={*busy} />
                <label for="newPassword">{"New Password"}</label>
                <input id="newPassword" ref={new_ref} type="password" required=true disabled={*busy} />
                <label for="confirmPassword">{"Confirm Password"}</label>
                <input id="confirmPassword" ref={confirm_ref} type="password" required=true disabled={*busy} />

                { error_alert(error.as_deref()) }

                <button type="submit" disabled={*busy}>
                    { if *busy { "Resetting password..." } else { "Reset Password" } }
                </button>
                <Link<Route> to={Route::Login}>{"Back to Login"}</Link<Route>>
            </form>
        </div>
    }
}
