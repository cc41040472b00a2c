use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;

#[derive(Properties, PartialEq)]
struct NoticeProps {
    title:   AttrValue,
    message: AttrValue,
}

#[function_component(Notice)]
fn notice(props: &NoticeProps) -> Html {
    let navigator = use_navigator();
    let onclick = Callback::from(move |_: MouseEvent| {
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Home);
        }
    });

    html! {
        <div class="page">
            <h1>{ props.title.clone() }</h1>
            <p>{ props.message.clone() }</p>
            <button {onclick}>{"Return to Home"}</button>
        </div>
    }
}

#[function_component(AccessDenied)]
pub fn access_denied() -> Html {
    html! {
        <Notice title="Access Denied" message="You do not have permission to view this page." />
    }
}

#[function_component(NotFound)]
pub fn not_found() -> Html {
    html! {
        <Notice title="Page Not Found" message="The page you are looking for does not exist." />
    }
}

#[derive(Properties, PartialEq)]
pub struct ConfigProblemProps {
    pub message: AttrValue,
}

/// Shown instead of the router when the build carries no usable settings.
#[function_component(ConfigProblem)]
pub fn config_problem(props: &ConfigProblemProps) -> Html {
    html! {
        <div class="page">
            <h1>{"Configuration error"}</h1>
            <p class="error">{ props.message.clone() }</p>
        </div>
    }
}
