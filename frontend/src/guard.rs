use parking_core::guard::{permission_guard, session_guard, GuardDecision, RequireMode};
use parking_core::Permission;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::claims::use_claims;
use crate::session::use_session_state;
use crate::utils::{current_location, follow};

/// Applies a decision: children, nothing yet, or a redirect.
#[hook]
fn use_decision(decision: GuardDecision) -> GuardDecision {
    let navigator = use_navigator();

    use_effect_with(decision.clone(), move |decision| {
        if let (GuardDecision::Redirect(redirect), Some(navigator)) = (decision, navigator) {
            follow(&navigator, redirect);
        }
        || ()
    });

    decision
}

fn render(decision: GuardDecision, children: &Children) -> Html {
    match decision {
        GuardDecision::Render => html! { <>{ for children.iter() }</> },
        GuardDecision::Suspend | GuardDecision::Redirect(_) => Html::default(),
    }
}

/* ---------------- session ----------------------------------------------- */

#[derive(Properties, PartialEq)]
pub struct SessionGuardProps {
    #[prop_or_default]
    pub children: Children,
}

#[function_component(SessionGuard)]
pub fn session_guard_view(props: &SessionGuardProps) -> Html {
    let session = use_session_state();
    let location = use_location();
    let here = current_location(location.as_ref());

    let decision = use_decision(session_guard(session.initialized, session.status, &here));
    render(decision, &props.children)
}

/* ---------------- permissions ------------------------------------------- */

#[derive(Properties, PartialEq)]
pub struct PermissionGuardProps {
    pub need: Vec<Permission>,
    #[prop_or_default]
    pub mode: RequireMode,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(PermissionGuard)]
pub fn permission_guard_view(props: &PermissionGuardProps) -> Html {
    let claims = use_claims();

    let decision = use_decision(permission_guard(&claims, &props.need, props.mode));
    render(decision, &props.children)
}

#[cfg(test)]
mod tests {
    use parking_core::guard::Redirect;

    use super::*;

    #[test]
    fn undecided_guard_renders_nothing() {
        let children = Children::default();
        assert!(render(GuardDecision::Suspend, &children) == Html::default());
        assert!(render(GuardDecision::Redirect(Redirect::to("/login")), &children) == Html::default());
    }
}
