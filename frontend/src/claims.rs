use std::rc::Rc;

use parking_core::{ClaimsResolver, ClaimsState};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::session::{use_session_state, Services, SessionState};

#[hook]
pub fn use_claims() -> ClaimsState {
    use_context::<ClaimsState>().unwrap_or_default()
}

#[derive(Properties, PartialEq)]
pub struct ClaimsProviderProps {
    pub services: Rc<Services>,
    #[prop_or_default]
    pub children: Children,
}

/// Claims together with the session they were read for.
#[derive(Clone, Debug, Default, PartialEq)]
struct Resolved {
    session: SessionState,
    claims:  ClaimsState,
}

impl Resolved {
    /// What `current` may see: still loading while these belong to an
    /// earlier session state.
    fn visible_to(&self, current: &SessionState) -> ClaimsState {
        if self.session == *current {
            self.claims.clone()
        } else {
            ClaimsState::Loading
        }
    }
}

/// Re-reads the token claims after every session transition.
#[function_component(ClaimsProvider)]
pub fn claims_provider(props: &ClaimsProviderProps) -> Html {
    let session = use_session_state();
    let resolved = use_state(Resolved::default);
    let resolver = use_memo(props.services.clone(), |services| ClaimsResolver::new(services.session.clone()));
    // une résolution plus ancienne ne doit pas écraser la dernière
    let generation = use_mut_ref(|| 0u64);

    {
        let resolved = resolved.clone();
        use_effect_with(session, move |session| {
            *generation.borrow_mut() += 1;
            let mine = *generation.borrow();

            if session.initialized {
                let session = *session;
                spawn_local(async move {
                    let claims = resolver.resolve().await;
                    if *generation.borrow() == mine {
                        resolved.set(Resolved { session, claims: ClaimsState::Ready(claims) });
                    }
                });
            }
            || ()
        });
    }

    html! {
        <ContextProvider<ClaimsState> context={resolved.visible_to(&session)}>
            { for props.children.iter() }
        </ContextProvider<ClaimsState>>
    }
}

#[cfg(test)]
mod tests {
    use parking_core::{Claims, Permission, SessionStatus};

    use super::*;

    fn state(status: SessionStatus) -> SessionState {
        SessionState { initialized: true, status }
    }

    fn admin() -> ClaimsState {
        ClaimsState::Ready(Claims { permissions: [Permission::UserAdmin].into(), first_name: "Ada".into() })
    }

    #[test]
    fn claims_of_an_earlier_session_read_as_loading() {
        let resolved = Resolved {
            session: state(SessionStatus::Unauthenticated),
            claims:  ClaimsState::Ready(Claims::default()),
        };

        assert_eq!(resolved.visible_to(&state(SessionStatus::Authenticated)), ClaimsState::Loading);
    }

    #[test]
    fn claims_of_the_current_session_are_published() {
        let resolved = Resolved { session: state(SessionStatus::Authenticated), claims: admin() };

        assert_eq!(resolved.visible_to(&state(SessionStatus::Authenticated)), admin());
    }

    #[test]
    fn nothing_resolved_yet_is_loading() {
        assert_eq!(Resolved::default().visible_to(&SessionState::default()), ClaimsState::Loading);
    }
}
