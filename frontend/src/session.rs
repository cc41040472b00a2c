use std::ptr;
use std::rc::Rc;

use log::info;
use parking_core::api::{ApiClient, ParkingApi};
use parking_core::error::ConfigError;
use parking_core::password::PwnedPasswords;
use parking_core::session::cognito::CognitoIdentityProvider;
use parking_core::session::SessionListener;
use parking_core::{ClientConfig, SessionManager, SessionStatus};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::{Api, Breach, GlooTransport, SessionStorageTokenStore};

/* ---------------- services partagés ------------------------------------- */

/// Built once at startup and handed down as a prop.
pub struct Services {
    pub session: Rc<SessionManager>,
    pub api:     Api,
    pub breach:  Breach,
}

impl Services {
    pub fn from_config(config: &ClientConfig) -> Result<Rc<Self>, ConfigError> {
        let transport = Rc::new(GlooTransport);
        let identity = CognitoIdentityProvider::new(&config.cognito, transport.clone(), SessionStorageTokenStore)?;
        let session = Rc::new(SessionManager::new(Rc::new(identity)));

        info!("API {} / user pool {}", config.api_base_url, config.cognito.user_pool_id);
        Ok(Rc::new(Self {
            api: ParkingApi::new(ApiClient::new(&config.api_base_url, transport.clone(), session.clone())),
            breach: PwnedPasswords::new(&config.pwned_url, transport),
            session,
        }))
    }
}

// identité : il n'existe qu'une instance
impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

/* ---------------- état publié ------------------------------------------- */

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionState {
    pub initialized: bool,
    pub status:      SessionStatus,
}

/* ---------------- hook pratique -------------------- */
#[hook]
pub fn use_session_state() -> SessionState {
    use_context::<SessionState>().unwrap_or_default()
}

/* -------------- props du provider ----------------- */
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub services: Rc<Services>,
    #[prop_or_default]
    pub children: Children,
}

/* -------------- provider global ------------------- */
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let state = use_state(SessionState::default);

    {
        let state = state.clone();
        use_effect_with(props.services.clone(), move |services| {
            let session = services.session.clone();

            let listener: SessionListener = {
                let state = state.clone();
                let weak = Rc::downgrade(&session);
                Rc::new(move |status: SessionStatus| {
                    let initialized = weak.upgrade().is_some_and(|s| s.is_initialized());
                    state.set(SessionState { initialized, status });
                })
            };
            let id = session.subscribe(listener);

            {
                let session = session.clone();
                spawn_local(async move {
                    session.initialize().await;
                    state.set(SessionState { initialized: true, status: session.status() });
                });
            }

            move || session.unsubscribe(id)
        });
    }

    html! {
        <ContextProvider<SessionState> context={*state}>
            { for props.children.iter() }
        </ContextProvider<SessionState>>
    }
}
