//! Administration des utilisateurs (liste, ajout, modification, suppression).

use std::rc::Rc;

use log::{error, info};
use parking_core::api::models::{optional_text, AddUserBody, EditUserBody, User};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::{error_alert, placeholder, PageProps, Remote};
use crate::session::Services;
use crate::utils::input_value;
use crate::Route;

#[derive(Properties, PartialEq)]
pub struct UserPageProps {
    pub services: Rc<Services>,
    pub id:       String,
}

fn back_to_users(navigator: &Option<Navigator>) {
    if let Some(navigator) = navigator {
        navigator.push(&Route::Users);
    }
}

/* ---------------- formulaire --------------------------------------------- */

#[derive(Clone, Debug, Default, PartialEq)]
struct UserForm {
    email_address:                   String,
    confirm_email_address:           String,
    first_name:                      String,
    last_name:                       String,
    registration_number:             String,
    alternative_registration_number: String,
    commute_distance:                String,
}

impl UserForm {
    fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            registration_number: user.registration_number.clone().unwrap_or_default(),
            alternative_registration_number: user.alternative_registration_number.clone().unwrap_or_default(),
            commute_distance: user.commute_distance.map(|d| d.to_string()).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Blank is "not set"; anything else must be a number.
    fn commute_distance(&self) -> Result<Option<f64>, String> {
        let raw = self.commute_distance.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| "Commute distance must be a number".to_string())
    }

    fn check_names(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First and last name are required".into());
        }
        Ok(())
    }

    fn to_add_body(&self) -> Result<AddUserBody, String> {
        let email = self.email_address.trim();
        if email.is_empty() {
            return Err("Email address is required".into());
        }
        if email != self.confirm_email_address.trim() {
            return Err("Email addresses do not match".into());
        }
        self.check_names()?;
        Ok(AddUserBody {
            email_address:                   email.to_string(),
            first_name:                      self.first_name.trim().to_string(),
            last_name:                       self.last_name.trim().to_string(),
            registration_number:             optional_text(&self.registration_number),
            alternative_registration_number: optional_text(&self.alternative_registration_number),
            commute_distance:                self.commute_distance()?,
        })
    }

    fn to_edit_body(&self) -> Result<EditUserBody, String> {
        self.check_names()?;
        Ok(EditUserBody {
            first_name:                      self.first_name.trim().to_string(),
            last_name:                       self.last_name.trim().to_string(),
            registration_number:             optional_text(&self.registration_number),
            alternative_registration_number: optional_text(&self.alternative_registration_number),
            commute_distance:                self.commute_distance()?,
        })
    }
}

#[derive(Properties, PartialEq)]
struct UserFieldsProps {
    form:       UserForm,
    with_email: bool,
    busy:       bool,
    onchange:   Callback<UserForm>,
}

#[function_component(UserFields)]
fn user_fields(props: &UserFieldsProps) -> Html {
    let field = |id: &'static str, label: &'static str, value: &str, apply: fn(&mut UserForm, String)| {
        let form = props.form.clone();
        let onchange = props.onchange.clone();
        let oninput = Callback::from(move |e: InputEvent| {
            let mut next = form.clone();
            apply(&mut next, input_value(&e));
            onchange.emit(next);
        });
        html! {
            <>
                <label for={id}>{ label }</label>
                <input id={id} type="text" value={value.to_string()} {oninput} disabled={props.busy} />
            </>
        }
    };
    let form = &props.form;

    html! {
        <>
            if props.with_email {
                { field("emailAddress", "Email address", &form.email_address, |f, v| f.email_address = v) }
                { field("confirmEmailAddress", "Confirm email address", &form.confirm_email_address, |f, v| f.confirm_email_address = v) }
            }
            { field("firstName", "First name", &form.first_name, |f, v| f.first_name = v) }
            { field("lastName", "Last name", &form.last_name, |f, v| f.last_name = v) }
            { field("registrationNumber", "Registration number", &form.registration_number, |f, v| f.registration_number = v) }
            { field("alternativeRegistrationNumber", "Alternative registration number", &form.alternative_registration_number, |f, v| f.alternative_registration_number = v) }
            { field("commuteDistance", "Commute distance", &form.commute_distance, |f, v| f.commute_distance = v) }
        </>
    }
}

/* ---------------- liste ------------------------------------------------- */

#[function_component(Users)]
pub fn users(props: &PageProps) -> Html {
    let data = use_state(|| Remote::<Vec<User>>::Loading);

    {
        let services = props.services.clone();
        let data     = data.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let users = services.api.users().await.map(|r| r.users);
                data.set(Remote::from_result(users));
            });
            || ()
        });
    }

    if let Some(view) = placeholder("Users", &*data, "users") {
        return view;
    }
    let Remote::Ready(users) = &*data else {
        return Html::default();
    };

    html! {
        <div class="page">
            <h1>{"Users"}</h1>

            <div class="actions">
                <Link<Route> to={Route::AddUser} classes="button">{"Add user"}</Link<Route>>
            </div>

            <table class="data-table">
                <thead>
                    <tr>
                        <th>{"Name"}</th>
                        <th>{"Registration number"}</th>
                        <th>{"Alternative registration number"}</th>
                        <th>{"Commute distance"}</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    { for users.iter().map(|u| html! {
                        <tr>
                            <td>{ u.full_name() }</td>
                            <td>{ u.registration_number.clone().unwrap_or_default() }</td>
                            <td>{ u.alternative_registration_number.clone().unwrap_or_default() }</td>
                            <td>{ u.commute_distance.map(|d| d.to_string()).unwrap_or_default() }</td>
                            <td class="row-actions">
                                <Link<Route> to={Route::EditUser { id: u.user_id.clone() }}>{"Edit"}</Link<Route>>
                                <Link<Route> to={Route::DeleteUser { id: u.user_id.clone() }}>{"Delete"}</Link<Route>>
                            </td>
                        </tr>
                    }) }
                </tbody>
            </table>
        </div>
    }
}

/* ---------------- ajout ------------------------------------------------- */

#[function_component(AddUser)]
pub fn add_user(props: &PageProps) -> Html {
    let navigator = use_navigator();
    let form      = use_state(UserForm::default);
    let busy      = use_state(|| false);
    let error     = use_state(|| None::<String>);

    let onchange = {
        let form = form.clone();
        Callback::from(move |next: UserForm| form.set(next))
    };

    let onsubmit = {
        let services = props.services.clone();
        let form     = form.clone();
        let busy     = busy.clone();
        let error    = error.clone();
        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            let body = match form.to_add_body() {
                Ok(body) => body,
                Err(message) => return error.set(Some(message)),
            };
            busy.set(true);
            error.set(None);

            let services  = services.clone();
            let busy      = busy.clone();
            let error     = error.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                match services.api.add_user(&body).await {
                    Ok(response) => {
                        info!("user {} added", response.user.user_id);
                        back_to_users(&navigator);
                    }
                    Err(e) => {
                        error!("Error adding user: {e}");
                        error.set(Some(e.to_string()));
                        busy.set(false);
                    }
                }
            });
        })
    };

    html! {
        <div class="page">
            <h1>{"Add User"}</h1>

            <form {onsubmit}>
                <UserFields form={(*form).clone()} with_email=true busy={*busy} {onchange} />

                { error_alert(error.as_deref()) }

                <button type="submit" disabled={*busy}>{ if *busy { "Saving..." } else { "Save" } }</button>
                <Link<Route> to={Route::Users}>{"Cancel"}</Link<Route>>
            </form>
        </div>
    }
}

/* ---------------- modification ------------------------------------------ */

#[function_component(EditUser)]
pub fn edit_user(props: &UserPageProps) -> Html {
    let navigator = use_navigator();
    let form      = use_state(|| Remote::<UserForm>::Loading);
    let busy      = use_state(|| false);
    let error     = use_state(|| None::<String>);

    {
        let services = props.services.clone();
        let form     = form.clone();
        use_effect_with(props.id.clone(), move |id| {
            let id = id.clone();
            spawn_local(async move {
                let user = services.api.user(&id).await;
                form.set(Remote::from_result(user.map(|r| UserForm::from_user(&r.user))));
            });
            || ()
        });
    }

    let Remote::Ready(current) = &*form else {
        return placeholder("Edit User", &*form, "user").unwrap_or_default();
    };

    let onchange = {
        let form = form.clone();
        Callback::from(move |next: UserForm| form.set(Remote::Ready(next)))
    };

    let onsubmit = {
        let services = props.services.clone();
        let id       = props.id.clone();
        let current  = current.clone();
        let busy     = busy.clone();
        let error    = error.clone();
        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            let body = match current.to_edit_body() {
                Ok(body) => body,
                Err(message) => return error.set(Some(message)),
            };
            busy.set(true);
            error.set(None);

            let services  = services.clone();
            let id        = id.clone();
            let busy      = busy.clone();
            let error     = error.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                match services.api.edit_user(&id, &body).await {
                    Ok(_) => {
                        info!("user {id} updated");
                        back_to_users(&navigator);
                    }
                    Err(e) => {
                        error!("Error updating user {id}: {e}");
                        error.set(Some(e.to_string()));
                        busy.set(false);
                    }
                }
            });
        })
    };

    html! {
        <div class="page">
            <h1>{"Edit User"}</h1>

            <form {onsubmit}>
                <UserFields form={current.clone()} with_email=false busy={*busy} {onchange} />

                { error_alert(error.as_deref()) }

                <button type="submit" disabled={*busy}>{ if *busy { "Saving..." } else { "Save" } }</button>
                <Link<Route> to={Route::Users}>{"Cancel"}</Link<Route>>
            </form>
        </div>
    }
}

/* ---------------- suppression ------------------------------------------- */

#[function_component(DeleteUser)]
pub fn delete_user(props: &UserPageProps) -> Html {
    let navigator = use_navigator();
    let user      = use_state(|| Remote::<User>::Loading);
    let busy      = use_state(|| false);
    let error     = use_state(|| None::<String>);

    {
        let services = props.services.clone();
        let user     = user.clone();
        use_effect_with(props.id.clone(), move |id| {
            let id = id.clone();
            spawn_local(async move {
                let loaded = services.api.user(&id).await.map(|r| r.user);
                user.set(Remote::from_result(loaded));
            });
            || ()
        });
    }

    if let Some(view) = placeholder("Delete User", &*user, "user") {
        return view;
    }
    let Remote::Ready(target) = &*user else {
        return Html::default();
    };

    let onclick = {
        let services = props.services.clone();
        let id       = props.id.clone();
        let busy     = busy.clone();
        let error    = error.clone();
        Callback::from(move |_: MouseEvent| {
            busy.set(true);
            error.set(None);

            let services  = services.clone();
            let id        = id.clone();
            let busy      = busy.clone();
            let error     = error.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                match services.api.delete_user(&id).await {
                    Ok(()) => {
                        info!("user {id} deleted");
                        back_to_users(&navigator);
                    }
                    Err(e) => {
                        error!("Error deleting user {id}: {e}");
                        error.set(Some(e.to_string()));
                        busy.set(false);
                    }
                }
            });
        })
    };

    html! {
        <div class="page">
            <h1>{"Delete User"}</h1>
            <p>{ format!("Are you sure you want to delete {}?", target.full_name()) }</p>

            { error_alert(error.as_deref()) }

            <div class="actions">
                <button class="danger" {onclick} disabled={*busy}>{ if *busy { "Deleting..." } else { "Delete" } }</button>
                <Link<Route> to={Route::Users}>{"Cancel"}</Link<Route>>
            </div>
        </div>
    }
}
