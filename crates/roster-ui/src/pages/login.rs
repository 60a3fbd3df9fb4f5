use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use roster_types::FieldErrors;

use crate::components::toast::use_toasts;
use crate::context::use_client;

const LOGIN_REDIRECT_DELAY: std::time::Duration = std::time::Duration::from_secs(1);

#[component]
pub fn LoginPage() -> impl IntoView {
    let client = use_client();
    let toasts = use_toasts();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());
    #[allow(unused_variables)]
    let (loading, setLoading) = signal(false);

    {
        let client = client.clone();
        let navigate = navigate.clone();
        Effect::new(move |_| {
            if !client.is_ready() {
                return;
            }
            if client.auth.take_just_logged_out() {
                toasts.success("Logout successful");
            }
            if client.auth.is_logged_in() {
                navigate("/dashboard", Default::default());
            }
        });
    }

    let handleSubmit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        #[cfg(feature = "hydrate")]
        {
            use roster_client::{error::UNEXPECTED_ERROR, ClientError};
            use wasm_bindgen_futures::spawn_local;

            if loading.get_untracked() {
                return;
            }
            setLoading.set(true);
            errors.set(FieldErrors::new());

            let auth = client.auth.clone();
            let navigate = navigate.clone();
            let (emailValue, passwordValue) = (email.get_untracked(), password.get_untracked());
            spawn_local(async move {
                match auth.login(&emailValue, &passwordValue).await {
                    Ok(_) => {
                        toasts.success("Login successful!");
                        set_timeout(
                            move || navigate("/dashboard", Default::default()),
                            LOGIN_REDIRECT_DELAY,
                        );
                    }
                    Err(ClientError::Validation(fieldErrors)) => {
                        let _ = errors.try_set(fieldErrors);
                    }
                    Err(e @ ClientError::InvalidCredentials(_)) => toasts.error(e.user_message()),
                    Err(_) => toasts.error(UNEXPECTED_ERROR),
                }
                let _ = setLoading.try_set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&client, &navigate, &toasts);
        }
    };

    let fieldError =
        move |field: &'static str| move || errors.with(|e| e.first(field).map(str::to_string));
    let invalidClass = move |field: &'static str| {
        if errors.with(|e| e.has(field)) {
            "is-invalid"
        } else {
            ""
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <div class="login-header">
                    <div class="login-icon">"R"</div>
                    <h1>"Roster"</h1>
                    <p>"Sign in to manage users"</p>
                </div>

                <form on:submit=handleSubmit novalidate>
                    <div class="form-group">
                        <label for="email">"Email"</label>
                        <input
                            type="email"
                            id="email"
                            name="email"
                            autocomplete="username"
                            class=move || invalidClass("email")
                            prop:value=move || email.get()
                            on:input=move |ev| {
                                email.set(event_target_value(&ev));
                                errors.update(|e| {
                                    e.remove("email");
                                });
                            }
                        />
                        {move || {
                            fieldError("email")()
                                .map(|m| view! { <div class="invalid-feedback">{m}</div> })
                        }}
                    </div>
                    <div class="form-group">
                        <label for="password">"Password"</label>
                        <input
                            type="password"
                            id="password"
                            name="password"
                            autocomplete="current-password"
                            class=move || invalidClass("password")
                            prop:value=move || password.get()
                            on:input=move |ev| {
                                password.set(event_target_value(&ev));
                                errors.update(|e| {
                                    e.remove("password");
                                });
                            }
                        />
                        {move || {
                            fieldError("password")()
                                .map(|m| view! { <div class="invalid-feedback">{m}</div> })
                        }}
                    </div>
                    <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                        {move || if loading.get() { "Signing in..." } else { "Sign In" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
