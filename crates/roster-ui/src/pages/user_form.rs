use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_params_map};
use roster_client::form::{Field, FormMode, UserForm};

use crate::components::toast::use_toasts;
use crate::context::use_client;

const SAVED_REDIRECT_DELAY: std::time::Duration = std::time::Duration::from_millis(1500);

#[component]
pub fn UserFormPage() -> impl IntoView {
    let userId = use_params_map().with_untracked(|p| p.get("user_id"));
    match FormMode::from_route(userId.as_deref()) {
        Some(mode) => view! { <UserFormCard mode=mode /> }.into_any(),
        None => view! {
            <div class="card">
                <p class="login-error">"User not found."</p>
                <a href="/users" class="btn btn-outline">"Back to users"</a>
            </div>
        }
        .into_any(),
    }
}

#[component]
fn UserFormCard(mode: FormMode) -> impl IntoView {
    let client = use_client();
    let toasts = use_toasts();
    let navigate = use_navigate();
    let form = RwSignal::new(UserForm::new(mode));

    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen_futures::spawn_local;

        let lookups = client.lookups.clone();
        spawn_local(async move {
            let result = lookups.genders().await;
            if let Some(Err(e)) = form.try_update(|f| f.apply_genders(result)) {
                toasts.error(e.user_message());
            }
        });

        let lookups = client.lookups.clone();
        spawn_local(async move {
            let result = lookups.roles().await;
            if let Some(Err(e)) = form.try_update(|f| f.apply_roles(result)) {
                toasts.error(e.user_message());
            }
        });

        if let FormMode::Edit(id) = mode {
            let users = client.users.clone();
            spawn_local(async move {
                let result = users.show(id).await;
                if let Some(Err(e)) = form.try_update(|f| f.load_user(result)) {
                    toasts.error(e.user_message());
                }
            });
        }

        on_cleanup(move || {
            let staged =
                form.try_with_untracked(|f| f.staged_avatar().map(|s| s.preview_url.clone()));
            if let Some(Some(url)) = staged {
                crate::browser::revoke_object_url(&url);
            }
        });
    }

    let handleSubmit = {
        let navigate = navigate.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            #[cfg(feature = "hydrate")]
            {
                use roster_client::form::{Saved, SubmitOutcome};
                use wasm_bindgen_futures::spawn_local;

                let Some(Some(payload)) = form.try_update(|f| f.begin_submit()) else {
                    return;
                };
                let users = client.users.clone();
                let navigate = navigate.clone();
                spawn_local(async move {
                    let result = match mode {
                        FormMode::Create => {
                            users.store(payload).await.map(|message| Saved {
                                message,
                                user: None,
                            })
                        }
                        FormMode::Edit(id) => {
                            users.update(id, payload).await.map(|updated| Saved {
                                message: updated.message,
                                user: Some(updated.user),
                            })
                        }
                    };
                    match form.try_update(|f| f.finish_submit(result)) {
                        Some(SubmitOutcome::Saved { message, revoke }) => {
                            if let Some(url) = revoke {
                                crate::browser::revoke_object_url(&url);
                            }
                            toasts.success(message);
                            set_timeout(
                                move || navigate("/users", Default::default()),
                                SAVED_REDIRECT_DELAY,
                            );
                        }
                        Some(SubmitOutcome::Failed(e)) => toasts.error(e.user_message()),
                        Some(SubmitOutcome::Invalid) | None => {}
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&client, &navigate, toasts);
            }
        }
    };

    let handleAvatar = move |ev: leptos::ev::Event| {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen_futures::spawn_local;

            let Some(file) = crate::browser::selected_file(&ev) else {
                if let Some(Some(old)) = form.try_update(|f| f.clear_avatar()) {
                    crate::browser::revoke_object_url(&old);
                }
                return;
            };
            crate::browser::reset_input(&ev);
            spawn_local(async move {
                let avatar = match crate::browser::read_file(&file).await {
                    Ok(avatar) => avatar,
                    Err(e) => {
                        tracing::error!("{e}");
                        toasts.error("Could not read the selected file.");
                        return;
                    }
                };
                let Some(previewUrl) = crate::browser::object_url(&file) else {
                    toasts.error("Could not preview the selected file.");
                    return;
                };
                if let Some(Some(old)) = form.try_update(|f| f.select_avatar(avatar, previewUrl)) {
                    crate::browser::revoke_object_url(&old);
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = ev;
        }
    };

    let removeAvatar = move |_: leptos::ev::MouseEvent| {
        let old = form.try_update(|f| f.clear_avatar()).flatten();
        #[cfg(feature = "hydrate")]
        {
            if let Some(url) = old {
                crate::browser::revoke_object_url(&url);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = old;
        }
    };

    let handleCancel = move |_: leptos::ev::MouseEvent| navigate("/users", Default::default());

    let value = move |field: Field| {
        move || {
            form.with(|f| {
                let v = f.values();
                match field {
                    Field::Name => v.name.clone(),
                    Field::Gender => v.gender.clone(),
                    Field::Email => v.email.clone(),
                    Field::RoleType => v.role_type.clone(),
                    Field::Password => v.password.clone(),
                    Field::PasswordConfirmation => v.password_confirmation.clone(),
                    Field::Avatar => String::new(),
                }
            })
        }
    };
    let onInput = move |field: Field| {
        move |ev: leptos::ev::Event| form.update(|f| f.set_field(field, event_target_value(&ev)))
    };
    let inputClass = move |field: Field| {
        move || {
            if form.with(|f| f.error(field).is_some()) {
                "form-control is-invalid"
            } else {
                "form-control"
            }
        }
    };
    let feedback = move |field: Field| {
        move || {
            form.with(|f| f.error(field).map(str::to_string))
                .map(|m| view! { <div class="invalid-feedback">{m}</div> })
        }
    };

    view! {
        <div class="dashboard-header">
            <h1>{mode.title()}</h1>
            <p class="subtitle">
                {match mode {
                    FormMode::Create => "Create a new account",
                    FormMode::Edit(_) => "Update the account details",
                }}
            </p>
        </div>

        <form class="card user-form" on:submit=handleSubmit novalidate>
            <Show when=move || form.with(|f| f.is_loading())>
                <div class="loading">
                    <div class="spinner"></div>
                    "Loading..."
                </div>
            </Show>

            <div class="avatar-field">
                {move || match form.with(|f| f.preview()) {
                    Some(src) => {
                        view! { <img class="avatar-preview" src=src alt="Avatar preview" /> }
                            .into_any()
                    }
                    None => {
                        view! { <div class="avatar-preview avatar-placeholder"></div> }.into_any()
                    }
                }}
                <div class="form-group">
                    <label for="avatar">"Avatar"</label>
                    <input
                        type="file"
                        id="avatar"
                        name="avatar"
                        accept="image/jpeg,image/png,image/gif,image/webp"
                        class=inputClass(Field::Avatar)
                        on:change=handleAvatar
                    />
                    <Show when=move || form.with(|f| f.staged_avatar().is_some())>
                        <button type="button" class="btn btn-sm btn-outline" on:click=removeAvatar>
                            "Remove selected file"
                        </button>
                    </Show>
                    {feedback(Field::Avatar)}
                </div>
            </div>

            <div class="form-grid">
                <div class="form-group">
                    <label for="name">"Full Name"</label>
                    <input
                        type="text"
                        id="name"
                        class=inputClass(Field::Name)
                        prop:value=value(Field::Name)
                        on:input=onInput(Field::Name)
                    />
                    {feedback(Field::Name)}
                </div>

                <div class="form-group">
                    <label for="gender">"Gender"</label>
                    <select
                        id="gender"
                        class=inputClass(Field::Gender)
                        prop:value=value(Field::Gender)
                        on:change=onInput(Field::Gender)
                    >
                        <option value="">"Select gender"</option>
                        {move || {
                            let selected = value(Field::Gender)();
                            form.with(|f| {
                                f.genders()
                                    .iter()
                                    .map(|g| {
                                        let id = g.id.to_string();
                                        let isSelected = id == selected;
                                        view! {
                                            <option value=id selected=isSelected>
                                                {g.gender.clone()}
                                            </option>
                                        }
                                    })
                                    .collect_view()
                            })
                        }}
                    </select>
                    {feedback(Field::Gender)}
                </div>

                <div class="form-group">
                    <label for="email">"Email"</label>
                    <input
                        type="email"
                        id="email"
                        class=inputClass(Field::Email)
                        prop:value=value(Field::Email)
                        on:input=onInput(Field::Email)
                    />
                    {feedback(Field::Email)}
                </div>

                <div class="form-group">
                    <label for="role_type">"Role"</label>
                    <select
                        id="role_type"
                        class=inputClass(Field::RoleType)
                        prop:value=value(Field::RoleType)
                        on:change=onInput(Field::RoleType)
                    >
                        <option value="">"Select role"</option>
                        {move || {
                            let selected = value(Field::RoleType)();
                            form.with(|f| {
                                f.roles()
                                    .iter()
                                    .map(|r| {
                                        let id = r.id.to_string();
                                        let isSelected = id == selected;
                                        view! {
                                            <option value=id selected=isSelected>
                                                {r.role_type.clone()}
                                            </option>
                                        }
                                    })
                                    .collect_view()
                            })
                        }}
                    </select>
                    {feedback(Field::RoleType)}
                </div>

                <div class="form-group">
                    <label for="password">
                        {match mode {
                            FormMode::Create => "Password",
                            FormMode::Edit(_) => "New Password (optional)",
                        }}
                    </label>
                    <input
                        type="password"
                        id="password"
                        autocomplete="new-password"
                        class=inputClass(Field::Password)
                        prop:value=value(Field::Password)
                        on:input=onInput(Field::Password)
                    />
                    {feedback(Field::Password)}
                </div>

                <div class="form-group">
                    <label for="password_confirmation">"Confirm Password"</label>
                    <input
                        type="password"
                        id="password_confirmation"
                        autocomplete="new-password"
                        class=inputClass(Field::PasswordConfirmation)
                        prop:value=value(Field::PasswordConfirmation)
                        on:input=onInput(Field::PasswordConfirmation)
                    />
                    {feedback(Field::PasswordConfirmation)}
                </div>
            </div>

            <div class="form-actions">
                <button type="button" class="btn btn-outline" on:click=handleCancel>
                    "Cancel"
                </button>
                <button
                    type="submit"
                    class="btn btn-primary"
                    disabled=move || form.with(|f| !f.can_submit())
                >
                    {move || if form.with(|f| f.is_submitting()) { "Saving..." } else { "Save" }}
                </button>
            </div>
        </form>
    }
}
