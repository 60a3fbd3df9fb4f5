use std::num::NonZeroU32;

use leptos::prelude::*;
use roster_client::list::{FetchRequest, UsersTable, SEARCH_DEBOUNCE};
use roster_types::{avatar_url, User};

use crate::components::toast::use_toasts;
use crate::context::use_client;

#[component]
pub fn UsersPage() -> impl IntoView {
    let client = use_client();
    let toasts = use_toasts();
    let users = StoredValue::new(client.users.clone());
    let table = RwSignal::new(UsersTable::new());

    let run = move |request: FetchRequest| {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen_futures::spawn_local;

            let service = users.get_value();
            spawn_local(async move {
                let result = service.list(request.page, &request.search).await;
                let outcome = table.try_update(|t| t.apply_page(request.ticket, result));
                if let Some(Some(Err(e))) = outcome {
                    toasts.error(e.user_message());
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (request, users, toasts);
        }
    };

    if let Some(request) = table.try_update(|t| t.fetch(NonZeroU32::MIN)) {
        run(request);
    }

    let handleSearch = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        let Some(ticket) = table.try_update(|t| t.search_input(value)) else {
            return;
        };
        set_timeout(
            move || {
                if let Some(Some(request)) = table.try_update(|t| t.debounce_elapsed(ticket)) {
                    run(request);
                }
            },
            SEARCH_DEBOUNCE,
        );
    };

    let goToPage = move |page: u32| {
        if let Some(Some(request)) = table.try_update(|t| t.change_page(page)) {
            run(request);
        }
    };

    let deleteLabel = move || {
        if table.with(|t| t.is_deleting()) {
            "Deleting..."
        } else {
            "Delete"
        }
    };
    let confirmDelete = move |_: leptos::ev::MouseEvent| {
        let Some(Some(id)) = table.try_update(|t| t.confirm_delete()) else {
            return;
        };
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen_futures::spawn_local;

            let service = users.get_value();
            spawn_local(async move {
                let result = service.delete(id).await;
                match table.try_update(|t| t.apply_delete(result)) {
                    Some(Ok((message, request))) => {
                        toasts.success(message);
                        run(request);
                    }
                    Some(Err(e)) => toasts.error(e.user_message()),
                    None => {}
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = id;
        }
    };

    view! {
        <div class="dashboard-header page-header">
            <div>
                <h1>"Users"</h1>
                <p class="subtitle">"Everyone with access to the panel"</p>
            </div>
            <a href="/users/add" class="btn btn-primary">"Add User"</a>
        </div>

        <div class="card">
            <div class="table-toolbar">
                <input
                    type="search"
                    class="search-input"
                    placeholder="Search by name or email"
                    prop:value=move || table.with(|t| t.search().to_string())
                    on:input=handleSearch
                />
            </div>

            <table class="data-table">
                <thead>
                    <tr>
                        <th>"#"</th>
                        <th>"Avatar"</th>
                        <th>"Full Name"</th>
                        <th>"Email"</th>
                        <th class="actions-col">"Actions"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        table
                            .with(|t| {
                                if t.is_loading() {
                                    return view! {
                                        <tr>
                                            <td colspan="5" class="table-message">
                                                <div class="spinner"></div>
                                                "Loading..."
                                            </td>
                                        </tr>
                                    }
                                        .into_any();
                                }
                                if t.users().is_empty() {
                                    return view! {
                                        <tr>
                                            <td colspan="5" class="table-message">
                                                "No users found"
                                            </td>
                                        </tr>
                                    }
                                        .into_any();
                                }
                                t.users()
                                    .iter()
                                    .enumerate()
                                    .map(|(index, user)| {
                                        let number = t.row_number(index);
                                        let user = user.clone();
                                        view! { <UserRow number=number user=user table=table /> }
                                    })
                                    .collect_view()
                                    .into_any()
                            })
                    }}
                </tbody>
            </table>

            <Show when=move || table.with(|t| t.show_pagination() && t.last_page() > 1)>
                <nav class="pagination">
                    {move || {
                        let current = table.with(|t| t.current_page());
                        table
                            .with(|t| t.pages())
                            .map(|page| {
                                let class = if page == current {
                                    "page-btn active"
                                } else {
                                    "page-btn"
                                };
                                view! {
                                    <button
                                        type="button"
                                        class=class
                                        on:click=move |_| goToPage(page)
                                    >
                                        {page}
                                    </button>
                                }
                            })
                            .collect_view()
                    }}
                </nav>
            </Show>
        </div>

        <Show when=move || table.with(|t| t.pending_delete().is_some())>
            <div class="modal-backdrop">
                <div class="modal" role="dialog" aria-modal="true">
                    <h2>"Delete user"</h2>
                    <p>"Are you sure you want to delete this user? This cannot be undone."</p>
                    <div class="modal-actions">
                        <button
                            type="button"
                            class="btn btn-outline"
                            disabled=move || table.with(|t| t.is_deleting())
                            on:click=move |_| table.update(|t| t.cancel_delete())
                        >
                            "Cancel"
                        </button>
                        <button
                            type="button"
                            class="btn btn-danger"
                            disabled=move || table.with(|t| t.is_deleting())
                            on:click=confirmDelete
                        >
                            {deleteLabel}
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}

#[component]
fn UserRow(number: u64, user: User, table: RwSignal<UsersTable>) -> impl IntoView {
    let id = user.id;
    let avatar = match user.avatar.as_deref().map(avatar_url) {
        Some(src) => view! { <img class="avatar-thumb" src=src alt="" /> }.into_any(),
        None => view! { <span class="avatar-placeholder"></span> }.into_any(),
    };
    view! {
        <tr>
            <td>{number}</td>
            <td>{avatar}</td>
            <td>{user.name}</td>
            <td>{user.email}</td>
            <td class="actions-col">
                <a href=format!("/users/edit/{id}") class="btn btn-sm">"Edit"</a>
                <button
                    type="button"
                    class="btn btn-sm btn-danger"
                    on:click=move |_| table.update(|t| t.request_delete(id))
                >
                    "Delete"
                </button>
            </td>
        </tr>
    }
}
