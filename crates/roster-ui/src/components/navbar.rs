use leptos::prelude::*;

use crate::context::use_client;

/// Top bar with the signed-in user and the logout button.
#[component]
pub fn Navbar() -> impl IntoView {
    let client = use_client();
    let userName = {
        let client = client.clone();
        move || client.current_user().map(|u| u.name).unwrap_or_default()
    };
    #[allow(unused_variables)]
    let (loggingOut, setLoggingOut) = signal(false);

    let handleLogout = move |_: leptos::ev::MouseEvent| {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen_futures::spawn_local;

            if loggingOut.get_untracked() {
                return;
            }
            setLoggingOut.set(true);
            let auth = client.auth.clone();
            spawn_local(async move {
                auth.logout().await;
                let _ = setLoggingOut.try_set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &client;
        }
    };

    view! {
        <header class="top-bar">
            <span class="top-bar-user">{userName}</span>
            <button
                type="button"
                class="btn btn-outline"
                disabled=move || loggingOut.get()
                on:click=handleLogout
            >
                "Logout"
            </button>
        </header>
    }
}
