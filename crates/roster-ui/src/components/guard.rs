use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use roster_client::guard::{GuardState, RouteGuard, REDIRECT_DELAY};

use crate::components::toast::use_toasts;
use crate::context::use_client;

/// Renders `children` only for a logged-in session. Otherwise shows why,
/// then moves to the login page after a short delay.
#[component]
pub fn Protected(children: ChildrenFn) -> impl IntoView {
    let client = use_client();
    let toasts = use_toasts();
    let navigate = use_navigate();

    let guard = StoredValue::new(RouteGuard::new());
    let state = RwSignal::new(GuardState::Checking);

    Effect::new(move |_| {
        if !client.is_ready() {
            return;
        }
        let loggedIn = client.is_logged_in();
        let ticket = guard
            .try_update_value(|g| g.evaluate(loggedIn, || client.auth.take_just_logged_out()))
            .flatten();
        let current = guard.with_value(|g| g.state());
        state.set(current);

        let Some(ticket) = ticket else {
            return;
        };
        if let GuardState::DeniedPendingRedirect(notice) = current {
            if notice.is_success() {
                toasts.success(notice.message());
            } else {
                toasts.error(notice.message());
            }
        }

        let navigate = navigate.clone();
        set_timeout(
            move || {
                if guard.try_update_value(|g| g.redirect_elapsed(ticket)) == Some(true) {
                    let _ = state.try_set(GuardState::DeniedRedirecting);
                    navigate("/login", Default::default());
                }
            },
            REDIRECT_DELAY,
        );
    });

    view! {
        {move || match state.get() {
            GuardState::Allowed => children().into_any(),
            GuardState::Checking => {
                view! {
                    <div class="loading">
                        <div class="spinner"></div>
                        "Checking session..."
                    </div>
                }
                    .into_any()
            }
            GuardState::DeniedPendingRedirect(notice) => {
                view! { <div class="guard-denied">{notice.message()}</div> }.into_any()
            }
            GuardState::DeniedRedirecting => {
                view! { <div class="guard-denied">"Redirecting to login..."</div> }.into_any()
            }
        }}
    }
}
