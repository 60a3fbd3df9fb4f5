use leptos::prelude::*;
use leptos_router::hooks::use_location;

#[component]
pub fn Nav() -> impl IntoView {
    let pathname = use_location().pathname;
    let itemClass = move |prefix: &'static str| {
        move || {
            if pathname.get().starts_with(prefix) {
                "nav-item active"
            } else {
                "nav-item"
            }
        }
    };

    view! {
        <nav class="nav-sidebar">
            <div class="nav-brand">
                <div class="brand-icon">"R"</div>
                <span class="brand-text">"Roster"</span>
            </div>
            <ul class="nav-links">
                <li class=itemClass("/dashboard")>
                    <a href="/dashboard">
                        <span class="nav-icon">"\u{25A3}"</span>
                        <span>"Dashboard"</span>
                    </a>
                </li>
                <li class=itemClass("/users")>
                    <a href="/users">
                        <span class="nav-icon">"\u{263A}"</span>
                        <span>"Users"</span>
                    </a>
                </li>
            </ul>
        </nav>
    }
}
