use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{Route, Router, Routes},
    ParamSegment, StaticSegment,
};

use crate::components::guard::Protected;
use crate::components::nav::Nav;
use crate::components::navbar::Navbar;
use crate::components::toast::ToastProvider;
use crate::context::ClientContext;
use crate::pages::dashboard::DashboardPage;
use crate::pages::login::LoginPage;
use crate::pages::user_form::UserFormPage;
use crate::pages::users::UsersPage;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <link rel="icon" href="/favicon.svg" type="image/svg+xml" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let client = ClientContext::new();
    provide_context(client.clone());
    // Effects only run in the browser, after hydration.
    Effect::new(move |_| client.mark_ready());

    view! {
        <Stylesheet id="leptos" href="/pkg/roster-console.css" />
        <Title text="Roster" />
        <ToastProvider>
            <Router>
                <Routes fallback=|| view! { <p class="not-found">"Page not found."</p> }.into_any()>
                    <Route path=StaticSegment("") view=LoginPage />
                    <Route path=StaticSegment("login") view=LoginPage />
                    <Route path=StaticSegment("dashboard") view=DashboardView />
                    <Route path=StaticSegment("users") view=UsersView />
                    <Route path=(StaticSegment("users"), StaticSegment("add")) view=UserFormView />
                    <Route
                        path=(
                            StaticSegment("users"),
                            StaticSegment("edit"),
                            ParamSegment("user_id"),
                        )
                        view=UserFormView
                    />
                </Routes>
            </Router>
        </ToastProvider>
    }
}

#[component]
fn Layout(children: ChildrenFn) -> impl IntoView {
    view! {
        <Protected>
            <div class="app-layout">
                <Nav />
                <main class="main-content">
                    <Navbar />
                    {children()}
                </main>
            </div>
        </Protected>
    }
}

#[component]
fn DashboardView() -> impl IntoView {
    view! {
        <Layout>
            <DashboardPage />
        </Layout>
    }
}

#[component]
fn UsersView() -> impl IntoView {
    view! {
        <Layout>
            <UsersPage />
        </Layout>
    }
}

#[component]
fn UserFormView() -> impl IntoView {
    view! {
        <Layout>
            <UserFormPage />
        </Layout>
    }
}
