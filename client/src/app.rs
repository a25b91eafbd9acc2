//! Root application component with routing and context providers.
//!
//! ARCHITECTURE
//! ============
//! Every route except the OAuth callback is wrapped in [`AuthGate`]. The
//! session mirror runs for the lifetime of the app and feeds
//! `RwSignal<AuthState>` for components that only need to show who is
//! signed in.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use gate::Requirement;

use crate::components::auth_gate::AuthGate;
use crate::net::api::Services;
use crate::pages::{
    auth_callback::AuthCallbackPage, feed::FeedPage, login::LoginPage, profile::ProfilePage,
    register::RegisterPage,
};
use crate::state::auth::AuthState;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let auth = RwSignal::new(AuthState::default());
    provide_context(auth);

    match Services::from_build_env() {
        Ok(services) => {
            #[cfg(feature = "hydrate")]
            start_session_mirror(&services, auth);
            provide_context(services);
        }
        Err(e) => leptos::logging::error!("backend not configured: {e}"),
    }

    view! {
        <Stylesheet id="leptos" href="/pkg/agora.css"/>
        <Title text="Agora"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route
                    path=StaticSegment("")
                    view=|| view! { <AuthGate><FeedPage/></AuthGate> }
                />
                <Route
                    path=StaticSegment("profile")
                    view=|| view! { <AuthGate><ProfilePage/></AuthGate> }
                />
                <Route
                    path=StaticSegment("login")
                    view=|| view! { <AuthGate requirement=Requirement::ForbidAuth><LoginPage/></AuthGate> }
                />
                <Route
                    path=StaticSegment("register")
                    view=|| view! { <AuthGate requirement=Requirement::ForbidAuth><RegisterPage/></AuthGate> }
                />
                <Route path=(StaticSegment("auth"), StaticSegment("callback")) view=AuthCallbackPage/>
            </Routes>
        </Router>
    }
}

#[cfg(feature = "hydrate")]
fn start_session_mirror(services: &Services, auth: RwSignal<AuthState>) {
    let mirror = gate::SessionMirror::new(services.auth.clone(), services.directory.clone())
        .with_observer(move |snapshot| auth.set(AuthState::from(snapshot)));
    let handle = mirror.handle();
    leptos::task::spawn_local(mirror.run());
    on_cleanup(move || handle.shutdown());
}
