//! Signed-in landing page.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::net::api::Services;
use crate::state::auth::AuthState;

#[component]
pub fn FeedPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let services = use_context::<Services>();
    let busy = RwSignal::new(false);

    let on_sign_out = move |_| {
        if busy.get() {
            return;
        }
        let Some(services) = services.clone() else {
            return;
        };
        busy.set(true);

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            use gate::SessionStore;

            if let Err(e) = services.auth.sign_out().await {
                leptos::logging::warn!("sign-out failed remotely: {e}");
            }
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(&services.gate.login_path);
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = services;
    };

    view! {
        <div class="feed-page">
            <header class="feed-header">
                <h1>"Agora"</h1>
                <nav class="feed-nav">
                    <A href="/profile">"Profile"</A>
                    <button class="feed-nav__sign-out" on:click=on_sign_out disabled=move || busy.get()>
                        "Sign out"
                    </button>
                </nav>
            </header>
            <main class="feed-main">
                <h2>{move || format!("Welcome, {}", auth.get().greeting_name())}</h2>
                <Show when=move || !auth.get().loading && auth.get().profile.is_none()>
                    <p class="feed-notice">"Your profile is still being set up."</p>
                </Show>
            </main>
        </div>
    }
}
