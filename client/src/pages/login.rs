//! Login page supporting email + password and Google OAuth.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;

use crate::net::api::Services;
use crate::util::auth::login_error_message;
use crate::util::validate::validate_credentials;

/// Initial banner text for the page, from the `?error=` callback reason.
fn initial_notice(error: Option<&str>) -> String {
    error.filter(|e| !e.is_empty()).map(login_error_message).unwrap_or_default().to_owned()
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let services = use_context::<Services>();
    let query = use_query_map();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(initial_notice(query.get_untracked().get("error").as_deref()));
    let busy = RwSignal::new(false);

    let password_services = services.clone();
    let on_sign_in = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_credentials(&email.get(), &password.get()) {
            Ok(values) => values,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        let Some(services) = password_services.clone() else {
            info.set("Sign-in is not available right now.".to_owned());
            return;
        };
        busy.set(true);
        info.set("Signing in...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            use gate::SessionStore;
            use crate::net::api::error_message;

            let session = match services.auth.sign_in_with_password(&email_value, &password_value).await {
                Ok(session) => session,
                Err(e) => {
                    info.set(error_message(&e));
                    busy.set(false);
                    return;
                }
            };
            // Accounts confirmed by email, or whose registration stopped
            // short of the row insert, get their profile row here.
            if let Err(e) = services.ensure_profile(&session, None).await {
                leptos::logging::warn!("profile setup after sign-in failed: {e}");
                if let Err(sign_out_error) = services.auth.sign_out().await {
                    leptos::logging::warn!("sign-out after failed profile setup: {sign_out_error}");
                }
                info.set(error_message(&e));
                busy.set(false);
                return;
            }
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(&services.gate.home_path);
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (services, email_value, password_value);
    };

    let on_google = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        let Some(services) = services.clone() else {
            info.set("Sign-in is not available right now.".to_owned());
            return;
        };
        match services.auth.begin_oauth(backend::OAuthProvider::Google) {
            Ok(url) => {
                #[cfg(feature = "hydrate")]
                {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href(&url);
                    }
                }
                #[cfg(not(feature = "hydrate"))]
                let _ = url;
            }
            Err(e) => info.set(crate::net::api::error_message(&e)),
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Agora"</h1>
                <p class="login-card__subtitle">"Sign in"</p>
                <form class="login-form" on:submit=on_sign_in>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <p class="login-card__subtitle">"Or"</p>
                <a href="#" class="login-button" on:click=on_google>
                    "Continue with Google"
                </a>
                <p class="login-footer">
                    "New here? "
                    <A href="/register">"Create an account"</A>
                </p>
            </div>
        </div>
    }
}
