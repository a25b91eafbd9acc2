//! Registration page: creates the auth account, then its profile row.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::net::api::Services;
use crate::util::validate::validate_registration;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let services = use_context::<Services>();
    let email = RwSignal::new(String::new());
    let display_name = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_register = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let registration =
            match validate_registration(&email.get(), &password.get(), &confirm.get(), &display_name.get()) {
                Ok(registration) => registration,
                Err(msg) => {
                    info.set(msg.to_owned());
                    return;
                }
            };
        let Some(services) = services.clone() else {
            info.set("Registration is not available right now.".to_owned());
            return;
        };
        busy.set(true);
        info.set("Creating account...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            use backend::SignUpOutcome;
            use crate::net::api::error_message;

            let outcome = services
                .auth
                .sign_up(&registration.email, &registration.password, &registration.display_name)
                .await;
            match outcome {
                Ok(SignUpOutcome::SignedIn(session)) => {
                    if let Err(e) = services.ensure_profile(&session, Some(&registration.display_name)).await {
                        leptos::logging::warn!("profile row creation failed: {e}");
                        info.set(error_message(&e));
                        busy.set(false);
                        return;
                    }
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href(&services.gate.home_path);
                    }
                }
                Ok(SignUpOutcome::ConfirmationRequired) => {
                    info.set("Check your email to confirm your account, then sign in.".to_owned());
                    busy.set(false);
                }
                Err(e) => {
                    info.set(error_message(&e));
                    busy.set(false);
                }
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (services, registration);
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Agora"</h1>
                <p class="login-card__subtitle">"Create your account"</p>
                <form class="login-form" on:submit=on_register>
                    <input
                        class="login-input"
                        type="text"
                        maxlength="50"
                        placeholder="Display name"
                        prop:value=move || display_name.get()
                        on:input=move |ev| display_name.set(event_target_value(&ev))
                    />
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
                        placeholder="Password (8+ characters)"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Confirm password"
                        prop:value=move || confirm.get()
                        on:input=move |ev| confirm.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Create Account"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-footer">
                    "Already have an account? "
                    <A href="/login">"Sign in"</A>
                </p>
            </div>
        </div>
    }
}
