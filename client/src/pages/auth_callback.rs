//! OAuth redirect target: exchanges the provider `code` for a session.
//!
//! Sits outside the gate. Success lands on the home path, failure on the
//! login path with an `?error=` reason the login page knows how to show.
//! A first-time provider sign-in gets its profile row here. Navigation
//! always happens from a spawned task, never while the page is hydrating.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::loading::LoadingIndicator;
use crate::net::api::Services;
use crate::util::auth::{CallbackFailure, classify_callback, login_error_path};

#[component]
pub fn AuthCallbackPage() -> impl IntoView {
    let services = use_context::<Services>();
    let query = use_query_map().get_untracked();
    let classified = classify_callback(query.get("code").as_deref(), query.get("error").as_deref());

    #[cfg(feature = "hydrate")]
    {
        use leptos_router::NavigateOptions;
        use leptos_router::hooks::use_navigate;

        let navigate = use_navigate();
        leptos::task::spawn_local(async move {
            let target = match services {
                Some(services) => finish_callback(&services, classified).await,
                None => login_error_path(gate::config::DEFAULT_LOGIN_PATH, CallbackFailure::ExchangeFailed),
            };
            navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        });
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = (services, classified);

    view! {
        <div class="login-page">
            <LoadingIndicator/>
        </div>
    }
}

/// Exchange the code, make sure the account has a profile row, and return
/// where to send the visitor.
#[cfg(feature = "hydrate")]
async fn finish_callback(services: &Services, classified: Result<String, CallbackFailure>) -> String {
    use gate::SessionStore;

    let failure = match classified {
        Ok(code) => match services.auth.complete_oauth(&code).await {
            Ok(session) => match services.ensure_profile(&session, None).await {
                Ok(_) => return services.gate.home_path.clone(),
                Err(e) => {
                    leptos::logging::warn!("profile setup after oauth failed: {e}");
                    if let Err(sign_out_error) = services.auth.sign_out().await {
                        leptos::logging::warn!("sign-out after failed profile setup: {sign_out_error}");
                    }
                    CallbackFailure::ProfileSetupFailed
                }
            },
            Err(e) => {
                leptos::logging::warn!("oauth code exchange failed: {e}");
                CallbackFailure::from_exchange_error(&e)
            }
        },
        Err(failure) => failure,
    };
    login_error_path(&services.gate.login_path, failure)
}
