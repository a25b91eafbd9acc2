//! Route wrapper that renders its children only once the gate allows it.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each render of the component is one gate mount. Evaluation starts after
//! hydration; the server always renders the loading indicator. Leptos
//! `on_cleanup` marks the mount as gone, after which the in-flight
//! evaluation can no longer update state or navigate.

#[cfg(test)]
#[path = "auth_gate_test.rs"]
mod auth_gate_test;

use leptos::prelude::*;

use gate::{GatePolicy, GateState, Mount, Requirement};

use crate::components::loading::LoadingIndicator;

pub(crate) fn policy_for(requirement: Requirement, redirect: Option<String>) -> GatePolicy {
    let policy = GatePolicy { requirement, ..GatePolicy::default() };
    match redirect {
        Some(target) => policy.redirect_to(target),
        None => policy,
    }
}

/// Children render only while the gate state is `Allowed`.
#[component]
pub fn AuthGate(
    #[prop(optional)] requirement: Requirement,
    /// Overrides the configured login/home redirect.
    #[prop(optional, into)]
    redirect: Option<String>,
    children: ChildrenFn,
) -> impl IntoView {
    let gate_state = RwSignal::new(GateState::Pending);
    let mount = Mount::with_observer(move |state| gate_state.set(state));
    let policy = policy_for(requirement, redirect);

    #[cfg(feature = "hydrate")]
    start_evaluation(policy, mount.clone());
    #[cfg(not(feature = "hydrate"))]
    let _ = policy;

    on_cleanup(move || mount.unmount());

    view! {
        <Show when=move || gate_state.get() == GateState::Allowed fallback=|| view! { <LoadingIndicator/> }>
            {children()}
        </Show>
    }
}

#[cfg(feature = "hydrate")]
fn start_evaluation(policy: GatePolicy, mount: Mount) {
    use std::sync::Arc;

    use leptos_router::NavigateOptions;
    use leptos_router::hooks::use_navigate;

    use crate::net::api::Services;
    use crate::net::browser::GlooTimer;

    let Some(services) = use_context::<Services>() else {
        leptos::logging::error!("auth gate mounted without backend services");
        return;
    };
    let navigate = use_navigate();
    let navigator = move |target: &str| navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
    let gate = gate::AuthGate::new(services.auth, services.directory, navigator, services.gate)
        .with_timer(Arc::new(GlooTimer));

    leptos::task::spawn_local(async move {
        let decision = gate.evaluate(&policy, &mount).await;
        log::debug!("auth gate settled: {decision:?}");
    });
}
