use leptos::prelude::*;

/// Placeholder shown while the gate has not allowed the page yet.
#[component]
pub fn LoadingIndicator() -> impl IntoView {
    view! {
        <div class="loading" role="status" aria-live="polite">
            <span class="loading__spinner"></span>
            <span class="loading__label">"Loading..."</span>
        </div>
    }
}
