//! Profile page: view and edit the signed-in visitor's row.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use backend::ProfileUpdate;
use gate::ApplicationUser;
use leptos::prelude::*;
use leptos_router::components::A;

use crate::net::api::Services;
use crate::state::auth::AuthState;
use crate::util::validate::{validate_bio, validate_display_name};

/// Changed fields only; an unchanged form yields an empty update. A cleared
/// bio is sent as an empty string.
pub(crate) fn profile_changes(current: &ApplicationUser, name: &str, bio: &str) -> Result<ProfileUpdate, &'static str> {
    let name = validate_display_name(name)?;
    let bio = validate_bio(bio)?.unwrap_or_default();
    let current_bio = current.bio.as_deref().unwrap_or_default();
    Ok(ProfileUpdate {
        display_name: Some(name).filter(|n| *n != current.display_name),
        bio: (bio != current_bio).then_some(bio),
        avatar_url: None,
    })
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let services = use_context::<Services>();
    let name = RwSignal::new(String::new());
    let bio = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    // Seed the form once the mirror has the row.
    let seeded = RwSignal::new(false);
    Effect::new(move || {
        if seeded.get_untracked() {
            return;
        }
        if let Some(profile) = auth.get().profile {
            name.set(profile.display_name.clone());
            bio.set(profile.bio.clone().unwrap_or_default());
            seeded.set(true);
        }
    });

    let on_save = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let Some(current) = auth.get_untracked().profile else {
            info.set("Your profile has not loaded yet.".to_owned());
            return;
        };
        let update = match profile_changes(&current, &name.get(), &bio.get()) {
            Ok(update) if update.is_empty() => {
                info.set("Nothing to save.".to_owned());
                return;
            }
            Ok(update) => update,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        let Some(services) = services.clone() else {
            info.set("Saving is not available right now.".to_owned());
            return;
        };
        busy.set(true);
        info.set("Saving...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match services.directory.update_profile(&current.id, &update).await {
                Ok(_) => info.set("Saved.".to_owned()),
                Err(e) => info.set(crate::net::api::error_message(&e)),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (services, update);
    };

    view! {
        <div class="profile-page">
            <header class="feed-header">
                <A href="/">"Back to feed"</A>
            </header>
            <Show
                when=move || auth.get().profile.is_some()
                fallback=move || {
                    view! {
                        <p class="profile-missing">
                            {move || if auth.get().loading { "Loading profile..." } else { "No profile found." }}
                        </p>
                    }
                }
            >
                <form class="profile-form" on:submit=on_save.clone()>
                    <label class="profile-label">
                        "Display name"
                        <input
                            class="login-input"
                            type="text"
                            maxlength="50"
                            prop:value=move || name.get()
                            on:input=move |ev| name.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="profile-label">
                        "Bio"
                        <textarea
                            class="profile-bio"
                            maxlength="280"
                            prop:value=move || bio.get()
                            on:input=move |ev| bio.set(event_target_value(&ev))
                        ></textarea>
                    </label>
                    <p class="profile-email">{move || auth.get().user.and_then(|u| u.email().map(str::to_owned))}</p>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Save"
                    </button>
                </form>
            </Show>
            <Show when=move || !info.get().is_empty()>
                <p class="login-message">{move || info.get()}</p>
            </Show>
        </div>
    }
}
