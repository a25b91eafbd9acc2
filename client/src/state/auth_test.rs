use super::*;

fn session() -> Session {
    Session::new("u1", Some("ada@example.com".to_owned())).unwrap()
}

fn profile() -> ApplicationUser {
    ApplicationUser {
        id: "u1".to_owned(),
        display_name: "Ada".to_owned(),
        bio: None,
        avatar_url: None,
        created_at: None,
    }
}

#[test]
fn default_is_loading_and_signed_out() {
    let state = AuthState::default();
    assert!(state.loading);
    assert!(state.user.is_none());
}

#[test]
fn from_snapshot_copies_every_field() {
    let snapshot = MirrorSnapshot { user: Some(session()), profile: Some(profile()), loading: false };
    let state = AuthState::from(&snapshot);
    assert_eq!(state.user, Some(session()));
    assert_eq!(state.profile, Some(profile()));
    assert!(!state.loading);
}

#[test]
fn greeting_prefers_profile_name() {
    let state = AuthState { user: Some(session()), profile: Some(profile()), loading: false };
    assert_eq!(state.greeting_name(), "Ada");
}

#[test]
fn greeting_falls_back_to_email() {
    let state = AuthState { user: Some(session()), profile: None, loading: false };
    assert_eq!(state.greeting_name(), "ada@example.com");
}

#[test]
fn greeting_without_session() {
    assert_eq!(AuthState::default().greeting_name(), "there");
}
