use super::*;

#[test]
fn default_policy_requires_auth_without_override() {
    let policy = policy_for(Requirement::default(), None);
    assert_eq!(policy, GatePolicy::require_auth());
}

#[test]
fn forbid_policy_keeps_requirement() {
    let policy = policy_for(Requirement::ForbidAuth, None);
    assert_eq!(policy, GatePolicy::forbid_auth());
}

#[test]
fn redirect_override_is_applied() {
    let policy = policy_for(Requirement::RequireAuth, Some("/welcome".to_owned()));
    assert_eq!(policy.redirect.as_deref(), Some("/welcome"));
}

#[test]
fn blank_redirect_override_is_ignored() {
    let policy = policy_for(Requirement::RequireAuth, Some("  ".to_owned()));
    assert_eq!(policy.redirect, None);
}
