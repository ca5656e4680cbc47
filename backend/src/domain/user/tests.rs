//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn sample_user() -> User {
    User::new(UserDraft {
        id: UserId::new(VALID_ID).expect("valid id"),
        name: DisplayName::new("Ada Lovelace").expect("valid name"),
        email: Email::new("ada@example.com").expect("valid email"),
        role: Role::Instructor,
        avatar: String::new(),
        bio: String::new(),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
    })
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
}

#[rstest]
fn user_id_serialises_as_string() {
    let id = UserId::new(VALID_ID).expect("valid id");
    let value = serde_json::to_value(&id).expect("serialises");
    assert_eq!(value, serde_json::json!(VALID_ID));
}

#[rstest]
#[case("   ", UserValidationError::EmptyDisplayName)]
fn display_name_rejects_blank(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(DisplayName::new(raw).expect_err("blank name"), expected);
}

#[rstest]
fn display_name_rejects_overlong_values() {
    let raw = "a".repeat(DISPLAY_NAME_MAX + 1);
    assert_eq!(
        DisplayName::new(raw).expect_err("too long"),
        UserValidationError::DisplayNameTooLong {
            max: DISPLAY_NAME_MAX
        }
    );
}

#[rstest]
fn display_name_trims_whitespace() {
    let name = DisplayName::new("  Grace Hopper ").expect("valid name");
    assert_eq!(name.as_ref(), "Grace Hopper");
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("a@b", UserValidationError::InvalidEmail)]
#[case("a b@example.com", UserValidationError::InvalidEmail)]
fn email_rejects_invalid_addresses(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(raw).expect_err("invalid email"), expected);
}

#[rstest]
fn email_is_lowercased() {
    let email = Email::new("Grace@Navy.MIL").expect("valid email");
    assert_eq!(email.as_ref(), "grace@navy.mil");
}

#[rstest]
#[case("student", Role::Student)]
#[case("instructor", Role::Instructor)]
#[case("admin", Role::Admin)]
fn role_parses_known_values(#[case] raw: &str, #[case] expected: Role) {
    let role: Role = raw.parse().expect("known role");
    assert_eq!(role, expected);
    assert_eq!(role.as_str(), raw);
}

#[rstest]
fn role_rejects_unknown_values() {
    let err = "teacher".parse::<Role>().expect_err("unknown role");
    assert_eq!(err, UserValidationError::UnknownRole("teacher".to_owned()));
}

#[rstest]
#[case(Role::Student, false)]
#[case(Role::Instructor, true)]
#[case(Role::Admin, true)]
fn only_instructors_and_admins_author(#[case] role: Role, #[case] expected: bool) {
    assert_eq!(role.can_author(), expected);
}

#[rstest]
fn apply_profile_only_touches_supplied_fields(mut sample_user: User) {
    sample_user.apply_profile(ProfilePatch {
        name: None,
        bio: Some("Analyst".to_owned()),
        avatar: None,
    });

    assert_eq!(sample_user.name().as_ref(), "Ada Lovelace");
    assert_eq!(sample_user.bio(), "Analyst");
    assert_eq!(sample_user.avatar(), "");
}

#[rstest]
fn actor_carries_role(sample_user: User) {
    let actor = sample_user.actor();
    assert_eq!(actor.id(), sample_user.id());
    assert_eq!(actor.role(), Role::Instructor);
    assert!(!actor.is_admin());
}
