mod support;

use momentum::checkin::{CheckInPatch, NewCheckIn};
use momentum::error::{Entity, Error};
use support::{TestEnv, INTRUDER, OWNER};

#[test]
fn check_in_lifecycle() {
    let env = TestEnv::new();
    let store = env.check_ins();

    let created = store
        .create(
            OWNER,
            NewCheckIn {
                content: "Wrapped up the parser rewrite".to_string(),
                mood: Some("energized".to_string()),
                tags: vec!["deep-work".to_string(), "rust".to_string()],
                focused_hours: Some(4.0),
                ..NewCheckIn::default()
            },
        )
        .unwrap();

    let fetched = store.get(OWNER, &created.id).unwrap();
    assert_eq!(fetched.content, "Wrapped up the parser rewrite");
    assert_eq!(fetched.tags.len(), 2);
    assert!(!fetched.is_public);

    let updated = store
        .update(
            OWNER,
            &created.id,
            CheckInPatch {
                is_public: Some(true),
                reflections: Some(Some("should start earlier".to_string())),
                ..CheckInPatch::default()
            },
        )
        .unwrap();
    assert!(updated.is_public);
    assert_eq!(updated.reflections.as_deref(), Some("should start earlier"));

    store.delete(OWNER, &created.id).unwrap();
    assert!(matches!(
        store.get(OWNER, &created.id).unwrap_err(),
        Error::NotFound(Entity::CheckIn)
    ));
}

#[test]
fn listing_is_per_owner_and_date_sorted() {
    let env = TestEnv::new();
    let store = env.check_ins();

    for (owner, content, date) in [
        (OWNER, "mine old", "2026-08-01T08:00:00Z"),
        (OWNER, "mine new", "2026-08-06T08:00:00Z"),
        (INTRUDER, "theirs", "2026-08-05T08:00:00Z"),
    ] {
        store
            .create(
                owner,
                NewCheckIn {
                    content: content.to_string(),
                    date: Some(date.parse().unwrap()),
                    ..NewCheckIn::default()
                },
            )
            .unwrap();
    }

    let mine = store.list(OWNER).unwrap();
    let contents: Vec<&str> = mine.iter().map(|entry| entry.content.as_str()).collect();
    assert_eq!(contents, ["mine new", "mine old"]);
}
