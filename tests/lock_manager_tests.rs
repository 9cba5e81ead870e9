use docdao::{Change, FixedUserId, LockManager, Locked, SessionUserId};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[test]
fn test_single_editing_session_per_user() {
    let lm = LockManager::new(Arc::new(FixedUserId::new("u")));
    assert_eq!(lm.lock_object("A").unwrap(), Locked::Locked);

    let (locked, released) = lm.lock_object_and_unlock_all_others("B").unwrap();
    assert_eq!(locked, Locked::Locked);
    assert_eq!(released, vec!["A".to_string()]);
    assert!(!lm.is_object_locked_by_any_user("A").unwrap());
    assert_eq!(lm.lock_user_id("B").unwrap().as_deref(), Some("u"));
}

#[test]
fn test_lock_held_by_other_user_is_not_taken_over() {
    let lm = LockManager::new(Arc::new(FixedUserId::new("u")));
    lm.lock_object_for_user("B", "other").unwrap();
    lm.lock_object("A").unwrap();

    let (locked, released) = lm.lock_object_and_unlock_all_others("B").unwrap();
    assert_eq!(locked, Locked::NotLocked);
    assert_eq!(released, vec!["A".to_string()]);
    assert!(lm.is_object_locked_by_other_user("B").unwrap());
}

#[test]
fn test_queries_do_not_mutate() {
    let lm = LockManager::new(Arc::new(FixedUserId::new("u")));
    lm.lock_object("A").unwrap();
    let before = lm.lock_info("A").unwrap();
    for _ in 0..3 {
        lm.is_object_locked_by_current_user("A").unwrap();
        lm.is_object_locked_by_other_user("A").unwrap();
        lm.is_object_locked_by_any_user("X").unwrap();
    }
    assert_eq!(lm.lock_info("A").unwrap(), before);
    assert_eq!(lm.all_locked_objects().unwrap(), HashSet::from(["A".to_string()]));
}

#[test]
fn test_session_logout_releases_locks() {
    let session = Arc::new(SessionUserId::new());
    let lm = LockManager::new(session.clone());
    session.set_user_id(Some("alice".to_string()));
    lm.lock_object("doc-1").unwrap();
    lm.lock_object("doc-2").unwrap();

    let released = lm.unlock_all_objects_of_current_user().unwrap();
    assert_eq!(released.len(), 2);
    session.set_user_id(None);
    assert_eq!(lm.unlock_object("doc-1").unwrap(), Change::Unchanged);
    assert!(lm.all_locked_objects().unwrap().is_empty());
}

#[test]
fn test_concurrent_lockers_get_exactly_one_owner() {
    let lm = Arc::new(LockManager::new(Arc::new(FixedUserId::anonymous())));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let lm = lm.clone();
            thread::spawn(move || lm.lock_object_for_user("shared", &format!("user-{}", i)).unwrap())
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|locked| locked.is_locked())
        .count();
    assert_eq!(winners, 1);

    let owner = lm.lock_user_id("shared").unwrap().unwrap();
    assert_eq!(lm.unlock_object_for_user(&owner, "shared").unwrap(), Change::Changed);
}
