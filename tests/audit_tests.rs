use docdao::audit::{AuditActionType, AuditNotation, AuditorState};
use docdao::{
    AsyncAuditor, AuditItem, AuditManager, Auditor, Change, DaoConfig, DaoError, FileSystemIo, FixedUserId,
    Success,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_auditor_performs_every_item() {
    let total = Arc::new(AtomicUsize::new(0));
    let batches = Arc::new(AtomicUsize::new(0));
    let (t, b) = (total.clone(), batches.clone());
    let auditor = Arc::new(AsyncAuditor::new(Arc::new(FixedUserId::new("u")), move |items: &[AuditItem]| {
        t.fetch_add(items.len(), Ordering::SeqCst);
        b.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap());

    let producers: Vec<_> = (0..3)
        .map(|p| {
            let auditor = auditor.clone();
            std::thread::spawn(move || {
                for i in 0..4 {
                    auditor.on_modify_success("doc", "title", &[&p, &i]).unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    assert_eq!(auditor.stop().await.unwrap(), Change::Changed);
    assert_eq!(total.load(Ordering::SeqCst), 12);
    assert!(batches.load(Ordering::SeqCst) >= 1);

    assert_eq!(auditor.stop().await.unwrap(), Change::Unchanged);
    assert_eq!(auditor.state().unwrap(), AuditorState::Stopped);
    let err = auditor.on_execute_success("late", &[]).unwrap_err();
    assert!(matches!(err, DaoError::IllegalState(_)));
}

#[tokio::test]
async fn test_async_auditor_plain_notation() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let auditor = AsyncAuditor::new(Arc::new(FixedUserId::anonymous()), move |items: &[AuditItem]| {
        sink.lock().unwrap().extend(items.iter().map(|i| i.action.clone()));
    })
    .unwrap()
    .with_notation(AuditNotation::Plain);

    auditor.on_undelete_failure("user", &[&"u9"]).unwrap();
    auditor.stop().await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["user(u9)".to_string()]);
}

#[test]
fn test_audit_manager_writes_daily_file() {
    let dir = tempdir().unwrap();
    let io = Arc::new(FileSystemIo::new(dir.path()));
    let current_user = Arc::new(FixedUserId::new("admin"));

    let manager = AuditManager::new("audit", current_user.clone(), DaoConfig::new(), io.clone()).unwrap();
    manager.on_create_success("user", &[&"u1"]).unwrap();
    manager.on_execute_failure("backup", &[&"disk full"]).unwrap();

    let filename = manager.dao().filename().unwrap();
    assert!(dir.path().join(&filename).exists());

    let reopened = AuditManager::new("audit", current_user, DaoConfig::new(), io).unwrap();
    let items = reopened.all_audit_items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].action_type, AuditActionType::Create);
    assert_eq!(items[1].success, Success::Failure);
    assert_eq!(items[1].action, "backup(disk full)");
}
