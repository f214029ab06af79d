use afnetns_core::{Error, NamespaceName};
use afnetns_namespace::HandleManager;
use afnetns_registry::{InodeNameCache, Registry};
use tempfile::TempDir;

fn name(s: &str) -> NamespaceName {
    NamespaceName::new(s).unwrap()
}

#[test]
fn test_create_then_list_rolls_back_on_unpatched_kernel() {
    // Isolation needs the afnetns kernel patch; on anything else create
    // must fail and leave no trace behind.
    let dir = TempDir::new().unwrap();
    let manager = HandleManager::with_run_dir(dir.path());

    assert!(manager.create(&name("blue")).is_err());
    assert!(manager.list().unwrap().is_empty());
}

#[test]
fn test_list_is_registry_passthrough() {
    let dir = TempDir::new().unwrap();
    let manager = HandleManager::with_run_dir(dir.path());

    assert!(manager.list().unwrap().is_empty());

    manager.registry().ensure_dir().unwrap();
    manager.registry().create_exclusive(&name("blue")).unwrap();
    manager.registry().create_exclusive(&name("green")).unwrap();

    let mut names = manager.list().unwrap();
    names.sort();
    assert_eq!(names, ["blue", "green"]);
}

#[test]
fn test_delete_then_list_is_absent() {
    let dir = TempDir::new().unwrap();
    let manager = HandleManager::with_run_dir(dir.path());
    manager.registry().ensure_dir().unwrap();
    manager.registry().create_exclusive(&name("blue")).unwrap();

    let report = manager.delete(&name("blue"));
    assert!(report.succeeded());
    assert!(manager.list().unwrap().is_empty());
}

#[test]
fn test_delete_is_best_effort_on_missing_name() {
    let dir = TempDir::new().unwrap();
    let manager = HandleManager::with_run_dir(dir.path());
    manager.registry().ensure_dir().unwrap();

    // Fails, but only by reporting: both phases ran, neither panicked
    let report = manager.delete(&name("ghost"));
    assert!(!report.succeeded());
    assert!(report.unmount.is_err());
    assert!(report.unlink.is_err());
}

#[test]
fn test_registered_handles_resolve_through_the_cache() {
    use std::os::unix::fs::MetadataExt;

    let dir = TempDir::new().unwrap();
    let run_dir = dir.path().join("afnetns");
    let manager = HandleManager::with_run_dir(&run_dir);
    manager.registry().ensure_dir().unwrap();
    manager.registry().create_exclusive(&name("blue")).unwrap();

    let inode = std::fs::metadata(run_dir.join("blue")).unwrap().ino();

    // Fake self reference so resolution works without the kernel patch
    let link = dir.path().join("self_ref");
    std::os::unix::fs::symlink(format!("afnet:[{inode}]"), &link).unwrap();

    let cache = InodeNameCache::new(Registry::with_root(&run_dir)).with_self_link(&link);
    assert_eq!(
        cache
            .lookup(afnetns_core::NamespaceInode::from_raw(inode))
            .as_deref(),
        Some("blue,self")
    );
}

#[test]
fn test_exec_usage_and_not_found_precede_side_effects() {
    let dir = TempDir::new().unwrap();
    let manager = HandleManager::with_run_dir(dir.path());
    manager.registry().ensure_dir().unwrap();

    assert!(matches!(
        manager.exec(&name("ghost"), &[]),
        Err(Error::Usage { .. })
    ));
    assert!(matches!(
        manager.exec(&name("ghost"), &["/bin/true".to_string()]),
        Err(Error::NotFound { .. })
    ));
}

#[test]
#[ignore] // Requires root and the afnetns kernel patch
fn test_full_lifecycle_on_patched_kernel() {
    let manager = HandleManager::new();
    let ns = name("afnetns-test");

    manager.create(&ns).unwrap();
    assert!(manager.list().unwrap().contains(&"afnetns-test".to_string()));

    manager.switch(&ns).unwrap();

    let report = manager.delete(&ns);
    assert!(report.succeeded());
    assert!(!manager.list().unwrap().contains(&"afnetns-test".to_string()));
}
