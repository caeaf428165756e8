use super::*;

#[test]
fn unique_paths_differ_within_one_process() {
    let dir = std::env::temp_dir();
    let a = unique_temp_path(&dir, "chartreel_t", "bin");
    let b = unique_temp_path(&dir, "chartreel_t", "bin");
    assert_ne!(a, b);
    assert_eq!(a.extension().and_then(|e| e.to_str()), Some("bin"));
}

#[test]
fn guard_removes_file_unless_released() {
    let dir = std::env::temp_dir();
    let dropped = unique_temp_path(&dir, "chartreel_guard", "tmp");
    std::fs::write(&dropped, b"x").unwrap();
    drop(TempFileGuard::new(dropped.clone()));
    assert!(!dropped.exists());

    let kept = unique_temp_path(&dir, "chartreel_guard", "tmp");
    std::fs::write(&kept, b"x").unwrap();
    let mut guard = TempFileGuard::new(kept.clone());
    assert_eq!(guard.release().as_deref(), Some(kept.as_path()));
    drop(guard);
    assert!(kept.exists());
    std::fs::remove_file(kept).unwrap();
}
