use std::fs;
use std::path::Path;

use slicebench::commands::live_mask_string;
use slicebench::{canonicalize_or_current, infer_bench_name};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_resolves_existing_and_missing_paths() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");

    let existing = canonicalize_or_current(subdir.to_str().expect("utf8 path"))
        .expect("canonicalize nested");
    assert_eq!(existing, subdir.canonicalize().expect("canonicalize subdir"));

    // Roots that do not exist yet (e.g. for `init`) still resolve.
    let missing = tmp.path().join("not-yet");
    let resolved =
        canonicalize_or_current(missing.to_str().expect("utf8 path")).expect("resolve missing");
    assert!(resolved.ends_with("not-yet"));
}

#[test]
fn infer_bench_name_uses_last_path_component() {
    assert_eq!(infer_bench_name(Path::new("/tmp/layered-bench")), "layered-bench");
    assert_eq!(infer_bench_name(Path::new("C:/work/slicebench")), "slicebench");
}

#[test]
fn infer_bench_name_falls_back_when_missing() {
    assert_eq!(infer_bench_name(Path::new("/")), "unnamed-bench");
}

#[test]
fn live_masks_render_one_char_per_statement() {
    assert_eq!(live_mask_string(&[true, false, false, true]), "L..L");
    assert_eq!(live_mask_string(&[]), "");
}
