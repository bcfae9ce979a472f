#![cfg(unix)]

use rstest::rstest;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uplift_config::{FailurePolicy, Mode, NoFilesPolicy, UploadRequest};
use uplift_naming::NameTemplate;
use uplift_storage::backend::{MockCall, MockStore};
use uplift_storage::{ArtifactStore, CompressionLevel, UploadOptions};
use uplift_upload::error::ErrorKind;
use uplift_upload::{UploadResult, Uploader, Verdict};

fn request() -> UploadRequest {
    UploadRequest {
        search_path: "dist/".to_string(),
        no_files_policy: NoFilesPolicy::Warn,
        overwrite: false,
        retention_days: None,
        compression_level: None,
        upload_failure: FailurePolicy::Abort,
    }
}

fn single(name: &str) -> Mode {
    Mode::SingleArtifact { name: name.to_string() }
}

fn per_file(template: &str) -> Mode {
    Mode::PerFile {
        template: NameTemplate::new(template),
    }
}

fn paths(paths: &[&str]) -> Vec<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
}

fn uploaded_names(calls: &[MockCall]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            MockCall::Upload { name, .. } => Some(name.clone()),
            MockCall::Delete(_) => None,
        })
        .collect()
}

async fn run(
    store: &Arc<MockStore>,
    request: &UploadRequest,
    mode: &Mode,
    files: &[PathBuf],
    root: &str,
    workspace: Option<&str>,
) -> uplift_upload::error::Result<uplift_upload::Report> {
    Uploader::new(store.clone())
        .run(request, mode, files, Path::new(root), workspace.map(Path::new))
        .await
}

#[tokio::test]
async fn single_artifact_uploads_all_files_once() {
    let store = Arc::new(MockStore::default());
    let files = paths(&["/work/dist/a.txt", "/work/dist/sub/b.txt"]);
    let report = run(&store, &request(), &single("bundle"), &files, "/work/dist", None).await.unwrap();

    assert!(report.is_success());
    assert_eq!(store.calls().await, [MockCall::Upload {
        name: "bundle".to_string(),
        files: files.clone(),
        root: PathBuf::from("/work/dist"),
        options: UploadOptions::default(),
    }]);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].files, files);
}

#[rstest]
#[case::missing(MockStore::default())]
#[case::existing(MockStore::with_artifacts(["x"]))]
#[case::delete_fails(MockStore::default().failing_deletes())]
#[tokio::test]
async fn overwrite_deletes_before_upload(#[case] store: MockStore) {
    let store = Arc::new(store);
    let request = UploadRequest {
        overwrite: true,
        ..request()
    };
    let report = run(&store, &request, &single("x"), &paths(&["/work/a.txt"]), "/work", None).await.unwrap();

    assert!(report.is_success());
    let calls = store.calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], MockCall::Delete("x".to_string()));
    assert!(matches!(&calls[1], MockCall::Upload { name, .. } if name == "x"));
    assert!(store.exists("x").await.unwrap());
}

#[tokio::test]
async fn without_overwrite_nothing_is_deleted() {
    let store = Arc::new(MockStore::with_artifacts(["x"]));
    let err = run(&store, &request(), &single("x"), &paths(&["/work/a.txt"]), "/work", None).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Upload { name } if name == "x"));
    assert_eq!(uploaded_names(&store.calls().await), ["x"]);
    assert_eq!(store.calls().await.len(), 1);
}

#[tokio::test]
async fn per_file_disambiguates_repeated_names() {
    let store = Arc::new(MockStore::default());
    let files = paths(&["/work/a/report.txt", "/work/b/report.txt", "/work/c/report.txt"]);
    let report = run(&store, &request(), &per_file("${base}"), &files, "/work", None).await.unwrap();

    assert_eq!(report.uploaded().collect::<Vec<_>>(), ["report.txt", "1__report.txt", "2__report.txt"]);
    for call in store.calls().await {
        let MockCall::Upload { files, root, .. } = call else {
            panic!("unexpected delete");
        };
        assert_eq!(files.len(), 1);
        // Every upload keeps the discovered root directory.
        assert_eq!(root, PathBuf::from("/work"));
    }
}

#[rstest]
#[case("${dir}_${base}", None, &["dist_a.txt", "dist_sub_b.txt"])]
#[case("${dir}_${base}", Some("/work/dist"), &["_a.txt", "sub_b.txt"])]
#[case("${name}-linux${ext}", None, &["a-linux.txt", "b-linux.txt"])]
#[case("${root}${base}", Some("C:"), &["C-a.txt", "C-b.txt"])]
#[case("${name}:v1${ext}", None, &["a-v1.txt", "b-v1.txt"])]
#[tokio::test]
async fn per_file_names(#[case] template: &str, #[case] workspace: Option<&str>, #[case] expected: &[&str]) {
    let store = Arc::new(MockStore::default());
    let files = paths(&["/work/dist/a.txt", "/work/dist/sub/b.txt"]);
    let report = run(&store, &request(), &per_file(template), &files, "/work/dist", workspace).await.unwrap();
    assert_eq!(report.uploaded().collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn per_file_overwrite_deletes_resolved_name() {
    let store = Arc::new(MockStore::with_artifacts(["1__a.txt"]));
    let request = UploadRequest {
        overwrite: true,
        ..request()
    };
    let files = paths(&["/work/x/a.txt", "/work/y/a.txt"]);
    run(&store, &request, &per_file("${base}"), &files, "/work", None).await.unwrap();

    let deletes: Vec<_> = store
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            MockCall::Delete(name) => Some(name),
            MockCall::Upload { .. } => None,
        })
        .collect();
    assert_eq!(deletes, ["a.txt", "1__a.txt"]);
    assert!(store.exists("1__a.txt").await.unwrap());
}

#[rstest]
#[case(NoFilesPolicy::Warn, true)]
#[case(NoFilesPolicy::Ignore, true)]
#[case(NoFilesPolicy::Error, false)]
#[tokio::test]
async fn no_files_policy(#[case] policy: NoFilesPolicy, #[case] success: bool) {
    for mode in [single("artifact"), per_file("${base}")] {
        let store = Arc::new(MockStore::default());
        let request = UploadRequest {
            no_files_policy: policy,
            ..request()
        };
        let report = run(&store, &request, &mode, &[], "/work", None).await.unwrap();
        assert_eq!(report.is_success(), success);
        assert!(report.outcomes.is_empty());
        assert!(store.calls().await.is_empty());
    }
}

#[tokio::test]
async fn no_files_error_reports_search_path() {
    let store = Arc::new(MockStore::default());
    let request = UploadRequest {
        no_files_policy: NoFilesPolicy::Error,
        ..request()
    };
    let report = run(&store, &request, &single("artifact"), &[], "/work", None).await.unwrap();
    assert_eq!(
        report.verdict,
        Verdict::Failed("No files were found with the provided path: dist/. No artifacts will be uploaded.".to_string())
    );
}

#[rstest]
#[case(None, None)]
#[case(Some(0), None)]
#[case(Some(9), Some(30))]
#[tokio::test]
async fn upload_options_forwarded(#[case] level: Option<u32>, #[case] retention_days: Option<u32>) {
    let store = Arc::new(MockStore::default());
    let compression_level = level.map(|level| CompressionLevel::try_from(level).unwrap());
    let request = UploadRequest {
        compression_level,
        retention_days,
        ..request()
    };
    let files = paths(&["/work/a.txt", "/work/b.txt"]);
    run(&store, &request, &per_file("${base}"), &files, "/work", None).await.unwrap();
    for call in store.calls().await {
        let MockCall::Upload { options, .. } = call else {
            panic!("unexpected delete");
        };
        assert_eq!(options, UploadOptions {
            retention_days,
            compression_level,
        });
    }
}

#[tokio::test]
async fn per_file_abort_stops_at_first_failure() {
    let store = Arc::new(MockStore::default().failing_upload("b.txt"));
    let files = paths(&["/work/a.txt", "/work/sub/b.txt", "/work/c.txt"]);
    let err = run(&store, &request(), &per_file("${base}"), &files, "/work", None).await.unwrap_err();

    let ErrorKind::Aborted { name, file, uploaded } = &*err else {
        panic!("expected an aborted run, got {err:?}");
    };
    assert_eq!(name, "b.txt");
    assert_eq!(file, Path::new("/work/sub/b.txt"));
    assert_eq!(uploaded, &["a.txt"]);
    assert!(format!("{err:?}").contains("/work/sub/b.txt"));
    assert_eq!(uploaded_names(&store.calls().await), ["a.txt", "b.txt"]);
    assert_eq!(store.list().await.unwrap(), ["a.txt"]);
}

#[tokio::test]
async fn per_file_abort_on_first_file_reports_nothing_uploaded() {
    let store = Arc::new(MockStore::default().failing_upload("a.txt"));
    let files = paths(&["/work/a.txt", "/work/b.txt"]);
    let err = run(&store, &request(), &per_file("${base}"), &files, "/work", None).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Aborted { uploaded, .. } if uploaded.is_empty()));
    assert_eq!(uploaded_names(&store.calls().await), ["a.txt"]);
}

#[tokio::test]
async fn per_file_names_collide_after_colon_replacement() {
    let store = Arc::new(MockStore::default());
    let files = paths(&["/work/a:b.txt", "/work/a-b.txt"]);
    let report = run(&store, &request(), &per_file("${base}"), &files, "/work", None).await.unwrap();
    assert_eq!(report.uploaded().collect::<Vec<_>>(), ["a-b.txt", "1__a-b.txt"]);
}

#[tokio::test]
async fn per_file_continue_uploads_remaining_files() {
    let store = Arc::new(MockStore::default().failing_upload("b.txt"));
    let request = UploadRequest {
        upload_failure: FailurePolicy::Continue,
        ..request()
    };
    let files = paths(&["/work/a.txt", "/work/b.txt", "/work/x/b.txt"]);
    let report = run(&store, &request, &per_file("${base}"), &files, "/work", None).await.unwrap();

    // The failed name still counts as assigned.
    assert_eq!(uploaded_names(&store.calls().await), ["a.txt", "b.txt", "2__b.txt"]);
    assert!(!report.is_success());
    assert!(matches!(report.outcomes[1].result, UploadResult::Failed(_)));
    assert_eq!(report.uploaded().collect::<Vec<_>>(), ["a.txt", "2__b.txt"]);
}

#[tokio::test]
async fn invalid_rendered_name_is_an_upload_error() {
    let store = Arc::new(MockStore::default());
    let files = paths(&["/work/a.txt"]);
    let err = run(&store, &request(), &per_file("${name}?"), &files, "/work", None).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Aborted { name, .. } if name == "a?"));
}

#[tokio::test]
async fn single_artifact_failure_is_an_upload_error() {
    let store = Arc::new(MockStore::default().failing_upload("bundle"));
    let err = run(&store, &request(), &single("bundle"), &paths(&["/work/a.txt"]), "/work", None).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Upload { name } if name == "bundle"));
}
