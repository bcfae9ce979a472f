#![cfg(unix)]

use std::sync::Arc;
use uplift_config::{FailurePolicy, Mode, NoFilesPolicy, UploadRequest};
use uplift_naming::NameTemplate;
use uplift_storage::ArtifactStore;
use uplift_storage::backend::LocalStore;
use uplift_upload::Uploader;

#[tokio::test]
async fn per_file_into_local_store() {
    let workspace = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let dist = workspace.path().join("dist");
    std::fs::create_dir_all(dist.join("linux")).unwrap();
    std::fs::create_dir_all(dist.join("macos")).unwrap();
    std::fs::write(dist.join("linux/tool"), b"elf").unwrap();
    std::fs::write(dist.join("macos/tool"), b"mach-o").unwrap();
    let files = vec![dist.join("linux/tool"), dist.join("macos/tool")];

    let store = Arc::new(LocalStore::new("local", store_dir.path()).unwrap());
    let request = UploadRequest {
        search_path: "dist/".to_string(),
        no_files_policy: NoFilesPolicy::Warn,
        overwrite: true,
        retention_days: Some(1),
        compression_level: None,
        upload_failure: FailurePolicy::Abort,
    };
    let mode = Mode::PerFile {
        template: NameTemplate::new("${dir}-${base}"),
    };
    let uploader = Uploader::new(store.clone());
    let report = uploader.run(&request, &mode, &files, &dist, Some(workspace.path())).await.unwrap();

    assert!(report.is_success());
    assert_eq!(store.list().await.unwrap(), ["dist_linux-tool", "dist_macos-tool"]);
    let manifest = store.manifest("dist_macos-tool").await.unwrap();
    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.files[0].path, std::path::Path::new("macos/tool"));
    assert!(manifest.expires_at.is_some());

    // Overwrite lets the same run be repeated.
    let report = uploader.run(&request, &mode, &files, &dist, Some(workspace.path())).await.unwrap();
    assert!(report.is_success());
    assert_eq!(store.list().await.unwrap().len(), 2);
}
