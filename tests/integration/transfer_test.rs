//! Integration tests for uploads, downloads, deletes and raw writes.

mod helpers;

use std::sync::atomic::Ordering;

use sdbridge_core::error::ErrorKind;
use sdbridge_service::notice::{Notice, Operation};
use sdbridge_service::{LocalFile, TransferView};

#[tokio::test]
async fn test_upload_stores_file_and_reloads() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();

    ctx.transfers
        .upload(LocalFile::new("benchy.gcode", &b"G28\nG1 X10"[..]))
        .await
        .unwrap();

    assert_eq!(
        device.state.files.lock().unwrap().get("/benchy.gcode").map(Vec::len),
        Some(10)
    );
    let parts = device.state.parts.lock().unwrap().clone();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].endpoint, "/upload");
    assert_eq!(parts[0].field, "data");
    assert_eq!(parts[0].file_name.as_deref(), Some("/benchy.gcode"));

    assert_eq!(device.state.count("GET /list?dir=/"), 1);
    assert!(ctx.tree.node("/benchy.gcode").await.is_some());
    assert_eq!(ctx.transfers.view(), TransferView::default());
    assert!(!ctx.lock.is_busy());
}

#[tokio::test]
async fn test_rejected_upload_does_not_reload() {
    let device = helpers::FakeDevice::start().await;
    *device.state.upload_failure.lock().unwrap() = Some(500);
    let ctx = device.context();

    let err = ctx
        .transfers
        .upload(LocalFile::new("a.gcode", &b"G28"[..]))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Transport);
    assert_eq!(
        Notice::from_error(Operation::Upload, &err).message,
        "Upload failed!"
    );
    assert_eq!(device.state.count("GET /list"), 0);
    assert!(!ctx.lock.is_busy());
}

#[tokio::test]
async fn test_large_upload_ends_with_default_view() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();
    let data = vec![b'G'; 512 * 1024];

    ctx.transfers
        .upload(LocalFile::new("big.gcode", data))
        .await
        .unwrap();

    assert_eq!(
        device.state.files.lock().unwrap().get("/big.gcode").map(Vec::len),
        Some(512 * 1024)
    );
    let view = ctx.transfers.view();
    assert!(!view.busy);
    assert!(view.upload_enabled);
    assert!(!view.progress_visible);
}

#[tokio::test]
async fn test_download_fetches_bytes_and_relinquishes() {
    let device = helpers::FakeDevice::start().await;
    device.state.add_dir("/models");
    device.state.add_file("/models/part one.gcode", b"G1 X5 Y5");
    let ctx = device.context();

    let file = ctx.transfers.download("/models/part one.gcode").await.unwrap();
    assert_eq!(file.name, "part one.gcode");
    assert_eq!(&file.data[..], b"G1 X5 Y5");
    assert_eq!(device.state.relinquished.load(Ordering::SeqCst), 1);
    assert!(!ctx.lock.is_busy());

    let dir = tempfile::tempdir().unwrap();
    let saved = file.save(dir.path()).await.unwrap();
    assert_eq!(saved, dir.path().join("part one.gcode"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"G1 X5 Y5");
}

#[tokio::test]
async fn test_download_missing_file() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();

    let err = ctx.transfers.download("/missing.gcode").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Transport);
    assert_eq!(
        Notice::from_error(Operation::Download, &err).message,
        "Download failed!"
    );
    assert_eq!(device.state.relinquished.load(Ordering::SeqCst), 0);
    assert!(!ctx.lock.is_busy());
}

#[tokio::test]
async fn test_download_while_card_busy() {
    let device = helpers::FakeDevice::start().await;
    device.state.add_file("/a.gcode", b"G28");
    device.state.sd_busy.store(true, Ordering::SeqCst);
    let ctx = device.context();

    let err = ctx.transfers.download("/a.gcode").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::DeviceBusy);
    assert_eq!(device.state.relinquished.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_delete_removes_and_reloads() {
    let device = helpers::FakeDevice::start().await;
    device.state.add_file("/a.gcode", b"G28");
    device.state.add_file("/b.gcode", b"G28");
    let ctx = device.context();
    ctx.tree.reload().await.unwrap();

    ctx.transfers.delete("/a.gcode").await.unwrap();

    assert!(!device.state.files.lock().unwrap().contains_key("/a.gcode"));
    assert_eq!(device.state.count("GET /list?dir=/"), 2);
    assert!(ctx.tree.node("/a.gcode").await.is_none());
    assert!(ctx.tree.node("/b.gcode").await.is_some());
}

#[tokio::test]
async fn test_delete_missing_still_reloads() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();

    let err = ctx.transfers.delete("/ghost.gcode").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidRequest);
    assert_eq!(
        Notice::from_error(Operation::Delete, &err).message,
        "Bad args, please try again or reset the module"
    );
    assert_eq!(device.state.count("GET /list?dir=/"), 1);
}

#[tokio::test]
async fn test_edit_writes_without_reload() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();

    ctx.transfers
        .edit(LocalFile::new("config.txt", &b"speed=10"[..]))
        .await
        .unwrap();

    let parts = device.state.parts.lock().unwrap().clone();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].endpoint, "/edit");
    assert_eq!(
        device.state.files.lock().unwrap().get("/config.txt").map(Vec::as_slice),
        Some(&b"speed=10"[..])
    );
    assert_eq!(device.state.count("GET /list"), 0);
    assert_eq!(
        Notice::done(Operation::Edit).message,
        "Write done!"
    );
}
