//! Integration tests for browsing the card through the file tree.

mod helpers;

use sdbridge_core::error::ErrorKind;
use sdbridge_service::notice::{Notice, Operation};
use sdbridge_service::tree::{Placeholder, ToggleOutcome, TreeRow};

fn node_names(rows: &[TreeRow]) -> Vec<String> {
    rows.iter()
        .filter_map(TreeRow::as_node)
        .map(|r| r.name.clone())
        .collect()
}

#[tokio::test]
async fn test_reload_renders_root_entries() {
    let device = helpers::FakeDevice::start().await;
    device.state.add_dir("/models");
    device.state.add_file("/benchy.gcode", &[0u8; 2048]);
    device.state.add_file("/cube.gcode", b"G28");
    let ctx = device.context();

    assert_eq!(ctx.tree.reload().await.unwrap(), 3);

    let rows = ctx.tree.rows().await;
    assert_eq!(node_names(&rows), vec!["models", "benchy.gcode", "cube.gcode"]);
    assert_eq!(rows[1].as_node().unwrap().size_label, "2.0 KB");
    assert_eq!(rows[2].as_node().unwrap().size_label, "3 bytes");
    assert!(!ctx.lock.is_busy());
}

#[tokio::test]
async fn test_empty_card_shows_placeholder() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();

    assert_eq!(ctx.tree.reload().await.unwrap(), 0);
    let rows = ctx.tree.rows().await;
    assert!(matches!(
        &rows[..],
        [TreeRow::Placeholder { placeholder: Placeholder::NoFiles, .. }]
    ));
}

#[tokio::test]
async fn test_folder_is_listed_once() {
    let device = helpers::FakeDevice::start().await;
    device.state.add_dir("/my models");
    device.state.add_file("/my models/part one.gcode", b"G1 X1");
    let ctx = device.context();
    ctx.tree.reload().await.unwrap();

    assert_eq!(
        ctx.tree.toggle("/my models").await.unwrap(),
        ToggleOutcome::Fetched(1)
    );
    let expanded = ctx.tree.rows().await;
    assert_eq!(node_names(&expanded), vec!["my models", "part one.gcode"]);
    assert_eq!(expanded[1].as_node().unwrap().indent, 20);

    ctx.tree.toggle("/my models").await.unwrap();
    ctx.tree.toggle("/my models").await.unwrap();

    assert_eq!(ctx.tree.rows().await, expanded);
    assert_eq!(device.state.count("GET /list?dir=/my models"), 1);
}

#[tokio::test]
async fn test_busy_card_is_reported() {
    let device = helpers::FakeDevice::start().await;
    device
        .state
        .sd_busy
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let ctx = device.context();

    let err = ctx.tree.reload().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::DeviceBusy);
    assert_eq!(
        Notice::from_error(Operation::List, &err).message,
        "Printer is busy, wait for 10s and try again"
    );
    assert!(!ctx.lock.is_busy());
}

#[tokio::test]
async fn test_bad_paths_are_invalid_requests() {
    let device = helpers::FakeDevice::start().await;
    device.state.add_file("/a.gcode", b"G28");
    let ctx = device.context();

    let missing = ctx.tree.list_directory("/nope").await.unwrap_err();
    assert_eq!(missing.kind, ErrorKind::InvalidRequest);

    let not_dir = ctx.tree.list_directory("/a.gcode").await.unwrap_err();
    assert_eq!(not_dir.kind, ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_reload_drops_folder_removed_elsewhere() {
    let device = helpers::FakeDevice::start().await;
    device.state.add_dir("/old");
    device.state.add_file("/old/part.gcode", b"G28");
    device.state.add_file("/keep.gcode", b"G28");
    let ctx = device.context();
    ctx.tree.reload().await.unwrap();
    ctx.tree.toggle("/old").await.unwrap();
    assert!(ctx.tree.node("/old/part.gcode").await.is_some());

    device.state.remove("/old/part.gcode");
    device.state.remove("/old");
    ctx.tree.reload().await.unwrap();

    assert_eq!(node_names(&ctx.tree.rows().await), vec!["keep.gcode"]);
    assert!(ctx.tree.node("/old/part.gcode").await.is_none());
}

#[tokio::test]
async fn test_expand_to_depth_walks_nested_folders() {
    let device = helpers::FakeDevice::start().await;
    device.state.add_dir("/a");
    device.state.add_dir("/a/b");
    device.state.add_file("/a/b/deep.gcode", b"G28");
    let ctx = device.context();
    ctx.tree.reload().await.unwrap();

    assert_eq!(ctx.tree.expand_to_depth(2).await, 2);
    let rows = ctx.tree.rows().await;
    assert_eq!(node_names(&rows), vec!["a", "b", "deep.gcode"]);
    assert_eq!(rows[2].depth(), 2);
}
