use super::*;
use crossbeam_channel::bounded;

#[test]
fn queued_command_leaves_status_untouched() {
    let (tx, rx) = bounded(1);
    let mut status = "Ready".to_string();

    dispatch_backend_command(&tx, BackendCommand::LoadVehicles, &mut status);

    assert_eq!(status, "Ready");
    assert_eq!(rx.try_recv().expect("queued"), BackendCommand::LoadVehicles);
}

#[test]
fn full_queue_reports_retry_hint() {
    let (tx, _rx) = bounded(1);
    let mut status = String::new();

    dispatch_backend_command(&tx, BackendCommand::LoadVehicles, &mut status);
    dispatch_backend_command(
        &tx,
        BackendCommand::FetchImage {
            url: "https://renderings.evecp.bmw.cloud/a.jpg".into(),
        },
        &mut status,
    );

    assert!(status.contains("queue is full"));
}

#[test]
fn disconnected_backend_is_reported() {
    let (tx, rx) = bounded::<BackendCommand>(1);
    drop(rx);
    let mut status = String::new();

    dispatch_backend_command(&tx, BackendCommand::LoadVehicles, &mut status);

    assert!(status.contains("Backend worker stopped"));
}
