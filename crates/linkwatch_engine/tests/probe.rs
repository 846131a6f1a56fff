use std::sync::Arc;
use std::time::Duration;

use linkwatch_engine::{
    settle_page, EscapeAction, HostDocument, MemoryDocument, PageProfile, ProbeSettings,
    StructuralProbe, StructuralQuery,
};
use tokio::time::Instant;

fn query(source: &str) -> StructuralQuery {
    StructuralQuery::parse(source).unwrap()
}

#[tokio::test(start_paused = true)]
async fn missing_landmark_gives_up_after_max_attempts() {
    let host = MemoryDocument::new("https://discord.com/channels/1/2");
    let probe = StructuralProbe::new(ProbeSettings::default());

    let started = Instant::now();
    let outcome = probe.wait_for(&host, &query("#never")).await;

    assert_eq!(outcome, Err(EscapeAction::Reload));
    assert_eq!(host.query_count(), 200);
    assert!(started.elapsed() >= Duration::from_millis(200 * 100));
}

#[tokio::test(start_paused = true)]
async fn late_landmark_is_found_by_polling() {
    let host = MemoryDocument::new("https://discord.com/channels/1/2");
    let probe = StructuralProbe::new(ProbeSettings::default());

    let renderer = host.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(450)).await;
        renderer.render(r#"<nav aria-label="Servers sidebar"></nav>"#);
    });

    let node = probe
        .wait_for(&host, &query(r#"[aria-label="Servers sidebar"]"#))
        .await
        .expect("landmark appears");
    assert!(node.html.contains("Servers sidebar"));
    assert!(host.query_count() <= 6);
}

#[tokio::test(start_paused = true)]
async fn one_timed_out_probe_does_not_cancel_its_siblings() {
    let host = MemoryDocument::new("https://discord.com/channels/1/2");
    host.render(r#"<div class="sidebar_x1"></div>"#);
    let probe = StructuralProbe::new(ProbeSettings::default());

    let outcomes = probe
        .wait_for_all(&host, &[query("#never"), query(r#"[class^="sidebar_"]"#)])
        .await;

    assert_eq!(outcomes[0], Err(EscapeAction::Reload));
    assert!(outcomes[1].is_ok());
}

#[tokio::test(start_paused = true)]
async fn settle_page_strips_landmarks_and_clutter() {
    let host = MemoryDocument::new("https://discord.com/channels/1/2");
    let sidebar = host.render(r#"<nav aria-label="Servers sidebar"></nav>"#);
    let channels = host.render(r#"<div class="sidebar_a"></div>"#);
    let header = host.render(r#"<section aria-label="Channel header"></section>"#);
    let form = host.render(r#"<form class="form_b"></form>"#);
    let members =
        host.render(r#"<div class="content_c"><div class="container_d">members</div></div>"#);
    let list = host.render(r#"<ol data-list-id="chat-messages"></ol>"#);

    let profile = PageProfile::discord().unwrap();
    let started = Instant::now();
    let report = settle_page(Arc::new(host.clone()), profile).await;

    assert!(!report.escaped);
    assert_eq!(report.removed, 5);
    for removed in [sidebar, channels, header, form, members] {
        assert!(!host.contains(removed));
    }
    assert!(host.contains(list));
    assert!(started.elapsed() >= Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn settle_page_reports_an_escape_when_a_landmark_is_missing() {
    let host = MemoryDocument::new("https://discord.com/channels/1/2");
    let sidebar = host.render(r#"<nav aria-label="Servers sidebar"></nav>"#);

    let report = settle_page(Arc::new(host.clone()), PageProfile::discord().unwrap()).await;

    assert!(report.escaped);
    assert_eq!(report.removed, 1);
    assert!(!host.contains(sidebar));
    assert_eq!(host.location(), "https://discord.com/channels/1/2");
}
