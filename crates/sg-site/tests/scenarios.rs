//! Watch-mode scenarios driven through a hand-fed signal source.

use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use sg_core::{Config, WatchedRole};
use sg_site::{LoopOutcome, SiteGenerator};
use sg_watcher::{ChangeEvent, ChangeKind, ChannelSource, WatchSignal};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct Scratch {
    _temp: TempDir,
    root: Utf8PathBuf,
    out: Utf8PathBuf,
    generator: SiteGenerator,
}

fn scratch() -> Scratch {
    let temp = TempDir::new().unwrap();
    let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let root = base.join("www");
    let files = [
        ("_layouts/base.html", "v1[{% block body %}{% endblock %}]"),
        ("_partials/nav.html", "<nav/>"),
        ("index.html", "{% extends \"base\" %}{% block body %}home{% endblock %}"),
        ("about.html", "{% extends \"base\" %}{% block body %}{% include \"nav\" %}about{% endblock %}"),
        ("css/site.css", "body { color: red }"),
        ("js/app.js", "start()"),
        ("img/logo.svg", "<svg/>"),
    ];
    for (name, contents) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    let mut config = Config::default();
    config.site.source = root.clone();
    config.site.destination = base.join("_site");
    config.watch.debounce_ms = 20;
    config.watch.initial_build = false;

    let generator = SiteGenerator::new(config).unwrap();
    let root = generator.site().source_root().to_owned();
    let out = generator.site().destination_root().to_owned();
    Scratch {
        _temp: temp,
        root,
        out,
        generator,
    }
}

fn read(path: Utf8PathBuf) -> String {
    fs::read_to_string(path).unwrap()
}

fn change(scratch: &Scratch, role: WatchedRole, name: &str) -> WatchSignal {
    let path = scratch.generator.site().role_dir(role).join(name);
    ChangeEvent::new(role, ChangeKind::Modified, path).into()
}

#[tokio::test]
async fn css_change_resyncs_only_css() {
    let scratch = scratch();
    scratch.generator.generate().unwrap();

    fs::write(scratch.root.join("css/site.css"), "body { color: blue }").unwrap();
    fs::write(scratch.root.join("js/app.js"), "restart()").unwrap();
    fs::write(scratch.root.join("img/new.svg"), "<svg/>").unwrap();
    fs::write(scratch.root.join("index.html"), "changed").unwrap();

    let (source, tx) = ChannelSource::new(scratch.generator.site(), 8).unwrap();
    tx.send(change(&scratch, WatchedRole::Css, "site.css")).await.unwrap();
    drop(tx);
    let (outcome, stats) = scratch
        .generator
        .watch_with(source, &CancellationToken::new())
        .await;

    assert_eq!(outcome, LoopOutcome::SourceClosed);
    assert_eq!(stats.dispatches, 1);
    assert_eq!(read(scratch.out.join("css/site.css")), "body { color: blue }");
    assert_eq!(read(scratch.out.join("js/app.js")), "start()");
    assert!(!scratch.out.join("img/new.svg").exists());
    assert_eq!(read(scratch.out.join("index.html")), "v1[home]");
}

#[tokio::test]
async fn layout_change_rerenders_every_page() {
    let scratch = scratch();
    scratch.generator.generate().unwrap();
    assert_eq!(read(scratch.out.join("about.html")), "v1[<nav/>about]");

    fs::write(
        scratch.root.join("_layouts/base.html"),
        "v2<{% block body %}{% endblock %}>",
    )
    .unwrap();

    let (source, tx) = ChannelSource::new(scratch.generator.site(), 8).unwrap();
    tx.send(change(&scratch, WatchedRole::Layouts, "base.html")).await.unwrap();
    drop(tx);
    let (_, stats) = scratch
        .generator
        .watch_with(source, &CancellationToken::new())
        .await;

    assert_eq!(stats.dispatches, 1);
    insta::assert_snapshot!(
        format!(
            "{} {}",
            read(scratch.out.join("index.html")),
            read(scratch.out.join("about.html"))
        ),
        @"v2<home> v2<<nav/>about>"
    );
}

#[tokio::test]
async fn partial_and_page_changes_share_one_rebuild() {
    let scratch = scratch();
    fs::write(scratch.root.join("_partials/nav.html"), "<menu/>").unwrap();

    let (source, tx) = ChannelSource::new(scratch.generator.site(), 8).unwrap();
    tx.send(change(&scratch, WatchedRole::Partials, "nav.html")).await.unwrap();
    tx.send(change(&scratch, WatchedRole::Pages, "about.html")).await.unwrap();
    drop(tx);
    let (_, stats) = scratch
        .generator
        .watch_with(source, &CancellationToken::new())
        .await;

    assert_eq!(stats.batches, 1);
    assert_eq!(stats.dispatches, 1);
    assert_eq!(read(scratch.out.join("about.html")), "v1[<menu/>about]");
}

#[tokio::test]
async fn cancellation_while_waiting_stops_promptly() {
    let scratch = scratch();
    let (source, tx) = ChannelSource::new(scratch.generator.site(), 8).unwrap();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let (outcome, stats) = tokio::time::timeout(
        Duration::from_secs(5),
        scratch.generator.watch_with(source, &cancel),
    )
    .await
    .unwrap();

    assert_eq!(outcome, LoopOutcome::Cancelled);
    assert_eq!(stats.batches, 0);
    assert_eq!(stats.dispatches, 0);
    assert!(!scratch.out.exists());
    drop(tx);
}

#[tokio::test]
async fn signals_after_cancellation_are_not_dispatched() {
    let scratch = scratch();
    let (source, tx) = ChannelSource::new(scratch.generator.site(), 8).unwrap();
    tx.send(change(&scratch, WatchedRole::Js, "app.js")).await.unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let (outcome, stats) = scratch.generator.watch_with(source, &cancel).await;

    assert_eq!(outcome, LoopOutcome::Cancelled);
    assert_eq!(stats.dispatches, 0);
    assert!(!scratch.out.join("js").exists());
}
