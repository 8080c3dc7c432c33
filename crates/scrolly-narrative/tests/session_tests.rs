use pretty_assertions::assert_eq;
use scrolly_data::{RawDatasets, StoreError};
use scrolly_narrative::{
    ControlState, Interaction, NarrativeConfig, NarrativeError, NavEvent, Outcome, RenderOutcome,
    RendererId, SceneRegistry, Session,
};
use scrolly_test_utils::{sample_raw_datasets, DrawCall, FailingSource, RecordingSurface, StaticSource};
use std::time::Duration;

fn session() -> Session<RecordingSurface> {
    Session::new(
        SceneRegistry::standard(),
        RecordingSurface::new(),
        NarrativeConfig::default(),
    )
}

fn click(key: &str) -> Interaction {
    Interaction::ElementActivated { key: key.to_string() }
}

#[tokio::test]
async fn load_renders_first_scene() {
    let mut s = session();
    let counts = s.load(&StaticSource::sample()).await.unwrap();

    assert_eq!(counts.listings, 6);
    assert_eq!(counts.neighbourhoods, 4);
    assert_eq!(counts.reviews, 6);
    assert!(s.is_loaded());
    assert!(matches!(s.surface().current(), Some(DrawCall::Bar(_))));
    assert_eq!(s.surface().keys(), vec!["Williamsburg", "Chelsea", "Harlem"]);
    assert_eq!(
        s.controls(),
        ControlState {
            can_advance: true,
            can_retreat: false,
            index: 0,
            len: 5
        }
    );
}

#[tokio::test(start_paused = true)]
async fn load_waits_for_slow_source() {
    let mut s = session();
    let source = StaticSource::sample().with_delay(Duration::from_secs(30));
    s.load(&source).await.unwrap();
    assert!(s.is_loaded());
}

#[tokio::test]
async fn failed_fetch_shows_placeholder_and_stays_unloaded() {
    let mut s = session();
    let err = s.load(&FailingSource::new("connection refused")).await.unwrap_err();

    assert!(err.is_data_error());
    assert_eq!(err.to_string(), "dataset source failed: connection refused");
    assert!(!s.is_loaded());
    assert!(s.surface().is_placeholder());
    assert_eq!(
        s.surface().current(),
        Some(&DrawCall::Placeholder("No data available".to_string()))
    );
    assert_eq!(
        s.controls(),
        ControlState {
            len: 5,
            ..ControlState::default()
        }
    );
}

#[tokio::test]
async fn bad_row_fails_load_and_allows_retry() {
    let mut s = session();
    let mut raw = sample_raw_datasets();
    raw.listings[0] = raw.listings[0].clone().with("price", "ask");
    let err = s.load(&StaticSource::new(raw)).await.unwrap_err();
    assert!(matches!(err, NarrativeError::Store(StoreError::Coercion { .. })));
    assert!(s.surface().is_placeholder());

    s.load(&StaticSource::sample()).await.unwrap();
    assert!(s.is_loaded());
}

#[tokio::test]
async fn second_load_is_rejected() {
    let mut s = session();
    s.load(&StaticSource::sample()).await.unwrap();
    let err = s.load(&StaticSource::sample()).await.unwrap_err();
    assert_eq!(err, NarrativeError::Store(StoreError::AlreadyLoaded));
    assert!(s.is_loaded());
}

#[tokio::test]
async fn empty_datasets_load_and_show_placeholder() {
    let mut s = session();
    s.load(&StaticSource::new(RawDatasets::default())).await.unwrap();
    assert!(s.is_loaded());
    assert!(s.surface().is_placeholder());
}

#[test]
fn events_before_load_are_rejected() {
    let mut s = session();
    assert_eq!(s.advance().unwrap_err(), NarrativeError::NotLoaded);
    assert_eq!(s.retreat().unwrap_err(), NarrativeError::NotLoaded);
    assert_eq!(s.handle(NavEvent::Select("Harlem".into())).unwrap_err(), NarrativeError::NotLoaded);
    assert_eq!(s.interact(&click("Harlem")).unwrap_err(), NarrativeError::NotLoaded);
    assert!(s.state().is_none());
}

#[tokio::test]
async fn clicks_drive_drill_down() {
    let mut s = session();
    s.load(&StaticSource::sample()).await.unwrap();

    let handled = s.interact(&click("Chelsea")).unwrap().unwrap();
    assert_eq!(handled.outcome, Outcome::Selected { advanced: true });
    assert_eq!(
        handled.render,
        RenderOutcome::Drawn {
            renderer: RendererId::Bar,
            elements: 2
        }
    );
    assert_eq!(s.surface().keys(), vec!["3", "4"]);
    assert_eq!(s.surface().chart().unwrap().title, "Listings in Chelsea");

    // Harlem is no longer drawn
    assert_eq!(s.interact(&click("Harlem")).unwrap(), None);

    s.interact(&click("3")).unwrap().unwrap();
    assert!(matches!(s.surface().current(), Some(DrawCall::LinePoints(_))));
    assert_eq!(s.surface().keys(), vec!["2019-02"]);
    // Reviews chart is not interactive
    assert_eq!(s.interact(&click("2019-02")).unwrap(), None);
}

#[tokio::test]
async fn retreat_resets_selection_and_redraws() {
    let mut s = session();
    s.load(&StaticSource::sample()).await.unwrap();
    s.interact(&click("Harlem")).unwrap();
    s.retreat().unwrap();

    assert_eq!(s.controls().index, 0);
    assert!(s.state().unwrap().selection.is_empty());
    assert_eq!(s.surface().keys(), vec!["Williamsburg", "Chelsea", "Harlem"]);
}

#[tokio::test]
async fn controls_track_terminal_scene() {
    let mut s = session();
    s.load(&StaticSource::sample()).await.unwrap();
    for _ in 0..4 {
        assert_eq!(s.advance().unwrap().outcome, Outcome::Advanced);
    }
    assert_eq!(
        s.controls(),
        ControlState {
            can_advance: false,
            can_retreat: true,
            index: 4,
            len: 5
        }
    );
    assert!(matches!(s.surface().current(), Some(DrawCall::Text { .. })));

    let handled = s.advance().unwrap();
    assert!(handled.outcome.is_ignored());
    assert_eq!(s.controls().index, 4);
    assert_eq!(s.journal().unwrap().entries().len(), 5);
}

#[tokio::test]
async fn custom_placeholder_message() {
    let mut s = Session::new(
        SceneRegistry::standard(),
        RecordingSurface::new(),
        NarrativeConfig::default().with_no_data_message("Nothing to see"),
    );
    s.load(&StaticSource::sample()).await.unwrap();
    s.handle(NavEvent::Select("Astoria".into())).unwrap();
    assert_eq!(
        s.surface().current(),
        Some(&DrawCall::Placeholder("Nothing to see".to_string()))
    );
}
