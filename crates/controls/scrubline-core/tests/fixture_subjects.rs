use std::rc::Rc;

use approx::assert_relative_eq;
use scrubline_core::{
    AttachOptions, ClipSet, ControlsConfig, ControlsError, LoopMode, ManualClock,
    PlaybackController,
};

fn load(name: &str) -> Rc<ClipSet> {
    let set: ClipSet =
        scrubline_test_fixtures::clip_sets::load(name).expect("load clip set fixture");
    Rc::new(set)
}

fn controller() -> PlaybackController<ClipSet> {
    PlaybackController::with_clock(ControlsConfig::default(), Box::new(ManualClock::new()))
}

#[test]
fn catalogues_clips_from_fixture() {
    let mut controller = controller();
    controller
        .attach(load("walk-run-jump"), AttachOptions::default())
        .unwrap();

    let tracks = controller.available_tracks();
    let names: Vec<_> = tracks.iter().map(|track| track.name.as_str()).collect();
    assert_eq!(names, vec!["Walk", "Run", "Jump"]);
    assert_eq!(tracks[0].uuid, "walk-uuid");
    assert_eq!(tracks[2].sub_track_count, 1);
    assert_relative_eq!(tracks[1].duration, 15.0);
}

#[test]
fn unnamed_clips_get_generated_identity() {
    let mut controller = controller();
    controller
        .attach(load("unnamed-clips"), AttachOptions::default())
        .unwrap();

    let first = controller.track_by_index(0).unwrap();
    assert_eq!(first.name, "Animation 1");
    assert_eq!(first.uuid, "animation-0");
    assert_eq!(controller.track_by_index(1).unwrap().name, "Animation 2");
    assert_eq!(
        controller.select_track_by_name("Animation 2").unwrap().index,
        1
    );
}

#[test]
fn single_clip_disables_selector() {
    let mut controller = controller();
    controller
        .attach(load("single-clip"), AttachOptions::default())
        .unwrap();
    assert!(!controller.has_multiple_tracks());
    assert!(!controller.is_track_selector_enabled());
    assert_eq!(
        controller.view().unwrap().track_info_text.as_deref(),
        Some("2 tracks, 00:10:00")
    );
}

#[test]
fn empty_subject_attaches_without_selection() {
    let mut controller = controller();
    controller
        .attach(load("empty"), AttachOptions::playing())
        .unwrap();

    assert!(controller.attached_subject().is_some());
    assert_eq!(controller.current_track_index(), None);
    assert!(!controller.is_playing());
    assert_eq!(controller.current_time_display(), "--:--:-- / --:--:--");
    assert_eq!(
        controller.select_track(0).unwrap_err().to_string(),
        "Invalid animation index 0. No animations are available"
    );
}

#[test]
fn missing_clip_fixture_fails_to_attach() {
    let mut controller = controller();
    let err = controller
        .attach(load("missing-clip"), AttachOptions::default())
        .unwrap_err();
    assert_eq!(err, ControlsError::MissingClip { index: 1 });
    assert_eq!(err.category(), "data");
    assert!(controller.attached_subject().is_none());
}

#[test]
fn play_once_clip_clamps_at_the_end() {
    let subject = load("play-once");
    assert_eq!(subject.loop_mode, LoopMode::Once);

    let mut controller = controller();
    controller.attach(subject, AttachOptions::playing()).unwrap();
    controller.advance(3.0);

    assert_eq!(controller.current_time(), Some(2.0));
    assert_eq!(controller.current_percentage(), Some(100.0));
    assert_eq!(controller.view().unwrap().time_text, "00:02:00 / 00:02:00");
    let action = controller.bound_action().unwrap();
    assert!(!controller.mixer().unwrap().action(action).unwrap().running);
}
