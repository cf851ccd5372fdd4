//! Committed-description checks: what actually lands on the touchscreen
//! node for each controller and override combination.

mod common;

use common::manager;
use tabula_detect::{DetectError, ExplicitOverrides, SubModel};
use tabula_hal::PropertyValue;
use tabula_hal::mock::MockBoard;

#[tokio::test]
async fn gsl1680_a082_defaults_land_on_the_node() {
    let board = MockBoard::new();
    board.fit_silead(0xa082_0000, false);

    let applied = manager(&board, ExplicitOverrides::default())
        .configure_touchscreen()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(applied.variant, 0);
    assert_eq!(applied.resolved.width, 1024);
    assert_eq!(applied.resolved.height, 600);

    let props = board.node_properties("touchscreen").unwrap();
    assert_eq!(props.get("reg"), Some(&PropertyValue::U32(0x40)));
    assert_eq!(
        props.get("compatible").and_then(|v| v.as_str()),
        Some("silead,gsl1680")
    );
    assert_eq!(props.get("status").and_then(|v| v.as_str()), Some("okay"));
    assert_eq!(props.get("touchscreen-size-x"), Some(&PropertyValue::U32(1024)));
    assert_eq!(props.get("touchscreen-size-y"), Some(&PropertyValue::U32(600)));
    assert_eq!(
        props.get("firmware-name").and_then(|v| v.as_str()),
        Some("gsl1680-a082-q8-700.fw")
    );
    // Found without the rail: the supply reference is gone, the
    // orientation flags were never forced.
    assert!(!props.contains_key("vddio-supply"));
    assert!(!props.contains_key("touchscreen-inverted-x"));
    assert!(!props.contains_key("touchscreen-inverted-y"));
    assert!(!props.contains_key("touchscreen-swapped-x-y"));

    assert_eq!(board.commit_count(), 1);
}

#[tokio::test]
async fn overrides_win_over_variant_defaults() {
    let board = MockBoard::new();
    board.fit_silead(0xa082_0000, false);

    let overrides = ExplicitOverrides::default().with_variant(1).with_width(800);
    let applied = manager(&board, overrides)
        .configure_touchscreen()
        .await
        .unwrap()
        .unwrap();

    // Variant 1 is 480x800 with swapped axes; the width override takes
    // precedence, the rest of the profile stands.
    assert_eq!(applied.variant, 1);
    assert_eq!(applied.resolved.width, 800);
    assert_eq!(applied.resolved.height, 800);
    assert!(applied.resolved.swap_axes);

    let props = board.node_properties("touchscreen").unwrap();
    assert_eq!(props.get("touchscreen-size-x"), Some(&PropertyValue::U32(800)));
    assert_eq!(props.get("touchscreen-size-y"), Some(&PropertyValue::U32(800)));
    assert_eq!(props.get("touchscreen-swapped-x-y"), Some(&PropertyValue::Flag));
    assert_eq!(
        props.get("firmware-name").and_then(|v| v.as_str()),
        Some("gsl1680-a082-q8-a70.fw")
    );
}

#[tokio::test]
async fn b482_picks_its_own_firmware() {
    let board = MockBoard::new();
    board.fit_silead(0xb482_0000, false);

    let applied = manager(&board, ExplicitOverrides::default())
        .configure_touchscreen()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(applied.detected.sub_model, SubModel::Gsl1680B482);
    assert_eq!(applied.resolved.width, 960);
    assert_eq!(applied.resolved.height, 640);

    let props = board.node_properties("touchscreen").unwrap();
    assert_eq!(
        props.get("firmware-name").and_then(|v| v.as_str()),
        Some("gsl1680-b482-q8-d702.fw")
    );
}

#[tokio::test]
async fn ektf2127_commits_identity_only() {
    let board = MockBoard::new();
    board.fit_ektf2127(false);

    let applied = manager(&board, ExplicitOverrides::default())
        .configure_touchscreen()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(applied.detected.sub_model, SubModel::Ektf2127);
    assert_eq!(applied.detected.addr, 0x15);

    // Single unforced variant: the driver knows its own geometry, so
    // only identity, status and the rail removal are committed.
    let props = board.node_properties("touchscreen").unwrap();
    assert_eq!(
        props.get("compatible").and_then(|v| v.as_str()),
        Some("elan,ektf2127")
    );
    assert_eq!(props.get("status").and_then(|v| v.as_str()), Some("okay"));
    assert!(!props.contains_key("vddio-supply"));
    assert!(!props.contains_key("touchscreen-size-x"));
    assert!(!props.contains_key("firmware-name"));
}

#[tokio::test]
async fn out_of_range_variant_falls_back_to_first() {
    let board = MockBoard::new();
    board.fit_silead(0xa082_0000, false);

    let applied = manager(&board, ExplicitOverrides::default().with_variant(7))
        .configure_touchscreen()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(applied.variant, 0);
    assert_eq!(applied.resolved.width, 1024);
    assert_eq!(
        applied.resolved.firmware.as_deref(),
        Some("gsl1680-a082-q8-700.fw")
    );
}

#[tokio::test]
async fn unknown_chip_id_commits_nothing() {
    let board = MockBoard::new();
    board.fit_silead(0xdead_beef, false);

    let result = manager(&board, ExplicitOverrides::default())
        .configure_touchscreen()
        .await
        .unwrap();

    // An unrecognized id at the silead address does not stop the pass;
    // with no other candidate fitted it simply ends in silence.
    assert!(result.is_none());
    assert_eq!(board.commit_count(), 0);
}

#[tokio::test]
async fn failed_commit_leaves_description_untouched() {
    let board = MockBoard::new();
    board.fit_silead(0xa082_0000, false);
    board.fail_next_commit();

    let err = manager(&board, ExplicitOverrides::default())
        .configure_touchscreen()
        .await
        .unwrap_err();

    assert!(matches!(err, DetectError::CommitFailed { .. }));
    assert!(!err.should_retry_later());

    let props = board.node_properties("touchscreen").unwrap();
    assert_eq!(props.get("status").and_then(|v| v.as_str()), Some("disabled"));
    assert!(props.contains_key("vddio-supply"));
    assert!(!props.contains_key("reg"));
}
