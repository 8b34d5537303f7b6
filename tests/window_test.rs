use chrono::{Duration, Local, TimeZone, Timelike, Utc};
use kexplist::error::SyncError;
use kexplist::window::*;

#[test]
fn test_parse_hours_accepts_positive_integers() {
    assert_eq!(parse_hours("3").unwrap(), 3);
    assert_eq!(parse_hours(" 12 ").unwrap(), 12);
}

#[test]
fn test_parse_hours_rejects_everything_else() {
    for value in ["0", "-1", "1.5", "three", ""] {
        let err = parse_hours(value).unwrap_err();
        assert!(matches!(err, SyncError::InvalidWindow(_)), "value={value}");
        assert_eq!(err.exit_code(), 1);
    }
}

#[test]
fn test_window_is_half_open() {
    let start = Utc.with_ymd_and_hms(2017, 1, 31, 18, 0, 0).unwrap();
    let window = TimeWindow::new(start, 3).unwrap();

    assert_eq!(window.end() - window.start(), Duration::hours(3));
    assert!(window.contains(start));
    assert!(window.contains(start + Duration::minutes(179)));
    assert!(!window.contains(window.end()));
    assert!(!window.contains(start - Duration::seconds(1)));
}

#[test]
fn test_window_requires_positive_hours() {
    let start = Utc.with_ymd_and_hms(2017, 1, 31, 18, 0, 0).unwrap();
    assert!(TimeWindow::new(start, 0).is_err());
    assert!(TimeWindow::new(start, -3).is_err());
}

#[test]
fn test_parse_mdyh_reads_local_time() {
    let parsed = parse_mdyh("01/31/2017T18").unwrap();
    let local = parsed.with_timezone(&Local);

    assert_eq!(local.format("%m/%d/%Y %H:%M").to_string(), "01/31/2017 18:00");
}

#[test]
fn test_parse_mdyh_rejects_bad_input() {
    for value in ["2017-01-31T18", "13/01/2017T10", "01/31/2017T25", "01/31/2017"] {
        assert!(
            matches!(parse_mdyh(value), Err(SyncError::InvalidWindow(_))),
            "value={value}"
        );
    }
}

#[test]
fn test_compute_window_defaults_to_now() {
    let now = Utc.with_ymd_and_hms(2020, 6, 1, 12, 30, 0).unwrap();
    let window = compute_window(None, DEFAULT_HOURS, now).unwrap();

    assert_eq!(window.start(), now);
    assert_eq!(window.end(), now + Duration::hours(3));
}

#[test]
fn test_compute_window_validates_hours_before_start() {
    let now = Utc::now();
    let err = compute_window(Some("not a date"), "0", now).unwrap_err();
    assert!(err.to_string().contains("hours"));
}

#[test]
fn test_local_hours_cover_the_window() {
    let start = Local
        .with_ymd_and_hms(2017, 1, 31, 18, 30, 0)
        .earliest()
        .unwrap()
        .with_timezone(&Utc);
    let window = TimeWindow::new(start, 2).unwrap();

    let hours = window.local_hours();
    // 18:30 to 20:30 touches the 18, 19 and 20 o'clock pages
    assert_eq!(hours.len(), 3);
    assert_eq!(hours[0].hour(), 18);
    assert_eq!(hours[0].minute(), 0);
    assert_eq!(hours[2].hour(), 20);
}

#[test]
fn test_hour_label_uses_twelve_hour_clock() {
    assert_eq!(hour_label(0), "12AM");
    assert_eq!(hour_label(6), "6AM");
    assert_eq!(hour_label(12), "12PM");
    assert_eq!(hour_label(18), "6PM");
    assert_eq!(hour_label(23), "11PM");
}

#[test]
fn test_compute_window_rejects_out_of_range_hours() {
    let now = Utc.with_ymd_and_hms(2017, 1, 31, 18, 0, 0).unwrap();
    for hours in ["100000000000", "9999999999999", "9223372036854775807"] {
        assert!(
            matches!(compute_window(None, hours, now), Err(SyncError::InvalidWindow(_))),
            "hours={hours}"
        );
    }
}
