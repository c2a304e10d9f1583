use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn tempo() -> Command {
    let mut cmd = Command::cargo_bin("tempo").unwrap();
    cmd.env_remove("TEMPO_TIMEZONE").env_remove("TEMPO_CONFIG");
    cmd
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn instant_from_stdin() {
    let output = tempo()
        .args(["instant", "--now", "2024-06-01T09:00", "--policy", "start-of-day"])
        .write_stdin(r#"{"day":"10"}"#)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(
        stdout_json(&output)["instant"],
        "2024-06-10T00:00:00+00:00"
    );
}

#[test]
fn instant_from_file_with_timezone_flag() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"relativeChange":"add","relativeOffsets":[{{"unit":"day","value":3}}]}}"#)
        .unwrap();

    let output = tempo()
        .args(["--timezone", "Asia/Tokyo", "instant", "--now", "2024-01-01T10:00"])
        .arg(file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(stdout_json(&output)["instant"], "2024-01-04T10:00:00+09:00");
}

#[test]
fn timezone_from_env() {
    tempo()
        .env("TEMPO_TIMEZONE", "America/New_York")
        .args(["instant", "--now", "2024-06-01T09:00", "-"])
        .write_stdin("{}")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-06-01T09:00:00-04:00"));
}

#[test]
fn config_file_supplies_timezone_and_policy() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, r#"timezone = "Europe/Berlin""#).unwrap();
    writeln!(config, r#"default_time_policy = "end-of-day""#).unwrap();

    tempo()
        .arg("--config")
        .arg(config.path())
        .args(["instant", "--now", "2024-06-01T09:00"])
        .write_stdin(r#"{"day":15}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-06-15T23:59:00+02:00"));
}

#[test]
fn window_command() {
    let output = tempo()
        .args([
            "window",
            "--now",
            "2024-06-01T09:00",
            "--old",
            r#"{"day":"10"}"#,
            "--target",
            "{}",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let window = stdout_json(&output);
    assert_eq!(window["startDate"], "2024-06-09");
    assert_eq!(window["endDate"], "2024-07-07");
}

#[test]
fn recur_weekly() {
    let output = tempo()
        .arg("recur")
        .write_stdin(r#"{"frequency":"weekly","interval":1,"byWeekDay":["MO","WE"],"count":6}"#)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let built = stdout_json(&output);
    assert_eq!(
        built["ruleStrings"][0],
        "RRULE:FREQ=WEEKLY;INTERVAL=1;COUNT=6;BYDAY=MO,WE"
    );
    assert_eq!(built["weekdayCodes"], "1, 3, ");
}

#[test]
fn recur_incomplete_prints_null() {
    tempo()
        .arg("recur")
        .write_stdin(r#"{"frequency":"daily"}"#)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("null"));
}

#[test]
fn recur_overflow_fails() {
    tempo()
        .args(["recur", "--max-occurrences", "3"])
        .write_stdin(concat!(
            r#"{"frequency":"monthly","interval":1,"byWeekDay":["FR"],"byMonthDay":[13],"#,
            r#""count":12,"start":"2024-01-01T09:00"}"#,
        ))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to build recurrence"))
        .stderr(predicate::str::contains("more than 3 occurrences"));
}

#[test]
fn windows_command() {
    let output = tempo()
        .args([
            "windows",
            "--start",
            "2024-06-03T10:00",
            "--end",
            "2024-06-03T11:00",
        ])
        .write_stdin(r#"{"frequency":"weekly","interval":1,"count":2}"#)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let windows = stdout_json(&output);
    assert_eq!(windows.as_array().unwrap().len(), 2);
    assert_eq!(windows[1]["windowEndDate"], "2024-06-10T11:00:00+00:00");
}

#[test]
fn windows_rejects_cap_at_u16_max() {
    tempo()
        .args([
            "windows",
            "--start",
            "2024-06-03T10:00",
            "--end",
            "2024-06-03T11:00",
            "--max-occurrences",
            "65535",
        ])
        .write_stdin(r#"{"frequency":"daily","interval":1,"until":"2300-01-01"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to expand recurring windows"))
        .stderr(predicate::str::contains("maxOccurrences must be at most 65534"));
}

#[test]
fn duration_command() {
    tempo()
        .arg("duration")
        .write_stdin(r#"{"startTime":"09:00","endTime":"10:15"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""minutes": 75"#));
}

#[test]
fn malformed_field_fails_with_chain() {
    tempo()
        .args(["instant", "--now", "2024-06-01T09:00"])
        .write_stdin(r#"{"day":"tenth"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to resolve instant"))
        .stderr(predicate::str::contains("Invalid field 'day'"));
}

#[test]
fn invalid_json_fails() {
    tempo()
        .arg("duration")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON in stdin"));
}

#[test]
fn unknown_policy_is_a_usage_error() {
    tempo()
        .args(["instant", "--policy", "noon"])
        .write_stdin("{}")
        .assert()
        .failure();
}
