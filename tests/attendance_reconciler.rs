use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

// The seed collection ships two records on this date.
const SEED_DATE: &str = "2024-01-15";

fn temp_workspace(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_daemon() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schooldeskd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schooldeskd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn select_workspace(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, prefix: &str) {
    let workspace = temp_workspace(prefix);
    request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
}

fn records_for(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    student_id: &str,
    date: &str,
) -> Vec<serde_json::Value> {
    let result = request_ok(
        stdin,
        reader,
        id,
        "attendance.list",
        json!({ "studentId": student_id, "date": date }),
    );
    result
        .get("records")
        .and_then(|v| v.as_array())
        .expect("records array")
        .clone()
}

#[test]
fn repeated_marks_converge_to_one_record_with_last_write_winning() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-upsert-converge");

    for (i, status) in ["present", "present", "absent"].iter().enumerate() {
        let result = request_ok(
            &mut stdin,
            &mut reader,
            &format!("mark-{i}"),
            "attendance.mark",
            json!({ "studentId": "STD001", "date": "2024-03-01", "status": status }),
        );
        assert_eq!(result.get("recorded").and_then(|v| v.as_bool()), Some(true));
    }

    let records = records_for(&mut stdin, &mut reader, "list", "STD001", "2024-03-01");
    assert_eq!(records.len(), 1, "one record per (studentId, date)");
    assert_eq!(
        records[0].get("status").and_then(|v| v.as_str()),
        Some("absent"),
        "last write wins"
    );
}

#[test]
fn record_id_is_stable_across_status_changes() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-upsert-stable-id");

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "studentId": "STD003", "date": "2024-03-01", "status": "late" }),
    );
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.mark",
        json!({ "studentId": "STD003", "date": "2024-03-01", "status": "excused" }),
    );
    assert_eq!(first.get("id"), second.get("id"));
}

#[test]
fn new_record_copies_roster_fields() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-upsert-copy");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "studentId": "STD002", "date": "2024-03-01", "status": "present", "notes": "back from travel" }),
    );
    let records = records_for(&mut stdin, &mut reader, "2", "STD002", "2024-03-01");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(
        record.get("studentName").and_then(|v| v.as_str()),
        Some("Fatima Ahmed Hassan")
    );
    assert_eq!(record.get("grade").and_then(|v| v.as_str()), Some("Grade 5"));
    assert_eq!(record.get("class").and_then(|v| v.as_str()), Some("B"));
    assert_eq!(
        record.get("notes").and_then(|v| v.as_str()),
        Some("back from travel")
    );
}

#[test]
fn notes_are_replaced_not_merged() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-upsert-notes");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "studentId": "STD001", "date": "2024-03-01", "status": "late", "notes": "bus delay" }),
    );
    // A follow-up mark without notes clears the old note.
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.mark",
        json!({ "studentId": "STD001", "date": "2024-03-01", "status": "present" }),
    );
    let records = records_for(&mut stdin, &mut reader, "3", "STD001", "2024-03-01");
    assert_eq!(records[0].get("notes").and_then(|v| v.as_str()), Some(""));
}

#[test]
fn unknown_student_mark_is_a_silent_noop() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-upsert-unknown");

    let before = request_ok(&mut stdin, &mut reader, "1", "attendance.list", json!({}));
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.mark",
        json!({ "studentId": "STD999", "date": "2024-03-01", "status": "present" }),
    );
    assert_eq!(result.get("recorded").and_then(|v| v.as_bool()), Some(false));
    assert!(result.get("id").is_none());

    let after = request_ok(&mut stdin, &mut reader, "3", "attendance.list", json!({}));
    assert_eq!(after, before);
}

#[test]
fn bulk_mark_stamps_known_students_only() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-bulk-mark");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.bulkMark",
        json!({
            "studentIds": ["STD001", "STD002", "STD999"],
            "date": "2024-03-02",
            "status": "present"
        }),
    );
    assert_eq!(result.get("recorded").and_then(|v| v.as_u64()), Some(2));

    let stats = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.stats",
        json!({ "date": "2024-03-02" }),
    );
    assert_eq!(stats.get("present").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(stats.get("total").and_then(|v| v.as_u64()), Some(2));
}

#[test]
fn stats_count_only_the_selected_date() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-stats-date");

    let stats = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.stats",
        json!({ "date": SEED_DATE }),
    );
    assert_eq!(stats.get("present").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(stats.get("late").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(stats.get("absent").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(stats.get("excused").and_then(|v| v.as_u64()), Some(0));

    let stats = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.stats",
        json!({ "date": "1999-01-01" }),
    );
    assert_eq!(stats.get("total").and_then(|v| v.as_u64()), Some(0));
}

#[test]
fn roster_shows_per_student_status_for_the_selected_date() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-roster");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.roster",
        json!({ "date": SEED_DATE }),
    );
    let rows = result.get("rows").and_then(|v| v.as_array()).expect("rows");
    assert_eq!(rows.len(), 3, "roster covers every student");

    let status_of = |key: &str| {
        rows.iter()
            .find(|r| r.get("studentId").and_then(|v| v.as_str()) == Some(key))
            .and_then(|r| r.get("status"))
            .cloned()
    };
    assert_eq!(status_of("STD001"), Some(json!("present")));
    assert_eq!(status_of("STD002"), Some(json!("late")));
    // STD003 has no record for the date; the row still appears.
    assert_eq!(status_of("STD003"), Some(serde_json::Value::Null));

    let tally = result.get("tally").expect("tally");
    assert_eq!(tally.get("present").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(tally.get("late").and_then(|v| v.as_u64()), Some(1));
}

#[test]
fn roster_filters_combine_with_and() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-roster-filter");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.roster",
        json!({ "date": SEED_DATE, "grade": "Grade 6", "class": "A", "search": "salem" }),
    );
    let rows = result.get("rows").and_then(|v| v.as_array()).expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("studentId").and_then(|v| v.as_str()),
        Some("STD003")
    );

    // The "all" sentinel leaves a selector unconstrained.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.roster",
        json!({ "date": SEED_DATE, "grade": "all", "class": "all" }),
    );
    let rows = result.get("rows").and_then(|v| v.as_array()).expect("rows");
    assert_eq!(rows.len(), 3);
}

#[test]
fn invalid_status_is_rejected() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-bad-status");

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "studentId": "STD001", "date": "2024-03-01", "status": "vacation" }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        resp.get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_str()),
        Some("bad_params")
    );
}
