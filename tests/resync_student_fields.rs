use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

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

fn first_grade_student_name(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
) -> String {
    let result = request_ok(stdin, reader, id, "grades.list", json!({}));
    result
        .get("grades")
        .and_then(|v| v.as_array())
        .and_then(|rows| rows.first())
        .and_then(|g| g.get("studentName"))
        .and_then(|v| v.as_str())
        .expect("studentName")
        .to_string()
}

#[test]
fn rename_goes_stale_until_an_explicit_resync() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-resync");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "grades.create",
        json!({ "studentId": "STD001", "subject": "Mathematics", "examType": "quiz", "score": 8, "maxScore": 10 }),
    );

    // Rename the student; the denormalized copy is not kept in sync.
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.update",
        json!({ "id": "1", "patch": { "name": "Ahmed M. Ali" } }),
    );
    assert_eq!(
        first_grade_student_name(&mut stdin, &mut reader, "3"),
        "Ahmed Mohammed Ali",
        "grade keeps the stale name until asked"
    );

    // The reconciliation pass re-copies the roster fields everywhere.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.resyncDependents",
        json!({}),
    );
    // One grade plus the seed attendance record for STD001.
    assert_eq!(result.get("gradesUpdated").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(
        result.get("attendanceUpdated").and_then(|v| v.as_u64()),
        Some(1)
    );

    assert_eq!(
        first_grade_student_name(&mut stdin, &mut reader, "5"),
        "Ahmed M. Ali"
    );
    let attendance = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "attendance.list",
        json!({ "studentId": "STD001" }),
    );
    let record = &attendance
        .get("records")
        .and_then(|v| v.as_array())
        .expect("records")[0];
    assert_eq!(
        record.get("studentName").and_then(|v| v.as_str()),
        Some("Ahmed M. Ali")
    );

    // Idempotent: a second pass has nothing left to update.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.resyncDependents",
        json!({}),
    );
    assert_eq!(result.get("gradesUpdated").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(
        result.get("attendanceUpdated").and_then(|v| v.as_u64()),
        Some(0)
    );
}

#[test]
fn orphaned_rows_are_left_untouched() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    select_workspace(&mut stdin, &mut reader, "schooldesk-resync-orphans");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "grades.create",
        json!({ "studentId": "STD001", "subject": "Mathematics", "examType": "quiz", "score": 8, "maxScore": 10 }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.delete",
        json!({ "id": "1" }),
    );

    // STD001's grade and seed attendance row are now orphans; the pass
    // skips them rather than blanking their copies.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.resyncDependents",
        json!({}),
    );
    assert_eq!(result.get("gradesUpdated").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(
        result.get("attendanceUpdated").and_then(|v| v.as_u64()),
        Some(0)
    );
    assert_eq!(
        first_grade_student_name(&mut stdin, &mut reader, "4"),
        "Ahmed Mohammed Ali"
    );
}
