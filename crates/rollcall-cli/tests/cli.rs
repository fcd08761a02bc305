use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{json, Value};
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Output;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

fn run(home: &Path, args: &[&str]) -> Output {
    cargo_bin_cmd!("rollcall")
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .env("GROUPME_ACCESS_TOKEN", "test-token")
        .env_remove("GROUPME_GROUP_ID")
        .env_remove("RUST_LOG")
        .env("NO_PROXY", "127.0.0.1,localhost")
        .env("no_proxy", "127.0.0.1,localhost")
        .args(args)
        .output()
        .expect("run command")
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let output = run(home, args);
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).expect("utf8")
}

fn write_numbers(dir: &Path, contents: &str) -> String {
    let path = dir.join("numbers.txt");
    fs::write(&path, contents).expect("write numbers");
    path.to_str().expect("path").to_string()
}

/// Answers one request; yields the raw request line and body.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("header");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().expect("content length");
                }
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).expect("body");
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write response");
        (
            request_line.trim_end().to_string(),
            String::from_utf8(request_body).expect("utf8"),
        )
    });
    (format!("http://{addr}/v3"), handle)
}

#[test]
fn normalize_prints_one_number_per_line() {
    let temp = TempDir::new().expect("temp dir");
    let file = write_numbers(temp.path(), "  (555) 123-4567 \n+44 20 7946 0958\n\n");

    let stdout = run_ok(temp.path(), &["normalize", &file]);
    assert_eq!(stdout, "+15551234567\n+442079460958\n+1\n");

    let json: Value =
        serde_json::from_str(&run_ok(temp.path(), &["--json", "normalize", "--skip-blank", &file]))
            .expect("parse json");
    assert_eq!(json, json!(["+15551234567", "+442079460958"]));
}

#[test]
fn dry_run_prints_payload_in_file_order() {
    let temp = TempDir::new().expect("temp dir");
    let file = write_numbers(temp.path(), "5551234567\n+15557654321\n");

    let stdout = run_ok(temp.path(), &["add", "--dry-run", &file]);
    let payload: Value = serde_json::from_str(&stdout).expect("parse json");
    assert_eq!(
        payload,
        json!({
            "members": [
                {"nickname": "User +15551234567", "phone_number": "+15551234567"},
                {"nickname": "User +15557654321", "phone_number": "+15557654321"}
            ]
        })
    );

    let report: Value = serde_json::from_str(&run_ok(
        temp.path(),
        &["--json", "add", "--dry-run", "--country-code", "44", &file],
    ))
    .expect("parse json");
    assert_eq!(report["status"], "dry_run");
    assert_eq!(report["members"], 2);
    assert_eq!(
        report["payload"]["members"][0]["phone_number"],
        "+445551234567"
    );
}

#[test]
fn add_posts_payload_and_reports_success() {
    let temp = TempDir::new().expect("temp dir");
    let file = write_numbers(temp.path(), "5551234567\n+15557654321\n");
    let (base, server) = serve_once(
        "202 Accepted",
        r#"{"meta":{"code":202},"response":{"results_id":"res-9"}}"#,
    );

    let stdout = run_ok(
        temp.path(),
        &["add", "--group-id", "4242", "--api-base", &base, &file],
    );
    assert_eq!(stdout, "Members added successfully!\nResults id: res-9\n");

    let (request_line, body) = server.join().expect("server thread");
    assert_eq!(
        request_line,
        "POST /v3/groups/4242/members/add?token=test-token HTTP/1.1"
    );
    let body: Value = serde_json::from_str(&body).expect("parse body");
    assert_eq!(body["members"].as_array().expect("members").len(), 2);
}

#[test]
fn add_reports_client_error_status_without_failing() {
    let temp = TempDir::new().expect("temp dir");
    let file = write_numbers(temp.path(), "5551234567\n");
    let (base, server) = serve_once("400 Bad Request", r#"{"meta":{"code":400}}"#);

    let stdout = run_ok(
        temp.path(),
        &["add", "--group-id", "4242", "--api-base", &base, &file],
    );
    assert!(stdout.starts_with("An error occurred: "), "stdout: {stdout}");
    assert!(stdout.contains("400"));
    assert!(!stdout.contains("test-token"));
    server.join().expect("server thread");

    let (base, server) = serve_once("500 Internal Server Error", "{}");
    let report: Value = serde_json::from_str(&run_ok(
        temp.path(),
        &["--json", "add", "--group-id", "4242", "--api-base", &base, &file],
    ))
    .expect("parse json");
    assert_eq!(report["status"], "error");
    assert_eq!(report["http_status"], 500);
    server.join().expect("server thread");
}

#[test]
fn add_reports_unexpected_success_status_as_failure() {
    let temp = TempDir::new().expect("temp dir");
    let file = write_numbers(temp.path(), "5551234567\n");
    let (base, server) = serve_once("200 OK", r#"{"meta":{"code":200}}"#);

    let stdout = run_ok(
        temp.path(),
        &["add", "--group-id", "4242", "--api-base", &base, &file],
    );
    assert_eq!(
        stdout,
        "Failed to add members: 200 - {\"meta\":{\"code\":200}}\n"
    );
    server.join().expect("server thread");
}

#[test]
fn add_reports_transport_error_without_failing() {
    let temp = TempDir::new().expect("temp dir");
    let file = write_numbers(temp.path(), "5551234567\n");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let base = format!("http://{addr}/v3");

    let stdout = run_ok(
        temp.path(),
        &["--json", "add", "--group-id", "4242", "--api-base", &base, &file],
    );
    let report: Value = serde_json::from_str(&stdout).expect("parse json");
    assert_eq!(report["status"], "error");
    assert!(report["http_status"].is_null());
    assert!(!report["message"]
        .as_str()
        .expect("message")
        .contains("test-token"));
}

#[test]
fn missing_phone_file_fails_with_not_found() {
    let temp = TempDir::new().expect("temp dir");
    let missing = temp.path().join("missing.txt");

    let output = run(
        temp.path(),
        &["add", "--group-id", "1", missing.to_str().expect("path")],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("error: phone number file not found:"));
}

#[test]
fn add_without_group_id_is_invalid_input() {
    let temp = TempDir::new().expect("temp dir");
    let file = write_numbers(temp.path(), "5551234567\n");

    let output = run(temp.path(), &["add", &file]);
    assert_eq!(output.status.code(), Some(3));

    let output = run(temp.path(), &["add", "--group-id", "12 34", &file]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn config_file_supplies_group_and_phone_file() {
    let temp = TempDir::new().expect("temp dir");
    write_numbers(temp.path(), "555 000 0001\n");
    let config_dir = temp.path().join("config").join("rollcall");
    fs::create_dir_all(&config_dir).expect("config dir");
    let config_path = config_dir.join("config.toml");
    let numbers = temp.path().join("numbers.txt");
    fs::write(
        &config_path,
        format!(
            "group_id = \"99\"\nphone_file = {:?}\ndefault_country_code = \"7\"\n",
            numbers.to_str().expect("path")
        ),
    )
    .expect("write config");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&config_path).expect("metadata").permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&config_path, perms).expect("chmod");
    }

    let stdout = run_ok(temp.path(), &["normalize"]);
    assert_eq!(stdout, "+75550000001\n");
}
