//! End-to-end tests of the `crowdin_export` binary
//!
//! A loopback HTTP server stands in for the Crowdin API and the storage host
//! serving archive links.

use std::error::Error;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::{TempDir, tempdir};

type Route = (&'static str, String, u16, String);

fn crowdin_export_cmd(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("crowdin_export").expect("Failed to find crowdin_export binary");
    // Keep the user's config and environment out of the picture
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", workdir)
        .env("HOME", workdir)
        .env_remove("CROWDIN_API_URL")
        .env_remove("CROWDIN_PROXY")
        .env_remove("CROWDIN_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn bind_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

/// Answers every connection from `routes`, keyed by method and path
fn serve(listener: TcpListener, routes: Vec<Route>) {
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };

            let mut buffer = Vec::new();
            let mut chunk = [0u8; 4096];
            while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                }
            }

            let head = String::from_utf8_lossy(&buffer).to_string();
            let mut request_line = head.split_whitespace();
            let method = request_line.next().unwrap_or_default().to_string();
            let target = request_line.next().unwrap_or("/");
            let path = target.split('?').next().unwrap_or("/").to_string();

            let (status, body) = routes
                .iter()
                .find(|(m, p, _, _)| *m == method && *p == path)
                .map(|(_, _, status, body)| (*status, body.clone()))
                .unwrap_or((404, r#"{"error":{"code":404,"message":"Not Found"}}"#.to_string()));

            let response = format!(
                "HTTP/1.1 {} TEST\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
}

fn project_route() -> Route {
    (
        "GET",
        "/api/v2/projects/12345".to_string(),
        200,
        r#"{"data":{"id":12345,"name":"Demo"}}"#.to_string(),
    )
}

fn download_routes(base: &str, build_id: u64) -> Vec<Route> {
    vec![
        (
            "GET",
            format!("/api/v2/projects/12345/translations/builds/{}/download", build_id),
            200,
            format!(r#"{{"data":{{"url":"{}/storage/archive.zip","expireIn":"2030-01-01T00:00:00+00:00"}}}}"#, base),
        ),
        (
            "GET",
            "/storage/archive.zip".to_string(),
            200,
            "PK fake archive".to_string(),
        ),
    ]
}

#[test]
fn test_version_flag_exits_zero() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    crowdin_export_cmd(dir.path())
        .arg("-v")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn test_missing_arguments_exit_one() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    crowdin_export_cmd(dir.path())
        .args(["TOKEN", "12345"])
        .assert()
        .code(1)
        .stderr(contains("OUTPUT"));
    Ok(())
}

#[test]
fn test_non_numeric_project_id_exits_one_without_connecting() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    // Nothing listens on the discard port; a connection attempt would retry
    crowdin_export_cmd(dir.path())
        .args(["-n", "-u", "http://127.0.0.1:9/api/v2", "TOKEN", "12a", "out.zip"])
        .assert()
        .code(1)
        .stderr(contains("PROJECT_ID"));
    assert!(!dir.path().join("out.zip").exists());
    Ok(())
}

#[test]
fn test_unwritable_debug_file_is_fatal() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let debug_path = dir.path().join("no-such-dir").join("debug.log");

    crowdin_export_cmd(dir.path())
        .arg("-n")
        .arg("-d")
        .arg(&debug_path)
        .args(["TOKEN", "12345", "out.zip"])
        .assert()
        .code(1)
        .stderr(contains("Can't create debug file"));
    Ok(())
}

#[test]
fn test_rejected_token_reports_connection_problem() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let (listener, base) = bind_server();
    serve(
        listener,
        vec![(
            "GET",
            "/api/v2/projects/12345".to_string(),
            401,
            r#"{"error":{"code":401,"message":"Unauthorized"}}"#.to_string(),
        )],
    );

    crowdin_export_cmd(dir.path())
        .args(["-n", "-u", &format!("{}/api/v2", base), "BAD", "12345", "out.zip"])
        .assert()
        .code(1)
        .stderr(contains("Error: connection problem"));
    assert!(!dir.path().join("out.zip").exists());
    Ok(())
}

#[test]
fn test_downloads_latest_build_without_requesting() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let (listener, base) = bind_server();
    let mut routes = vec![
        project_route(),
        (
            "GET",
            "/api/v2/projects/12345/translations/builds".to_string(),
            200,
            r#"{"data":[
                {"data":{"id":20,"status":"finished","progress":100,"finishedAt":"2024-03-01T10:00:00+00:00"}},
                {"data":{"id":21,"status":"finished","progress":100,"finishedAt":"2024-03-02T10:00:00+00:00"}}
            ],"pagination":{"offset":0,"limit":500}}"#
                .to_string(),
        ),
    ];
    routes.extend(download_routes(&base, 21));
    serve(listener, routes);

    crowdin_export_cmd(dir.path())
        .args(["-n", "-u", &format!("{}/api/v2", base), "TOKEN", "12345", "out.zip"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(contains("Downloaded build 21"));

    assert_eq!(std::fs::read(dir.path().join("out.zip"))?, b"PK fake archive");
    Ok(())
}

#[test]
fn test_build_then_download_with_debug_log() -> Result<(), Box<dyn Error>> {
    let dir: TempDir = tempdir()?;
    let (listener, base) = bind_server();
    let mut routes = vec![
        project_route(),
        (
            "POST",
            "/api/v2/projects/12345/translations/builds".to_string(),
            201,
            r#"{"data":{"id":3,"status":"finished","progress":100}}"#.to_string(),
        ),
    ];
    routes.extend(download_routes(&base, 3));
    serve(listener, routes);

    let debug_path = dir.path().join("debug.log");
    crowdin_export_cmd(dir.path())
        .args(["-b", "-n", "-q", "-t", "30", "-u", &format!("{}/api/v2", base)])
        .arg("-d")
        .arg(&debug_path)
        .args(["TOKEN", "12345", "nested/out.zip"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    assert_eq!(
        std::fs::read(dir.path().join("nested").join("out.zip"))?,
        b"PK fake archive"
    );

    let debug_log = std::fs::read_to_string(&debug_path)?;
    assert!(debug_log.contains("POST"));
    assert!(debug_log.contains("exportApprovedOnly"));
    Ok(())
}

#[test]
fn test_empty_debug_path_runs_without_debug_log() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let (listener, base) = bind_server();
    let mut routes = vec![
        project_route(),
        (
            "GET",
            "/api/v2/projects/12345/translations/builds".to_string(),
            200,
            r#"{"data":[{"data":{"id":5,"status":"finished","progress":100}}]}"#.to_string(),
        ),
    ];
    routes.extend(download_routes(&base, 5));
    serve(listener, routes);

    crowdin_export_cmd(dir.path())
        .args(["-n", "-d", "", "-u", &format!("{}/api/v2", base), "TOKEN", "12345", "out.zip"])
        .assert()
        .success()
        .stderr(contains("Downloaded build 5"));

    assert_eq!(std::fs::read(dir.path().join("out.zip"))?, b"PK fake archive");
    Ok(())
}

#[test]
fn test_debug_log_records_error_category() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let (listener, base) = bind_server();
    serve(
        listener,
        vec![(
            "GET",
            "/api/v2/projects/12345".to_string(),
            403,
            r#"{"error":{"code":403,"message":"Forbidden"}}"#.to_string(),
        )],
    );

    let debug_path = dir.path().join("debug.log");
    crowdin_export_cmd(dir.path())
        .args(["-n", "-u", &format!("{}/api/v2", base)])
        .arg("-d")
        .arg(&debug_path)
        .args(["TOKEN", "12345", "out.zip"])
        .assert()
        .code(1);

    let debug_log = std::fs::read_to_string(&debug_path)?;
    assert!(debug_log.contains("category"));
    assert!(debug_log.contains("connection"));
    Ok(())
}
