// ABOUTME: Integration tests for the curio CLI binary.
// ABOUTME: Tests offline section splitting and HTML parsing plus API-backed commands against a mock server.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn curio_cmd() -> Command {
    Command::cargo_bin("curio").unwrap()
}

#[test]
fn sections_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("extract.txt");
    fs::write(
        &path,
        "Lead text.\n\n== History ==\nEnough content here to pass the minimum length check easily.\n\n== References ==\nShould be dropped.",
    )
    .unwrap();

    curio_cmd()
        .arg("--compact")
        .arg("sections")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""summary":"Lead text.""#))
        .stdout(predicate::str::contains(r#""title":"History""#))
        .stdout(predicate::str::contains("References").not());
}

#[test]
fn parse_html_with_outline() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    let outline_path = temp_dir.path().join("outline.json");

    fs::write(
        &html_path,
        r##"<p>Lead <a href="/wiki/Cat">cat</a>.<sup><a href="#cite_note-1">[1]</a></sup></p>
<h2>Ancient <i>Egypt</i></h2><p>Text.</p>
<ol class="references"><li id="cite_note-1"><span class="reference-text">A proper source.</span></li></ol>"##,
    )
    .unwrap();
    fs::write(
        &outline_path,
        r#"[{"title": "Ancient <i>Egypt</i>", "level": 2, "index": "1"}]"#,
    )
    .unwrap();

    curio_cmd()
        .arg("parse")
        .arg(&html_path)
        .arg("--outline")
        .arg(&outline_path)
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"title":"__summary__","count":1}"#))
        .stdout(predicate::str::contains(r#"{"title":"Ancient Egypt","index":"1"}"#))
        .stdout(predicate::str::contains("A proper source."));
}

#[test]
fn missing_file_fails() {
    curio_cmd()
        .arg("sections")
        .arg("/definitely/not/here.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn lead_links_from_api() {
    let server = MockServer::start();

    let links = server.mock(|when, then| {
        when.method(GET)
            .path("/w/api.php")
            .query_param("action", "parse")
            .query_param("prop", "links")
            .query_param("section", "0");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"parse":{"links":[{"ns":0,"exists":"","*":"Physics"},{"ns":4,"exists":"","*":"Wikipedia:About"}]}}"#);
    });
    let descriptions = server.mock(|when, then| {
        when.method(GET)
            .path("/w/api.php")
            .query_param("titles", "Physics");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"query":{"pages":{"22939":{"pageid":22939,"ns":0,"title":"Physics","description":"Natural science"}}}}"#);
    });

    curio_cmd()
        .arg("--api-url")
        .arg(server.url("/w/api.php"))
        .arg("--compact")
        .arg("links")
        .arg("736")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"[{"page_id":"22939","title":"Physics","description":"Natural science"}]"#,
        ));

    links.assert();
    descriptions.assert();
}

#[test]
fn section_citations_from_api() {
    let server = MockServer::start();
    let html = r##"<p>Lead.<sup><a href="#cite_note-1">[1]</a></sup></p>
<h2 id="History">History</h2><p>Old.<sup><a href="#cite_note-2">[2]</a></sup></p>
<h2 id="References">References</h2><ol class="references">
<li id="cite_note-1"><span class="reference-text">First source text.</span></li>
<li id="cite_note-2"><span class="reference-text">Second source text.</span></li>
</ol>"##;

    let rendered = server.mock(|when, then| {
        when.method(GET)
            .path("/w/api.php")
            .query_param("action", "parse")
            .query_param("pageid", "736")
            .query_param("prop", "text|sections");
        then.status(200).header("content-type", "application/json").body(
            json!({"parse": {
                "text": {"*": html},
                "sections": [
                    {"level": "2", "line": "History", "index": "1"},
                    {"level": "2", "line": "References", "index": "2"}
                ]
            }})
            .to_string(),
        );
    });

    curio_cmd()
        .arg("--api-url")
        .arg(server.url("/w/api.php"))
        .arg("--compact")
        .arg("citations")
        .arg("736")
        .arg("--section")
        .arg("History")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"[{"id":"cite_note-2","index":2,"text":"Second source text."}]"#,
        ))
        .stdout(predicate::str::contains("First source text.").not());

    rendered.assert();
}

#[test]
fn upstream_failure_exits_nonzero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/w/api.php");
        then.status(500);
    });

    curio_cmd()
        .arg("--api-url")
        .arg(server.url("/w/api.php"))
        .arg("page")
        .arg("736")
        .assert()
        .failure()
        .stderr(predicate::str::contains("content unavailable"));
}
