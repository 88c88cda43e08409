// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::ArtifactError;
use serde_json::json;
use std::path::PathBuf;

/// Stand-in CLI: records stdin and args next to itself, prints `reply.json`.
struct ScriptedCli {
    dir: tempfile::TempDir,
}

impl ScriptedCli {
    fn new(body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("model-cli");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    fn replying(reply: &serde_json::Value) -> Self {
        let cli = Self::new(
            "here=$(dirname \"$0\")\ncat > \"$here/stdin.txt\"\necho \"$@\" > \"$here/args.txt\"\ncat \"$here/reply.json\"",
        );
        std::fs::write(cli.dir.path().join("reply.json"), reply.to_string()).unwrap();
        cli
    }

    fn generator(&self, timeout_secs: u64) -> CliGenerator {
        CliGenerator::new(&GeneratorSettings {
            cli_binary: self.path("model-cli").display().to_string(),
            cli_timeout_secs: timeout_secs,
            ..GeneratorSettings::default()
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).unwrap()
    }
}

fn triple_text() -> String {
    let triple = json!({"html": "<html><head></head><body>ok</body></html>", "css": "body{}", "js": ""});
    format!("Here it is:\n```json\n{triple}\n```")
}

fn current() -> ArtifactTriple {
    ArtifactTriple { html: "<p>old</p>".into(), css: "p{}".into(), js: String::new() }
}

#[yare::parameterized(
    ok = { r#"{"type":"result","is_error":false,"result":"text"}"#, Some("text") },
    error_flag = { r#"{"is_error":true,"result":"rate limited"}"#, None },
    empty_result = { r#"{"is_error":false,"result":""}"#, None },
    missing_result = { r#"{"is_error":false}"#, None },
)]
fn envelope_parsing(stdout: &str, expected: Option<&str>) {
    assert_eq!(parse_envelope(stdout).ok().as_deref(), expected);
}

#[test]
fn envelope_error_flag_carries_message() {
    let err = parse_envelope(r#"{"is_error":true,"result":"rate limited"}"#).unwrap_err();
    assert_eq!(err.to_string(), "model returned error: rate limited");
}

#[test]
fn non_json_envelope_is_rejected() {
    let err = parse_envelope("Segmentation fault").unwrap_err();
    assert!(matches!(err, GenerateError::Envelope { .. }));
}

#[tokio::test]
async fn refine_sends_prompt_on_stdin_and_parses_reply() {
    let cli = ScriptedCli::replying(&json!({"is_error": false, "result": triple_text()}));
    let triple = cli.generator(30).refine(&current(), 72.5, "Region 1: x=0").await.unwrap();

    assert_eq!(triple.css, "body{}");
    let stdin = cli.read("stdin.txt");
    assert!(stdin.contains("- Similarity: 72.5%"));
    assert!(stdin.contains("<p>old</p>"));
    let args = cli.read("args.txt");
    assert!(args.starts_with("-p --model sonnet --output-format json --permission-mode bypassPermissions --system-prompt"));
}

#[tokio::test]
async fn image_mode_names_absolute_path() {
    let cli = ScriptedCli::replying(&json!({"is_error": false, "result": triple_text()}));
    let image = cli.path("mock.png");
    std::fs::write(&image, b"png").unwrap();

    cli.generator(30).generate_from_image(&image, None).await.unwrap();
    assert!(cli.read("stdin.txt").contains(&image.display().to_string()));
}

#[tokio::test]
async fn missing_key_in_reply_is_rejected() {
    let reply = json!({"html": "<p></p>", "js": ""}).to_string();
    let cli = ScriptedCli::replying(&json!({"is_error": false, "result": reply}));
    let err = cli.generator(30).refine(&current(), 50.0, "").await.unwrap_err();
    assert!(matches!(err, GenerateError::Artifact(ArtifactError::MissingField("css"))));
}

#[tokio::test]
async fn nonzero_exit_reports_code_and_stderr() {
    let cli = ScriptedCli::new("cat > /dev/null\necho 'not logged in' >&2\nexit 2");
    let err = cli.generator(30).refine(&current(), 50.0, "").await.unwrap_err();
    assert_eq!(err.to_string(), "Claude CLI error (code 2): not logged in");
}

#[tokio::test]
async fn hung_cli_times_out() {
    let cli = ScriptedCli::new("exec sleep 30");
    let err = cli.generator(1).refine(&current(), 50.0, "").await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "Claude CLI timed out after 1s");
}

#[tokio::test]
async fn missing_binary_is_a_spawn_error() {
    let generator = CliGenerator::new(&GeneratorSettings {
        cli_binary: "/nonexistent/model-cli".into(),
        ..GeneratorSettings::default()
    });
    let err = generator.refine(&current(), 50.0, "").await.unwrap_err();
    assert!(matches!(err, GenerateError::Process(crate::subprocess::SubprocessError::Spawn { .. })));
}
