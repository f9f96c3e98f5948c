use std::process::Command;

fn shadowgrid(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_shadowgrid"))
        .args(args)
        .output()
        .expect("failed to invoke the shadowgrid binary")
}

#[test]
fn run_emits_a_json_report() {
    let output = shadowgrid(&["run", "--seed", "7", "--ticks", "50", "--json"]);
    assert!(output.status.success(), "run failed: {output:?}");

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON report");
    assert_eq!(report["seed"], 7);
    assert!(report["ticks"].as_u64().is_some_and(|ticks| (1..=50).contains(&ticks)));
    assert!(report["tiles_revealed"].as_u64().is_some_and(|tiles| tiles > 0));
    assert!(report["status"].is_string());
}

#[test]
fn run_is_reproducible_for_a_seed() {
    let args = ["run", "--seed", "11", "--ticks", "120", "--json", "--show-map"];
    let first = shadowgrid(&args);
    let second = shadowgrid(&args);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn generate_prints_a_walled_cave() {
    let output = shadowgrid(&["generate", "--seed", "3", "--width", "20", "--height", "12"]);
    assert!(output.status.success(), "generate failed: {output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let rows: Vec<&str> = stdout.lines().take(12).collect();
    assert_eq!(rows.len(), 12);
    assert!(rows.iter().all(|row| row.chars().count() == 20));
    assert!(rows[0].chars().all(|glyph| glyph == '#'));
    assert!(stdout.contains("floor region:"));
}

#[test]
fn oversized_caves_are_refused() {
    let output = shadowgrid(&["generate", "--width", "4294967295"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("may not exceed"), "unexpected stderr: {stderr}");
}

#[test]
fn invalid_options_are_reported() {
    let output = shadowgrid(&["run", "--level", "9"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("start_level"), "unexpected stderr: {stderr}");
}
