mod common;

use std::fs;

use assert_cmd::Command;
use common::{ACTUAL_FIXTURE, PLANNED_FIXTURE, TestWorkspace, fixture_path};
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;

fn crew_recon() -> Command {
    Command::cargo_bin("crew-recon").expect("binary exists")
}

fn roster_args(subcommand: &str) -> Vec<String> {
    vec![
        subcommand.to_string(),
        "-p".to_string(),
        fixture_path(PLANNED_FIXTURE).to_string_lossy().into_owned(),
        "-a".to_string(),
        fixture_path(ACTUAL_FIXTURE).to_string_lossy().into_owned(),
        "--header-row".to_string(),
        "1".to_string(),
    ]
}

fn stdout_of(command: &mut Command) -> String {
    let output = command.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf-8 stdout")
}

#[test]
fn compare_writes_one_quoted_row_per_crew_and_date() {
    let stdout = stdout_of(crew_recon().args(roster_args("compare")));
    let lines = stdout.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 13);
    assert_eq!(
        lines[0],
        r#""Crew ID","Crew Name","Rank","Date","Planned","Actual","Category""#
    );
    assert_eq!(
        lines[1],
        r#""52001","Andi Wijaya","Cockpit","1","JT100","JT100A","maintain""#
    );
    assert!(lines.contains(&r#""60005","Eka Putri","Cabin","1","-","JT500","change""#));
    assert!(!stdout.contains("60004"));
    assert_eq!(lines.iter().filter(|l| l.ends_with(r#""maintain""#)).count(), 6);
}

#[test]
fn compare_json_honours_rank_and_date_filters() {
    let mut args = roster_args("compare");
    args.extend(
        ["--format", "json", "--rank", "cockpit", "--date", "1"]
            .iter()
            .map(|s| s.to_string()),
    );
    let stdout = stdout_of(crew_recon().args(&args));
    let records: Value = serde_json::from_str(&stdout).expect("json output");
    let records = records.as_array().expect("array of records");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["crew_id"], "52001");
    assert_eq!(records[1]["crew_id"], "53002");
    assert!(records.iter().all(|r| r["rank"] == "Cockpit"));
    assert!(records.iter().all(|r| r["date"] == "1"));
    assert_eq!(records[1]["planned"], "SA1");
    assert_eq!(records[1]["category"], "maintain");
}

#[test]
fn compare_writes_tsv_output_file() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("out").join("detail.tsv");
    let mut args = roster_args("compare");
    args.extend(["-o".to_string(), output.to_string_lossy().into_owned()]);
    crew_recon().args(&args).assert().success();

    let contents = fs::read_to_string(&output).expect("read output");
    let header = contents.lines().next().expect("header line");
    assert_eq!(header.split('\t').count(), 7);
    assert_eq!(contents.lines().count(), 13);
}

#[test]
fn strict_policy_only_keeps_identical_cells() {
    let mut args = roster_args("compare");
    args.extend(["--policy".to_string(), "strict".to_string()]);
    let stdout = stdout_of(crew_recon().args(&args));
    assert_eq!(
        stdout
            .lines()
            .filter(|l| l.ends_with(r#""maintain""#))
            .count(),
        2
    );
}

#[test]
fn show_warnings_reports_plain_text_cells() {
    let mut args = roster_args("compare");
    args.push("--show-warnings".to_string());
    crew_recon()
        .args(&args)
        .assert()
        .success()
        .stderr(contains("'SICK' compared as plain text"));
}

#[test]
fn summary_prints_every_table() {
    let stdout = stdout_of(crew_recon().args(roster_args("summary")));
    assert!(stdout.starts_with("All ranks: 12 record(s), 4 crew"));
    for title in [
        "Totals",
        "Maintain and change per date",
        "Maintain and change per rank",
        "Maintain and change per crew",
    ] {
        assert!(stdout.contains(title), "missing section {title}");
    }
    assert!(stdout.contains("50.00%"));
    assert!(stdout.contains("Eka Putri"));
}

#[test]
fn summary_json_matches_expected_counts() {
    let mut args = roster_args("summary");
    args.push("--json".to_string());
    let stdout = stdout_of(crew_recon().args(&args));
    let report: Value = serde_json::from_str(&stdout).expect("json report");

    assert_eq!(report["totals"]["records"], 12);
    assert_eq!(report["totals"]["maintain"], 6);
    assert_eq!(report["totals"]["change"], 6);
    assert_eq!(report["totals"]["crew"], 4);
    assert_eq!(report["totals"]["change_percent"], 50.0);

    let per_rank = report["per_rank"].as_array().expect("per rank");
    assert_eq!(per_rank[0]["rank"], "Cockpit");
    assert_eq!(per_rank[0]["maintain"], 4);
    assert_eq!(per_rank[0]["change"], 2);
    assert_eq!(per_rank[1]["rank"], "Cabin");
    assert_eq!(per_rank[1]["maintain"], 2);
    assert_eq!(per_rank[1]["change"], 4);

    let per_date = report["per_date"].as_array().expect("per date");
    let counts = per_date
        .iter()
        .map(|d| (d["maintain"].as_u64(), d["change"].as_u64()))
        .collect::<Vec<_>>();
    assert_eq!(
        counts,
        vec![(Some(3), Some(1)), (Some(2), Some(2)), (Some(1), Some(3))]
    );
}

#[test]
fn summary_by_rank_only_prints_that_table() {
    let mut args = roster_args("summary");
    args.extend(
        ["--by", "rank", "--rank", "cabin"]
            .iter()
            .map(|s| s.to_string()),
    );
    let stdout = stdout_of(crew_recon().args(&args));
    assert!(stdout.starts_with("Cabin crew: 6 record(s), 2 crew"));
    assert!(stdout.contains("Maintain and change per rank"));
    assert!(!stdout.contains("Maintain and change per crew"));
}

#[test]
fn export_writes_detail_and_summary_files() {
    let workspace = TestWorkspace::new();
    let dir = workspace.path().join("report");
    let mut args = roster_args("export");
    args.extend(["-d".to_string(), dir.to_string_lossy().into_owned()]);
    crew_recon().args(&args).assert().success();

    for name in [
        "detail.csv",
        "per_date.csv",
        "per_rank.csv",
        "per_crew.csv",
        "summary_total.csv",
    ] {
        assert!(dir.join(name).exists(), "{name} written");
    }
    let detail = workspace.read_csv(&dir.join("detail.csv"));
    assert_eq!(detail.len(), 13);
    let totals = workspace.read_csv(&dir.join("summary_total.csv"));
    assert_eq!(
        totals,
        vec![
            vec!["Category", "Count", "Percent"],
            vec!["maintain", "6", "50.00%"],
            vec!["change", "6", "50.00%"],
        ]
    );
}

#[test]
fn missing_rank_column_is_reported() {
    let workspace = TestWorkspace::new();
    let planned = workspace.write("planned.csv", "Crew ID,Crew Name,1\nC1,Ann,JT100\n");
    let actual = workspace.write("actual.csv", "Crew ID,Crew Name,Rank,1\nC1,Ann,CPT,JT100\n");
    crew_recon()
        .args([
            "compare",
            "-p",
            planned.to_str().unwrap(),
            "-a",
            actual.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("planned roster is missing required column 'Rank'"));
}

#[test]
fn duplicate_crew_id_is_rejected() {
    let workspace = TestWorkspace::new();
    let planned = workspace.write(
        "planned.csv",
        "Crew ID,Rank,1\nC1,CPT,JT100\nC1,FO,JT200\n",
    );
    let actual = workspace.write("actual.csv", "Crew ID,Rank,1\nC1,CPT,JT100\n");
    crew_recon()
        .args([
            "compare",
            "-p",
            planned.to_str().unwrap(),
            "-a",
            actual.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("crew id 'C1' more than once"));
}

#[test]
fn planned_roster_can_come_from_stdin() {
    let planned = fs::read_to_string(fixture_path(PLANNED_FIXTURE)).expect("read fixture");
    let actual = fixture_path(ACTUAL_FIXTURE);
    let stdout = stdout_of(
        crew_recon()
            .args([
                "compare",
                "-p",
                "-",
                "-a",
                actual.to_str().unwrap(),
                "--header-row",
                "1",
            ])
            .write_stdin(planned),
    );
    assert_eq!(stdout.lines().count(), 13);
}

#[test]
fn both_rosters_from_stdin_is_rejected() {
    crew_recon()
        .args(["compare", "-p", "-", "-a", "-"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("Only one of --planned and --actual"));
}

#[test]
fn init_config_refuses_to_overwrite_without_force() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("settings.yml");
    let path_arg = path.to_str().unwrap();

    crew_recon()
        .args(["init-config", "-o", path_arg])
        .assert()
        .success();
    let contents = fs::read_to_string(&path).expect("read settings");
    assert!(contents.contains("crew_id: Crew ID"));
    assert!(contents.contains("SA1"));

    crew_recon()
        .args(["init-config", "-o", path_arg])
        .assert()
        .failure()
        .stderr(contains("already exists"));
    crew_recon()
        .args(["init-config", "-o", path_arg, "--force"])
        .assert()
        .success();
}

#[test]
fn settings_file_drives_header_row_and_policy() {
    let workspace = TestWorkspace::new();
    let config = workspace.write("settings.yml", "header_row: 1\ncells:\n  policy: strict\n");
    let stdout = stdout_of(crew_recon().args([
        "compare",
        "-p",
        fixture_path(PLANNED_FIXTURE).to_str().unwrap(),
        "-a",
        fixture_path(ACTUAL_FIXTURE).to_str().unwrap(),
        "-c",
        config.to_str().unwrap(),
    ]));
    assert_eq!(stdout.lines().count(), 13);
    assert_eq!(
        stdout
            .lines()
            .filter(|l| l.ends_with(r#""maintain""#))
            .count(),
        2
    );
}

#[test]
fn preview_lists_date_columns() {
    crew_recon()
        .args([
            "preview",
            "-i",
            fixture_path(PLANNED_FIXTURE).to_str().unwrap(),
            "--header-row",
            "1",
            "--rows",
            "2",
        ])
        .assert()
        .success()
        .stdout(contains("Date columns (3): 1, 2, 3"))
        .stdout(contains("Andi Wijaya"))
        .stdout(contains("Dian Sari").not());
}
