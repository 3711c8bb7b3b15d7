use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use petri_layout::records::{NetDocument, RoutedNetDocument};
use petri_layout_cli::{Args, run};

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demo nets live at the workspace root, not inside the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        direction: None,
        relayout: false,
        log_level: "off".to_string(),
    }
}

fn read_routed(path: &Path) -> RoutedNetDocument {
    let json = fs::read_to_string(path).expect("Failed to read output");
    serde_json::from_str(&json).expect("Output should be a routed net document")
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_json_files(demos_path());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        for direction in ["horizontal", "vertical"] {
            let output_filename = format!(
                "{}_{direction}.json",
                demo_path.file_stem().unwrap().to_string_lossy()
            );
            let output_path = temp_dir.path().join(output_filename);

            let mut args = args(demo_path, &output_path);
            args.direction = Some(direction.to_string());

            if let Err(e) = run(&args) {
                failed_demos.push((demo_path.clone(), e));
                continue;
            }

            let source = fs::read_to_string(demo_path).unwrap();
            let input = NetDocument::from_json(&source).unwrap();
            let routed = read_routed(&output_path);
            assert_eq!(routed.nodes.len(), input.nodes.len());
            assert_eq!(routed.edges.len(), input.edges.len());
            assert_eq!(routed.direction.to_string(), direction);
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_json_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args(demo_path, &output_path)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}

#[test]
fn e2e_relayout_of_own_output_is_stable() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("producer_consumer.json");
    let first = temp_dir.path().join("first.json");
    let second = temp_dir.path().join("second.json");
    let third = temp_dir.path().join("third.json");

    run(&args(&input, &first)).expect("Fresh layout should succeed");

    let mut relayout = args(&first, &second);
    relayout.relayout = true;
    run(&relayout).expect("Relayout should succeed");

    let mut again = args(&second, &third);
    again.relayout = true;
    run(&again).expect("Second relayout should succeed");

    let first = read_routed(&first);
    let second = read_routed(&second);
    let third = read_routed(&third);
    for (before, after) in first.nodes.iter().zip(&second.nodes) {
        assert_eq!(before.id(), after.id());
        assert_eq!(before.attach_point_capacity, after.attach_point_capacity);
    }
    assert_eq!(second.nodes, third.nodes);
    assert_eq!(second.edges, third.edges);
}

#[test]
fn e2e_config_file_sets_direction_and_color() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r##"
[layout]
direction = "vertical"

[style]
edge_color = "#d62728"
"##,
    )
    .expect("Failed to write config");
    let output_path = temp_dir.path().join("out.json");

    let mut args = args(&demos_path().join("simple_chain.json"), &output_path);
    args.config = Some(config_path.to_string_lossy().to_string());
    run(&args).expect("Layout should succeed");

    let routed = read_routed(&output_path);
    assert_eq!(routed.direction.to_string(), "vertical");
    assert!(
        routed
            .edges
            .iter()
            .all(|edge| edge.style.stroke == "#d62728" && edge.marker_end.color == "#d62728")
    );
    assert_eq!(routed.statistics.places, 2);
    assert_eq!(routed.statistics.transitions, 1);
}
