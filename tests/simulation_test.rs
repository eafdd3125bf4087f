use std::process::Command;

fn run_headless(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_parking_sim"))
        .args(args)
        .env("RUST_LOG", "warn,parking_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_headless(&["--clicks", "10", "--seed", "7", "--quiet"]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stdout: {}",
        stdout
    );
    assert!(stdout.contains("=== Parking Simulation Summary ==="));
    assert!(stdout.contains("=== Parking Grid ==="));
}

/// Test that a missing scenario file is reported instead of panicking
#[test]
fn test_missing_scenario_fails_cleanly() {
    let output = run_headless(&["--scenario", "no-such-scenario.toml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no-such-scenario.toml"),
        "Missing file name in error. stderr: {}",
        stderr
    );
}
