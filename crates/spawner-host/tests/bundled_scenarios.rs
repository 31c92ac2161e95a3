//! Every bundled scenario must load and pass with default settings.

use spawner_host::scenario::{load_scenario, run_scenario, scenario_files};
use spawner_host::settings::HostSettings;
use std::path::Path;

#[test]
fn bundled_scenarios_pass() {
    let dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios"));
    let files = scenario_files(dir).expect("scenario directory should be readable");
    assert!(files.len() >= 4, "expected bundled scenarios, found {files:?}");

    for file in files {
        let scenario = load_scenario(&file)
            .unwrap_or_else(|e| panic!("failed to load '{}': {e}", file.display()));
        let report = run_scenario(&scenario, &HostSettings::default())
            .unwrap_or_else(|e| panic!("failed to run '{}': {e}", file.display()));
        assert!(
            report.passed(),
            "scenario '{}' failed: {:?}",
            report.title,
            report.failures
        );
    }
}
