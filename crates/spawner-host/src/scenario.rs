//! Scripted scenarios for the headless runner.
//!
//! A scenario is a RON file: a tick budget, actions pinned to ticks, and
//! expectations checked once the run ends. Actions scheduled for a tick run
//! before that tick's step.

use crate::error::{HostError, ScenarioError};
use crate::form::FormResponse;
use crate::host::{BreakOutcome, Host};
use crate::interaction::ItemUse;
use crate::settings::HostSettings;
use serde::Deserialize;
use spawner_core::guard::{Actor, GameMode};
use spawner_core::id::Region;
use spawner_core::position::BlockPos;
use spawner_core::world::World;
use std::path::{Path, PathBuf};

// ===========================================================================
// Schema
// ===========================================================================

/// Top-level scenario definition.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub ticks: u64,
    #[serde(default)]
    pub actions: Vec<TimedAction>,
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimedAction {
    pub at: u64,
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
pub enum Action {
    /// Use the trigger item on `target` and submit the form.
    Place {
        actor: String,
        region: Region,
        target: (i32, i32, i32),
        interval: String,
        item: String,
        count: String,
    },
    /// Try to break the block at `target`.
    Break {
        actor: String,
        mode: GameMode,
        region: Region,
        target: (i32, i32, i32),
    },
    /// Remove a block behind the engine's back.
    Tamper { region: Region, target: (i32, i32, i32) },
    /// Save the world and load it back.
    SaveReload,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Expectation {
    Dropped {
        region: Region,
        item: String,
        total: u32,
    },
    Destroyed(usize),
    Vetoed(usize),
    Rejected(usize),
    Generators(usize),
}

// ===========================================================================
// Report
// ===========================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioReport {
    pub title: String,
    pub ticks: u64,
    pub emitted: usize,
    pub destroyed: usize,
    pub vetoed: usize,
    /// Placements refused because of invalid input.
    pub rejected: usize,
    /// Live generators at the end of the run.
    pub generators: usize,
    /// One line per unmet expectation.
    pub failures: Vec<String>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

// ===========================================================================
// Loading
// ===========================================================================

pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let content = std::fs::read_to_string(path)?;
    ron::from_str(&content).map_err(|e| ScenarioError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Every `.ron` file in `dir`, sorted by file name.
pub fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>, ScenarioError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("ron") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// ===========================================================================
// Running
// ===========================================================================

fn pos((x, y, z): (i32, i32, i32)) -> BlockPos {
    BlockPos::new(x, y, z)
}

/// Run a scenario against a fresh world.
pub fn run_scenario(
    scenario: &Scenario,
    settings: &HostSettings,
) -> Result<ScenarioReport, ScenarioError> {
    let catalog = settings.item_catalog()?;
    let mut host = Host::new(settings.clone(), catalog);
    let mut report = ScenarioReport {
        title: scenario.title.clone(),
        ticks: scenario.ticks,
        ..ScenarioReport::default()
    };

    for tick in 0..scenario.ticks {
        for timed in scenario.actions.iter().filter(|a| a.at == tick) {
            apply(&mut host, &timed.action, &mut report).map_err(|source| {
                ScenarioError::Action {
                    title: scenario.title.clone(),
                    tick,
                    source,
                }
            })?;
        }
        let step = host.tick();
        report.emitted += step.emitted_count();
        report.destroyed += step.destroyed().count();
    }
    report.generators = host.engine().registry().len();

    for expectation in &scenario.expect {
        if let Some(failure) = check(&host, &report, expectation) {
            report.failures.push(failure);
        }
    }
    tracing::info!(
        title = %report.title,
        emitted = report.emitted,
        destroyed = report.destroyed,
        passed = report.passed(),
        "scenario finished"
    );
    Ok(report)
}

fn apply(host: &mut Host, action: &Action, report: &mut ScenarioReport) -> Result<(), HostError> {
    match action {
        Action::Place {
            actor,
            region,
            target,
            interval,
            item,
            count,
        } => {
            let actor = Actor::new(actor.as_str(), GameMode::Creative);
            let trigger_item = host.settings().trigger_item.clone();
            host.use_item(&ItemUse {
                actor: actor.clone(),
                item_id: trigger_item,
                region: *region,
                target: pos(*target),
                sneaking: false,
            });
            let response = FormResponse::Submitted(vec![interval.clone(), item.clone(), count.clone()]);
            match host.submit_form(&actor, response) {
                Ok(_) => {}
                Err(HostError::Placement(_)) => report.rejected += 1,
                Err(e) => return Err(e),
            }
        }
        Action::Break {
            actor,
            mode,
            region,
            target,
        } => {
            let actor = Actor::new(actor.as_str(), *mode);
            if host.break_block(&actor, *region, pos(*target)) == BreakOutcome::Vetoed {
                report.vetoed += 1;
            }
        }
        Action::Tamper { region, target } => host.world_mut().clear_block(*region, pos(*target)),
        Action::SaveReload => {
            let data = host.save()?;
            host.reload(&data)?;
        }
    }
    Ok(())
}

fn check(host: &Host, report: &ScenarioReport, expectation: &Expectation) -> Option<String> {
    let (what, expected, actual) = match expectation {
        Expectation::Dropped {
            region,
            item,
            total,
        } => (
            format!("{item} dropped in {region}"),
            *total as usize,
            host.world().dropped_total(*region, item) as usize,
        ),
        Expectation::Destroyed(n) => ("generators destroyed".to_string(), *n, report.destroyed),
        Expectation::Vetoed(n) => ("removals vetoed".to_string(), *n, report.vetoed),
        Expectation::Rejected(n) => ("placements rejected".to_string(), *n, report.rejected),
        Expectation::Generators(n) => ("live generators".to_string(), *n, report.generators),
    };
    (expected != actual).then(|| format!("{what}: expected {expected}, got {actual}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
Scenario(
    title: "basic",
    ticks: 10,
    actions: [
        (at: 0, action: Place(
            actor: "op",
            region: Overworld,
            target: (0, 64, 0),
            interval: "5",
            item: "minecraft:diamond",
            count: "1",
        )),
        (at: 2, action: Break(actor: "steve", mode: Survival, region: Overworld, target: (0, 64, 0))),
        (at: 3, action: Place(
            actor: "op",
            region: Overworld,
            target: (8, 64, 0),
            interval: "often",
            item: "minecraft:diamond",
            count: "1",
        )),
    ],
    expect: [
        Dropped(region: Overworld, item: "minecraft:diamond", total: 2),
        Vetoed(1),
        Rejected(1),
        Generators(1),
    ],
)
"#;

    #[test]
    fn basic_scenario_passes() {
        let scenario: Scenario = ron::from_str(BASIC).unwrap();
        let report = run_scenario(&scenario, &HostSettings::default()).unwrap();
        assert!(report.passed(), "{:?}", report.failures);
        assert_eq!(report.emitted, 2);
    }

    #[test]
    fn unmet_expectations_are_reported() {
        let mut scenario: Scenario = ron::from_str(BASIC).unwrap();
        scenario.expect = vec![Expectation::Destroyed(3)];
        let report = run_scenario(&scenario, &HostSettings::default()).unwrap();
        assert_eq!(
            report.failures,
            vec!["generators destroyed: expected 3, got 0".to_string()]
        );
    }

    #[test]
    fn tampering_and_reload() {
        let scenario = Scenario {
            title: "tamper".to_string(),
            description: String::new(),
            ticks: 6,
            actions: vec![
                TimedAction {
                    at: 0,
                    action: Action::Place {
                        actor: "op".to_string(),
                        region: Region::Nether,
                        target: (0, 30, 0),
                        interval: "2".to_string(),
                        item: "minecraft:quartz".to_string(),
                        count: "1".to_string(),
                    },
                },
                TimedAction {
                    at: 1,
                    action: Action::SaveReload,
                },
                TimedAction {
                    at: 5,
                    action: Action::Tamper {
                        region: Region::Nether,
                        target: (0, 125, 0),
                    },
                },
            ],
            expect: vec![
                Expectation::Destroyed(1),
                Expectation::Generators(0),
                Expectation::Dropped {
                    region: Region::Nether,
                    item: "minecraft:quartz".to_string(),
                    total: 2,
                },
            ],
        };
        let report = run_scenario(&scenario, &HostSettings::default()).unwrap();
        assert!(report.passed(), "{:?}", report.failures);
    }
}
