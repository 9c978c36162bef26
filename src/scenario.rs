use anyhow::{Context, Result};
use keepinv_core::{ContainerKind, ItemStack};
use keepinv_retention::{DeathOutcome, KeepInventory, RespawnOutcome};
use keepinv_testkit::{EventRecord, JsonlSink, SimulatedPlayer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{fs, path::Path};
use tracing::{info, warn};

use crate::commands::{self, CommandContext, PERMISSION_GLOBAL};

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    steps: Vec<ScenarioStep>,
}

/// One scripted step for one player.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioStep {
    pub player: String,
    #[serde(flatten)]
    pub action: ScenarioAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioAction {
    /// Hand the player an item, into an exact slot when `slot` is given.
    Give {
        item: String,
        #[serde(default = "default_quantity")]
        quantity: u32,
        #[serde(default)]
        container: Option<ContainerKind>,
        #[serde(default)]
        slot: Option<usize>,
    },
    /// Kill the player. `host_emptied` simulates the host clearing the
    /// inventory into its loss list before the hook runs.
    Die {
        #[serde(default)]
        host_emptied: bool,
    },
    Respawn,
    Command {
        command: String,
        #[serde(default)]
        admin: bool,
    },
}

fn default_quantity() -> u32 {
    1
}

/// Ordered death/respawn script.
#[derive(Debug)]
pub struct Scenario {
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario script from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_str(&contents)
    }

    /// Load a scenario script from an in-memory JSON string.
    pub fn from_str(contents: &str) -> Result<Self> {
        let file: ScenarioFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("scenario contains no steps");
        }
        for (index, step) in file.steps.iter().enumerate() {
            if step.player.trim().is_empty() {
                anyhow::bail!("scenario step {index} has an empty player name");
            }
            match &step.action {
                ScenarioAction::Give { quantity: 0, .. } => {
                    anyhow::bail!("scenario step {index} gives zero items");
                }
                ScenarioAction::Give {
                    container, slot, ..
                } if container.is_some() != slot.is_some() => {
                    anyhow::bail!("scenario step {index} needs both container and slot, or neither");
                }
                ScenarioAction::Command { command, .. } if command.trim().is_empty() => {
                    anyhow::bail!("scenario step {index} has an empty command");
                }
                _ => {}
            }
        }
        Ok(Self { steps: file.steps })
    }

    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }
}

/// Counters collected while a scenario runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScenarioSummary {
    pub deaths: usize,
    pub retained: usize,
    pub restores: usize,
    pub failures: usize,
    pub command_lines: Vec<String>,
}

struct ScriptedSender<'a> {
    player: &'a SimulatedPlayer,
    admin: bool,
}

impl CommandContext for ScriptedSender<'_> {
    fn player(&self) -> keepinv_core::PlayerId {
        self.player.id
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.admin && permission == PERMISSION_GLOBAL
    }
}

/// Drives simulated players through a scenario.
pub struct ScenarioRunner<'a> {
    service: &'a KeepInventory,
    players: BTreeMap<String, SimulatedPlayer>,
    events: Option<JsonlSink>,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(service: &'a KeepInventory, events: Option<JsonlSink>) -> Self {
        Self {
            service,
            players: BTreeMap::new(),
            events,
        }
    }

    pub fn player(&self, name: &str) -> Option<&SimulatedPlayer> {
        self.players.get(name)
    }

    pub fn run(&mut self, scenario: &Scenario) -> Result<ScenarioSummary> {
        let mut summary = ScenarioSummary::default();
        for (index, step) in scenario.steps().iter().enumerate() {
            self.run_step(index, step, &mut summary)?;
        }
        info!(
            deaths = summary.deaths,
            retained = summary.retained,
            restores = summary.restores,
            failures = summary.failures,
            "scenario finished"
        );
        Ok(summary)
    }

    fn run_step(
        &mut self,
        index: usize,
        step: &ScenarioStep,
        summary: &mut ScenarioSummary,
    ) -> Result<()> {
        let service = self.service;
        let player = self
            .players
            .entry(step.player.clone())
            .or_insert_with(|| SimulatedPlayer::new(&step.player));

        match &step.action {
            ScenarioAction::Give {
                item,
                quantity,
                container,
                slot,
            } => {
                let stack = ItemStack::new(item.as_str(), *quantity);
                match (container, slot) {
                    (Some(kind), Some(slot)) => player
                        .place(*kind, *slot, stack)
                        .with_context(|| format!("step {index}: cannot place {item}"))?,
                    _ => {
                        if let Some(rest) = player.give(stack)? {
                            warn!(player = %step.player, item = %rest.item_id, quantity = rest.quantity, "inventory full, item not given");
                        }
                    }
                }
            }
            ScenarioAction::Die { host_emptied } => {
                let outcome = if *host_emptied {
                    player.die_after_host_emptied(service)
                } else {
                    player.die(service)
                };
                summary.deaths += 1;
                match outcome {
                    DeathOutcome::Captured { .. } | DeathOutcome::NothingToCapture => {
                        summary.retained += 1
                    }
                    DeathOutcome::CaptureFailed => summary.failures += 1,
                    DeathOutcome::NotRetained => {}
                }
                if let Some(sink) = self.events.as_mut() {
                    sink.write(&EventRecord::now(index, &step.player, "death", &outcome))?;
                }
            }
            ScenarioAction::Respawn => {
                let outcome = player.respawn(service);
                match &outcome {
                    RespawnOutcome::Restored(_) => summary.restores += 1,
                    RespawnOutcome::RestoreFailed => summary.failures += 1,
                    RespawnOutcome::NoSnapshot => {}
                }
                if let Some(sink) = self.events.as_mut() {
                    sink.write(&EventRecord::now(index, &step.player, "respawn", &outcome))?;
                }
            }
            ScenarioAction::Command { command, admin } => {
                let sender = ScriptedSender {
                    player: &*player,
                    admin: *admin,
                };
                let lines = match commands::parse_command(command) {
                    Ok(cmd) => commands::execute_command(service, &sender, cmd).lines,
                    Err(err) => vec![format!("Error: {err}")],
                };
                for line in &lines {
                    info!(player = %step.player, "{line}");
                }
                if let Some(sink) = self.events.as_mut() {
                    sink.write(&EventRecord::now(index, &step.player, "command", &lines))?;
                }
                summary.command_lines.extend(lines);
            }
        }
        Ok(())
    }
}
