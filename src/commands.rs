use std::fmt;

use keepinv_core::PlayerId;
use keepinv_retention::{KeepInventory, Preference, ToggleOutcome, ToggleRefusal};

/// Names the command answers to.
pub const COMMAND_NAMES: [&str; 3] = ["keepinventory", "keepinv", "ki"];

/// Permission required for `global on|off`.
pub const PERMISSION_GLOBAL: &str = "keepinventory.global";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepInventoryCommand {
    Usage,
    On,
    Off,
    Status,
    Global { enabled: bool },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
}

/// Who is running the command.
pub trait CommandContext {
    fn player(&self) -> PlayerId;
    fn has_permission(&self, permission: &str) -> bool;
}

pub fn execute_command(
    service: &KeepInventory,
    ctx: &impl CommandContext,
    cmd: KeepInventoryCommand,
) -> CommandOutput {
    let mut out = CommandOutput::default();
    match cmd {
        KeepInventoryCommand::Usage => out.lines.extend(usage_lines()),
        KeepInventoryCommand::On => match service.enable_for_player(ctx.player()) {
            ToggleOutcome::Applied => out.lines.push(
                "Keep inventory enabled! Your inventory will be kept when you die.".to_string(),
            ),
            ToggleOutcome::Refused(reason) => out.lines.push(refusal_line(reason)),
        },
        KeepInventoryCommand::Off => match service.disable_for_player(ctx.player()) {
            ToggleOutcome::Applied => out.lines.push(
                "Keep inventory disabled! Items will drop under the normal rules when you die."
                    .to_string(),
            ),
            ToggleOutcome::Refused(reason) => out.lines.push(refusal_line(reason)),
        },
        KeepInventoryCommand::Status => {
            let status = service.status(&ctx.player());
            out.lines.push("=== Keep Inventory Status ===".to_string());
            out.lines.push(format!(
                "Personal: {}",
                match status.personal {
                    Preference::OptedIn => "enabled",
                    Preference::OptedOut => "disabled",
                    Preference::Unset => "not set",
                }
            ));
            out.lines
                .push(format!("Global: {}", on_off(status.global_override)));
            out.lines.push(format!(
                "Effective: {}",
                if status.effective {
                    "items kept"
                } else {
                    "items drop"
                }
            ));
            out.lines
                .push(format!("Players enabled: {}", status.opted_in_players));
            if status.force_enabled {
                out.lines
                    .push("Forced on by the server configuration".to_string());
            }
        }
        KeepInventoryCommand::Global { enabled } => {
            if !ctx.has_permission(PERMISSION_GLOBAL) {
                out.lines
                    .push("Error: you do not have permission to change the global setting".to_string());
                return out;
            }
            match service.set_global(enabled) {
                ToggleOutcome::Applied if enabled => out.lines.push(
                    "Global keep inventory enabled! Every player keeps items on death.".to_string(),
                ),
                ToggleOutcome::Applied => out.lines.push(
                    "Global keep inventory disabled! Players use their own settings.".to_string(),
                ),
                ToggleOutcome::Refused(reason) => out.lines.push(refusal_line(reason)),
            }
        }
    }
    out
}

fn on_off(value: bool) -> &'static str {
    if value {
        "enabled"
    } else {
        "disabled"
    }
}

fn refusal_line(reason: ToggleRefusal) -> String {
    format!("Error: {reason}")
}

pub fn parse_command(input: &str) -> Result<KeepInventoryCommand, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input).trim();

    let mut parts = input.split_whitespace();
    let name = parts
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?
        .to_ascii_lowercase();
    if !COMMAND_NAMES.contains(&name.as_str()) {
        return Err(CommandError::new(format!(
            "Unknown command: {name}. Try /keepinventory"
        )));
    }

    let args: Vec<String> = parts.map(|s| s.to_ascii_lowercase()).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] => Ok(KeepInventoryCommand::Usage),
        ["on"] => Ok(KeepInventoryCommand::On),
        ["off"] => Ok(KeepInventoryCommand::Off),
        ["status"] => Ok(KeepInventoryCommand::Status),
        ["global", "on"] => Ok(KeepInventoryCommand::Global { enabled: true }),
        ["global", "off"] => Ok(KeepInventoryCommand::Global { enabled: false }),
        ["global", ..] => Err(CommandError::new("Usage: /keepinventory global <on|off>")),
        [other, ..] => Err(CommandError::new(format!(
            "Unknown subcommand: {other}. Try /keepinventory"
        ))),
    }
}

pub fn usage_lines() -> Vec<String> {
    vec![
        "=== Keep Inventory Commands ===".to_string(),
        "/keepinventory on - keep your inventory on death".to_string(),
        "/keepinventory off - drop items normally on death".to_string(),
        "/keepinventory status - show the current state".to_string(),
        "/keepinventory global <on|off> - server-wide switch (requires permission)".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepinv_retention::RetentionConfig;

    struct FakeCtx {
        player: PlayerId,
        admin: bool,
    }

    impl FakeCtx {
        fn regular(name: &str) -> Self {
            Self {
                player: PlayerId::from_name(name),
                admin: false,
            }
        }

        fn admin(name: &str) -> Self {
            Self {
                player: PlayerId::from_name(name),
                admin: true,
            }
        }
    }

    impl CommandContext for FakeCtx {
        fn player(&self) -> PlayerId {
            self.player
        }

        fn has_permission(&self, permission: &str) -> bool {
            self.admin && permission == PERMISSION_GLOBAL
        }
    }

    fn run(service: &KeepInventory, ctx: &FakeCtx, input: &str) -> Vec<String> {
        match parse_command(input) {
            Ok(cmd) => execute_command(service, ctx, cmd).lines,
            Err(err) => vec![format!("Error: {err}")],
        }
    }

    #[test]
    fn parses_aliases_and_subcommands() {
        assert_eq!(parse_command("/keepinventory"), Ok(KeepInventoryCommand::Usage));
        assert_eq!(parse_command("/KI ON"), Ok(KeepInventoryCommand::On));
        assert_eq!(parse_command("keepinv off"), Ok(KeepInventoryCommand::Off));
        assert_eq!(parse_command("/ki status"), Ok(KeepInventoryCommand::Status));
        assert_eq!(
            parse_command("/keepinventory global off"),
            Ok(KeepInventoryCommand::Global { enabled: false })
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("/give torch").is_err());
        let err = parse_command("/ki global").unwrap_err();
        assert!(err.to_string().contains("global <on|off>"));
        let err = parse_command("/ki sideways").unwrap_err();
        assert!(err.to_string().contains("sideways"));
    }

    #[test]
    fn global_requires_permission() {
        let service = KeepInventory::with_config(RetentionConfig::default());
        let lines = run(&service, &FakeCtx::regular("alex"), "/ki global on");
        assert!(lines[0].contains("permission"));
        assert!(!service.global_override());
    }

    #[test]
    fn locked_toggle_reports_refusal() {
        let service = KeepInventory::with_config(RetentionConfig {
            allow_player_toggle: false,
            ..RetentionConfig::default()
        });
        let lines = run(&service, &FakeCtx::regular("alex"), "/ki on");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Error:"));
    }

    #[test]
    fn golden_transcript() {
        let service = KeepInventory::with_config(RetentionConfig::default());
        let alex = FakeCtx::regular("alex");
        let admin = FakeCtx::admin("op");

        let mut transcript = Vec::new();
        for (ctx, input) in [
            (&alex, "/keepinventory"),
            (&alex, "/ki on"),
            (&alex, "/ki status"),
            (&admin, "/ki global on"),
            (&admin, "/ki status"),
            (&admin, "/ki global off"),
            (&alex, "/ki off"),
            (&alex, "/ki status"),
        ] {
            transcript.push(format!("> {input}"));
            transcript.extend(run(&service, ctx, input));
        }

        let expected = vec![
            "> /keepinventory",
            "=== Keep Inventory Commands ===",
            "/keepinventory on - keep your inventory on death",
            "/keepinventory off - drop items normally on death",
            "/keepinventory status - show the current state",
            "/keepinventory global <on|off> - server-wide switch (requires permission)",
            "> /ki on",
            "Keep inventory enabled! Your inventory will be kept when you die.",
            "> /ki status",
            "=== Keep Inventory Status ===",
            "Personal: enabled",
            "Global: disabled",
            "Effective: items kept",
            "Players enabled: 1",
            "> /ki global on",
            "Global keep inventory enabled! Every player keeps items on death.",
            "> /ki status",
            "=== Keep Inventory Status ===",
            "Personal: not set",
            "Global: enabled",
            "Effective: items kept",
            "Players enabled: 1",
            "> /ki global off",
            "Global keep inventory disabled! Players use their own settings.",
            "> /ki off",
            "Keep inventory disabled! Items will drop under the normal rules when you die.",
            "> /ki status",
            "=== Keep Inventory Status ===",
            "Personal: disabled",
            "Global: disabled",
            "Effective: items drop",
            "Players enabled: 0",
        ];
        assert_eq!(transcript, expected);
    }

    #[test]
    fn force_enabled_status_and_refusals() {
        let service = KeepInventory::with_config(RetentionConfig {
            force_enabled: true,
            ..RetentionConfig::default()
        });
        let admin = FakeCtx::admin("op");

        let lines = run(&service, &admin, "/ki global off");
        assert!(lines[0].starts_with("Error:"));
        let lines = run(&service, &admin, "/ki off");
        assert!(lines[0].starts_with("Error:"));
        let lines = run(&service, &admin, "/ki status");
        assert_eq!(lines.last().unwrap(), "Forced on by the server configuration");
        assert!(lines.contains(&"Effective: items kept".to_string()));
    }
}
