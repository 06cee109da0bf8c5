use anyhow::{Context, Result};
use changelist::v1::{ChangeRecord, RebuildOutcome, RebuildPolicy, ReconcileConfig, Reconciler};
use clap::ValueEnum;
use serde::Deserialize;

use crate::cmd_tree::read_input;
use crate::view::print_rows;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Re-derive the tree on every rebuild
    Always,
    /// Keep the tree while the selection is unchanged
    SkipWhenSelectionUnchanged,
}

impl From<Policy> for RebuildPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Always => RebuildPolicy::Always,
            Policy::SkipWhenSelectionUnchanged => RebuildPolicy::SkipWhenSelectionUnchanged,
        }
    }
}

/// One step of a replay file.
///
/// ```json
/// [
///   { "rebuild": { "changes": [ … ], "selection": ["readme.md"] } },
///   { "toggle": { "group": "doc.sketch/page1", "expanded": true } }
/// ]
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Rebuild {
        changes: Vec<ChangeRecord>,
        #[serde(default)]
        selection: Vec<String>,
    },
    Toggle {
        group: String,
        expanded: bool,
    },
}

pub fn run(input: &str, policy: Policy, json: bool, pretty: bool) -> Result<()> {
    let content = read_input(input)?;
    let events: Vec<Event> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse replay events from {}", input))?;

    let mut view = Reconciler::new(ReconcileConfig {
        policy: policy.into(),
        ..Default::default()
    });

    for (index, event) in events.into_iter().enumerate() {
        let outcome = apply(&mut view, event)
            .with_context(|| format!("Invalid event #{}", index))?;

        if json {
            let output = serde_json::json!({
                "event": index,
                "outcome": outcome,
                "row_count": view.row_count(),
                "rows": view.current_view(),
            });
            if pretty {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", serde_json::to_string(&output)?);
            }
        } else {
            println!("#{} {}", index, outcome);
            print_rows(view.current_view());
        }
    }
    Ok(())
}

fn apply(view: &mut Reconciler, event: Event) -> Result<&'static str> {
    match event {
        Event::Rebuild { changes, selection } => {
            for change in &changes {
                change.validate()?;
            }
            Ok(match view.rebuild(changes, &selection) {
                RebuildOutcome::Rebuilt => "rebuilt",
                RebuildOutcome::Skipped => "skipped",
            })
        }
        Event::Toggle { group, expanded } => Ok(if view.toggle_group(&group, expanded) {
            "toggled"
        } else {
            "ignored"
        }),
    }
}
