use anyhow::{Context, Result};
use changelist::v1::ChangeRecord;
use std::io::Read;

use crate::view::{self, ViewArgs};

pub fn run(input: &str, view_args: ViewArgs, pretty: bool) -> Result<()> {
    let content = read_input(input)?;
    let changes = ChangeRecord::list_from_json(&content)
        .with_context(|| format!("Failed to parse change records from {}", input))?;

    view::show(changes, &view_args, pretty)
}

/// Read a file, or stdin when `input` is `-`.
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}
