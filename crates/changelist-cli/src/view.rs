//! Shared view flags and row rendering for the tree-printing commands.

use anyhow::{Result, bail};
use changelist::v1::{
    ChangeRecord, DEFAULT_ROW_HEIGHT, GroupNode, Node, ReconcileConfig, Reconciler,
    SelectionHandler,
};
use changelist_git::status_code;
use clap::Args;
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Expand a group by id, e.g. `doc.sketch/page1` (repeatable)
    #[arg(long = "expand", value_name = "GROUP")]
    pub expand: Vec<String>,

    /// Collapse a group by id (repeatable)
    #[arg(long = "collapse", value_name = "GROUP")]
    pub collapse: Vec<String>,

    /// Expand every group before applying --expand/--collapse
    #[arg(long, conflicts_with = "collapse_all")]
    pub expand_all: bool,

    /// Collapse every group before applying --expand/--collapse
    #[arg(long)]
    pub collapse_all: bool,

    /// Select a row and print what it refers to instead of the tree
    #[arg(long, value_name = "ROW")]
    pub select: Option<usize>,

    /// Row height reported in JSON output
    #[arg(long, default_value_t = DEFAULT_ROW_HEIGHT)]
    pub row_height: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Build a view for `changes`, apply the requested toggles and print it.
pub fn show(changes: Vec<ChangeRecord>, args: &ViewArgs, pretty: bool) -> Result<()> {
    let view = build(changes, args);

    if let Some(row) = args.select {
        let mut printer = SelectionPrinter::default();
        if !view.dispatch_selection(row, &mut printer) {
            bail!("Row {} is out of range ({} rows)", row, view.row_count());
        }
        println!("{}", printer.output);
        return Ok(());
    }

    if args.json {
        println!("{}", to_json(&view, pretty)?);
    } else {
        print_rows(view.current_view());
    }
    Ok(())
}

pub fn build(changes: Vec<ChangeRecord>, args: &ViewArgs) -> Reconciler {
    let mut view = Reconciler::new(ReconcileConfig {
        row_height: args.row_height,
        ..Default::default()
    });
    view.rebuild(changes, &[]);

    if args.expand_all {
        view.set_all_expanded(true);
    } else if args.collapse_all {
        view.set_all_expanded(false);
    }
    for group in &args.expand {
        if !view.toggle_group(group, true) {
            warn!("No group named {}", group);
        }
    }
    for group in &args.collapse {
        if !view.toggle_group(group, false) {
            warn!("No group named {}", group);
        }
    }
    view
}

pub fn to_json(view: &Reconciler, pretty: bool) -> Result<String> {
    let output = serde_json::json!({
        "row_height": view.row_height(),
        "row_count": view.row_count(),
        "rows": view.current_view(),
    });
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(json)
}

pub fn print_rows(rows: &[Node]) {
    if rows.is_empty() {
        println!("  (no changes)");
        return;
    }
    for node in rows {
        println!("{}", render_row(node));
    }
}

/// One text line per row: two spaces of indent per depth, a fold marker
/// for groups and a status letter for files.
pub fn render_row(node: &Node) -> String {
    let indent = "  ".repeat(node.depth());
    match node {
        Node::Group(group) => {
            let marker = if group.expanded { '▾' } else { '▸' };
            match group.conflict_status {
                Some(conflict) => format!("{}{} {} [{}]", indent, marker, group.label, conflict),
                None => format!("{}{} {}", indent, marker, group.label),
            }
        }
        Node::File(file) => format!(
            "{}{} {}",
            indent,
            status_code(&file.change.status),
            file.change.label()
        ),
    }
}

#[derive(Default)]
struct SelectionPrinter {
    output: String,
}

impl SelectionHandler for SelectionPrinter {
    fn on_file_selected(&mut self, change: &ChangeRecord) {
        self.output = format!("file {} ({})", change.path, change.status);
    }

    fn on_document_selected(&mut self, group: &GroupNode) {
        self.output = format!("document {}", group.group_id);
    }

    fn on_part_selected(&mut self, group: &GroupNode) {
        self.output = format!("part {} (depth {})", group.group_id, group.depth);
    }
}
