//! `fieldprice order` -- evaluation order of formula fields.

use anyhow::{Context, Result};

use crate::cli::OrderArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table, FieldView};

/// Execute the `fieldprice order` command.
pub fn run(ctx: &RuntimeContext, args: &OrderArgs) -> Result<()> {
    let snapshot = ctx.load_snapshot(&args.snapshot)?;
    let resolver = snapshot.resolver();

    let order = resolver
        .evaluation_order()
        .context("cannot order formula fields")?;
    let mut views = Vec::with_capacity(order.len());
    for id in order {
        views.push(FieldView::from_field(resolver.field(id)?));
    }

    if ctx.json {
        output_json(&views);
        return Ok(());
    }

    if views.is_empty() {
        if !ctx.quiet {
            println!("No formula fields.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = views
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let mut row = vec![(i + 1).to_string()];
            row.extend(view.row());
            row
        })
        .collect();
    output_table(&["#", "ID", "NAME", "KIND", "FORMULA"], &rows);
    Ok(())
}
