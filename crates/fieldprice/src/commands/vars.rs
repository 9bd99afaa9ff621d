//! `fieldprice vars` -- variables usable in a field's formula.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::VarsArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

#[derive(Serialize)]
struct VariableView {
    name: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    label: String,
    used: bool,
}

/// Execute the `fieldprice vars` command.
pub fn run(ctx: &RuntimeContext, args: &VarsArgs) -> Result<()> {
    let snapshot = ctx.load_snapshot(&args.snapshot)?;
    let resolver = snapshot.resolver();

    let usable = resolver
        .usable_variables_for(args.field)
        .with_context(|| format!("cannot list variables of field {}", args.field))?;
    let used: Vec<String> = resolver
        .used_variables(args.field)?
        .into_iter()
        .map(|v| v.name)
        .collect();

    let views: Vec<VariableView> = usable
        .into_values()
        .map(|var| VariableView {
            used: used.contains(&var.name),
            kind: var.kind.as_str(),
            name: var.name,
            label: var.label,
        })
        .collect();

    if ctx.json {
        output_json(&views);
        return Ok(());
    }

    if views.is_empty() {
        if !ctx.quiet {
            println!("Field {} has no usable variables.", args.field);
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|v| {
            vec![
                v.name.clone(),
                v.kind.to_string(),
                if v.used { "yes" } else { "" }.to_string(),
                v.label.clone(),
            ]
        })
        .collect();
    output_table(&["NAME", "KIND", "USED", "LABEL"], &rows);
    Ok(())
}
