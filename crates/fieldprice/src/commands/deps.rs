//! `fieldprice deps` -- direct, transitive and reverse formula dependencies.

use anyhow::{Context, Result};

use crate::cli::DepsArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table, FieldView};

/// Execute the `fieldprice deps` command.
pub fn run(ctx: &RuntimeContext, args: &DepsArgs) -> Result<()> {
    let snapshot = ctx.load_snapshot(&args.snapshot)?;
    let resolver = snapshot.resolver();

    let (views, relation) = if args.reverse {
        let fields = resolver.all_depending_on(args.field)?;
        (
            fields.into_iter().map(FieldView::from_field).collect::<Vec<_>>(),
            "depend on",
        )
    } else if args.transitive {
        let ids = resolver
            .transitive_dependencies_for(args.field)
            .with_context(|| format!("cannot resolve dependencies of field {}", args.field))?;
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            views.push(FieldView::from_field(resolver.field(id)?));
        }
        (views, "needs (transitively)")
    } else {
        let fields = resolver
            .dependencies_for(args.field)
            .with_context(|| format!("cannot resolve dependencies of field {}", args.field))?;
        (
            fields.into_iter().map(FieldView::from_field).collect(),
            "references",
        )
    };

    if ctx.json {
        output_json(&views);
        return Ok(());
    }

    if views.is_empty() {
        if !ctx.quiet {
            if args.reverse {
                println!("No formula references field {}.", args.field);
            } else {
                println!("Field {} has no dependencies.", args.field);
            }
        }
        return Ok(());
    }

    if !ctx.quiet {
        if args.reverse {
            println!("Fields that {} field {}:", relation, args.field);
        } else {
            println!("Field {} {}:", args.field, relation);
        }
    }
    let rows: Vec<Vec<String>> = views.iter().map(FieldView::row).collect();
    output_table(&["ID", "NAME", "KIND", "FORMULA"], &rows);
    Ok(())
}
