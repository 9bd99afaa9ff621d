//! `fieldprice validate` -- static validation of price formulas.

use anyhow::{bail, Result};
use fieldprice_engine::{FieldReport, FormulaValidator};
use serde::Serialize;

use crate::cli::ValidateArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

#[derive(Serialize)]
struct ReportView {
    field_id: u64,
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl From<&FieldReport> for ReportView {
    fn from(report: &FieldReport) -> Self {
        Self {
            field_id: report.field_id,
            valid: report.is_ok(),
            errors: report.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Execute the `fieldprice validate` command.
pub fn run(ctx: &RuntimeContext, args: &ValidateArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let snapshot = ctx.load_snapshot(&args.snapshot)?;
    let resolver = snapshot.resolver();

    let mut options = config.validation_options();
    options.collect_all |= args.all;
    let validator = FormulaValidator::with_options(&resolver, options);

    let reports = match (args.field, args.formula.as_deref()) {
        (Some(field), Some(formula)) => {
            let errors = if options.collect_all {
                validator.validate_all(field, formula)
            } else {
                validator.validate(field, formula).err().into_iter().collect()
            };
            vec![FieldReport {
                field_id: field,
                errors,
            }]
        }
        _ => validator.validate_snapshot(),
    };

    let failed = reports.iter().filter(|r| !r.is_ok()).count();

    if ctx.json {
        let views: Vec<ReportView> = reports.iter().map(ReportView::from).collect();
        output_json(&views);
    } else {
        for report in &reports {
            let name = resolver
                .field(report.field_id)
                .map(|f| f.display_name())
                .unwrap_or_else(|_| format!("field {}", report.field_id));
            if report.is_ok() {
                if !ctx.quiet {
                    println!("ok    {} ({})", report.field_id, name);
                }
                continue;
            }
            println!("FAIL  {} ({})", report.field_id, name);
            for err in &report.errors {
                println!("      {}", err);
            }
        }
        if reports.is_empty() && !ctx.quiet {
            println!("No formulas to validate.");
        }
    }

    if failed > 0 {
        bail!("{} of {} formula(s) failed validation", failed, reports.len());
    }
    Ok(())
}
