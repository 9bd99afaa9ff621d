//! `fieldprice price` -- price one entity from a request file.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use fieldprice_core::entity::EntityRef;
use fieldprice_engine::{PriceCalculator, PricingRequest, Summand, SummandCause};
use serde::Serialize;

use crate::cli::PriceArgs;
use crate::context::RuntimeContext;
use crate::output::{format_amount, output_json, output_table};

#[derive(Serialize)]
struct PriceView<'a> {
    entity: EntityRef,
    price: Option<f64>,
    summands: &'a [Summand],
    totals_by_field: BTreeMap<u64, f64>,
}

/// Execute the `fieldprice price` command.
pub fn run(ctx: &RuntimeContext, args: &PriceArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let snapshot = ctx.load_snapshot(&args.snapshot)?;
    let request = PricingRequest::load(&args.request)
        .with_context(|| format!("failed to load request {}", args.request.display()))?;

    let resolver = snapshot.resolver();
    let calculator =
        PriceCalculator::with_options(&resolver, snapshot.event_id, config.pricing_options());
    let tag = calculator
        .price_tag(&request, &request.answers)
        .with_context(|| format!("cannot price {}", request.entity))?;

    if ctx.json {
        output_json(&PriceView {
            entity: tag.entity,
            price: tag.price(),
            summands: tag.summands(),
            totals_by_field: tag.totals_by_field(),
        });
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tag
        .summands()
        .iter()
        .map(|s| match &s.cause {
            SummandCause::BasePrice { entity } => vec![
                "base price".to_string(),
                entity.to_string(),
                format_amount(s.value),
            ],
            SummandCause::CustomFieldValue {
                field_id,
                field_name,
                source,
                ..
            } => vec![
                format!("{} ({})", field_name, field_id),
                source.to_string(),
                format_amount(s.value),
            ],
        })
        .collect();
    output_table(&["CAUSE", "SOURCE", "AMOUNT"], &rows);

    match tag.price() {
        Some(total) => println!("Total for {}: {}", tag.entity, format_amount(total)),
        None => println!("{} has no price", tag.entity),
    }
    Ok(())
}
