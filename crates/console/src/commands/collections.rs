use anyhow::Context as _;
use chrono::Utc;
use models::collection::{
    CollectionFilter, CollectionSummary, CreateCollection, format_amount, parse_amount,
};
use services::services::export::{CollectionTable, Column, Tabular};
use uuid::Uuid;

use super::Context;
use crate::{
    cli::{CollectionFilterArgs, CollectionsCommand},
    output, prompt,
};

impl From<CollectionFilterArgs> for CollectionFilter {
    fn from(args: CollectionFilterArgs) -> Self {
        Self {
            kind: args.kind,
            member_id: args.member,
            from: args.from,
            to: args.to,
        }
    }
}

pub async fn run(ctx: &Context, command: CollectionsCommand) -> anyhow::Result<()> {
    match command {
        CollectionsCommand::List { filter } => {
            let client = ctx.client()?;
            let filter = CollectionFilter::from(filter);
            let collections = output::with_spinner(
                ctx.spinner(),
                "Loading collections...",
                client.list_collections(&filter),
            )
            .await?;
            output::print_table(&CollectionTable(&collections), ctx.format)?;
            Ok(())
        }
        CollectionsCommand::Record {
            amount,
            kind,
            member,
            entity,
            date,
            currency,
            notes,
        } => {
            let amount = match amount {
                Some(amount) => amount,
                None => prompt::text("Amount")?,
            };
            let amount_cents = parse_amount(&amount)?;
            let kind = match kind {
                Some(kind) => kind,
                None => prompt::collection_kind()?,
            };
            let request = CreateCollection {
                entity_id: entity,
                member_id: member,
                kind,
                amount_cents,
                currency: currency.trim().to_uppercase(),
                collected_on: date.unwrap_or_else(|| Utc::now().date_naive()),
                notes: notes.filter(|n| !n.trim().is_empty()),
            };

            let client = ctx.client()?;
            let recorded = output::with_spinner(
                ctx.spinner(),
                "Recording collection...",
                client.create_collection(&request),
            )
            .await
            .context("Collection was not recorded")?;

            tracing::info!(
                collection_id = %recorded.id,
                kind = %recorded.kind,
                "Collection recorded"
            );
            println!(
                "Recorded {} of {} {} on {} ({})",
                recorded.kind,
                format_amount(recorded.amount_cents),
                recorded.currency,
                recorded.collected_on,
                recorded.id
            );
            Ok(())
        }
        CollectionsCommand::Summary { filter } => {
            let client = ctx.client()?;
            let filter = CollectionFilter::from(filter);
            let collections = output::with_spinner(
                ctx.spinner(),
                "Loading collections...",
                client.list_collections(&filter),
            )
            .await?;
            let summary = CollectionSummary::from_collections(&collections);
            output::print_table(&SummaryTable(&summary), ctx.format)?;
            Ok(())
        }
        CollectionsCommand::Remove { id, yes } => remove(ctx, id, yes).await,
    }
}

async fn remove(ctx: &Context, id: Uuid, yes: bool) -> anyhow::Result<()> {
    let client = ctx.client()?;
    if !yes && !prompt::confirm(&format!("Delete collection {}?", id), false)? {
        return Ok(());
    }
    output::with_spinner(
        ctx.spinner(),
        "Deleting collection...",
        client.delete_collection(id),
    )
    .await?;
    println!("Deleted collection {}", id);
    Ok(())
}

/// One row per kind plus a closing total row
struct SummaryTable<'a>(&'a CollectionSummary);

impl Tabular for SummaryTable<'_> {
    fn columns(&self) -> Vec<Column> {
        vec![Column::new("kind", "Kind"), Column::new("amount", "Amount")]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = self
            .0
            .by_kind
            .iter()
            .map(|(kind, cents)| vec![kind.to_string(), format_amount(*cents)])
            .collect();
        rows.push(vec![
            format!("total ({} collections)", self.0.count),
            format_amount(self.0.total_cents),
        ]);
        rows
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use models::collection::CollectionKind;

    use super::*;

    #[test]
    fn test_summary_rows() {
        let summary = CollectionSummary {
            count: 3,
            total_cents: 4500,
            by_kind: BTreeMap::from([
                (CollectionKind::Offering, 500),
                (CollectionKind::Tithe, 4000),
            ]),
        };
        let rows = SummaryTable(&summary).rows();
        assert_eq!(rows[0], vec!["tithe", "40.00"]);
        assert_eq!(rows[1], vec!["offering", "5.00"]);
        assert_eq!(rows[2], vec!["total (3 collections)", "45.00"]);
    }

    #[test]
    fn test_filter_args_conversion() {
        let filter = CollectionFilter::from(CollectionFilterArgs {
            kind: Some(CollectionKind::Pledge),
            ..Default::default()
        });
        assert_eq!(filter.kind, Some(CollectionKind::Pledge));
        assert_eq!(filter.member_id, None);
    }
}
