use crate::cli::{Command, DeliveryCommand, ListArgs, PeriodArgs, RecordCommand, StatsCommand};
use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tally_api::endpoints::{Period, SortOrder, StoreId};
use tally_api::{Client, Request};
use tally_auth::Reissuer;

/// Run one command and return what should be printed
pub async fn execute_command<R: Reissuer>(
    client: &Client<R>,
    store: Option<StoreId>,
    command: &Command,
) -> Result<Value> {
    match command {
        Command::Me => to_json(client.send(Request::users().me()).await?),
        Command::Sales(command) => {
            let store_id = resolve_store(client, store).await?;
            sales(client, store_id, command).await
        }
        Command::Expenses(command) => {
            let store_id = resolve_store(client, store).await?;
            expenses(client, store_id, command).await
        }
        Command::Delivery(DeliveryCommand::Show) => {
            let store_id = resolve_store(client, store).await?;
            let settings = client
                .send(Request::stores().delivery_settings(store_id))
                .await?;
            let platforms: Vec<Value> = settings
                .enabled_platforms()
                .map(|platform| {
                    json!({
                        "platform": platform,
                        "commissionRate": settings.commission_rate(platform),
                    })
                })
                .collect();
            Ok(json!({ "storeId": store_id, "enabled": platforms, "settings": settings }))
        }
        Command::Stats(command) => {
            let store_id = resolve_store(client, store).await?;
            stats(client, store_id, command).await
        }
    }
}

/// The requested store, or the account's first one
pub async fn resolve_store<R: Reissuer>(
    client: &Client<R>,
    requested: Option<StoreId>,
) -> Result<StoreId> {
    if let Some(store_id) = requested {
        return Ok(store_id);
    }

    let user = client.send(Request::users().me()).await?;
    let store = user
        .store_list
        .first()
        .ok_or_else(|| anyhow!("No store is registered on this account"))?;
    tracing::debug!(store_id = store.id, "Using first store on the account");
    Ok(store.id)
}

async fn sales<R: Reissuer>(
    client: &Client<R>,
    store_id: StoreId,
    command: &RecordCommand,
) -> Result<Value> {
    let repo = Request::sales_records().with_store(store_id);
    match command {
        RecordCommand::List(args) => {
            let mut req = repo
                .list()
                .page(args.page)
                .size(args.size)
                .sort_order(sort_order(args));
            if let Some((from, to)) = date_range(args) {
                req = req.between(from, to);
            }
            to_json(client.send(req).await?)
        }
        RecordCommand::Get { id } => to_json(client.send(repo.get(*id)).await?),
        RecordCommand::Delete { id } => {
            client.send(repo.delete(*id)).await?;
            Ok(json!({ "deleted": id }))
        }
    }
}

async fn expenses<R: Reissuer>(
    client: &Client<R>,
    store_id: StoreId,
    command: &RecordCommand,
) -> Result<Value> {
    let repo = Request::expense_records().with_store(store_id);
    match command {
        RecordCommand::List(args) => {
            let mut req = repo
                .list()
                .page(args.page)
                .size(args.size)
                .sort_order(sort_order(args));
            if let Some(payment) = &args.payment {
                req = req.payment(payment.as_str());
            }
            if let Some((from, to)) = date_range(args) {
                req = req.between(from, to);
            }
            to_json(client.send(req).await?)
        }
        RecordCommand::Get { id } => to_json(client.send(repo.get(*id)).await?),
        RecordCommand::Delete { id } => {
            client.send(repo.delete(*id)).await?;
            Ok(json!({ "deleted": id }))
        }
    }
}

async fn stats<R: Reissuer>(
    client: &Client<R>,
    store_id: StoreId,
    command: &StatsCommand,
) -> Result<Value> {
    let repo = Request::stats().with_store(store_id);
    match command {
        StatsCommand::SalesExpense(args) => {
            let mut req = repo
                .sales_expense(period(args), args.year)
                .exclude_delivery_commission(args.exclude_commission);
            if let Some(month) = args.month {
                req = req.month(month);
            }
            let stats = client.send(req).await?;
            let profit: serde_json::Map<String, Value> = stats
                .profit()
                .into_iter()
                .map(|(label, amount)| (label, json!(amount)))
                .collect();
            let mut value = to_json(stats)?;
            value["profit"] = Value::Object(profit);
            Ok(value)
        }
        StatsCommand::SalesType {
            year,
            exclude_delivery_fee,
        } => {
            let req = repo
                .sales_type(*year)
                .exclude_delivery_fee(*exclude_delivery_fee);
            to_json(client.send(req).await?)
        }
        StatsCommand::Delivery(args) => {
            let mut req = repo
                .delivery_platform(period(args), args.year)
                .exclude_delivery_commission(args.exclude_commission);
            if let Some(month) = args.month {
                req = req.month(month);
            }
            to_json(client.send(req).await?)
        }
    }
}

fn sort_order(args: &ListArgs) -> SortOrder {
    if args.asc {
        SortOrder::Asc
    } else {
        SortOrder::Desc
    }
}

fn date_range(args: &ListArgs) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
    args.from.zip(args.to)
}

fn period(args: &PeriodArgs) -> Period {
    if args.daily {
        Period::Daily
    } else {
        Period::Monthly
    }
}

fn to_json(value: impl Serialize) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
