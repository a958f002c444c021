//! Operator CLI for the list table.
//!
//! Run with: `cargo run --bin reshima-cli -- <command>`
//!
//! Commands:
//! - `ls <user-id>`: print `list-id<TAB>name` per list
//! - `show <user-id> <list-id>`: print a list's full content as JSON
//! - `new <user-id> [name]`: create a list under a fresh id, print the id
//! - `rm <user-id> <list-id>`: delete a list and all its items
//!
//! Environment: `RESHIMA_TABLE` (default `AppData`), `RESHIMA_ENDPOINT`
//! (e.g. DynamoDB Local). AWS credentials and region come from the
//! ambient environment.

use std::process::ExitCode;

use anyhow::{Context, Result, bail};

use reshima::{DEFAULT_LIST_NAME, ListStore, StoreConfig, new_list_id};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    match rt.block_on(run(&args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Build the store config from environment overrides.
fn config_from_env() -> StoreConfig {
    let mut config = StoreConfig::new();
    if let Ok(table) = std::env::var("RESHIMA_TABLE") {
        config = config.with_table_name(table);
    }
    if let Ok(endpoint) = std::env::var("RESHIMA_ENDPOINT") {
        config = config.with_endpoint(endpoint);
    }
    config
}

async fn run(args: &[String]) -> Result<()> {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let store = ListStore::connect(&sdk_config, &config_from_env());

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["ls", user_id] => {
            for list in store.get_lists(user_id).await? {
                println!("{}\t{}", list.list_id, list.name);
            }
            Ok(())
        }
        ["show", user_id, list_id] => {
            let content = store.load(user_id, list_id).await?;
            let json = serde_json::to_string_pretty(&content).context("serialize list")?;
            println!("{json}");
            Ok(())
        }
        ["new", user_id] | ["new", user_id, _] => {
            let name = args.get(2).copied().unwrap_or(DEFAULT_LIST_NAME);
            let list_id = new_list_id();
            store.create_list(user_id, &list_id, name).await?;
            println!("{list_id}");
            Ok(())
        }
        ["rm", user_id, list_id] => {
            store.delete_list(user_id, list_id).await?;
            Ok(())
        }
        _ => bail!("usage: reshima-cli <ls|show|new|rm> <user-id> [list-id | name]"),
    }
}
