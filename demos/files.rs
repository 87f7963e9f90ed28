//! Read a handful of files through a chain.
//!
//! Every read is started up front; a bridge per file folds its completion
//! back into the chain, so the contents print in order regardless of which
//! read finishes first. A second chain reads the same files serially with
//! `collect`.
//!
//! Run with `cargo run --example files -- Cargo.toml DESIGN.md`.

use std::rc::Rc;

use jam::prelude::*;
use serde_json::{json, Value};
use tokio::task::LocalSet;

fn read_into(bridge: Bridge, path: String) {
    tokio::task::spawn_local(async move {
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => bridge.ok(vec![json!(text)]),
            Err(err) => bridge.fail(anyhow::Error::new(err).context(path)),
        }
    });
}

fn read_file(next: Next, path: Value, _index: usize) {
    let Some(path) = path.as_str().map(str::to_owned) else {
        return next.fail(anyhow::anyhow!("file name must be a string"));
    };
    tokio::task::spawn_local(async move {
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => next.ok(vec![json!(text.len())]),
            Err(err) => next.fail(anyhow::Error::new(err).context(path)),
        }
    });
}

fn report(done: Rc<tokio::sync::Notify>) -> impl FnOnce(Outcome) + 'static {
    move |outcome| {
        if let Err(fault) = outcome {
            tracing::error!(error = %fault, "chain failed");
        }
        done.notify_one();
    }
}

fn bridged(files: &[String], done: Rc<tokio::sync::Notify>) -> Result<(), ChainError> {
    let chain = Chain::configured(ChainConfig::default().label("bridged"), identity);
    for file in files {
        read_into(chain.bridge()?, file.clone());
        let name = file.clone();
        chain.then(move |next, args| {
            let text = args.first().and_then(Value::as_str).unwrap_or_default();
            println!("FILE: {name} ({} bytes)", text.len());
            next.done()
        })?;
    }
    chain.finally(report(done))?;
    Ok(())
}

fn serial(files: &[String], done: Rc<tokio::sync::Notify>) -> Result<(), ChainError> {
    let names = Value::Array(files.iter().cloned().map(Value::from).collect());
    Chain::configured(ChainConfig::default().label("serial"), inject(vec![names]))
        .push(collect(None, read_file)?)?
        .push(tap(|args| println!("SIZES: {}", Value::Array(args.clone()))))?
        .finally(report(done))?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let files: Vec<String> = std::env::args().skip(1).collect();
    let files = if files.is_empty() {
        vec!["Cargo.toml".to_string()]
    } else {
        files
    };

    LocalSet::new()
        .run_until(async move {
            let done = Rc::new(tokio::sync::Notify::new());
            bridged(&files, done.clone())?;
            done.notified().await;

            serial(&files, done.clone())?;
            done.notified().await;
            Ok::<(), anyhow::Error>(())
        })
        .await
}
