//! # mixed_lanes
//!
//! Two lanes over different input types feeding one output type, plus a
//! post-conversion, and what happens when a converter drops a result.
//!
//! Run with:
//! ```sh
//! cargo run --bin mixed_lanes
//! ```

use std::fmt;

use anyhow::Result;
use funnel_core::{Funnel, FunnelError};
use funnel_observability::{init_tracing, LogConfig};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s:?}"),
        }
    }
}

fn doubled(xs: &[i64]) -> Vec<i64> {
    xs.iter().map(|x| x * 2).collect()
}

fn stringified(xs: &[i64]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

fn render(values: &[Value]) -> String {
    let parts: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn merge() -> Result<Vec<Value>, FunnelError> {
    let funnel = Funnel::new();
    let a = funnel.through(doubled);
    let b = funnel.through(stringified);

    a.accept(1);
    funnel.add(Value::Text("x".into()));
    b.accept(2);
    a.accept(3);
    b.accept_with(4, |v| match v {
        Value::Text(s) => Value::Text(format!("{s}!")),
        other => other,
    });

    funnel.run()
}

fn lossy() -> Result<Vec<Value>, FunnelError> {
    let funnel = Funnel::new();
    let dropping = funnel.through(|xs: &[i64]| doubled(&xs[1..]));
    funnel.add(Value::Int(0));
    dropping.accept(10);
    dropping.accept(20);
    funnel.run()
}

fn main() -> Result<()> {
    init_tracing(&LogConfig::from_env("FUNNEL_LOG_CONFIG")?)?;

    let merged = merge()?;
    println!("✓ Merged output: {}", render(&merged));

    match lossy() {
        Ok(values) => println!("✗ Unexpectedly succeeded: {}", render(&values)),
        Err(e) => {
            error!("lossy converter rejected: {e}");
            info!("failing lane: {:?}", e.lane());
            println!("✓ Lossy converter rejected: {e}");
        }
    }
    Ok(())
}
