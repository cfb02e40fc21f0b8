use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, Write};

pub const SCHEMA_VERSION: &str = "evscrape.v1";

#[derive(Serialize, Default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

pub fn envelope<T: Serialize>(op: &str, result: &T, meta: Option<Meta>) -> Result<Value> {
    Ok(json!({
        "schema_version": SCHEMA_VERSION,
        "time": Utc::now(),
        "op": op,
        "result": serde_json::to_value(result)?,
        "meta": meta,
    }))
}

pub fn print_result<T: Serialize>(op: &str, result: &T, meta: Option<Meta>) -> Result<()> {
    let env = envelope(op, result, meta)?;
    let mut out = io::stdout();
    serde_json::to_writer(&mut out, &env)?;
    writeln!(&mut out)?;
    Ok(())
}
