//! `operations` command: the facade's operation table.

use clap::Args;
use gyrograph_core::Operation;
use serde::Serialize;
use tracing::debug;

use super::fail;
use super::output::{render_json, OutputFormat};

#[derive(Args, Debug)]
pub struct OperationsArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct OperationInfo {
    pub name: &'static str,
    pub signature: &'static str,
}

pub fn operation_table() -> Vec<OperationInfo> {
    Operation::ALL
        .into_iter()
        .map(|op| OperationInfo {
            name: op.name(),
            signature: op.signature(),
        })
        .collect()
}

pub fn operations_command(args: OperationsArgs) -> i32 {
    debug!("operations_command: args={:?}", args);
    let table = operation_table();
    match args.format {
        OutputFormat::Text => {
            for info in &table {
                println!("{}", info.signature);
            }
            0
        }
        format => match render_json(&table, format) {
            Ok(rendered) => {
                println!("{rendered}");
                0
            }
            Err(e) => fail(&anyhow::Error::new(e)),
        },
    }
}
