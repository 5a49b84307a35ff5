//! Implementation of the `kiln list` command.

use kiln_adapters::units;
use kiln_core::domain::UnitInfo;

use crate::{
    cli::{ListArgs, ListFormat},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, output: OutputManager) -> CliResult<()> {
    let infos: Vec<UnitInfo> = units::catalog().iter().map(|unit| unit.info()).collect();

    match args.format {
        ListFormat::Table => {
            output.header("Built-in units:")?;
            let width = infos.iter().map(|i| i.name.len()).max().unwrap_or(0);
            for info in &infos {
                output.print(&format!(
                    "  {:<width$}  {:<7}  {}",
                    info.name, info.version, info.metadata.description
                ))?;
                if !info.dependencies.is_empty() {
                    output.detail(&format!(
                        "  {:<width$}  after: {}",
                        "",
                        info.dependencies.join(", ")
                    ))?;
                }
            }
        }
        ListFormat::List => {
            for info in &infos {
                output.print(&info.name)?;
            }
        }
        ListFormat::Json => output.json(&infos)?,
    }

    Ok(())
}
