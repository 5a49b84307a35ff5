//! Implementation of the `kiln new` command.
//!
//! Responsibility: turn CLI arguments and configured defaults into a
//! `ConfigRecord`, hand the selected units to the plugin manager, and display
//! the result. No generation logic lives here.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use kiln_adapters::{LocalFilesystem, MiniJinjaRenderer, units};
use kiln_core::{
    application::{FileMaterializer, GenerationReport, PlannedUnit, PluginManager, WrittenFile},
    domain::{Backend, ConfigRecord, Database, UiFramework},
};

use crate::{
    cli::NewArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Execute the `kiln new` command.
///
/// Dispatch sequence:
/// 1. Validate the project name
/// 2. Build the record from flags, then config, then built-in defaults
/// 3. Refuse an existing project directory unless `--force`
/// 4. Register the selected built-in units
/// 5. `--dry-run`: print the plan; otherwise run the pipeline
#[instrument(skip_all, fields(project = %args.name))]
pub fn execute(args: NewArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    validate_project_name(&args.name)?;

    let record = Arc::new(build_record(&args, &config, Local::now())?);
    let base_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.defaults.output_dir.clone());

    debug!(
        backend = %record.backend(),
        database = %record.database(),
        ui = %record.ui(),
        fingerprint = record.fingerprint(),
        "Record resolved"
    );

    let project_path = base_dir.join(record.project_dir());
    let exists = project_path
        .try_exists()
        .with_cli_context(|| format!("checking {}", project_path.display()))?;
    if exists && !args.force && !args.dry_run {
        return Err(CliError::ProjectExists { path: project_path });
    }

    let filesystem = Arc::new(LocalFilesystem::new());
    let materializer = FileMaterializer::new(&base_dir, &record, filesystem);
    let mut manager = PluginManager::new(
        Arc::clone(&record),
        Box::new(MiniJinjaRenderer::new()),
        materializer,
    );
    manager.register_all(units::select(&record))?;

    if args.dry_run {
        let plan = manager.plan()?;
        let order = manager.resolved_order().unwrap_or_default();
        return show_plan(&plan, order, manager.root(), &output);
    }

    if !output.is_json() {
        output.header(&format!("Generating '{}'...", record.app_name()))?;
    }
    info!(path = %project_path.display(), "Generation started");

    let report = manager.run()?;
    show_report(&report, &output)
}

// ── Validation ────────────────────────────────────────────────────────────────

fn validate_project_name(name: &str) -> CliResult<()> {
    let reason = if name.trim().is_empty() {
        Some("name cannot be empty")
    } else if name.starts_with('.') {
        Some("name cannot start with '.'")
    } else if name.contains(['/', '\\']) {
        Some("name cannot contain path separators")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        Some("name may only contain letters, digits, '-' and '_'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CliError::InvalidProjectName {
            name: name.into(),
            reason: reason.into(),
        }),
        None => Ok(()),
    }
}

// ── Record construction ───────────────────────────────────────────────────────

/// Merge flags over configured defaults. `now` supplies the year and the
/// migration timestamp.
fn build_record(
    args: &NewArgs,
    config: &AppConfig,
    now: DateTime<Local>,
) -> CliResult<ConfigRecord> {
    let defaults = &config.defaults;

    let backend = match args.backend {
        Some(arg) => arg.into(),
        None => from_config::<Backend>("defaults.backend", &defaults.backend)?,
    };
    let database = match args.database {
        Some(arg) => arg.into(),
        None => from_config::<Database>("defaults.database", &defaults.database)?,
    };
    let ui = match args.ui {
        Some(arg) => arg.into(),
        None => from_config::<UiFramework>("defaults.ui", &defaults.ui)?,
    };

    let mut builder = ConfigRecord::builder()
        .app_name(&args.name)
        .backend(backend)
        .database(database)
        .ui(ui)
        .port(args.port.unwrap_or(defaults.port))
        .docker(args.docker)
        .events(args.events)
        .year(now.year())
        .timestamp(now.format("%Y%m%d%H%M%S").to_string())
        .fingerprint(
            args.fingerprint
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        );

    if let Some(module) = &args.module {
        builder = builder.module_path(module);
    }
    if let Some(description) = &args.description {
        builder = builder.description(description);
    }
    if let Some(author) = args.author.as_ref().or(defaults.author.as_ref()) {
        builder = builder.author(author);
    }

    builder.build().map_err(|e| CliError::InvalidInput {
        message: e.to_string(),
        source: Some(Box::new(e)),
    })
}

fn from_config<T>(key: &str, value: &str) -> CliResult<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e: T::Err| CliError::ConfigError {
        message: format!("{key}: {e}"),
        source: Some(Box::new(e)),
    })
}

// ── Presentation ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PlanEntry<'a> {
    unit: &'a str,
    files: Vec<String>,
}

#[derive(Serialize)]
struct Summary<'a> {
    root: &'a Path,
    order: &'a [String],
    files: &'a [WrittenFile],
    warnings: Vec<String>,
}

fn show_plan(
    plan: &[PlannedUnit],
    order: &[String],
    project_path: &Path,
    output: &OutputManager,
) -> CliResult<()> {
    if output.is_json() {
        let entries: Vec<PlanEntry<'_>> = plan
            .iter()
            .map(|unit| PlanEntry {
                unit: &unit.name,
                files: unit.files.iter().map(ToString::to_string).collect(),
            })
            .collect();
        return output.json(&entries);
    }

    let total: usize = plan.iter().map(|unit| unit.files.len()).sum();
    output.info(&format!(
        "Dry run: would write {total} files to {}",
        project_path.display()
    ))?;
    output.detail(&format!("Order: {}", order.join(" -> ")))?;
    for unit in plan {
        output.header(&format!("  {}", unit.name))?;
        for file in &unit.files {
            output.detail(&format!("    {file}"))?;
        }
    }
    Ok(())
}

fn show_report(report: &GenerationReport, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(&Summary {
            root: &report.root,
            order: &report.order,
            files: &report.files,
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        });
    }

    for warning in &report.warnings {
        output.warning(&warning.to_string())?;
    }
    output.success(&format!(
        "Generated {} files in {}",
        report.files.len(),
        report.root.display()
    ))?;

    output.print("")?;
    output.print("Next steps:")?;
    output.print(&format!("  cd {}", display_dir(&report.root).display()))?;
    output.print("  go mod tidy")?;
    output.print("  make run")?;
    Ok(())
}

/// Strip a leading `./` so the hint reads naturally.
fn display_dir(path: &Path) -> PathBuf {
    path.strip_prefix(".")
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{BackendArg, Cli, Commands};
    use chrono::TimeZone;
    use clap::Parser;

    fn args(extra: &[&str]) -> NewArgs {
        let argv = ["kiln", "new"].into_iter().chain(extra.iter().copied());
        match Cli::parse_from(argv).command {
            Commands::New(args) => args,
            other => panic!("expected New command, got {other:?}"),
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
    }

    // ── validate_project_name ─────────────────────────────────────────────────

    #[test]
    fn invalid_names_are_rejected() {
        for name in ["", "  ", ".hidden", "a/b", "a\\b", "my app", "café"] {
            assert!(
                matches!(
                    validate_project_name(name),
                    Err(CliError::InvalidProjectName { .. })
                ),
                "accepted: {name:?}"
            );
        }
    }

    #[test]
    fn valid_names_pass() {
        for name in ["shop", "order-service", "billing_api", "MyApp", "v2"] {
            assert!(validate_project_name(name).is_ok(), "failed for: {name}");
        }
    }

    // ── build_record ──────────────────────────────────────────────────────────

    #[test]
    fn flags_win_over_config() {
        let mut config = AppConfig::default();
        config.defaults.backend = "echo".into();
        config.defaults.port = 9000;

        let record = build_record(
            &args(&["shop", "--backend", "gin", "--port", "3000"]),
            &config,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(record.backend(), Backend::Gin);
        assert_eq!(record.port(), 3000);
    }

    #[test]
    fn config_fills_missing_flags() {
        let mut config = AppConfig::default();
        config.defaults.backend = "fiber".into();
        config.defaults.database = "sqlite".into();
        config.defaults.author = Some("Ada".into());

        let record = build_record(&args(&["shop"]), &config, fixed_now()).unwrap();
        assert_eq!(record.backend(), Backend::Fiber);
        assert_eq!(record.database(), Database::Sqlite);
        assert_eq!(record.ui(), UiFramework::None);
        assert_eq!(record.author(), "Ada");
    }

    #[test]
    fn clock_supplies_year_and_timestamp() {
        let record = build_record(&args(&["shop"]), &AppConfig::default(), fixed_now()).unwrap();
        assert_eq!(record.year(), 2026);
        assert_eq!(record.timestamp(), "20260304050607");
    }

    #[test]
    fn fingerprint_is_random_unless_given() {
        let config = AppConfig::default();
        let a = build_record(&args(&["shop"]), &config, fixed_now()).unwrap();
        let b = build_record(&args(&["shop"]), &config, fixed_now()).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());

        let fixed = build_record(
            &args(&["shop", "--fingerprint", "build-42"]),
            &config,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(fixed.fingerprint(), "build-42");
    }

    #[test]
    fn bad_config_value_is_a_configuration_error() {
        let mut config = AppConfig::default();
        config.defaults.ui = "angular".into();

        let err = build_record(&args(&["shop"]), &config, fixed_now()).unwrap_err();
        assert!(matches!(err, CliError::ConfigError { ref message, .. } if message.starts_with("defaults.ui")));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn flag_overrides_bad_config_value() {
        let mut config = AppConfig::default();
        config.defaults.backend = "rails".into();

        let record =
            build_record(&args(&["shop", "-b", "std"]), &config, fixed_now()).unwrap();
        assert_eq!(record.backend(), Backend::from(BackendArg::Std));
    }

    #[test]
    fn invalid_module_path_is_user_error() {
        let err = build_record(
            &args(&["shop", "--module", "has space"]),
            &AppConfig::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn display_dir_drops_current_dir_prefix() {
        assert_eq!(display_dir(Path::new("./shop")), PathBuf::from("shop"));
        assert_eq!(display_dir(Path::new("/srv/shop")), PathBuf::from("/srv/shop"));
    }
}
