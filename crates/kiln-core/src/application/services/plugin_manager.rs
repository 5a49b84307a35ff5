//! Plugin manager - sequences generation units through their lifecycle.
//!
//! ```text
//! register* → resolve_order → init_all → execute_all → shutdown_all
//! ```
//!
//! Forward passes (`init_all`, `execute_all`) follow the resolved order and
//! stop at the first failure. `shutdown_all` walks the reverse order and
//! attempts every unit regardless of earlier failures. Nothing is rolled
//! back: files written before a failure stay on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{
    ApplicationError,
    ports::TemplateRenderer,
    services::materializer::{FileMaterializer, WrittenFile},
    unit::{ExecutionContext, GenerationUnit},
};
use crate::domain::{
    ConfigRecord, DependencyGraph, DomainError, Phase, RelativePath, Stage, UnitInfo,
};
use crate::error::{KilnError, KilnResult};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub root: PathBuf,
    pub order: Vec<String>,
    pub files: Vec<WrittenFile>,
    /// Non-fatal problems (currently only import normalization failures).
    pub warnings: Vec<KilnError>,
}

/// Files a unit would write, computed without touching disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUnit {
    pub name: String,
    pub files: Vec<RelativePath>,
}

/// Registry and lifecycle driver for generation units.
pub struct PluginManager {
    record: Arc<ConfigRecord>,
    renderer: Box<dyn TemplateRenderer>,
    materializer: FileMaterializer,
    units: HashMap<String, Box<dyn GenerationUnit>>,
    registration: Vec<String>,
    resolved: Option<Vec<String>>,
    phase: Phase,
    written: Vec<WrittenFile>,
    warnings: Vec<KilnError>,
}

impl PluginManager {
    pub fn new(
        record: Arc<ConfigRecord>,
        renderer: Box<dyn TemplateRenderer>,
        materializer: FileMaterializer,
    ) -> Self {
        Self {
            record,
            renderer,
            materializer,
            units: HashMap::new(),
            registration: Vec::new(),
            resolved: None,
            phase: Phase::Empty,
            written: Vec::new(),
            warnings: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Add a unit to the registry.
    ///
    /// # Errors
    /// - `DuplicateOrEmptyName` if the name is empty or taken
    /// - `LifecycleViolation` once resolution has happened
    pub fn register(&mut self, unit: Box<dyn GenerationUnit>) -> KilnResult<()> {
        self.expect_phase("register units", |p| {
            matches!(p, Phase::Empty | Phase::Registered)
        })?;

        let name = unit.name().to_string();
        if name.is_empty() || self.units.contains_key(&name) {
            return Err(DomainError::DuplicateOrEmptyName { name }.into());
        }

        debug!(unit = %name, version = unit.version(), "Registered unit");
        self.registration.push(name.clone());
        self.units.insert(name, unit);
        self.phase = Phase::Registered;
        Ok(())
    }

    /// Register several units, stopping at the first error.
    ///
    /// Units registered before the failure stay registered.
    pub fn register_all<I>(&mut self, units: I) -> KilnResult<()>
    where
        I: IntoIterator<Item = Box<dyn GenerationUnit>>,
    {
        for unit in units {
            self.register(unit)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Compute (once) an order where every unit follows its dependencies.
    ///
    /// # Errors
    /// - `UnknownDependency` or `CyclicDependency`; no unit is touched
    pub fn resolve_order(&mut self) -> KilnResult<&[String]> {
        if self.resolved.is_none() {
            self.expect_phase("resolve dependencies", |p| {
                matches!(p, Phase::Empty | Phase::Registered)
            })?;

            let mut graph = DependencyGraph::new();
            for name in &self.registration {
                if let Some(unit) = self.units.get(name) {
                    graph.add(name.clone(), unit.dependencies());
                }
            }

            let order = graph.topological_order()?;
            info!(order = %order.join(" → "), "Resolved unit order");
            self.resolved = Some(order);
            self.phase = Phase::Ordered;
        }

        Ok(self.resolved.as_deref().unwrap_or_default())
    }

    /// Initialize every unit in dependency order.
    #[instrument(skip_all, fields(units = self.units.len()))]
    pub fn init_all(&mut self) -> KilnResult<()> {
        self.expect_phase("initialize units", |p| {
            matches!(p, Phase::Empty | Phase::Registered | Phase::Ordered)
        })?;
        let order = self.resolve_order()?.to_vec();

        for name in &order {
            let unit = self.unit_mut(name)?;
            if let Err(e) = unit.initialize() {
                warn!(unit = %name, error = %e, "Unit failed to initialize");
                self.phase = Phase::Failed(Stage::Initialize);
                return Err(ApplicationError::unit_failed(name, Stage::Initialize, e).into());
            }
            debug!(unit = %name, "Initialized");
        }

        self.phase = Phase::Initialized;
        Ok(())
    }

    /// Execute every unit in dependency order.
    #[instrument(skip_all, fields(root = %self.materializer.root().display()))]
    pub fn execute_all(&mut self) -> KilnResult<()> {
        self.expect_phase("execute units", |p| matches!(p, Phase::Initialized))?;
        let order = self.resolved.clone().unwrap_or_default();

        let mut ctx = ExecutionContext::new(
            &self.record,
            self.renderer.as_ref(),
            &self.materializer,
        );
        let mut failure = None;

        for name in &order {
            let Some(unit) = self.units.get_mut(name) else {
                failure = Some(ApplicationError::UnitNotFound { name: name.clone() });
                break;
            };
            info!(unit = %name, "Executing unit");
            if let Err(e) = unit.execute(&mut ctx) {
                warn!(unit = %name, error = %e, "Unit failed to execute");
                failure = Some(ApplicationError::unit_failed(name, Stage::Execute, e));
                break;
            }
        }

        let (written, warnings) = ctx.into_parts();
        self.written.extend(written);
        self.warnings.extend(warnings);

        match failure {
            Some(err) => {
                self.phase = Phase::Failed(Stage::Execute);
                Err(err.into())
            }
            None => {
                self.phase = Phase::Executed;
                Ok(())
            }
        }
    }

    /// Shut every unit down in reverse dependency order.
    ///
    /// Accepted after a successful or failed forward pass. Every unit is
    /// attempted even if some fail.
    ///
    /// # Errors
    /// - `ShutdownFailed` listing each failing unit
    pub fn shutdown_all(&mut self) -> KilnResult<()> {
        self.expect_phase("shut down units", |p| {
            matches!(p, Phase::Initialized | Phase::Executed | Phase::Failed(_))
        })?;
        let order = self.resolved.clone().unwrap_or_default();

        let mut failures = Vec::new();
        for name in order.iter().rev() {
            match self.units.get_mut(name) {
                Some(unit) => {
                    if let Err(e) = unit.shutdown() {
                        warn!(unit = %name, error = %e, "Unit failed to shut down");
                        failures.push((name.clone(), e));
                    }
                }
                None => failures.push((
                    name.clone(),
                    ApplicationError::UnitNotFound { name: name.clone() }.into(),
                )),
            }
        }

        self.phase = Phase::ShutDown;
        if failures.is_empty() {
            debug!("All units shut down");
            Ok(())
        } else {
            Err(ApplicationError::ShutdownFailed { failures }.into())
        }
    }

    /// Full pipeline: resolve, initialize, execute, shut down.
    ///
    /// If a forward pass fails, shutdown is still attempted for every unit
    /// and the original error is returned.
    #[instrument(skip_all, fields(app = %self.record.app_name()))]
    pub fn run(&mut self) -> KilnResult<GenerationReport> {
        info!(units = self.units.len(), "Starting generation");

        if let Err(e) = self.init_all().and_then(|()| self.execute_all()) {
            self.shutdown_after_failure();
            return Err(e);
        }
        self.shutdown_all()?;

        let report = self.report();
        info!(
            files = report.files.len(),
            warnings = report.warnings.len(),
            "Generation complete"
        );
        Ok(report)
    }

    /// Initialize every unit, collect their file sets, then shut down.
    ///
    /// Nothing is rendered or written.
    pub fn plan(&mut self) -> KilnResult<Vec<PlannedUnit>> {
        if let Err(e) = self.init_all() {
            self.shutdown_after_failure();
            return Err(e);
        }

        let order = self.resolved.clone().unwrap_or_default();
        let planned = order
            .into_iter()
            .filter_map(|name| {
                let files = self.units.get(&name)?.files().paths().cloned().collect();
                Some(PlannedUnit { name, files })
            })
            .collect();

        self.shutdown_all()?;
        Ok(planned)
    }

    fn shutdown_after_failure(&mut self) {
        if !matches!(self.phase, Phase::Failed(_) | Phase::Initialized) {
            return;
        }
        if let Err(e) = self.shutdown_all() {
            warn!(error = %e, "Shutdown after failure was incomplete");
        }
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Unit names in registration order.
    pub fn unit_names(&self) -> Vec<&str> {
        self.registration.iter().map(String::as_str).collect()
    }

    /// The cached resolution, if `resolve_order` has succeeded.
    pub fn resolved_order(&self) -> Option<&[String]> {
        self.resolved.as_deref()
    }

    /// Identity of each registered unit, in registration order.
    pub fn describe(&self) -> Vec<UnitInfo> {
        self.registration
            .iter()
            .filter_map(|name| self.units.get(name))
            .map(|unit| unit.info())
            .collect()
    }

    pub fn root(&self) -> &Path {
        self.materializer.root()
    }

    /// Snapshot of what has been written so far.
    pub fn report(&self) -> GenerationReport {
        GenerationReport {
            root: self.materializer.root().to_path_buf(),
            order: self.resolved.clone().unwrap_or_default(),
            files: self.written.clone(),
            warnings: self.warnings.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn expect_phase(
        &self,
        operation: &'static str,
        allowed: impl Fn(Phase) -> bool,
    ) -> KilnResult<()> {
        if allowed(self.phase) {
            Ok(())
        } else {
            Err(ApplicationError::LifecycleViolation {
                operation,
                actual: self.phase,
            }
            .into())
        }
    }

    fn unit_mut(&mut self, name: &str) -> KilnResult<&mut Box<dyn GenerationUnit>> {
        self.units.get_mut(name).ok_or_else(|| {
            ApplicationError::UnitNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockFilesystem, MockTemplateRenderer};
    use crate::domain::{FileSet, UnitMetadata};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Unit that records every lifecycle call and can be told to fail.
    struct Recording {
        name: String,
        deps: Vec<String>,
        meta: UnitMetadata,
        files: FileSet,
        log: Log,
        fail_on: Option<Stage>,
    }

    impl Recording {
        fn new(name: &str, deps: &[&str], log: &Log) -> Self {
            Self {
                name: name.into(),
                deps: deps.iter().map(|d| (*d).to_string()).collect(),
                meta: UnitMetadata::new(format!("{name} unit")),
                files: FileSet::new(),
                log: Arc::clone(log),
                fail_on: None,
            }
        }

        fn failing(mut self, stage: Stage) -> Self {
            self.fail_on = Some(stage);
            self
        }

        fn boxed(self) -> Box<dyn GenerationUnit> {
            Box::new(self)
        }

        fn step(&self, stage: Stage) -> KilnResult<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", stage, self.name));
            if self.fail_on == Some(stage) {
                return Err(KilnError::Internal {
                    message: format!("{} exploded", self.name),
                });
            }
            Ok(())
        }
    }

    impl GenerationUnit for Recording {
        fn name(&self) -> &str {
            &self.name
        }
        fn version(&self) -> &str {
            "0.1.0"
        }
        fn dependencies(&self) -> &[String] {
            &self.deps
        }
        fn metadata(&self) -> &UnitMetadata {
            &self.meta
        }
        fn files(&self) -> &FileSet {
            &self.files
        }
        fn initialize(&mut self) -> KilnResult<()> {
            self.files.add(format!("{}.txt", self.name), || "x")?;
            self.step(Stage::Initialize)
        }
        fn execute(&mut self, _ctx: &mut ExecutionContext<'_>) -> KilnResult<()> {
            self.step(Stage::Execute)
        }
        fn shutdown(&mut self) -> KilnResult<()> {
            self.files.clear();
            self.step(Stage::Shutdown)
        }
    }

    fn manager() -> PluginManager {
        let record = Arc::new(ConfigRecord::builder().app_name("demo").build().unwrap());
        let materializer =
            FileMaterializer::new("/out", &record, Arc::new(MockFilesystem::new()));
        PluginManager::new(record, Box::new(MockTemplateRenderer::new()), materializer)
    }

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn empty_and_duplicate_names_are_rejected() {
        let log = log();
        let mut pm = manager();
        pm.register(Recording::new("a", &[], &log).boxed()).unwrap();

        let dup = pm.register(Recording::new("a", &[], &log).boxed());
        assert!(matches!(
            dup,
            Err(KilnError::Domain(DomainError::DuplicateOrEmptyName { .. }))
        ));
        let empty = pm.register(Recording::new("", &[], &log).boxed());
        assert!(matches!(
            empty,
            Err(KilnError::Domain(DomainError::DuplicateOrEmptyName { .. }))
        ));
        assert_eq!(pm.len(), 1);
    }

    #[test]
    fn register_all_stops_at_first_error() {
        let log = log();
        let mut pm = manager();
        let result = pm.register_all(vec![
            Recording::new("a", &[], &log).boxed(),
            Recording::new("a", &[], &log).boxed(),
            Recording::new("b", &[], &log).boxed(),
        ]);
        assert!(result.is_err());
        assert_eq!(pm.unit_names(), vec!["a"]);
    }

    #[test]
    fn order_follows_dependencies_and_is_cached() {
        let log = log();
        let mut pm = manager();
        pm.register_all(vec![
            Recording::new("middleware", &["router"], &log).boxed(),
            Recording::new("router", &["config"], &log).boxed(),
            Recording::new("config", &[], &log).boxed(),
        ])
        .unwrap();
        assert!(pm.resolved_order().is_none());

        let first = pm.resolve_order().unwrap().to_vec();
        assert_eq!(first, vec!["config", "router", "middleware"]);
        assert_eq!(pm.resolved_order(), Some(first.as_slice()));
        assert_eq!(pm.phase(), Phase::Ordered);
        assert_eq!(pm.resolve_order().unwrap(), first.as_slice());
        assert_eq!(pm.unit_names(), vec!["middleware", "router", "config"]);
    }

    #[test]
    fn unknown_dependency_fails_before_any_initialize() {
        let log = log();
        let mut pm = manager();
        pm.register(Recording::new("A", &["B"], &log).boxed()).unwrap();

        let err = pm.init_all().unwrap_err();
        assert!(matches!(
            err,
            KilnError::Domain(DomainError::UnknownDependency { ref unit, ref dependency })
                if unit == "A" && dependency == "B"
        ));
        assert!(entries(&log).is_empty());
        assert_eq!(pm.phase(), Phase::Registered);
    }

    #[test]
    fn cycle_is_reported_with_its_path() {
        let log = log();
        let mut pm = manager();
        pm.register_all(vec![
            Recording::new("a", &["b"], &log).boxed(),
            Recording::new("b", &["a"], &log).boxed(),
        ])
        .unwrap();

        let err = pm.run().unwrap_err();
        assert!(err.to_string().contains("a -> b -> a"));
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn init_failure_stops_the_pass() {
        let log = log();
        let mut pm = manager();
        pm.register_all(vec![
            Recording::new("a", &[], &log).boxed(),
            Recording::new("b", &["a"], &log)
                .failing(Stage::Initialize)
                .boxed(),
            Recording::new("c", &["b"], &log).boxed(),
        ])
        .unwrap();

        let err = pm.init_all().unwrap_err();
        assert!(err.to_string().contains("Unit 'b' failed to initialize"));
        assert_eq!(pm.phase(), Phase::Failed(Stage::Initialize));
        assert_eq!(entries(&log), vec!["initialize:a", "initialize:b"]);
    }

    #[test]
    fn shutdown_runs_in_reverse_order() {
        let log = log();
        let mut pm = manager();
        pm.register_all(vec![
            Recording::new("c", &["b"], &log).boxed(),
            Recording::new("b", &["a"], &log).boxed(),
            Recording::new("a", &[], &log).boxed(),
        ])
        .unwrap();

        let report = pm.run().unwrap();
        assert_eq!(report.order, vec!["a", "b", "c"]);
        assert_eq!(pm.phase(), Phase::ShutDown);

        let shutdowns: Vec<_> = entries(&log)
            .into_iter()
            .filter(|e| e.starts_with("shutdown:"))
            .collect();
        assert_eq!(shutdowns, vec!["shutdown:c", "shutdown:b", "shutdown:a"]);
    }

    #[test]
    fn shutdown_is_best_effort() {
        let log = log();
        let mut pm = manager();
        pm.register_all(vec![
            Recording::new("a", &[], &log)
                .failing(Stage::Shutdown)
                .boxed(),
            Recording::new("b", &[], &log).boxed(),
            Recording::new("c", &[], &log)
                .failing(Stage::Shutdown)
                .boxed(),
        ])
        .unwrap();
        pm.init_all().unwrap();
        pm.execute_all().unwrap();

        let err = pm.shutdown_all().unwrap_err();
        match err {
            KilnError::Application(ApplicationError::ShutdownFailed { failures }) => {
                let names: Vec<_> = failures.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["c", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(entries(&log).contains(&"shutdown:b".to_string()));
    }

    #[test]
    fn failing_third_of_five_contains_the_damage() {
        let log = log();
        let mut pm = manager();
        pm.register_all(vec![
            Recording::new("u1", &[], &log).boxed(),
            Recording::new("u2", &["u1"], &log).boxed(),
            Recording::new("u3", &["u2"], &log)
                .failing(Stage::Execute)
                .boxed(),
            Recording::new("u4", &["u3"], &log).boxed(),
            Recording::new("u5", &["u4"], &log).boxed(),
        ])
        .unwrap();

        let err = pm.run().unwrap_err();
        assert!(err.to_string().contains("Unit 'u3' failed to execute"));

        let log = entries(&log);
        assert!(log.contains(&"execute:u2".to_string()));
        assert!(!log.contains(&"execute:u4".to_string()));
        assert!(!log.contains(&"execute:u5".to_string()));
        let shutdowns = log.iter().filter(|e| e.starts_with("shutdown:")).count();
        assert_eq!(shutdowns, 5);
        assert_eq!(pm.phase(), Phase::ShutDown);
    }

    #[test]
    fn calls_out_of_phase_are_rejected() {
        let log = log();
        let mut pm = manager();
        pm.register(Recording::new("a", &[], &log).boxed()).unwrap();

        let err = pm.execute_all().unwrap_err();
        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::LifecycleViolation { .. })
        ));
        assert!(pm.shutdown_all().is_err());

        pm.init_all().unwrap();
        assert!(pm.register(Recording::new("late", &[], &log).boxed()).is_err());
        assert!(pm.init_all().is_err());
    }

    #[test]
    fn plan_lists_files_without_executing() {
        let log = log();
        let mut pm = manager();
        pm.register_all(vec![
            Recording::new("b", &["a"], &log).boxed(),
            Recording::new("a", &[], &log).boxed(),
        ])
        .unwrap();

        let plan = pm.plan().unwrap();
        let names: Vec<_> = plan.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(plan[0].files[0].as_str(), "a.txt");
        assert!(!entries(&log).iter().any(|e| e.starts_with("execute:")));
    }

    #[test]
    fn describe_lists_registered_units() {
        let log = log();
        let mut pm = manager();
        pm.register(Recording::new("router", &["config"], &log).boxed())
            .unwrap();

        let info = pm.describe();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].to_string(), "router@0.1.0");
        assert_eq!(info[0].metadata.description, "router unit");
    }
}
