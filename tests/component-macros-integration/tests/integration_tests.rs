//! 约定注册集成测试

use component_macros::{component, Injectable};
use component_macros_integration_tests::{IAlphaService, IAuditable, IBetaService, IGammaService, IStartupLog};
use di_abstractions::{this_assembly, Assembly, ResolverExt, ServiceRegistration, Startable};
use di_impl::ServiceRegistrationImpl;
use ioc_common::{BoxError, DependencyResult};
use ioc_composition::{IocBuilder, Module, UseIocManager};
use std::sync::{Arc, Mutex};

#[derive(Injectable)]
#[component(transient, services(dyn IAlphaService))]
pub struct AlphaService;

impl IAlphaService for AlphaService {
    fn kind(&self) -> &'static str {
        "alpha"
    }
}

#[derive(Injectable)]
#[component(transient, services(dyn IBetaService))]
pub struct BetaService {
    alpha: Arc<dyn IAlphaService>,
}

impl IBetaService for BetaService {
    fn kind(&self) -> &'static str {
        self.alpha.kind()
    }
}

#[derive(Injectable)]
#[component(transient, services(dyn IGammaService, dyn IAuditable))]
pub struct GammaService;

impl IGammaService for GammaService {
    fn kind(&self) -> &'static str {
        "gamma"
    }
}

impl IAuditable for GammaService {
    fn audit_key(&self) -> String {
        "gamma".to_string()
    }
}

#[derive(Injectable)]
#[component(singleton, startable)]
pub struct StartupProbe {
    log: Arc<dyn IStartupLog>,
}

impl Startable for StartupProbe {
    fn start(&self) -> Result<(), BoxError> {
        self.log.record("probe started");
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStartupLog {
    entries: Mutex<Vec<String>>,
}

impl IStartupLog for MemoryStartupLog {
    fn record(&self, entry: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.to_string());
        }
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|entries| entries.clone()).unwrap_or_default()
    }
}

/// 通过约定注册当前 crate 的全部组件
#[derive(Default)]
struct ConventionModule;

impl Module for ConventionModule {
    fn register(&self, builder: ioc_composition::IocBuilder) -> DependencyResult<IocBuilder> {
        builder.register_services(|r| {
            r.register_assembly_by_convention(&this_assembly!())?;
            Ok(())
        })
    }
}

fn startup_log() -> Arc<MemoryStartupLog> {
    Arc::new(MemoryStartupLog::default())
}

#[test]
fn test_assembly_catalog_collects_components() {
    let assembly = Assembly::of_crate(env!("CARGO_PKG_NAME"));

    let names: Vec<_> = assembly
        .components()
        .iter()
        .map(|component| component.implementation().short_name())
        .collect();
    assert_eq!(names, vec!["AlphaService", "BetaService", "GammaService", "StartupProbe"]);
    assert_eq!(this_assembly!().len(), 4);
}

#[test]
fn test_convention_scan_resolves_default_interfaces() {
    let log = startup_log();
    let mut registration = ServiceRegistrationImpl::new();
    registration
        .register_instance::<dyn IStartupLog>(log.clone(), false)
        .unwrap()
        .register_assembly_by_convention(&this_assembly!())
        .unwrap();
    let root = registration.create_resolver().unwrap();

    assert_eq!(root.resolve::<dyn IAlphaService>().unwrap().kind(), "alpha");
    assert_eq!(root.resolve::<dyn IBetaService>().unwrap().kind(), "alpha");
    assert_eq!(root.resolve::<dyn IGammaService>().unwrap().kind(), "gamma");
    assert!(!root.is_registered::<dyn IAuditable>());
    assert!(root.is_registered::<GammaService>());

    let first = root.resolve::<dyn IAlphaService>().unwrap();
    let second = root.resolve::<dyn IAlphaService>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));

    assert_eq!(log.entries(), vec!["probe started"]);
}

#[test]
fn test_convention_module_through_builder() {
    let log = startup_log();
    let registered: Arc<dyn IStartupLog> = log.clone();
    let manager = IocBuilder::new()
        .register_services(move |r| {
            r.register_instance::<dyn IStartupLog>(registered, false)?;
            Ok(())
        })
        .unwrap()
        .register_module::<ConventionModule>()
        .unwrap()
        .create_resolver()
        .unwrap()
        .use_ioc_manager();

    let probe = manager.resolve::<StartupProbe>().unwrap();
    assert!(Arc::ptr_eq(&probe, &manager.resolve::<StartupProbe>().unwrap()));
    assert_eq!(manager.resolve::<dyn IBetaService>().unwrap().kind(), "alpha");
    assert_eq!(log.entries(), vec!["probe started"]);

    manager.dispose().unwrap();
    assert!(manager.resolve::<dyn IAlphaService>().err().unwrap().is_disposed());
}

#[test]
fn test_conventional_event_reports_assembly() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let mut registration = ServiceRegistrationImpl::new();
    registration.on_conventional_registering(move |args| {
        if let Ok(mut seen) = recorder.lock() {
            seen.push((args.assembly.clone(), args.component_count));
        }
        Ok(())
    });
    registration
        .register_instance::<dyn IStartupLog>(startup_log(), false)
        .unwrap()
        .register_assembly_by_convention(&this_assembly!())
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(env!("CARGO_PKG_NAME").to_string(), 4)]
    );
    assert_eq!(registration.registration_count(), 5);
}
