//! Manifest-driven passes writing to a directory sink.

use std::fs;
use std::path::{Path, PathBuf};

use strongid_codegen::prelude::*;
use strongid_symbols::{InMemoryCompilation, parse_manifest};
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/compilation.toml")
}

fn load() -> (InMemoryCompilation, BuildProperties) {
    let mut manifest = parse_manifest(fixture()).unwrap();
    let properties = BuildProperties::from(std::mem::take(&mut manifest.build_properties));
    (manifest.into_compilation(), properties)
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test_log::test]
fn test_fixture_wiring_pass_writes_files() {
    let (compilation, properties) = load();
    let context = GeneratorContext::new(&compilation, &properties);
    let temp_dir = TempDir::new().unwrap();
    let mut sink = DirectorySink::create(temp_dir.path()).unwrap();

    let outcome = run_generator(&ContextWiringGenerator::default(), &context, &mut sink).unwrap();
    assert_eq!(outcome, PassOutcome::Completed { artifacts: 4 });
    assert_eq!(
        file_names(temp_dir.path()),
        vec![
            "Acme.Orders.Domain.OrderIdValueConverters.g.cs",
            "Acme.Orders.Domain.UserIdValueConverters.g.cs",
            "Acme.Shared.Domain.Tenancy.TenantIdValueConverters.g.cs",
            "OrdersDbContextValueConverterConfigure.g.cs",
        ]
    );

    let order_converter =
        fs::read_to_string(temp_dir.path().join("Acme.Orders.Domain.OrderIdValueConverters.g.cs")).unwrap();
    assert!(order_converter.contains("ValueConverter<Acme.Orders.Domain.OrderId, Guid>"));
    assert!(order_converter.contains("base(p => p.Value, p => new Acme.Orders.Domain.OrderId(p))"));

    let wiring = fs::read_to_string(temp_dir.path().join("OrdersDbContextValueConverterConfigure.g.cs")).unwrap();
    let registrations: Vec<&str> = wiring.lines().filter(|l| l.contains("HaveConversion")).collect();
    assert_eq!(registrations.len(), 3);
    assert!(registrations[0].contains("global::Acme.Orders.Domain.UserId"));
    assert!(registrations[1].contains("global::Acme.Orders.Domain.OrderId"));
    assert!(registrations[2].contains("global::Acme.Shared.Domain.Tenancy.ValueConverters.TenantIdValueConverter"));
    assert!(!wiring.contains("InvoiceId"));
}

#[test]
fn test_fixture_both_generators_share_a_sink() {
    let (compilation, properties) = load();
    let context = GeneratorContext::new(&compilation, &properties);
    let mut sink = MemorySink::new();

    let config = GeneratorConfig::builder()
        .statement_order(StatementOrder::ByName)
        .build();
    run_generator(&ContextWiringGenerator::new(config.clone()), &context, &mut sink).unwrap();
    let outcome = run_generator(&ValueConverterGenerator::new(config), &context, &mut sink).unwrap();

    assert_eq!(outcome, PassOutcome::Completed { artifacts: 3 });
    assert_eq!(sink.len(), 7);
    assert_eq!(
        &sink.hint_names()[4..],
        &[
            "OrderIdValueConverter.g.cs",
            "TenantIdValueConverter.g.cs",
            "UserIdValueConverter.g.cs"
        ]
    );

    let tenant = &sink.get("TenantIdValueConverter.g.cs").unwrap().text;
    assert!(tenant.contains("using Acme.Shared.Domain.Tenancy;"));
    assert!(tenant.contains("namespace Acme.Orders.Web.ValueConverters"));
}

#[test]
fn test_rerun_is_byte_identical() {
    let (compilation, properties) = load();
    let context = GeneratorContext::new(&compilation, &properties);

    let mut first = MemorySink::new();
    let mut second = MemorySink::new();
    run_generator(&ContextWiringGenerator::default(), &context, &mut first).unwrap();
    run_generator(&ContextWiringGenerator::default(), &context, &mut second).unwrap();
    assert_eq!(first.into_artifacts(), second.into_artifacts());
}

#[test]
fn test_generator_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("strongid.toml");
    fs::write(
        &path,
        r#"
        context_bases = ["AppIdentityDbContextBase"]
        violation_policy = "abort_pass"
        "#,
    )
    .unwrap();

    let config = GeneratorConfig::load(&path).unwrap();
    assert_eq!(config.violation_policy, ViolationPolicy::AbortPass);
    let (compilation, properties) = load();
    let context = GeneratorContext::new(&compilation, &properties);
    let mut sink = MemorySink::new();

    // No unit mentions the only recognized base.
    let outcome = run_generator(&ContextWiringGenerator::new(config), &context, &mut sink).unwrap();
    assert_eq!(outcome, PassOutcome::Completed { artifacts: 0 });
    assert!(sink.is_empty());
}

#[test]
fn test_missing_manifest_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(parse_manifest(temp_dir.path().join("absent.toml")).is_err());
}
