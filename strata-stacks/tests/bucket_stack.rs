use strata_core::error::DefinitionError;
use strata_core::output::Resolution;
use strata_core::resource::Value;
use strata_stacks::{Stack, StackConfig, bucket, preview_registry};

#[test]
fn exports_bucket_name() {
    let mut registry = preview_registry();
    let bucket = bucket::define(&mut registry, &StackConfig::new("simple", "dev")).unwrap();

    let exported = registry.export_named("bucketName").unwrap();
    assert!(exported.resolution().is_pending());
    assert_eq!(format!("{:?}", exported), "Output(<pending>)");

    registry
        .resolve(bucket.resource.id(), "id", "my-bucket-2c3b1a9")
        .unwrap();
    assert_eq!(
        exported.resolution(),
        Resolution::Ready(Value::from("my-bucket-2c3b1a9"))
    );
}

#[test]
fn private_unless_justified() {
    let mut registry = preview_registry();
    let bucket = bucket::define(&mut registry, &StackConfig::new("simple", "dev")).unwrap();
    let entry = registry.entry(bucket.resource.id()).unwrap();
    assert_eq!(entry.resource.attributes["acl"].as_str(), Some("private"));

    let mut config = StackConfig::new("simple", "dev");
    config.bucket.acl = "public-read".to_string();
    let err = bucket::define(&mut preview_registry(), &config).unwrap_err();
    assert!(matches!(err, DefinitionError::Configuration(_)));

    config.bucket.justification = Some("public website assets".to_string());
    let mut registry = preview_registry();
    let bucket = bucket::define(&mut registry, &config).unwrap();
    let entry = registry.entry(bucket.resource.id()).unwrap();
    assert_eq!(entry.resource.attributes["acl"].as_str(), Some("public-read"));
}

#[test]
fn stacks_are_independent() {
    let mut registry = preview_registry();
    Stack::Bucket
        .define(&mut registry, &StackConfig::new("simple", "dev"))
        .unwrap();
    assert_eq!(registry.entries().len(), 1);
    assert_eq!(Stack::Bucket.name(), "bucket");
    assert_eq!(Stack::Cluster.name(), "cluster");
}
