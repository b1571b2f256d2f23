//! Service document → resource catalog → template and alias flow.

use super::{env, AUTOSCALE};
use restcli::body::{apply_replacements, read_address, Replacement};
use restcli::config::{parse_service_config, resolve_service};
use restcli::resources::ResourceError;
use serde_json::json;

#[test]
fn test_declaration_order_decides_ownership() {
    let config = parse_service_config(AUTOSCALE).unwrap();
    let catalog = &config.resources;

    assert_eq!(
        catalog.require("groups").unwrap().help.as_deref(),
        Some("Scaling groups")
    );
    assert_eq!(
        catalog.require("GROUPS/").unwrap().help.as_deref(),
        Some("Scaling groups")
    );
    assert_eq!(
        catalog.require("groups/abc/config").unwrap().help.as_deref(),
        Some("Configuration of one scaling group")
    );
    assert_eq!(
        catalog.require("groups/abc").unwrap().help.as_deref(),
        Some("One scaling group")
    );
    assert!(matches!(
        catalog.require("groups/abc/policies"),
        Err(ResourceError::NotMatched { .. })
    ));
}

#[test]
fn test_template_mutated_through_aliases() {
    let config = parse_service_config(AUTOSCALE).unwrap();
    let definition = config.resources.require("groups").unwrap();
    let mut body = config.resources.template("groups", None).unwrap().clone();

    let replacements = vec![
        Replacement::parse("name=prod").unwrap(),
        Replacement::parse("min=3").unwrap(),
        Replacement::parse("server=api-01").unwrap(),
        Replacement::parse("scalingPolicies[0].change=-1").unwrap(),
    ];
    apply_replacements(&mut body, &replacements, definition.aliases()).unwrap();

    assert_eq!(
        read_address(&body, "groupConfiguration.name").unwrap(),
        &json!("prod")
    );
    assert_eq!(
        read_address(&body, "groupConfiguration.minEntities").unwrap(),
        &json!(3)
    );
    assert_eq!(
        read_address(&body, "launchConfiguration.args.server.name").unwrap(),
        &json!("api-01")
    );
    assert_eq!(
        read_address(&body, "scalingPolicies[0].change").unwrap(),
        &json!(-1)
    );

    // the stored template is untouched
    assert_eq!(
        read_address(
            config.resources.template("groups", None).unwrap(),
            "groupConfiguration.name"
        )
        .unwrap(),
        &json!("manitest")
    );
}

#[test]
fn test_same_alias_name_differs_per_resource() {
    let config = parse_service_config(AUTOSCALE).unwrap();
    let group = config.resources.require("groups").unwrap();
    let group_config = config.resources.require("groups/abc/config").unwrap();

    assert_eq!(group.aliases().unwrap()["min"], "groupConfiguration.minEntities");
    assert_eq!(group_config.aliases().unwrap()["min"], "minEntities");
    assert!(config.resources.require("groups/abc").unwrap().aliases().is_none());
}

#[test]
fn test_missing_templates() {
    let config = parse_service_config(AUTOSCALE).unwrap();
    assert!(matches!(
        config.resources.template("groups/abc", None),
        Err(ResourceError::TemplateNotFound { .. })
    ));
    assert!(matches!(
        config.resources.template("groups", Some("large")),
        Err(ResourceError::TemplateNotFound { .. })
    ));
}

#[test]
fn test_help_lines_and_environment_resolution() {
    let config = parse_service_config(AUTOSCALE).unwrap();
    assert_eq!(
        config.resources.help_lines(),
        vec![
            "Scaling groups",
            "Configuration of one scaling group",
            "One scaling group"
        ]
    );

    let vars = env(&[
        ("AS_URI_PREFIX", "https://ord.autoscale.example.com/v1.0/123456/"),
        ("RS_AUTH_TOKEN", "tok"),
    ]);
    let resolved = resolve_service(&config, |name| vars.get(name).cloned());
    assert_eq!(
        resolved.uri_prefix.as_deref(),
        Some("https://ord.autoscale.example.com/v1.0/123456/")
    );
    assert_eq!(resolved.headers["X-Auth-Token"], "tok");
    assert_eq!(resolved.headers["Content-Type"], "application/json");
}
