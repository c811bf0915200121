//! Unit tests for parameter types, manifests, configuration and error messages.
mod common;
use common::*;
use kumitate::compiler::RequirementsManifest;
use kumitate::config::{BranchFailurePolicy, SynthesisConfig};
use kumitate::error::{ConfigError, GraphError, ParamTypeError};
use kumitate::model::{ContainerKind, PackageRef, ParamKey, ParamType, Parameter, PrimitiveType, RouteSpec};

#[test]
fn test_parse_primitive_types() {
    assert_eq!("int".parse::<ParamType>().unwrap(), ParamType::Primitive(PrimitiveType::Int));
    assert_eq!("frozenset".parse::<ParamType>().unwrap(), PrimitiveType::FrozenSet.into());
    assert_eq!(" bytes ".parse::<ParamType>().unwrap(), PrimitiveType::Bytes.into());
}

#[test]
fn test_string_alias_renders_as_str() {
    let parsed: ParamType = "string".parse().unwrap();
    assert_eq!(parsed, ParamType::Primitive(PrimitiveType::Str));
    assert_eq!(parsed.to_string(), "str");
}

#[test]
fn test_parse_container_types() {
    let parsed: ParamType = "list[ int ]".parse().unwrap();
    assert_eq!(
        parsed,
        ParamType::Container {
            kind: ContainerKind::List,
            element: PrimitiveType::Int
        }
    );
    assert_eq!(parsed.to_string(), "list[int]");
    assert_eq!("frozenset[str]".parse::<ParamType>().unwrap().to_string(), "frozenset[str]");
}

#[test]
fn test_reject_invalid_types() {
    assert!(matches!("list[list[int]]".parse::<ParamType>(), Err(ParamTypeError::InvalidElement { .. })));
    assert!(matches!("widget".parse::<ParamType>(), Err(ParamTypeError::Unknown(_))));
    assert!(matches!("dict[str]".parse::<ParamType>(), Err(ParamTypeError::Unknown(_))));
    assert!(matches!("list[int".parse::<ParamType>(), Err(ParamTypeError::Malformed(_))));
}

#[test]
fn test_parameter_deserializes_type_tag() {
    let parameter: Parameter = serde_json::from_str(r#"{"name": "tags", "type": "set[str]"}"#).unwrap();
    assert_eq!(parameter.key().to_string(), "tags: set[str]");

    let invalid = serde_json::from_str::<Parameter>(r#"{"name": "tags", "type": "set[set]x"}"#);
    assert!(invalid.is_err());
}

#[test]
fn test_param_key_distinguishes_types() {
    assert_ne!(param("x", "int").key(), param("x", "float").key());
    assert_eq!(param("x", "str").key(), param("x", "string").key());
}

#[test]
fn test_route_function_name() {
    assert_eq!(RouteSpec::new("Create User", "").function_name(), "create_user_request");
    assert_eq!(RouteSpec::new("Get-All Users/", "").function_name(), "get_all_users_request");
    assert_eq!(RouteSpec::new("  Ping  ", "").function_name(), "ping_request");
}

#[test]
fn test_requirement_lines() {
    assert_eq!(PackageRef::pinned("requests", "2.0", "==").requirement_line(), "requests==2.0");
    assert_eq!(PackageRef::pinned("numpy", "1.26", ">=").requirement_line(), "numpy>=1.26");
    assert_eq!(PackageRef::new("httpx").requirement_line(), "httpx");

    let mut bare_version = PackageRef::new("pydantic");
    bare_version.version = Some("2.5".to_string());
    assert_eq!(bare_version.requirement_line(), "pydantic==2.5");
}

#[test]
fn test_manifest_deduplicates_packages() {
    let packages = [
        PackageRef::pinned("requests", "2.0", "=="),
        PackageRef::new("httpx"),
        PackageRef::pinned("requests", "2.0", "=="),
    ];
    let manifest = RequirementsManifest::from_packages(&packages);
    assert_eq!(manifest.to_string(), "requests==2.0\nhttpx");
    assert!(manifest.conflicts.is_empty());
}

#[test]
fn test_manifest_keeps_first_seen_version_on_conflict() {
    let packages = [
        PackageRef::pinned("requests", "2.0", "=="),
        PackageRef::pinned("requests", "3.0", ">="),
    ];
    let manifest = RequirementsManifest::from_packages(&packages);
    assert_eq!(manifest.lines(), vec!["requests==2.0"]);
    assert_eq!(manifest.conflicts.len(), 1);
    assert_eq!(manifest.conflicts[0].dropped.requirement_line(), "requests>=3.0");
}

#[test]
fn test_config_defaults_and_overrides() {
    let config = SynthesisConfig::default();
    assert_eq!(config.recursion_depth_limit, 3);
    assert_eq!(config.branch_failure_policy, BranchFailurePolicy::AbortRoute);
    assert_eq!(config.style.line_length, 88);

    let config = SynthesisConfig::default()
        .with_overrides(|name| match name {
            "RECURSION_DEPTH_LIMIT" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.recursion_depth_limit, 5);
    assert_eq!(config.style.line_length, 88);
}

#[test]
fn test_config_rejects_invalid_override() {
    let result = SynthesisConfig::default().with_overrides(|name| {
        (name == "KUMITATE_LINE_LENGTH").then(|| "wide".to_string())
    });
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnv { name: "KUMITATE_LINE_LENGTH", .. })
    ));
}

#[test]
fn test_config_parses_partial_json() {
    let config: SynthesisConfig =
        serde_json::from_str(r#"{"branch_failure_policy": "prune_branch", "style": {"line_length": 100}}"#)
            .unwrap();
    assert_eq!(config.branch_failure_policy, BranchFailurePolicy::PruneBranch);
    assert_eq!(config.style.line_length, 100);
    assert_eq!(config.style.indent_width, 4);
    assert!(config.normalize);
}

#[test]
fn test_missing_dependency_message_lists_keys() {
    let error = GraphError::MissingDependency {
        node_id: "summarize".to_string(),
        missing: vec![
            ParamKey { name: "user".to_string(), param_type: PrimitiveType::Dict.into() },
            param("orders", "list[int]").key(),
        ],
    };
    assert_eq!(
        error.to_string(),
        "Node 'summarize' has no provider for input parameter(s): user: dict, orders: list[int]"
    );
}
