//! Tests for the recursive decomposition driver.
mod common;
use common::*;
use kumitate::decompose::FunctionRegistry;
use kumitate::prelude::*;
use tokio_test::block_on;

fn user_route() -> RouteSpec {
    RouteSpec::new("Get User", "get_user").with_description("Fetch a user")
}

/// `get_user_request` calls `load_user` and `format_user`; `load_user` also calls
/// `format_user`.
fn user_oracle() -> ScriptedOracle {
    ScriptedOracle::new()
        .with_function(
            "get_user_request",
            definition_json(
                "get_user_request",
                "def get_user_request(user_id: int) -> dict:",
                &[
                    ("load_user", "def load_user(user_id: int) -> dict:"),
                    ("format_user", "def format_user(user: dict) -> dict:"),
                ],
            ),
        )
        .with_function(
            "load_user",
            definition_json(
                "load_user",
                "def load_user(user_id: int) -> dict:",
                &[("format_user", "def format_user(user: dict) -> dict:")],
            ),
        )
        .with_function(
            "format_user",
            definition_json("format_user", "def format_user(user: dict) -> dict:", &[]),
        )
}

#[test]
fn test_develop_route_materializes_children_depth_first() {
    let oracle = user_oracle();
    let decomposition = block_on(Decomposer::new(&oracle).develop_route(&user_route(), "GET /users/{id}"))
        .expect("decomposition failed");

    let names: Vec<&str> = decomposition
        .functions
        .iter()
        .map(|f| f.definition.function_name.as_str())
        .collect();
    assert_eq!(names, vec!["get_user_request", "load_user", "format_user"]);
    assert_eq!(decomposition.root.function_name, "get_user_request");

    let format_user = decomposition.get("format_user").unwrap();
    assert_eq!(format_user.depth, 2);
    assert_eq!(format_user.parent.as_deref(), Some("load_user"));
    assert!(decomposition.pruned.is_empty());
}

#[test]
fn test_registered_functions_are_linked_not_regenerated() {
    let oracle = user_oracle();
    block_on(Decomposer::new(&oracle).develop_route(&user_route(), "")).unwrap();

    let requested: Vec<String> = oracle
        .requests()
        .into_iter()
        .map(|r| r.function_name)
        .collect();
    assert_eq!(requested, vec!["get_user_request", "load_user", "format_user"]);
}

#[test]
fn test_oracle_receives_route_context() {
    let oracle = user_oracle();
    block_on(Decomposer::new(&oracle).develop_route(&user_route(), "GET /users/{id}")).unwrap();
    let requests = oracle.requests();

    let root = &requests[0];
    assert_eq!(root.description, "Fetch a user");
    assert!(root.provided_functions.is_empty());
    assert_eq!(root.route_context, "GET /users/{id}");

    let child = &requests[1];
    assert_eq!(
        child.description,
        "def load_user(user_id: int) -> dict:\n\nHigh-level Goal: Fetch a user"
    );
    assert_eq!(
        child.provided_functions,
        vec!["def get_user_request(user_id: int) -> dict:"]
    );

    let grandchild = &requests[2];
    assert_eq!(grandchild.provided_functions.len(), 2);
}

#[test]
fn test_registry_does_not_leak_between_routes() {
    let oracle = user_oracle();
    let decomposer = Decomposer::new(&oracle);
    block_on(decomposer.develop_route(&user_route(), "")).unwrap();
    block_on(decomposer.develop_route(&user_route(), "")).unwrap();

    let requests = oracle.requests();
    assert_eq!(requests.len(), 6);
    assert!(requests[3].provided_functions.is_empty());
}

#[test]
fn test_depth_ceiling_aborts_route() {
    let oracle = EndlessOracle::default();
    let route = RouteSpec::new("Spiral", "spiral");
    let result = block_on(Decomposer::new(&oracle).with_depth_limit(3).develop_route(&route, ""));

    match result {
        Err(DecompositionError::RecursionLimitExceeded { function, depth, limit }) => {
            assert_eq!(function, "spiral_request_x_x_x_x");
            assert_eq!(depth, 4);
            assert_eq!(limit, 3);
        }
        other => panic!("expected RecursionLimitExceeded, got {:?}", other),
    }
    // Depths 0 through 3 were generated; depth 4 never reached the oracle.
    assert_eq!(oracle.calls(), 4);
}

#[test]
fn test_prune_branch_keeps_sibling_work() {
    let oracle = EndlessOracle::default();
    let route = RouteSpec::new("Spiral", "spiral");
    let decomposition = block_on(
        Decomposer::new(&oracle)
            .with_depth_limit(3)
            .with_policy(BranchFailurePolicy::PruneBranch)
            .develop_route(&route, ""),
    )
    .unwrap();

    assert_eq!(decomposition.len(), 4);
    assert_eq!(decomposition.pruned.len(), 1);
    let pruned = &decomposition.pruned[0].function_name;
    assert_eq!(pruned, "spiral_request_x_x_x_x");
    assert!(decomposition.get(pruned).is_none());
}

#[test]
fn test_invalid_oracle_output_is_reported() {
    let oracle = ScriptedOracle::new().with_function("get_user_request", r#"{"function_name": 3}"#);
    let result = block_on(Decomposer::new(&oracle).develop_route(&user_route(), ""));
    assert!(matches!(
        result,
        Err(DecompositionError::OracleOutputInvalid { function, .. }) if function == "get_user_request"
    ));
}

#[test]
fn test_oracle_failure_aborts_even_when_pruning() {
    let oracle = ScriptedOracle::new().with_function(
        "get_user_request",
        definition_json("get_user_request", "def get_user_request():", &[("unknown", "def unknown():")]),
    );
    let result = block_on(
        Decomposer::new(&oracle)
            .with_policy(BranchFailurePolicy::PruneBranch)
            .develop_route(&user_route(), ""),
    );
    assert!(matches!(result, Err(DecompositionError::Oracle { function, .. }) if function == "unknown"));
}

#[test]
fn test_from_oracle_json_rejects_unnamed_child() {
    let json = r#"{"function_name": "f", "template": "def f():", "child_functions": [{"function_name": " "}]}"#;
    let result = FunctionDefinition::from_oracle_json("f", json);
    assert!(matches!(result, Err(DecompositionError::OracleOutputInvalid { .. })));
}

#[test]
fn test_registry_excludes_target_from_provided_templates() {
    let mut registry = FunctionRegistry::new();
    for name in ["a", "b"] {
        let registered = registry.register(MaterializedFunction {
            definition: FunctionDefinition::new(name, format!("def {}():", name)),
            depth: 0,
            parent: None,
        });
        assert!(registered);
    }
    let duplicate = registry.register(MaterializedFunction {
        definition: FunctionDefinition::new("a", "def a(x):"),
        depth: 1,
        parent: Some("b".to_string()),
    });

    assert!(!duplicate);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.provided_templates("a"), vec!["def b():"]);
    assert_eq!(registry.get("a").unwrap().definition.template, "def a():");
}
