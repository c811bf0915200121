use clap::Parser;
use rand::rngs::ThreadRng;
use rand::{Rng, rng};
use serde_json::{Value, json};
use std::fs;

const TYPES: [&str; 6] = ["int", "float", "str", "bool", "list[int]", "dict"];
const PACKAGES: [(&str, &str); 4] = [
    ("requests", "2.31.0"),
    ("pydantic", "2.5.0"),
    ("numpy", "1.26.0"),
    ("httpx", "0.25.0"),
];

/// A CLI tool to generate synthetic node graphs for the Kumitate compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_graph.json")]
    output: String,

    /// Number of interior nodes
    #[arg(short, long, default_value_t = 8)]
    nodes: usize,

    /// Number of request parameters the start node provides
    #[arg(long, default_value_t = 3)]
    inputs: usize,

    /// Maximum number of upstream values each interior node consumes
    #[arg(long, default_value_t = 2)]
    fan_in: usize,
}

/// A value available to downstream nodes.
#[derive(Clone)]
struct Available {
    name: String,
    param_type: &'static str,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rng();

    if cli.inputs == 0 || cli.fan_in == 0 {
        eprintln!("Error: --inputs and --fan-in must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating node graph ({} interior nodes, {} request parameters)...",
        cli.nodes, cli.inputs
    );

    let mut available: Vec<Available> = (0..cli.inputs)
        .map(|i| Available {
            name: format!("arg_{}", i),
            param_type: random_type(&mut rng),
        })
        .collect();

    let mut nodes = vec![json!({
        "id": "request",
        "node_type": "start",
        "description": "Route entry point",
        "outputs": params(&available),
    })];

    for i in 0..cli.nodes {
        let (node, output) = generate_interior(&mut rng, i, &available, cli.fan_in);
        nodes.push(node);
        available.push(output);
    }

    let result = &available[available.len() - 1];
    nodes.push(json!({
        "id": "response",
        "node_type": "end",
        "description": "Route response",
        "inputs": params(std::slice::from_ref(result)),
    }));

    let json_output = serde_json::to_string_pretty(&json!({ "nodes": nodes }))?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved node graph to '{}'",
        cli.output
    );

    Ok(())
}

/// Generates one interior node consuming a random subset of the available values.
fn generate_interior(
    rng: &mut ThreadRng,
    index: usize,
    available: &[Available],
    fan_in: usize,
) -> (Value, Available) {
    let count = rng.random_range(1..=fan_in.min(available.len()));
    let mut inputs: Vec<Available> = Vec::with_capacity(count);
    while inputs.len() < count {
        let candidate = &available[rng.random_range(0..available.len())];
        if !inputs.iter().any(|a| a.name == candidate.name) {
            inputs.push(candidate.clone());
        }
    }

    let id = format!("step_{}", index);
    let output = Available {
        name: format!("value_{}", index),
        param_type: random_type(rng),
    };
    let signature = inputs
        .iter()
        .map(|a| format!("{}: {}", a.name, a.param_type))
        .collect::<Vec<_>>()
        .join(", ");
    let code = format!(
        "def {}({}) -> {}:\n    return {}",
        id,
        signature,
        output.param_type,
        default_value(output.param_type)
    );

    let mut node = json!({
        "id": id,
        "node_type": "action",
        "description": format!("Synthetic step {}", index),
        "inputs": params(&inputs),
        "outputs": params(std::slice::from_ref(&output)),
        "code": code,
    });
    if rng.random_bool(0.3) {
        let (package, version) = PACKAGES[rng.random_range(0..PACKAGES.len())];
        node["required_packages"] = json!([{
            "package_name": package,
            "version": version,
            "specifier": "==",
        }]);
    }

    (node, output)
}

fn params(values: &[Available]) -> Value {
    Value::Array(
        values
            .iter()
            .map(|a| json!({ "name": a.name, "param_type": a.param_type }))
            .collect(),
    )
}

fn random_type(rng: &mut ThreadRng) -> &'static str {
    TYPES[rng.random_range(0..TYPES.len())]
}

fn default_value(param_type: &str) -> &'static str {
    match param_type {
        "int" => "0",
        "float" => "0.0",
        "str" => "\"\"",
        "bool" => "False",
        "list[int]" => "[]",
        _ => "{}",
    }
}
