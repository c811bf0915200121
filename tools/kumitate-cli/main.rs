use clap::{Parser, Subcommand};
use kumitate::prelude::*;
use kumitate::store::{FunctionRecord, MemoryRepository, Repository};
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Assemble dependency-linked code nodes into single functions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a node graph JSON file into one function
    Compile {
        /// Path to the node graph JSON file
        nodes_path: String,
        /// Route name; determines the function name
        #[arg(short, long)]
        route: String,
        /// Endpoint handler name recorded in the artifact
        #[arg(short, long, default_value = "")]
        endpoint: String,
        /// Write the compiled artifact to this file (bincode)
        #[arg(short, long)]
        output: Option<String>,
        /// Emit the assembled code without normalizing it
        #[arg(long)]
        raw: bool,
    },
    /// Normalize a Python source file and print the result
    Normalize {
        /// Path to the source file
        source_path: String,
    },
    /// Decompose a route using recorded oracle responses
    Decompose {
        /// Path to the oracle script JSON file
        script_path: String,
        /// Route name; determines the top-level function name
        #[arg(short, long)]
        route: String,
        /// Natural-language description of the route
        #[arg(short, long, default_value = "")]
        description: String,
        /// Route or API context passed to the oracle
        #[arg(long, default_value = "")]
        context: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Command::Compile {
            nodes_path,
            route,
            endpoint,
            output,
            raw,
        } => run_compile(&config, &nodes_path, &route, &endpoint, output, raw),
        Command::Normalize { source_path } => run_normalize(&config, &source_path),
        Command::Decompose {
            script_path,
            route,
            description,
            context,
        } => run_decompose(config, &script_path, &route, &description, &context).await,
    }
}

fn load_config(path: Option<&str>) -> SynthesisConfig {
    let config = match path {
        Some(path) => SynthesisConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => SynthesisConfig::default(),
    };
    config
        .with_env_overrides()
        .unwrap_or_else(|e| exit_with_error(&e.to_string()))
}

fn run_compile(
    config: &SynthesisConfig,
    nodes_path: &str,
    route: &str,
    endpoint: &str,
    output: Option<String>,
    raw: bool,
) {
    let start = Instant::now();
    let json = fs::read_to_string(nodes_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read node graph '{}': {}", nodes_path, e))
    });
    let nodes = OracleNodeGraph::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse node graph JSON: {}", e)));

    let graph = build_graph(nodes)
        .unwrap_or_else(|e| exit_with_error(&format!("Graph construction failed: {}", e)));
    let node_count = graph.len();

    let data = Compiler::builder(graph, RouteSpec::new(route, endpoint))
        .with_config(config)
        .with_normalization(config.normalize && !raw)
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));

    println!("{}", data.code);
    if !data.requirements_manifest.is_empty() {
        println!("# requirements");
        for line in data.requirements_manifest.lines() {
            println!("# {}", line);
        }
    }

    if let Some(path) = output {
        data.save(&path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save artifact: {}", e)));
        eprintln!("Artifact written to '{}'", path);
    }
    eprintln!(
        "Compiled '{}' from {} nodes in {:?}",
        data.function_name,
        node_count,
        start.elapsed()
    );
}

fn run_normalize(config: &SynthesisConfig, source_path: &str) {
    let source = fs::read_to_string(source_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read source '{}': {}", source_path, e))
    });
    let normalized = kumitate::normalizer::normalize_with(&source, &config.style)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    print!("{}", normalized);
}

async fn run_decompose(
    config: SynthesisConfig,
    script_path: &str,
    route: &str,
    description: &str,
    context: &str,
) {
    let oracle = ScriptedOracle::from_file(script_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load oracle script: {}", e)));
    let route = RouteSpec::new(route, "").with_description(description);
    let synthesizer = Synthesizer::new(&oracle, &oracle).with_config(config);

    let decomposition = synthesizer
        .decompose_route(&route, context)
        .await
        .unwrap_or_else(|e| exit_with_error(&format!("Decomposition failed: {}", e)));

    let repository: MemoryRepository<FunctionRecord> = MemoryRepository::new();
    let records = synthesizer
        .persist_decomposition(&decomposition, &repository)
        .await
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to store functions: {}", e)));

    for record in &records {
        println!(
            "{}{} (id {})",
            "  ".repeat(record.depth),
            record.function_name,
            record.id.unwrap_or_default()
        );
    }
    for stub in &decomposition.pruned {
        println!("pruned: {}", stub.function_name);
    }

    let page = repository
        .list(1, records.len().max(1))
        .await
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    eprintln!("{} function(s) stored", page.total_items);
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
