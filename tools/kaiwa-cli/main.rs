use clap::{Parser, Subcommand};
use kaiwa::deploy::{FileDeployer, FlowDeployer, MemoryDeployer, deploy_flow};
use kaiwa::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{AgentArgs, FlowArgs};

/// Builds, validates and deploys voice-agent conversation flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a template, build it and write the flow document
    Build {
        /// Template JSON file (defaults to the embedded ESI Design School flow)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Where to write the document (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        flow: FlowArgs,
    },
    /// Parse a flow document and run every build check on it
    Validate {
        /// Flow document JSON file
        path: PathBuf,
    },
    /// Print an outline of a flow document or template
    Inspect {
        /// Flow document JSON file (renders the template if omitted)
        path: Option<PathBuf>,

        /// Template JSON file, used when no document is given
        #[arg(short, long)]
        template: Option<PathBuf>,

        #[command(flatten)]
        flow: FlowArgs,
    },
    /// Build the flow and deploy it as an agent
    Deploy {
        /// Template JSON file (defaults to the embedded ESI Design School flow)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Directory receiving the agent request
        #[arg(long, default_value = "deployments")]
        out_dir: PathBuf,

        /// Build the request without writing anything
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        flow: FlowArgs,

        #[command(flatten)]
        agent: AgentArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kaiwa=info,warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build {
            template,
            output,
            flow,
        } => run_build(template, output, &flow),
        Command::Validate { path } => run_validate(&path),
        Command::Inspect {
            path,
            template,
            flow,
        } => run_inspect(path, template, &flow),
        Command::Deploy {
            template,
            out_dir,
            dry_run,
            flow,
            agent,
        } => run_deploy(template, out_dir, dry_run, &flow, &agent),
    }
}

fn load_template(path: Option<PathBuf>) -> FlowTemplate {
    let template = match path {
        Some(path) => FlowTemplate::from_file(path),
        None => FlowTemplate::esi_design_school(),
    };
    template.unwrap_or_else(|e| exit_with_error(&format!("Failed to load template: {}", e)))
}

fn render_flow(template: Option<PathBuf>, args: &FlowArgs) -> Flow {
    let template = load_template(template);
    info!(template = template.name(), "rendering template");
    template
        .render_flow(&args.to_settings())
        .unwrap_or_else(|e| exit_with_error(&format!("Flow build failed: {}", e)))
}

fn run_build(template: Option<PathBuf>, output: Option<PathBuf>, args: &FlowArgs) {
    let flow = render_flow(template, args);
    let json = flow
        .to_document()
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&format!("Serialization failed: {}", e)));

    match output {
        Some(path) => {
            fs::write(&path, json).unwrap_or_else(|e| {
                exit_with_error(&format!("Could not write '{}': {}", path.display(), e))
            });
            println!("Flow built: {}", flow.summary());
            println!("Document written to: {}", path.display());
        }
        None => println!("{}", json),
    }
}

fn run_validate(path: &Path) {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Could not read '{}': {}", path.display(), e))
    });
    let flow = FlowDocument::parse_flow(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid flow: {}", e)));
    println!("Valid flow: {}", flow.summary());
    println!("Start node: {}", flow.start_node_id());
}

fn run_inspect(path: Option<PathBuf>, template: Option<PathBuf>, args: &FlowArgs) {
    let flow = match path {
        Some(path) => {
            let json = fs::read_to_string(&path).unwrap_or_else(|e| {
                exit_with_error(&format!("Could not read '{}': {}", path.display(), e))
            });
            FlowDocument::parse_flow(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid flow: {}", e)))
        }
        None => render_flow(template, args),
    };
    print!("{}", flow.outline());
}

fn run_deploy(
    template: Option<PathBuf>,
    out_dir: PathBuf,
    dry_run: bool,
    flow_args: &FlowArgs,
    agent_args: &AgentArgs,
) {
    if !dry_run {
        agent_args
            .require_api_key()
            .unwrap_or_else(|e| exit_with_error(&e));
    }

    let flow = render_flow(template, flow_args);
    let settings = agent_args.to_settings();

    println!("Agent Name: {}", settings.agent_name);
    println!("Language: {}", flow.language());
    println!("Voice ID: {}", flow.voice_id());
    println!("Webhook: {}", flow_args.webhook_url);
    println!("Flow: {}", flow.summary());

    let deployer: Box<dyn FlowDeployer> = if dry_run {
        Box::new(MemoryDeployer::new())
    } else {
        Box::new(FileDeployer::new(out_dir))
    };
    let receipt = deploy_flow(deployer.as_ref(), &flow, &settings)
        .unwrap_or_else(|e| exit_with_error(&format!("Deployment failed: {}", e)));

    println!("\nAgent ID: {}", receipt.agent_id);
    println!("Agent Name: {}", receipt.agent_name);
    if let Some(location) = receipt.location {
        println!("Request saved to: {}", location.display());
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
