use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::info;

use strata_core::output::{Output, Resolution};
use strata_core::preview::PreviewRegistry;
use strata_core::resource::Value;
use strata_provider_aws::iam::{ServiceAccountIdentity, TrustPolicy};
use strata_stacks::{Stack, StackConfig, preview_registry};

const DEFAULT_CONFIG_FILE: &str = "strata.yaml";
const MAX_DISPLAY_LENGTH: usize = 72;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Declare AWS and Kubernetes infrastructure as a resource graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resources a stack registers, in the order they would be created
    Preview {
        #[command(flatten)]
        target: StackArgs,
    },
    /// Run the definition pass and check every resource against its schema
    Validate {
        #[command(flatten)]
        target: StackArgs,
    },
    /// Print the IAM trust policy for a Kubernetes service account
    TrustPolicy {
        /// ARN of the cluster's IAM OIDC provider
        #[arg(long)]
        oidc_arn: String,

        /// Issuer URL of the cluster's IAM OIDC provider
        #[arg(long)]
        oidc_url: String,

        #[arg(long)]
        namespace: String,

        #[arg(long)]
        service_account: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StackKind {
    Cluster,
    Bucket,
}

impl From<StackKind> for Stack {
    fn from(kind: StackKind) -> Self {
        match kind {
            StackKind::Cluster => Stack::Cluster,
            StackKind::Bucket => Stack::Bucket,
        }
    }
}

#[derive(clap::Args)]
struct StackArgs {
    /// Path to the stack configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Stack definition to run
    #[arg(long, value_enum, default_value = "cluster")]
    stack: StackKind,

    /// AWS region (overrides aws.region)
    #[arg(long)]
    region: Option<String>,

    /// Project name (overrides project)
    #[arg(long)]
    project: Option<String>,

    /// Stack name (overrides stack)
    #[arg(long)]
    stack_name: Option<String>,

    /// IAM policy document for the load balancer controller
    #[arg(long)]
    policy_file: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Preview { target } => run_preview(&target),
        Commands::Validate { target } => run_validate(&target),
        Commands::TrustPolicy {
            oidc_arn,
            oidc_url,
            namespace,
            service_account,
        } => run_trust_policy(&oidc_arn, &oidc_url, &namespace, &service_account),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(args: &StackArgs) -> Result<StackConfig, String> {
    let mut config = match &args.config {
        Some(path) => StackConfig::load(path).map_err(|e| e.to_string())?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            StackConfig::load(DEFAULT_CONFIG_FILE).map_err(|e| e.to_string())?
        }
        None => StackConfig::new("strata", "dev"),
    };

    if let Some(project) = &args.project {
        config = config.with_project(project.as_str());
    }
    if let Some(stack) = &args.stack_name {
        config = config.with_stack(stack.as_str());
    }
    if let Some(region) = &args.region {
        config = config.with_region(region.as_str());
    }
    if let Some(path) = &args.policy_file {
        config = config.with_policy_file(path.as_path());
    }
    Ok(config)
}

fn define(args: &StackArgs) -> Result<(Stack, PreviewRegistry), String> {
    let config = load_config(args)?;
    let stack = Stack::from(args.stack);
    info!(
        "running {} definition for {}/{}",
        stack.name(),
        config.project,
        config.stack
    );

    let mut registry = preview_registry();
    stack
        .define(&mut registry, &config)
        .map_err(|e| e.to_string())?;
    registry.check_upstream().map_err(|e| e.to_string())?;
    Ok((stack, registry))
}

fn run_validate(args: &StackArgs) -> Result<(), String> {
    let (stack, registry) = define(args)?;
    println!(
        "{}",
        format!(
            "Stack '{}' is valid: {} resources, {} outputs.",
            stack.name(),
            registry.entries().len(),
            registry.exports().len()
        )
        .green()
    );
    Ok(())
}

fn run_preview(args: &StackArgs) -> Result<(), String> {
    let (stack, registry) = define(args)?;

    println!(
        "{}",
        format!("Preview of stack '{}':", stack.name()).cyan().bold()
    );

    for (index, wave) in registry.apply_waves().iter().enumerate() {
        println!();
        println!("{}", format!("Wave {}", index + 1).dimmed());
        for id in wave {
            let Some(entry) = registry.entry(id) else {
                continue;
            };
            println!("{} {}", "+".green().bold(), id.to_string().green());
            if let Some(parent) = &entry.options.parent {
                println!("    {} {}", "parent:".dimmed(), parent);
            }
            if let Some(provider) = &entry.options.provider {
                println!("    {} {}", "provider:".dimmed(), provider);
            }
            let hooks = entry.options.transformations.len();
            if hooks > 0 || !entry.applied_transformations.is_empty() {
                println!(
                    "    {} {} declared, applied: [{}]",
                    "hooks:".dimmed(),
                    hooks,
                    entry.applied_transformations.join(", ")
                );
            }
            for (key, value) in &entry.resource.attributes {
                println!("    {}: {}", key, format_value(value));
            }
        }
    }

    if !registry.exports().is_empty() {
        println!();
        println!("{}", "Outputs:".cyan().bold());
        for (name, output) in registry.exports() {
            println!("    {}: {}", name, format_output(output));
        }
    }

    println!();
    println!(
        "Preview: {} to create.",
        registry.entries().len().to_string().green()
    );
    Ok(())
}

fn run_trust_policy(
    oidc_arn: &str,
    oidc_url: &str,
    namespace: &str,
    service_account: &str,
) -> Result<(), String> {
    let identity = ServiceAccountIdentity::new(namespace, service_account);
    let policy = TrustPolicy::for_service_account(oidc_arn, oidc_url, &identity);
    let json = policy.to_json_pretty().map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn format_output(output: &Output<Value>) -> String {
    if output.is_secret() {
        return "[secret]".to_string();
    }
    match output.resolution() {
        Resolution::Pending => "(known after apply)".to_string(),
        Resolution::Ready(value) => format_value(&value),
        Resolution::Failed(e) => format!("(failed: {})", e).red().to_string(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => format!("\"{}\"", truncate(s)),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let strs: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            format!("{{{}}}", strs.join(", "))
        }
        Value::Deferred(output) => format_output(output).dimmed().to_string(),
    }
}

/// Shorten long literals such as inline policy documents
fn truncate(s: &str) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= MAX_DISPLAY_LENGTH {
        return flat;
    }
    let head: String = flat.chars().take(MAX_DISPLAY_LENGTH).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::resource::ResourceId;

    #[test]
    fn secret_outputs_are_masked() {
        let output = Output::known(Value::from("apiVersion: v1")).secret();
        assert_eq!(format_output(&output), "[secret]");
        assert!(!format_value(&Value::Deferred(output)).contains("apiVersion"));
    }

    #[test]
    fn pending_outputs_are_known_after_apply() {
        let (output, _resolver) = Output::<Value>::unresolved(ResourceId::new("s3.bucket", "b"));
        assert_eq!(format_output(&output), "(known after apply)");
    }

    #[test]
    fn long_strings_are_truncated() {
        let long = "x".repeat(200);
        let shown = format_value(&Value::from(long.as_str()));
        assert!(shown.len() < 100);
        assert!(shown.ends_with("...\""));
    }

    #[test]
    fn cli_parses_preview_flags() {
        let cli = Cli::try_parse_from([
            "strata", "preview", "--stack", "bucket", "--region", "us-east-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Preview { target } => {
                assert!(matches!(target.stack, StackKind::Bucket));
                assert_eq!(target.region.as_deref(), Some("us-east-1"));
            }
            _ => panic!("Expected preview"),
        }
    }
}
