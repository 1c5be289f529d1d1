//! formgen CLI entrypoint
//! Parses command-line arguments and dispatches to the generation pipeline.
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use formgen::core::config::{Config, EnvConfigReader};
use formgen::generation::{
    DatabaseKind, FormDefinition, GenerationError, GenerationOptions, GenerationRequest,
};
use formgen::infrastructure::{self, ZipPackager};
use formgen::infrastructure::output::format_size;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Template root, overriding configuration and environment
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate artifacts from a form definition
    Generate(GenerateArgs),
    /// Inspect the template registry
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },
    /// Inspect or unpack generated archives
    Archive {
        #[command(subcommand)]
        action: ArchiveCommands,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Form definition file (JSON, or YAML for .yml/.yaml)
    #[arg(long)]
    form: PathBuf,
    /// Project name; the entity name is derived from it
    #[arg(long)]
    project_name: String,
    #[arg(long)]
    namespace: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Target database: sqlserver, postgresql, mysql or sqlite
    #[arg(long, default_value = "sqlserver")]
    database: DatabaseKind,
    /// Generate the object-model family
    #[arg(long)]
    object_model: bool,
    /// Generate the relational-schema family
    #[arg(long)]
    relational_schema: bool,
    /// Generate the UI-component family
    #[arg(long)]
    ui_components: bool,
    /// Generate the deployment family
    #[arg(long)]
    deployment: bool,
    /// Directory receiving the organized project folder
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Directory receiving the archive
    #[arg(long)]
    archive_dir: Option<PathBuf>,
    /// Identity recorded on the job
    #[arg(long, default_value = "formgen-cli")]
    requested_by: String,
    /// Print the finished job as JSON
    #[arg(long)]
    json: bool,
}

impl GenerateArgs {
    /// Without any family flag the default families are generated
    fn options(&self) -> GenerationOptions {
        let explicit =
            self.object_model || self.relational_schema || self.ui_components || self.deployment;
        let defaults = GenerationOptions::default();
        let (object_model, relational_schema, ui_components) = if explicit {
            (self.object_model, self.relational_schema, self.ui_components)
        } else {
            (
                defaults.generate_object_model,
                defaults.generate_relational_schema,
                defaults.generate_ui_components,
            )
        };

        GenerationOptions {
            generate_object_model: object_model,
            generate_relational_schema: relational_schema,
            generate_ui_components: ui_components,
            generate_deployment: self.deployment,
            project_name: self.project_name.clone(),
            namespace: self.namespace.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            target_database: self.database,
            ..defaults
        }
    }
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// List registered templates
    List,
    /// Check every registered template has a source file
    Validate,
}

#[derive(Subcommand, Debug)]
enum ArchiveCommands {
    /// List archive entries
    List { archive: PathBuf },
    /// Extract an archive into a directory
    Extract { archive: PathBuf, destination: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO; stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::discover(cli.config.as_deref(), &EnvConfigReader)
        .await
        .context("Failed to load configuration")?;
    if let Some(dir) = &cli.templates_dir {
        config.templates_dir = dir.clone();
    }

    match cli.command {
        Commands::Generate(args) => generate(config, args).await,
        Commands::Templates { action } => match action {
            TemplateCommands::List => list_templates(&config).await,
            TemplateCommands::Validate => validate_templates(&config).await,
        },
        Commands::Archive { action } => match action {
            ArchiveCommands::List { archive } => list_archive(&archive).await,
            ArchiveCommands::Extract {
                archive,
                destination,
            } => extract_archive(&archive, &destination).await,
        },
    }
}

async fn generate(mut config: Config, args: GenerateArgs) -> anyhow::Result<()> {
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(dir) = &args.archive_dir {
        config.archive_dir = dir.clone();
    }

    let definition = FormDefinition::load(&args.form)
        .await
        .with_context(|| format!("Failed to load form definition {}", args.form.display()))?;
    let orchestrator = infrastructure::build_orchestrator(&config)
        .await
        .context("Failed to set up the generation pipeline")?;

    info!(project = %args.project_name, fields = definition.fields.len(), "Generating artifacts");
    let request = GenerationRequest::new(definition, args.options(), args.requested_by.clone());

    let job = match orchestrator.generate(request).await {
        Ok(job) => job,
        Err(GenerationError::JobFailed(failure)) => {
            error!(job_id = %failure.job_id, "Generation failed");
            if args.json {
                println!("{}", serde_json::to_string_pretty(&failure.job)?);
            }
            bail!("Generation job {} failed: {}", failure.job_id, failure.error);
        }
        Err(e) => return Err(e).context("Generation request rejected"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&job)?);
        return Ok(());
    }

    println!("Job {} {}", job.id(), job.status());
    println!("Artifacts: {}", job.generated_artifact_count());
    for artifact in job.artifacts() {
        println!("  {:<22} {}", artifact.artifact_type().as_str(), artifact.file_path());
    }
    if let Some(folder) = job.output_folder() {
        println!("Output folder: {}", folder.display());
    }
    if let (Some(archive), Some(size)) = (job.archive_path(), job.archive_size_bytes()) {
        println!("Archive: {} ({})", archive.display(), format_size(size));
    }
    Ok(())
}

async fn list_templates(config: &Config) -> anyhow::Result<()> {
    let registry = infrastructure::load_registry(config)
        .await
        .context("Failed to load template registry")?;

    for category in formgen::generation::ArtifactCategory::ALL {
        let templates = registry.by_category(category);
        if templates.is_empty() {
            continue;
        }
        println!("{}:", category.display_name());
        for template in templates {
            let marker = if registry.exists(&template.name) { "" } else { " (missing)" };
            println!(
                "  {:<22} {:<20} {}{}",
                template.name,
                template.artifact_type.as_str(),
                template.output_pattern,
                marker
            );
        }
    }

    let stats = registry.stats();
    println!("{} templates", stats.total);
    Ok(())
}

async fn validate_templates(config: &Config) -> anyhow::Result<()> {
    let registry = infrastructure::load_registry(config)
        .await
        .context("Failed to load template registry")?;
    let report = registry.validate();

    for missing in &report.missing {
        println!("missing: {} ({})", missing.name, missing.path.display());
    }
    if !report.is_valid() {
        bail!(
            "{} of {} templates are missing their source file",
            report.missing.len(),
            report.checked
        );
    }
    println!("All {} templates present in {}", report.checked, registry.root().display());
    Ok(())
}

async fn list_archive(archive: &Path) -> anyhow::Result<()> {
    let entries = ZipPackager::new()
        .list_entries(archive)
        .await
        .with_context(|| format!("Failed to read archive {}", archive.display()))?;
    for entry in entries {
        println!("{entry}");
    }
    Ok(())
}

async fn extract_archive(archive: &Path, destination: &Path) -> anyhow::Result<()> {
    let written = ZipPackager::new()
        .extract(archive, destination)
        .await
        .with_context(|| format!("Failed to extract archive {}", archive.display()))?;
    println!("Extracted {} files to {}", written.len(), destination.display());
    Ok(())
}
