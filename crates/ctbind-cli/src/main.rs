use clap::{Parser, Subcommand};
use ctbind_config::BindingConfig;
use ctbind_core::{render_module, validate_module, BindingModule, Renderer};
use miette::Result;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ctbind")]
#[command(author, version, about = "Generate Python ctypes bindings from a native API model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a declaration model to Python source
    Render {
        /// Model file (.json or .toml)
        model: PathBuf,

        /// Binding configuration (defaults to the OpenVR conventions)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a declaration model without rendering it
    Check {
        /// Model file (.json or .toml)
        model: PathBuf,

        /// Binding configuration (defaults to the OpenVR conventions)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            model,
            config,
            output,
        } => {
            let renderer = Renderer::new(load_config(config.as_deref())?);
            let module = load_model(&model)?;
            let source = render_module(&renderer, &module).join("\n\n\n");
            tracing::info!(
                declarations = module.declarations.len(),
                "rendered {}",
                model.display()
            );

            if let Some(output_path) = output {
                std::fs::write(&output_path, format!("{}\n", source))
                    .map_err(|e| miette::miette!("Failed to write output: {}", e))?;
                println!("Wrote bindings to {}", output_path.display());
            } else {
                println!("{}", source);
            }
        }

        Commands::Check { model, config } => {
            let renderer = Renderer::new(load_config(config.as_deref())?);
            let module = load_model(&model)?;
            let diagnostics = validate_module(&module, &renderer);
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();

            for diagnostic in diagnostics.iter().cloned() {
                eprintln!("{:?}", miette::Report::new(diagnostic));
            }
            if errors > 0 {
                miette::bail!("{}: {} error(s)", model.display(), errors);
            }
            println!(
                "{}: OK ({} warning(s))",
                model.display(),
                diagnostics.len() - errors
            );
        }
    }

    Ok(())
}

/// Install a stderr subscriber honoring `RUST_LOG`.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<BindingConfig> {
    match path {
        Some(path) => BindingConfig::from_file(path)
            .map_err(|e| miette::miette!("{}: {}", path.display(), e)),
        None => Ok(BindingConfig::default()),
    }
}

fn load_model(path: &Path) -> Result<BindingModule> {
    BindingModule::from_file(path).map_err(|e| miette::miette!("{}: {}", path.display(), e))
}
