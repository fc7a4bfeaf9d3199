//! CLI entry point for blogdeck

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogdeck::filter::FilterState;
use blogdeck::theme::Theme;

#[derive(Parser)]
#[command(name = "blogdeck")]
#[command(version)]
#[command(about = "Renders and serves a markdown blog from a post manifest", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List posts, optionally filtered
    List {
        /// Only posts carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only posts matching this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List tags with their post counts
    Tags,

    /// Show a post
    Show {
        /// Document identifier from the manifest
        file: String,

        /// Print the rendered page instead of the metadata
        #[arg(long)]
        html: bool,
    },

    /// Show or change the theme (show, toggle, light, dark)
    Theme {
        #[arg(default_value = "show")]
        action: String,

        /// System color scheme preference to assume
        #[arg(long)]
        system: Option<Theme>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogdeck=debug,info"
    } else {
        "blogdeck=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Server { port, ip } => {
            let blog = blogdeck::Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blogdeck::server::start(&blog, &ip, port).await?;
        }

        Commands::List { tag, search } => {
            let blog = blogdeck::Blog::new(&base_dir)?;
            let state = FilterState::new(tag.as_deref(), search.as_deref());
            blogdeck::commands::list::run(&blog, "post", &state).await?;
        }

        Commands::Tags => {
            let blog = blogdeck::Blog::new(&base_dir)?;
            blogdeck::commands::list::run(&blog, "tag", &FilterState::default()).await?;
        }

        Commands::Show { file, html } => {
            let blog = blogdeck::Blog::new(&base_dir)?;
            blogdeck::commands::show::run(&blog, &file, html).await?;
        }

        Commands::Theme { action, system } => {
            let blog = blogdeck::Blog::new(&base_dir)?;
            blogdeck::commands::theme::run(&blog, &action, system)?;
        }

        Commands::Version => {
            println!("blogdeck version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
