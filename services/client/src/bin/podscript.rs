//! services/client/src/bin/podscript.rs

use clap::{Args, Parser, Subcommand};
use client_lib::{
    adapters::{FileSessionStore, HttpTransport, LocalFile, MemorySessionStore},
    config::Config,
    error::ClientError,
    AuthClient, FileRepository, Gateway, ProjectFilter, ProjectRepository, ScriptRepository,
};
use podscript_core::{
    ErrorKind, MediaType, Project, ProjectFile, Script, ScriptDraft, ScriptEdit, SessionStore,
    SourceKind,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "podscript", about = "Manage podcast projects and transcripts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with an existing account
    Login {
        email: String,
        password: String,
        /// Stay logged in for seven days
        #[arg(long)]
        remember: bool,
    },
    /// Create an account and log in
    Register {
        name: String,
        email: String,
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// Forget the stored credential
    Logout,
    /// Show the logged-in user
    Whoami,
    #[command(subcommand)]
    Projects(ProjectCommand),
    #[command(subcommand)]
    Scripts(ScriptCommand),
    #[command(subcommand)]
    Files(FileCommand),
}

#[derive(Subcommand)]
enum ProjectCommand {
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Create {
        name: String,
    },
}

#[derive(Args)]
struct ScriptFields {
    /// Episode name
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    transcript: String,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Source {
    Rss,
    Youtube,
}

#[derive(Subcommand)]
enum ScriptCommand {
    List {
        project: String,
    },
    /// Enter a script by hand
    Add {
        project: String,
        #[arg(long)]
        platform: String,
        #[command(flatten)]
        fields: ScriptFields,
    },
    /// Enter a script from an RSS feed or YouTube video
    Source {
        project: String,
        #[arg(value_enum)]
        kind: Source,
        #[command(flatten)]
        fields: ScriptFields,
    },
    /// Create a script from the text of a local file
    Upload {
        project: String,
        path: PathBuf,
        /// Declared MIME type; guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    Edit {
        project: String,
        script: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        transcript: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    Delete {
        project: String,
        script: String,
    },
}

#[derive(Subcommand)]
enum FileCommand {
    List {
        project: String,
    },
    Upload {
        project: String,
        path: PathBuf,
        #[arg(long)]
        mime: Option<String>,
    },
    Add {
        project: String,
        #[arg(long)]
        platform: String,
        #[command(flatten)]
        fields: ScriptFields,
    },
    Delete {
        project: String,
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Parse Arguments, Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- 2. Initialize Adapters ---
    let session: Arc<dyn SessionStore> = match config
        .session_path
        .clone()
        .or_else(FileSessionStore::default_path)
    {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => {
            warn!("No config directory available; credentials will not be remembered.");
            Arc::new(MemorySessionStore::new())
        }
    };
    let transport = Arc::new(HttpTransport::new(&config)?);
    let gateway = Gateway::new(transport, session);
    info!("Using API at {}", config.api_url);

    // --- 3. Cancel In-Flight Work on Ctrl-C ---
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    // --- 4. Run the Command ---
    let result = run(cli.command, gateway, &cancel).await;
    match result {
        Err(kind) if kind.requires_login() => {
            eprintln!("{}", kind);
            eprintln!("Please log in with `podscript login`.");
            Err(kind.into())
        }
        Err(ErrorKind::Cancelled) => {
            eprintln!("Cancelled.");
            Ok(())
        }
        other => other.map_err(ClientError::from),
    }
}

async fn run(
    command: Command,
    gateway: Gateway,
    cancel: &CancellationToken,
) -> Result<(), ErrorKind> {
    match command {
        Command::Login {
            email,
            password,
            remember,
        } => {
            AuthClient::new(gateway)
                .login(&email, &password, remember, cancel)
                .await?;
            println!("Logged in.");
        }
        Command::Register {
            name,
            email,
            password,
            remember,
        } => {
            AuthClient::new(gateway)
                .register(&name, &email, &password, remember, cancel)
                .await?;
            println!("Account created.");
        }
        Command::Logout => {
            AuthClient::new(gateway).logout();
            println!("Logged out.");
        }
        Command::Whoami => {
            let user = AuthClient::new(gateway).me(cancel).await?;
            println!(
                "{} {} <{}>",
                user.id,
                user.name.unwrap_or_default(),
                user.email.unwrap_or_default()
            );
        }
        Command::Projects(command) => run_projects(command, gateway, cancel).await?,
        Command::Scripts(command) => run_scripts(command, gateway, cancel).await?,
        Command::Files(command) => run_files(command, gateway, cancel).await?,
    }
    Ok(())
}

async fn run_projects(
    command: ProjectCommand,
    gateway: Gateway,
    cancel: &CancellationToken,
) -> Result<(), ErrorKind> {
    let repo = ProjectRepository::new(gateway);
    match command {
        ProjectCommand::List { status, search } => {
            let total = repo.load(&ProjectFilter { status, search }, cancel).await?;
            for project in repo.items() {
                print_project(&project);
            }
            println!("{} project(s) in total", total);
        }
        ProjectCommand::Create { name } => {
            let project = repo.create(&name, cancel).await?;
            print_project(&project);
        }
    }
    Ok(())
}

async fn run_scripts(
    command: ScriptCommand,
    gateway: Gateway,
    cancel: &CancellationToken,
) -> Result<(), ErrorKind> {
    let repo = ScriptRepository::new(gateway);
    match command {
        ScriptCommand::List { project } => {
            repo.load(&project, cancel).await?;
        }
        ScriptCommand::Add {
            project,
            platform,
            fields,
        } => {
            let draft = ScriptDraft::manual(platform, fields.name, fields.transcript);
            draft.validate()?;
            repo.create(&project, &draft, cancel).await?;
        }
        ScriptCommand::Source {
            project,
            kind,
            fields,
        } => {
            let kind = match kind {
                Source::Rss => SourceKind::RssFeed,
                Source::Youtube => SourceKind::YouTubeVideo,
            };
            let draft = ScriptDraft::from_source(kind, fields.name, fields.transcript);
            draft.validate()?;
            repo.create(&project, &draft, cancel).await?;
        }
        ScriptCommand::Upload {
            project,
            path,
            mime,
        } => {
            let file = local_file(path, mime);
            repo.upload_file(&project, &file, cancel).await?;
        }
        ScriptCommand::Edit {
            project,
            script,
            name,
            transcript,
            status,
            tags,
        } => {
            // The editor starts from the stored script, like the edit view does.
            repo.load(&project, cancel).await?;
            let current = repo
                .state()
                .find(&script)
                .ok_or_else(|| ErrorKind::ValidationFailed("script".to_string()))?;
            let mut edit = ScriptEdit::from_script(&current);
            if let Some(name) = name {
                edit.name = name;
            }
            if let Some(transcript) = transcript {
                edit.transcript = transcript;
            }
            if let Some(status) = status {
                edit.status = status;
            }
            if let Some(tags) = tags {
                edit.tags = tags;
            }
            if edit.name.trim().is_empty() {
                return Err(ErrorKind::ValidationFailed("name".to_string()));
            }
            repo.update(&project, &script, edit, cancel).await?;
        }
        ScriptCommand::Delete { project, script } => {
            repo.load(&project, cancel).await?;
            repo.delete(&script, cancel).await?;
        }
    }
    for script in repo.items() {
        print_script(&script);
    }
    Ok(())
}

async fn run_files(
    command: FileCommand,
    gateway: Gateway,
    cancel: &CancellationToken,
) -> Result<(), ErrorKind> {
    let repo = FileRepository::new(gateway);
    match command {
        FileCommand::List { project } => {
            repo.load(&project, cancel).await?;
        }
        FileCommand::Upload {
            project,
            path,
            mime,
        } => {
            let file = local_file(path, mime);
            repo.upload_file(&project, &file, cancel).await?;
        }
        FileCommand::Add {
            project,
            platform,
            fields,
        } => {
            let draft = ScriptDraft::manual(platform, fields.name, fields.transcript);
            draft.validate()?;
            repo.add_script(&project, &draft, cancel).await?;
        }
        FileCommand::Delete { project, file } => {
            repo.load(&project, cancel).await?;
            repo.delete(&project, &file, cancel).await?;
        }
    }
    for file in repo.items() {
        print_file(&file);
    }
    Ok(())
}

fn local_file(path: PathBuf, mime: Option<String>) -> LocalFile {
    match mime {
        Some(mime) => LocalFile::new(path, mime),
        None => LocalFile::from_path(path),
    }
}

fn print_project(project: &Project) {
    println!(
        "{}\t{}\t{} file(s)\t{}",
        project.id,
        project.name,
        project.file_count,
        project.last_updated.as_deref().unwrap_or("-")
    );
}

fn print_script(script: &Script) {
    println!(
        "{}\t{}\t{}\t{}\t{}\t[{}]",
        script.id,
        script.name,
        script.platform,
        script.media_type,
        script.status,
        script.tags.join(", ")
    );
}

fn print_file(file: &ProjectFile) {
    println!(
        "{}\t{}\t{}",
        file.id,
        file.name,
        file.media_type.map(|t| t.to_string()).unwrap_or_else(|| MediaType::default().to_string())
    );
}
