use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use benefits_chat::core::ChatService;
use benefits_chat::core::config::{self, CliOverrides, ResolvedConfig};
use benefits_chat::inference::{
    BedrockTransport, ChatRequest, Message, ModelCatalog, Role, TransportError,
};
use benefits_chat::store::{Document, DocumentStore, FileStore};
use clap::{Parser, Subcommand};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "benefits-chat", about = "Healthcare benefits assistant backed by Bedrock")]
struct Args {
    /// Data directory for stored documents
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a question, optionally grounded on a stored document
    Ask {
        /// Model provider id (claude, titan, llama)
        #[arg(short, long)]
        model: Option<String>,
        /// Id of a stored document to answer from
        #[arg(short, long)]
        document: Option<String>,
        question: String,
    },
    /// Store a plain-text document
    Upload {
        path: PathBuf,
        /// MIME type recorded with the document
        #[arg(long = "type", default_value = "text/plain")]
        mime_type: String,
    },
    /// List stored documents
    Documents,
    /// Print a stored document
    Show { id: String },
    /// Delete a stored document
    Delete { id: String },
    /// List available models
    Models,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to benefits-chat.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("benefits-chat.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config()?;
    let model = match &args.command {
        Command::Ask { model, .. } => model.clone(),
        _ => None,
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            model,
            data_dir: args.data_dir.clone(),
        },
    );
    log::info!(
        "benefits-chat starting: model={}, region={}, data_dir={}",
        resolved.model,
        resolved.region,
        resolved.data_dir.display()
    );

    let catalog = Arc::new(ModelCatalog::with_overrides(&resolved.models));
    let store = Arc::new(FileStore::open(&resolved.data_dir).await?);

    match args.command {
        Command::Ask {
            document, question, ..
        } => ask(&resolved, catalog, store, document, question).await?,
        Command::Upload { path, mime_type } => {
            let content = tokio::fs::read_to_string(&path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let doc = Document::from_text(name, mime_type, content);
            store.store(&doc).await?;
            println!("{}", doc.id);
        }
        Command::Documents => {
            for meta in store.list().await? {
                println!("{}\t{}\t{}\t{} bytes", meta.id, meta.name, meta.mime_type, meta.size);
            }
        }
        Command::Show { id } => match store.get(&id).await? {
            Some(doc) => println!("{}", doc.content),
            None => return Err(format!("document not found: {id}").into()),
        },
        Command::Delete { id } => store.delete(&id).await?,
        Command::Models => {
            for option in catalog.options() {
                println!("{}\t{}\t{}", option.id, option.model_id, option.description);
            }
        }
    }

    Ok(())
}

async fn ask(
    resolved: &ResolvedConfig,
    catalog: Arc<ModelCatalog>,
    store: Arc<FileStore>,
    document_id: Option<String>,
    question: String,
) -> Result<(), Box<dyn Error>> {
    let api_key = resolved.bedrock_api_key.clone().ok_or_else(|| {
        TransportError::Config("set AWS_BEARER_TOKEN_BEDROCK or [bedrock] api_key".to_string())
    })?;
    let transport = Arc::new(BedrockTransport::new(resolved.bedrock_base_url.clone(), api_key)?);
    let service = ChatService::new(catalog, transport, store);

    let request = ChatRequest {
        messages: vec![Message::new(Role::User, question)],
        model: resolved.model.clone(),
        document_id,
    };
    let reply = service.respond(&request).await?;
    println!("{}", reply.content);
    Ok(())
}
