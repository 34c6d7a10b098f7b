pub mod cli;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod models;
pub mod server;

use cli::Args;
use config::prompt;
use llm::ollama::OllamaClient;
use log::info;
use server::Server;
use std::error::Error;
use std::time::Duration;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Ollama URL: {}", args.ollama_url);
    info!("Default Model: {}", args.model);
    info!("Chat Timeout: {}s", args.chat_timeout_secs);
    info!("Probe Timeout: {}s", args.probe_timeout_secs);
    if let Some(path) = &args.system_prompt_path {
        info!("System Prompt Path: {}", path);
    }
    info!("-------------------------");

    let system_prompt = prompt::load_system_prompt(args.system_prompt_path.as_deref())?;
    let client = OllamaClient::new(
        args.ollama_url.clone(),
        args.model.clone(),
        Duration::from_secs(args.chat_timeout_secs),
        Duration::from_secs(args.probe_timeout_secs),
    )?;

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, client, system_prompt);
    server.run().await
}
