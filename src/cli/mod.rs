use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the gateway to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8000")]
    pub server_addr: String,

    /// Base URL of the Ollama inference server.
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Model used when a chat request does not name one.
    #[arg(long, env = "DEFAULT_MODEL", default_value = "llama3.2")]
    pub model: String,

    /// Timeout in seconds for chat calls. Sized to tolerate slow generation,
    /// not to bound it tightly.
    #[arg(long, env = "CHAT_TIMEOUT_SECS", default_value = "60")]
    pub chat_timeout_secs: u64,

    /// Timeout in seconds for health probes and model-catalog lookups.
    #[arg(long, env = "PROBE_TIMEOUT_SECS", default_value = "5")]
    pub probe_timeout_secs: u64,

    /// Optional path to a file overriding the built-in tutor system prompt.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,
}
