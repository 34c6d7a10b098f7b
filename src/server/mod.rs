pub mod api;

use crate::llm::ollama::OllamaClient;
use std::error::Error;

pub struct Server {
    addr: String,
    state: api::AppState,
}

impl Server {
    pub fn new(addr: String, client: OllamaClient, system_prompt: String) -> Self {
        Self {
            addr,
            state: api::AppState::new(client, system_prompt),
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.addr, self.state.clone()).await
    }
}
