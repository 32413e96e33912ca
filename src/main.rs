use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    prompt_creator::cli::run_cli().await
}
