use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    worktrack::run().await
}
