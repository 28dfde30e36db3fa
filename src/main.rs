#[tokio::main]
async fn main() -> anyhow::Result<()> {
    missive_server::run().await
}
