#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gelis::bootstrapper::run().await
}
