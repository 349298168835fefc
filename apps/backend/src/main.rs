#[tokio::main]
async fn main() -> anyhow::Result<()> {
    assessment_backend::run().await
}
