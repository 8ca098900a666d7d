#[tokio::main]
async fn main() {
    alumni_connect::run().await;
}
