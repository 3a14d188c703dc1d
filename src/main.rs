/*
 * Responsibility
 * - tokio runtime 起動
 * - app::run() の呼び出し（ロジックは置かない）
 */
use anyhow::Result;

use hello_web::app;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
