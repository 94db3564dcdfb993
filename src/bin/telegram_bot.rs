#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = student_marks_bot::run_telegram_bot().await {
        eprintln!("student-marks-telegram-bot fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
