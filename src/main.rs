#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = student_marks_bot::run().await {
        eprintln!("student-marks-bot fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
