use std::time::Duration;

use assert_cmd::Command;

const TIMEOUT_DURATION: Duration = Duration::from_secs(20);

/// Exit code the launcher uses when no GPU adapter exists; accepted so the
/// test still passes on build machines without one.
const EXIT_CODE_NO_GPU: i32 = 2;

#[test]
fn headless_frame_renders_without_panicking() -> Result<(), anyhow::Error> {
    let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))?
        .env("HEADLESS", "true")
        .timeout(TIMEOUT_DURATION)
        .output()?;
    let code = output.status.code();
    assert!(
        output.status.success() || code == Some(EXIT_CODE_NO_GPU),
        "unexpected exit: {:?}\nstdout: {}\nstderr: {}",
        code,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
    Ok(())
}
