/// Cross-platform notification support
/// Currently only implements macOS notifications

#[cfg(target_os = "macos")]
use std::process::{Command, Stdio};

/// Notification body for a saved work session
pub fn record_saved_text(task_name: &str, minutes: u32) -> String {
    format!("{} minutes logged on {}", minutes, task_name)
}

/// AppleScript that posts `body` as a notification
#[cfg(any(target_os = "macos", test))]
fn notification_script(body: &str) -> String {
    format!(
        r#"display notification "{}" with title "Tally - Session Saved""#,
        body.replace('"', "\\\"")
    )
}

/// Send a notification when the timer saves a record
pub fn notify_record_saved(task_name: &str, minutes: u32) {
    let body = record_saved_text(task_name, minutes);

    #[cfg(target_os = "macos")]
    {
        let script = notification_script(&body);

        // fire and forget so the timer loop keeps drawing
        if let Err(e) = Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            tracing::debug!(error = %e, "notification failed");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        tracing::debug!(%body, "notifications unsupported on this platform");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_saved_text() {
        assert_eq!(record_saved_text("Write docs", 25), "25 minutes logged on Write docs");
    }

    #[test]
    fn test_notification_script_escapes_quotes() {
        assert_eq!(
            notification_script(r#"5 minutes logged on "Ship it""#),
            r#"display notification "5 minutes logged on \"Ship it\"" with title "Tally - Session Saved""#
        );
    }
}
