//! Toast display through Windows PowerShell
//!
//! WSL can execute Windows binaries directly, so the toast is shown by
//! running a PowerShell script against the WinRT notification API.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{NotificationSink, SinkError};

/// powershell.exe as seen from inside a WSL distribution
pub const DEFAULT_POWERSHELL_PATH: &str =
    "/mnt/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe";

/// AUMID the toast is attributed to. PowerShell's own identity is used
/// so no app registration is needed.
const APP_ID: &str =
    r"{1AC14E77-02E7-4E5D-B744-2EB1AE5198B7}\WindowsPowerShell\v1.0\powershell.exe";

/// Shows toasts by spawning powershell.exe with a WinRT toast script
pub struct PowerShellSink {
    program: String,
}

impl PowerShellSink {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_POWERSHELL_PATH.to_string(),
        }
    }

    /// Use a different powershell.exe location (non-standard installs)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PowerShellSink {
    fn default() -> Self {
        Self::new()
    }
}

/// The XML document is embedded in a PowerShell here-string, so it needs
/// no additional quoting beyond its own XML escaping.
fn toast_script(xml: &str) -> String {
    format!(
        r#"
[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null
[Windows.Data.Xml.Dom.XmlDocument, Windows.Data.Xml.Dom.XmlDocument, ContentType = WindowsRuntime] | Out-Null

$app = '{app}'

$xml = @"
{xml}
"@

$XmlDocument = [Windows.Data.Xml.Dom.XmlDocument]::new()
$XmlDocument.LoadXml($xml)

$toast = [Windows.UI.Notifications.ToastNotification]::new($XmlDocument)
[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier($app).Show($toast)
"#,
        app = APP_ID,
        xml = xml
    )
}

#[async_trait]
impl NotificationSink for PowerShellSink {
    async fn show(&self, xml: &str) -> Result<(), SinkError> {
        let output = Command::new(&self.program)
            .args(["-Command", &toast_script(xml)])
            .output()
            .await?;

        if !output.status.success() {
            return Err(SinkError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("Toast displayed");
        Ok(())
    }
}
