use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};

use crate::error::PageError;

/// How to start the browser.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    /// Explicit executable; discovered on the system when `None`.
    pub executable: Option<PathBuf>,
    /// Per-command CDP timeout.
    pub request_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Locate a Chrome/Chromium executable: the explicit path first, then the
/// usual install locations, then `which` on Unix.
///
/// # Errors
///
/// Returns [`PageError::Browser`] if no executable is found.
pub fn find_browser_executable(explicit: Option<&Path>) -> Result<PathBuf, PageError> {
    if let Some(path) = explicit {
        if path.exists() {
            tracing::info!(path = %path.display(), "using configured browser");
            return Ok(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), "configured browser path does not exist");
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    if let Some(path) = candidates.iter().map(PathBuf::from).find(|p| p.exists()) {
        tracing::info!(path = %path.display(), "found browser");
        return Ok(path);
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            let Ok(output) = Command::new("which").arg(cmd).output() else {
                continue;
            };
            if !output.status.success() {
                continue;
            }
            let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !found.is_empty() {
                tracing::info!(path = %found, "found browser on PATH");
                return Ok(PathBuf::from(found));
            }
        }
    }

    Err(PageError::Browser(
        "Chrome/Chromium executable not found; set CHROMIUM_PATH".to_string(),
    ))
}

/// Launch the browser and spawn the task driving its CDP connection.
pub(super) async fn launch(
    options: &LaunchOptions,
) -> Result<(Browser, JoinHandle<()>), PageError> {
    let executable = find_browser_executable(options.executable.as_deref())?;

    let mut builder = BrowserConfig::builder()
        .request_timeout(options.request_timeout)
        .window_size(1366, 900)
        .chrome_executable(executable);
    builder = if options.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };
    let config = builder
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-notifications")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--lang=pl-PL")
        .build()
        .map_err(|e| PageError::Browser(format!("invalid browser config: {e}")))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| PageError::Browser(format!("failed to launch browser: {e}")))?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // chromiumoxide cannot decode some newer CDP events
                if message.contains("data did not match any variant")
                    || message.contains("Failed to deserialize WS response")
                {
                    tracing::trace!(error = %message, "ignored CDP decode error");
                } else {
                    tracing::error!(error = %message, "browser handler error");
                }
            }
        }
        tracing::debug!("browser handler finished");
    });

    Ok((browser, handler_task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_existing_path_wins() {
        let exe = std::env::current_exe().unwrap();
        assert_eq!(find_browser_executable(Some(exe.as_path())).unwrap(), exe);
    }
}
