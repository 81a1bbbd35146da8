//! Chromium implementation of the page capability, over CDP.

mod chromium;
mod launch;

pub use chromium::{ChromiumBrowser, ChromiumPage};
pub use launch::{find_browser_executable, LaunchOptions};
