use sizewatch_core::ProbeSettings;

use crate::page::{text_or_empty, visible_or_hidden, PageSession};
use crate::vocab::{contains_caption, CONSENT_CAPTIONS, CONSENT_SELECTOR};

/// Click the first visible consent button, trying captions in priority
/// order. Returns whether a banner was dismissed. Never fails.
pub async fn dismiss_consent<P: PageSession + ?Sized>(page: &P, settings: &ProbeSettings) -> bool {
    let buttons = match page.query_all(None, CONSENT_SELECTOR).await {
        Ok(buttons) => buttons,
        Err(e) => {
            tracing::debug!(error = %e, "consent lookup failed");
            return false;
        }
    };
    if buttons.is_empty() {
        return false;
    }

    let mut captioned = Vec::with_capacity(buttons.len());
    for button in buttons {
        let text = text_or_empty(page, button).await;
        if !text.is_empty() {
            captioned.push((button, text));
        }
    }

    for &caption in CONSENT_CAPTIONS {
        for (button, text) in &captioned {
            if !contains_caption(text, &[caption]) || !visible_or_hidden(page, *button).await {
                continue;
            }
            match page.click(*button, settings.consent_timeout).await {
                Ok(()) => {
                    tracing::debug!(caption, "dismissed consent banner");
                    page.wait(settings.consent_settle).await;
                    return true;
                }
                Err(e) => tracing::debug!(caption, error = %e, "consent click failed"),
            }
        }
    }
    false
}
