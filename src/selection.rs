//! Selected-star details and the free-text descriptions shown next to them.
//!
//! The text comes from an external generative service reached through
//! [`DescriptionService`]. Its replies are displayed as-is; failures and empty
//! replies turn into fixed placeholders and never reach the caller as errors.

use std::error::Error;

use chrono::NaiveDate;
use tracing::warn;

use crate::catalog::Star;
use crate::coordinates::ObserverPosition;

pub const STAR_INFO_EMPTY: &str = "Could not retrieve information about this star.";
pub const STAR_INFO_UNAVAILABLE: &str = "Star information is currently unavailable.";
pub const FORECAST_EMPTY: &str = "Could not generate tonight's sky forecast.";
pub const FORECAST_UNAVAILABLE: &str = "Failed to load tonight's sky forecast.";

/// place name used in forecasts while the observer position is unknown
pub const UNKNOWN_PLACE: &str = "Tokyo";

pub trait DescriptionService {
    fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

pub fn star_prompt(star: &Star) -> String {
    format!(
        "You are a professional astronomer and a friendly guide. In under 150 characters, \
         tell me about the star \"{}\" (constellation: {}): 1. its basic features such as \
         colour and distance 2. an interesting fact or myth. Keep the wording simple and \
         reply with plain text only, no markdown.",
        star.name, star.constellation
    )
}

pub fn forecast_prompt(date: NaiveDate, observer: Option<&ObserverPosition>) -> String {
    let place = observer
        .map(ObserverPosition::describe)
        .unwrap_or_else(|| UNKNOWN_PLACE.to_string());
    format!(
        "Date: {}\nLocation: {}\n\nWrite tonight's sky forecast as a roughly 200 character \
         \"tonight's highlights\". Mention the seasonal constellations, visible planets and any \
         meteor showers, in a casual and romantic tone that makes people want to look up.",
        date.format("%Y-%m-%d"),
        place
    )
}

/// the description shown for a selected star, or a placeholder
pub fn describe_star(service: &dyn DescriptionService, star: &Star) -> String {
    request(service, &star_prompt(star), STAR_INFO_EMPTY, STAR_INFO_UNAVAILABLE)
}

pub fn tonight_forecast(
    service: &dyn DescriptionService,
    date: NaiveDate,
    observer: Option<&ObserverPosition>,
) -> String {
    request(
        service,
        &forecast_prompt(date, observer),
        FORECAST_EMPTY,
        FORECAST_UNAVAILABLE,
    )
}

fn request(
    service: &dyn DescriptionService,
    prompt: &str,
    empty: &str,
    unavailable: &str,
) -> String {
    match service.generate(prompt) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => empty.to_string(),
        Err(e) => {
            warn!(error = %e, "description service failed");
            unavailable.to_string()
        }
    }
}
