//! Named backdrop colours the corpus glyphs were rendered against.
//!
//! Background names are an open set shared verbatim between the corpus, the
//! quad codebook and the caller. This table only supplies the fill colour
//! used when compositing transparent source pixels; whether a background
//! can be matched against is decided by the corpus.

use super::rgb::Rgb;

/// Known background names and their hex colours.
pub const KNOWN_BACKGROUNDS: &[(&str, &str)] = &[
    ("white", "#FFFFFF"),
    ("black", "#000000"),
    ("ios_light", "#F2F2F7"),
    ("ios_dark", "#1C1C1E"),
    ("android_light", "#FEFBFF"),
    ("android_dark", "#1C1B1F"),
    ("imsg_blue", "#007AFF"),
    ("imsg_green", "#34C759"),
    ("discord_dark", "#313338"),
    ("discord_light", "#FFFFFF"),
    ("discord_blurple", "#5865F2"),
    ("whatsapp_light", "#DCF8C6"),
    ("whatsapp_dark", "#005C4B"),
    ("whatsapp_bg", "#0B141A"),
    ("slack_light", "#FFFFFF"),
    ("slack_dark", "#1A1D21"),
    ("slack_purple", "#4A154B"),
    ("telegram_light", "#FFFFFF"),
    ("telegram_dark", "#212121"),
    ("telegram_blue", "#2AABEE"),
    ("twitter_light", "#FFFFFF"),
    ("twitter_dark", "#15202B"),
    ("twitter_blue", "#1DA1F2"),
];

/// Look up the fill colour for a background name.
///
/// Returns `None` for names outside [`KNOWN_BACKGROUNDS`].
pub fn background_color(name: &str) -> Option<Rgb> {
    KNOWN_BACKGROUNDS
        .iter()
        .find(|(known, _)| *known == name)
        .and_then(|(_, hex)| hex.parse().ok())
}

/// Iterate over the known background names with their colours.
pub fn known_backgrounds() -> impl Iterator<Item = (&'static str, Rgb)> {
    KNOWN_BACKGROUNDS
        .iter()
        .filter_map(|(name, hex)| hex.parse().ok().map(|c| (*name, c)))
}
