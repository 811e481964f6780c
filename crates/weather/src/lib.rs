//! Live weather lookup for skydoc.
//!
//! Extracts a location from the query via the language model, fetches
//! current conditions from OpenWeatherMap in metric units, and normalizes
//! the response into a [`WeatherReading`].

pub mod client;
pub mod location;
pub mod resolver;
pub mod types;

// Re-export commonly used types
pub use client::{OpenWeatherClient, WeatherService};
pub use location::extract_location;
pub use resolver::WeatherResolver;
pub use types::WeatherReading;
