//! Configuration types for Petri net layout.
//!
//! This module provides configuration structures that control how nets are
//! laid out and how arcs are styled. All types implement
//! [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining layout and style settings.
//! - [`LayoutConfig`] - Default [`LayoutDirection`] and optional spacing overrides.
//! - [`StyleConfig`] - Arc stroke color.
//!
//! # Example
//!
//! ```
//! # use petri_layout::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.style().edge_color().is_ok());
//! ```

use serde::Deserialize;

use petri_layout_core::color::Color;

use crate::layout::{LayoutDirection, Spacing};

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Layout direction and spacing overrides.
///
/// Unset distances fall back to [`Spacing::for_direction`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Direction used when the caller does not pick one.
    #[serde(default)]
    direction: LayoutDirection,

    #[serde(default)]
    node_separation: Option<f32>,

    #[serde(default)]
    rank_separation: Option<f32>,

    #[serde(default)]
    margin: Option<f32>,
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`] with the given default direction and no
    /// spacing overrides.
    pub fn new(direction: LayoutDirection) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn with_node_separation(mut self, value: f32) -> Self {
        self.node_separation = Some(value);
        self
    }

    pub fn with_rank_separation(mut self, value: f32) -> Self {
        self.rank_separation = Some(value);
        self
    }

    pub fn with_margin(mut self, value: f32) -> Self {
        self.margin = Some(value);
        self
    }

    /// Returns the default [`LayoutDirection`].
    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Returns the spacing for `direction` with the overrides applied.
    pub fn spacing(&self, direction: LayoutDirection) -> Spacing {
        let defaults = Spacing::for_direction(direction);
        Spacing::new(
            self.node_separation.unwrap_or(defaults.node_separation()),
            self.rank_separation.unwrap_or(defaults.rank_separation()),
            self.margin.unwrap_or(defaults.margin()),
        )
    }
}

/// Visual styling of routed arcs.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Arc stroke and marker [`Color`], as a color string.
    #[serde(default)]
    edge_color: Option<String>,
}

impl StyleConfig {
    pub fn new(edge_color: Option<String>) -> Self {
        Self { edge_color }
    }

    /// Returns the parsed arc [`Color`], or the default `#333` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn edge_color(&self) -> Result<Color, String> {
        self.edge_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map(Option::unwrap_or_default)
            .map_err(|err| format!("Invalid edge color in config: {err}"))
    }
}
