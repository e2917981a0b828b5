use serde::{Deserialize, Serialize};

use crate::core::sizing::SizingMode;
use crate::core::types::Viewport;
use crate::error::{TimelineError, TimelineResult};

pub const TIMELINE_CONFIG_JSON_SCHEMA_V1: u32 = 1;

/// Plain host-facing configuration; parsed and serialized explicitly instead
/// of living in a framework property bag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub viewport: Viewport,
    pub sizing_mode: SizingMode,
    pub min_unit_width_px: f64,
    pub year_row_visible: bool,
    pub month_row_visible: bool,
}

impl TimelineConfig {
    pub const DEFAULT_MIN_UNIT_WIDTH_PX: f64 = 30.0;

    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            sizing_mode: SizingMode::default(),
            min_unit_width_px: Self::DEFAULT_MIN_UNIT_WIDTH_PX,
            year_row_visible: true,
            month_row_visible: true,
        }
    }

    #[must_use]
    pub fn with_sizing_mode(mut self, sizing_mode: SizingMode) -> Self {
        self.sizing_mode = sizing_mode;
        self
    }

    #[must_use]
    pub fn with_min_unit_width_px(mut self, min_unit_width_px: f64) -> Self {
        self.min_unit_width_px = min_unit_width_px;
        self
    }

    #[must_use]
    pub fn with_year_row_visible(mut self, visible: bool) -> Self {
        self.year_row_visible = visible;
        self
    }

    #[must_use]
    pub fn with_month_row_visible(mut self, visible: bool) -> Self {
        self.month_row_visible = visible;
        self
    }

    pub fn validate(&self) -> TimelineResult<()> {
        if !self.viewport.is_valid() {
            return Err(TimelineError::InvalidViewport {
                width: self.viewport.width,
            });
        }
        if !self.min_unit_width_px.is_finite() || self.min_unit_width_px <= 0.0 {
            return Err(TimelineError::InvalidConfig(
                "minimum unit width must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: TimelineConfig,
}

impl TimelineConfig {
    pub fn to_json_contract_v1_pretty(&self) -> TimelineResult<String> {
        let payload = TimelineConfigJsonContractV1 {
            schema_version: TIMELINE_CONFIG_JSON_SCHEMA_V1,
            config: *self,
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            TimelineError::InvalidConfig(format!("failed to serialize config contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> TimelineResult<Self> {
        if let Ok(config) = serde_json::from_str::<TimelineConfig>(input) {
            return Ok(config);
        }
        let payload: TimelineConfigJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            TimelineError::InvalidConfig(format!("failed to parse config json payload: {e}"))
        })?;
        if payload.schema_version != TIMELINE_CONFIG_JSON_SCHEMA_V1 {
            return Err(TimelineError::InvalidConfig(format!(
                "unsupported config schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.config)
    }
}
