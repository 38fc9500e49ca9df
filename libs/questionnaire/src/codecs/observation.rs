//! `sdc-questionnaire-observationLinkPeriod` and `sdc-questionnaire-observationExtract`

use super::{CodecContext, ExtensionCodec};
use crate::urls;
use ferrum_models::{Duration, Extension, TypedValue};
use serde_json::{Number, Value};

/// How far back an existing Observation may be reused
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPeriod {
    pub value: Number,
    /// Unit label as shown to the user ("days", "months", ...)
    pub unit: String,
}

pub struct ObservationLinkPeriod;

impl ExtensionCodec for ObservationLinkPeriod {
    type Value = Option<LinkPeriod>;

    const URL: &'static str = urls::OBSERVATION_LINK_PERIOD;

    fn decode(extensions: &[Value]) -> Option<LinkPeriod> {
        let ext = super::first_matching(extensions, Self::URL)?;
        let duration = ext.value.as_ref()?.as_quantity()?;
        Some(LinkPeriod {
            value: duration.value.clone()?,
            unit: duration.unit.clone().unwrap_or_default(),
        })
    }

    fn build(period: &Option<LinkPeriod>, ctx: &CodecContext<'_>) -> Vec<Extension> {
        let Some(period) = period else {
            return Vec::new();
        };
        let mut duration = Duration {
            value: Some(period.value.clone()),
            ..Default::default()
        };
        if !period.unit.is_empty() {
            duration.unit = Some(period.unit.clone());
            match ctx.units.resolve(&period.unit) {
                Some(ucum) => {
                    duration.system = Some(ucum.system);
                    duration.code = Some(ucum.code);
                }
                None => tracing::warn!(
                    unit = %period.unit,
                    "No UCUM code for observation link period unit"
                ),
            }
        }
        vec![Extension::with_value(Self::URL, TypedValue::Duration(duration))]
    }
}

pub struct ObservationExtract;

impl ExtensionCodec for ObservationExtract {
    type Value = bool;

    const URL: &'static str = urls::OBSERVATION_EXTRACT;

    fn decode(extensions: &[Value]) -> bool {
        super::first_matching(extensions, Self::URL)
            .and_then(|e| e.value)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn build(extract: &bool, _: &CodecContext<'_>) -> Vec<Extension> {
        if *extract {
            vec![Extension::with_value(Self::URL, TypedValue::Boolean(true))]
        } else {
            Vec::new()
        }
    }
}
