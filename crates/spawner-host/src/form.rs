//! The three-field configuration form.

use crate::error::HostError;
use crate::settings::FormDefaults;
use spawner_core::placement::GeneratorRequest;

/// Number of fields on the form.
pub const FIELD_COUNT: usize = 3;

/// One free-text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub default: String,
}

/// What the host shows the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigForm {
    pub title: &'static str,
    pub fields: [FormField; FIELD_COUNT],
}

impl ConfigForm {
    pub fn new(defaults: &FormDefaults) -> Self {
        Self {
            title: "Item Spawner",
            fields: [
                FormField {
                    label: "Spawn interval (ticks)",
                    default: defaults.interval.clone(),
                },
                FormField {
                    label: "Item id",
                    default: defaults.item_id.clone(),
                },
                FormField {
                    label: "Item count",
                    default: defaults.item_count.clone(),
                },
            ],
        }
    }

    /// The response an operator produces by accepting every default.
    pub fn accept_defaults(&self) -> FormResponse {
        FormResponse::Submitted(self.fields.iter().map(|f| f.default.clone()).collect())
    }
}

/// What the host hands back once the operator closes the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormResponse {
    /// Raw field values, in field order.
    Submitted(Vec<String>),
    Cancelled,
}

impl FormResponse {
    /// `None` for a cancelled form.
    pub fn into_request(self) -> Result<Option<GeneratorRequest>, HostError> {
        let values = match self {
            FormResponse::Cancelled => return Ok(None),
            FormResponse::Submitted(values) => values,
        };
        let [interval, item_id, item_count]: [String; FIELD_COUNT] =
            values.try_into().map_err(|v: Vec<String>| HostError::FormShape {
                expected: FIELD_COUNT,
                found: v.len(),
            })?;
        Ok(Some(GeneratorRequest {
            interval,
            item_id,
            item_count,
        }))
    }
}
