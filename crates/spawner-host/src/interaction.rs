//! Translating raw item use into form requests.

use crate::form::ConfigForm;
use crate::settings::HostSettings;
use spawner_core::guard::Actor;
use spawner_core::id::Region;
use spawner_core::position::BlockPos;

/// An actor used an item on a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUse {
    pub actor: Actor,
    pub item_id: String,
    pub region: Region,
    pub target: BlockPos,
    pub sneaking: bool,
}

/// A form to show, and where the resulting generator goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub region: Region,
    pub target: BlockPos,
    pub form: ConfigForm,
}

/// How the host should treat an item use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Cancel the host's default handling of the use.
    pub consumed: bool,
    pub form: Option<FormRequest>,
}

impl Interaction {
    fn ignored() -> Self {
        Self {
            consumed: false,
            form: None,
        }
    }
}

/// Decide what an item use does. Any use of the trigger item is consumed;
/// only a non-sneaking use opens the form.
pub fn handle_item_use(settings: &HostSettings, item_use: &ItemUse) -> Interaction {
    if item_use.item_id != settings.trigger_item {
        return Interaction::ignored();
    }
    let form = (!item_use.sneaking).then(|| FormRequest {
        region: item_use.region,
        target: item_use.target,
        form: ConfigForm::new(&settings.form),
    });
    Interaction {
        consumed: true,
        form,
    }
}
