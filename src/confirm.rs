use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::archive::archive_request;
use crate::config::Settings;
use crate::errors::AppResult;
use crate::present::{ConfirmationPrompt, ConsolePresenter, DecisionPresenter, PromptDetail};
use crate::request::{ConfirmationRequest, RequestMode};
use crate::store::IndexStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationDecision {
    Confirmed,
    Rejected,
}

impl ConfirmationDecision {
    /// Value part of the stdout token: 1 admits, 0 denies.
    pub fn token_value(self) -> u32 {
        match self {
            ConfirmationDecision::Confirmed => 1,
            ConfirmationDecision::Rejected => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub request_path: PathBuf,
    /// Skips archival, for unit-test and debugging runs.
    pub keep_request: bool,
}

#[derive(Debug)]
pub struct ConfirmationOutcome {
    pub decision: ConfirmationDecision,
    /// Whether the missing store entry for the claimed index was repaired.
    pub healed: bool,
    pub archived_to: Option<PathBuf>,
}

pub fn prompt_for(settings: &Settings, request: &ConfirmationRequest) -> ConfirmationPrompt {
    let picture = if request.claimed_index.is_unbound() {
        None
    } else {
        Some(settings.picture_path(request.claimed_index))
    };
    let detail = match request.mode {
        RequestMode::Privileged => PromptDetail::Privileged {
            limited_hid_driver: request.limited_hid_driver.clone(),
            claimed_index: request.claimed_index,
            interfaces: request.interfaces.clone(),
        },
        RequestMode::User => PromptDetail::User {
            description: request.description.clone(),
        },
    };
    ConfirmationPrompt {
        picture,
        product: request.product.clone(),
        manufacturer: request.manufacturer.clone(),
        config_num: request.config_num.clone(),
        interface_total_num: request.interface_total_num.clone(),
        detail,
    }
}

pub fn run_confirmation(
    settings: &Settings,
    config: &ConfirmationConfig,
    request: &ConfirmationRequest,
    store: &mut IndexStore,
) -> AppResult<ConfirmationOutcome> {
    run_confirmation_with(settings, config, request, store, &ConsolePresenter)
}

/// Evaluates one confirmation request: `Loaded -> Displaying ->
/// {Confirmed, Rejected}`. A non-zero claimed index missing from the store
/// is taken as evidence of a prior enrollment whose store write was lost,
/// and is healed on confirmation only. The request file is archived exactly
/// once on either terminal transition.
pub fn run_confirmation_with<P>(
    settings: &Settings,
    config: &ConfirmationConfig,
    request: &ConfirmationRequest,
    store: &mut IndexStore,
    presenter: &P,
) -> AppResult<ConfirmationOutcome>
where
    P: DecisionPresenter,
{
    let needs_self_heal =
        !request.claimed_index.is_unbound() && !store.contains(request.claimed_index);
    if needs_self_heal {
        warn!(
            index = %request.claimed_index,
            "claimed picture index is not recorded as used"
        );
    }

    let prompt = prompt_for(settings, request);
    let affirmed = presenter.present_decision(&prompt)?;

    let (decision, healed) = if affirmed {
        if needs_self_heal {
            store.add(request.claimed_index);
            store.persist(&settings.index_store_path)?;
            info!(index = %request.claimed_index, "index store healed");
        }
        (ConfirmationDecision::Confirmed, needs_self_heal)
    } else {
        // No store mutation on reject, even when a heal was pending.
        (ConfirmationDecision::Rejected, false)
    };

    let archived_to = if config.keep_request {
        debug!("keeping request file in place");
        None
    } else {
        match archive_request(&config.request_path) {
            Ok(target) => Some(target),
            Err(err) => {
                // The decision takes priority over audit bookkeeping.
                warn!(
                    path = %config.request_path.display(),
                    error = %err,
                    "failed to archive request file"
                );
                None
            }
        }
    };

    Ok(ConfirmationOutcome {
        decision,
        healed,
        archived_to,
    })
}
