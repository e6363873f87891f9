use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::errors::AppResult;
use crate::present::{Candidate, ChoicePresenter, ConsolePresenter, EnrollmentPrompt};
use crate::request::EnrollmentRequest;
use crate::store::{IndexStore, PictureIndex};

/// Terminal state of one enrollment run. At most one index is ever
/// committed per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentDecision {
    Committed(PictureIndex),
    Aborted,
}

impl EnrollmentDecision {
    /// Value part of the stdout token: committed index, or 0 on abort.
    pub fn token_value(self) -> u32 {
        match self {
            EnrollmentDecision::Committed(index) => index.get(),
            EnrollmentDecision::Aborted => 0,
        }
    }
}

/// Unused pool slots, ascending, paired with their picture paths. Indices
/// already bound to an enrolled identity are never offered again.
pub fn candidates(settings: &Settings, store: &IndexStore) -> Vec<Candidate> {
    (1..=settings.pool_size)
        .map(PictureIndex::new)
        .filter(|index| !store.contains(*index))
        .map(|index| Candidate {
            index,
            picture: settings.picture_path(index),
        })
        .collect()
}

pub fn run_enrollment(
    settings: &Settings,
    request: &EnrollmentRequest,
    store: &mut IndexStore,
) -> AppResult<EnrollmentDecision> {
    run_enrollment_with(settings, request, store, &ConsolePresenter)
}

pub fn run_enrollment_with<P>(
    settings: &Settings,
    request: &EnrollmentRequest,
    store: &mut IndexStore,
    presenter: &P,
) -> AppResult<EnrollmentDecision>
where
    P: ChoicePresenter,
{
    let candidates = candidates(settings, store);
    if candidates.is_empty() {
        info!(
            pool_size = settings.pool_size,
            enrolled = store.len(),
            "no unused picture left in pool, aborting enrollment"
        );
        return Ok(EnrollmentDecision::Aborted);
    }

    let prompt = EnrollmentPrompt {
        product: request.product.clone(),
        manufacturer: request.manufacturer.clone(),
        candidates,
    };

    let selection = presenter.present_choices(&prompt)?;
    let chosen = match selection {
        Some(index) if prompt.candidates.iter().any(|c| c.index == index) => index,
        Some(index) => {
            // The unbound sentinel or an already-used index must never be
            // committed; treat the selection as a decline.
            warn!(%index, "selection is not an offered candidate, aborting enrollment");
            return Ok(EnrollmentDecision::Aborted);
        }
        None => {
            debug!("enrollment suspended by user");
            return Ok(EnrollmentDecision::Aborted);
        }
    };

    store.add(chosen);
    store.persist(&settings.index_store_path)?;
    info!(index = %chosen, "security picture committed");
    Ok(EnrollmentDecision::Committed(chosen))
}
