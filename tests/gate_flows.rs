use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use picgate::config::Settings;
use picgate::confirm::{
    run_confirmation_with, ConfirmationConfig, ConfirmationDecision,
};
use picgate::enroll::{run_enrollment_with, EnrollmentDecision};
use picgate::errors::AppResult;
use picgate::output::{format_token, CONFIRM_PREFIX, ENROLL_PREFIX};
use picgate::present::{ChoicePresenter, ConfirmationPrompt, DecisionPresenter, EnrollmentPrompt};
use picgate::request::{load_confirmation, EnrollmentRequest};
use picgate::store::{IndexStore, PictureIndex};

struct ScriptedChoice {
    selections: RefCell<Vec<Option<PictureIndex>>>,
}

impl ScriptedChoice {
    fn new(picks: &[u32]) -> Self {
        Self {
            selections: RefCell::new(
                picks.iter().rev().map(|i| Some(PictureIndex::new(*i))).collect(),
            ),
        }
    }
}

impl ChoicePresenter for ScriptedChoice {
    fn present_choices(&self, _prompt: &EnrollmentPrompt) -> AppResult<Option<PictureIndex>> {
        Ok(self.selections.borrow_mut().pop().flatten())
    }
}

struct FirstCandidateChoice;

impl ChoicePresenter for FirstCandidateChoice {
    fn present_choices(&self, prompt: &EnrollmentPrompt) -> AppResult<Option<PictureIndex>> {
        Ok(prompt.candidates.first().map(|c| c.index))
    }
}

struct StubDecision(bool);

impl DecisionPresenter for StubDecision {
    fn present_decision(&self, _prompt: &ConfirmationPrompt) -> AppResult<bool> {
        Ok(self.0)
    }
}

fn settings(dir: &TempDir, pool_size: u32) -> Settings {
    Settings {
        pool_size,
        pool_dir: dir.path().join("pic"),
        pool_ext: "gif".into(),
        index_store_path: dir.path().join("index.conf"),
    }
}

fn write_confirmation_request(dir: &TempDir, claimed: u32) -> PathBuf {
    let path = dir.path().join("gudGUI.input");
    fs::write(
        &path,
        format!(
            "pro=false\nconfigNum=1\ninterfaceTotalNum=1\nproduct=Stick\nmanufacturer=Acme\n\
             securityPicIndex={claimed}\ndescription=A USB storage device\n"
        ),
    )
    .unwrap();
    path
}

// Scenario A: poolSize=3, empty store, user picks index 2.
#[test]
fn first_enrollment_commits_picked_index() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir, 3);
    let mut store = IndexStore::default();

    let decision = run_enrollment_with(
        &settings,
        &EnrollmentRequest::default(),
        &mut store,
        &ScriptedChoice::new(&[2]),
    )
    .unwrap();

    assert_eq!(decision, EnrollmentDecision::Committed(PictureIndex::new(2)));
    assert_eq!(
        format_token(ENROLL_PREFIX, decision.token_value()),
        "Security_pic_index2"
    );
    assert_eq!(fs::read_to_string(&settings.index_store_path).unwrap(), "2");
}

// Scenario B: store={2}, confirmation of index 2 affirmed.
#[test]
fn confirming_a_known_index_admits_without_store_change() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir, 3);
    fs::write(&settings.index_store_path, "2").unwrap();
    let mut store = IndexStore::load(&settings.index_store_path).unwrap();
    let request_path = write_confirmation_request(&dir, 2);
    let request = load_confirmation(&request_path, settings.pool_size).unwrap();
    let config = ConfirmationConfig {
        request_path: request_path.clone(),
        keep_request: false,
    };

    let outcome =
        run_confirmation_with(&settings, &config, &request, &mut store, &StubDecision(true))
            .unwrap();

    assert_eq!(
        format_token(CONFIRM_PREFIX, outcome.decision.token_value()),
        "Enable1"
    );
    assert_eq!(fs::read_to_string(&settings.index_store_path).unwrap(), "2");
    assert!(!request_path.exists());
    assert!(outcome.archived_to.unwrap().exists());
}

// Scenario C: empty store, confirmation of index 5 affirmed, store healed.
#[test]
fn confirming_an_unrecorded_index_heals_the_store() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir, 8);
    let mut store = IndexStore::default();
    let request_path = write_confirmation_request(&dir, 5);
    let request = load_confirmation(&request_path, settings.pool_size).unwrap();
    let config = ConfirmationConfig {
        request_path,
        keep_request: false,
    };

    let outcome =
        run_confirmation_with(&settings, &config, &request, &mut store, &StubDecision(true))
            .unwrap();

    assert_eq!(outcome.decision, ConfirmationDecision::Confirmed);
    assert!(outcome.healed);
    assert_eq!(fs::read_to_string(&settings.index_store_path).unwrap(), "5");
}

// Scenario D: full store, enrollment aborts without presenting.
#[test]
fn exhausted_pool_yields_the_zero_token() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir, 3);
    fs::write(&settings.index_store_path, "1,2,3").unwrap();
    let mut store = IndexStore::load(&settings.index_store_path).unwrap();

    struct PanicChoice;
    impl ChoicePresenter for PanicChoice {
        fn present_choices(&self, _: &EnrollmentPrompt) -> AppResult<Option<PictureIndex>> {
            panic!("no candidate should be presented");
        }
    }

    let decision = run_enrollment_with(
        &settings,
        &EnrollmentRequest::default(),
        &mut store,
        &PanicChoice,
    )
    .unwrap();

    assert_eq!(
        format_token(ENROLL_PREFIX, decision.token_value()),
        "Security_pic_index0"
    );
    assert_eq!(
        fs::read_to_string(&settings.index_store_path).unwrap(),
        "1,2,3"
    );
}

#[test]
fn successive_enrollments_never_reuse_an_index() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir, 5);
    let mut committed = Vec::new();

    for _ in 0..5 {
        let mut store = IndexStore::load(&settings.index_store_path).unwrap();
        let decision = run_enrollment_with(
            &settings,
            &EnrollmentRequest::default(),
            &mut store,
            &FirstCandidateChoice,
        )
        .unwrap();
        match decision {
            EnrollmentDecision::Committed(index) => committed.push(index),
            EnrollmentDecision::Aborted => panic!("pool exhausted early"),
        }
    }

    let mut unique = committed.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), committed.len());

    let store = IndexStore::load(&settings.index_store_path).unwrap();
    assert_eq!(store.len(), 5);
    assert!(store
        .indices()
        .iter()
        .all(|index| (1..=settings.pool_size).contains(&index.get())));

    // Sixth attempt finds nothing left.
    let mut store = IndexStore::load(&settings.index_store_path).unwrap();
    let decision = run_enrollment_with(
        &settings,
        &EnrollmentRequest::default(),
        &mut store,
        &FirstCandidateChoice,
    )
    .unwrap();
    assert_eq!(decision, EnrollmentDecision::Aborted);
}

#[test]
fn rejecting_with_pending_heal_leaves_store_file_untouched() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir, 8);
    fs::write(&settings.index_store_path, "3,1").unwrap();
    let mut store = IndexStore::load(&settings.index_store_path).unwrap();
    let request_path = write_confirmation_request(&dir, 7);
    let request = load_confirmation(&request_path, settings.pool_size).unwrap();
    let config = ConfirmationConfig {
        request_path: request_path.clone(),
        keep_request: false,
    };

    let outcome =
        run_confirmation_with(&settings, &config, &request, &mut store, &StubDecision(false))
            .unwrap();

    assert_eq!(
        format_token(CONFIRM_PREFIX, outcome.decision.token_value()),
        "Enable0"
    );
    assert_eq!(
        fs::read_to_string(&settings.index_store_path).unwrap(),
        "3,1"
    );
    assert!(!request_path.exists());
}

#[test]
fn tokens_match_the_caller_contract() {
    for (prefix, value) in [
        (ENROLL_PREFIX, 0),
        (ENROLL_PREFIX, 12),
        (CONFIRM_PREFIX, 0),
        (CONFIRM_PREFIX, 1),
    ] {
        let token = format_token(prefix, value);
        assert!(token.starts_with(prefix));
        let rest = &token[prefix.len()..];
        assert!(!rest.is_empty());
        assert!(rest.chars().all(|c| c.is_ascii_digit()));
        assert!(!token.contains('\n'));
    }
}
