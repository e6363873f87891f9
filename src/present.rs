use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};
use crate::store::PictureIndex;

/// One selectable pool picture during enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub index: PictureIndex,
    pub picture: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentPrompt {
    pub product: String,
    pub manufacturer: String,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptDetail {
    /// Privileged mode: driver name, raw index and the interface list.
    Privileged {
        limited_hid_driver: String,
        claimed_index: PictureIndex,
        interfaces: Vec<String>,
    },
    /// User mode: a free-text device description instead.
    User { description: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    /// Bound security picture, absent for an unverified first-seen device.
    pub picture: Option<PathBuf>,
    pub product: String,
    pub manufacturer: String,
    pub config_num: String,
    pub interface_total_num: String,
    pub detail: PromptDetail,
}

/// Rendering collaborator for the enrollment dialog. `Ok(None)` means the
/// human declined (or picked nothing), not a failure.
pub trait ChoicePresenter {
    fn present_choices(&self, prompt: &EnrollmentPrompt) -> AppResult<Option<PictureIndex>>;
}

/// Rendering collaborator for the confirmation dialog. `true` means the
/// human recognized the device.
pub trait DecisionPresenter {
    fn present_decision(&self, prompt: &ConfirmationPrompt) -> AppResult<bool>;
}

/// Terminal fallback for both dialogs. All prompt text goes to stderr and
/// the answer is read from stdin, keeping stdout free for the decision
/// token. Picture "rendering" is limited to printing the pool file path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePresenter;

pub fn enrollment_text(prompt: &EnrollmentPrompt) -> String {
    let mut text = format!(
        "Select a security picture for this device\nProduct: {}\nManufacturer: {}\n",
        prompt.product, prompt.manufacturer
    );
    for candidate in &prompt.candidates {
        text.push_str(&format!(
            "  [{}] {}\n",
            candidate.index,
            candidate.picture.display()
        ));
    }
    text.push_str("Enter an index to complete registration, or nothing to suspend: ");
    text
}

pub fn confirmation_text(prompt: &ConfirmationPrompt) -> String {
    let mut text = String::from("Do you recognize the device?\n");
    if let Some(picture) = &prompt.picture {
        text.push_str(&format!("Security picture: {}\n", picture.display()));
    }
    text.push_str(&format!(
        "product: {}\nmanufacturer: {}\nConfiguration Num: {}\nInterface Total Num: {}\n",
        prompt.product, prompt.manufacturer, prompt.config_num, prompt.interface_total_num
    ));
    match &prompt.detail {
        PromptDetail::Privileged {
            limited_hid_driver,
            claimed_index,
            interfaces,
        } => {
            text.push_str(&format!(
                "Limited HID Driver: {limited_hid_driver}\nSecurity Pic Index: {claimed_index}\nInterfaces:\n"
            ));
            for interface in interfaces {
                text.push_str(&format!("  {interface}\n"));
            }
        }
        PromptDetail::User { description } => {
            text.push_str(&format!("Device Description: {description}\n"));
        }
    }
    text.push_str("Is this your device? [y/N]: ");
    text
}

fn read_answer() -> AppResult<String> {
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(AppError::Prompt)?;
    Ok(answer.trim().to_string())
}

impl ChoicePresenter for ConsolePresenter {
    fn present_choices(&self, prompt: &EnrollmentPrompt) -> AppResult<Option<PictureIndex>> {
        let mut stderr = io::stderr().lock();
        stderr
            .write_all(enrollment_text(prompt).as_bytes())
            .map_err(AppError::Prompt)?;
        stderr.flush().map_err(AppError::Prompt)?;

        let answer = read_answer()?;
        if answer.is_empty() {
            return Ok(None);
        }
        Ok(answer.parse::<PictureIndex>().ok())
    }
}

impl DecisionPresenter for ConsolePresenter {
    fn present_decision(&self, prompt: &ConfirmationPrompt) -> AppResult<bool> {
        let mut stderr = io::stderr().lock();
        stderr
            .write_all(confirmation_text(prompt).as_bytes())
            .map_err(AppError::Prompt)?;
        stderr.flush().map_err(AppError::Prompt)?;

        let answer = read_answer()?;
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}
