//! Application status transitions that callers may request.
//!
//! Only a draft can be submitted by its owner. Every later state is written
//! by administrative processes outside this API.

use entity::application::ApplicationStatus;

use crate::error::AppError;

const ALLOWED_TRANSITIONS: &[(ApplicationStatus, &[ApplicationStatus])] = &[
    (ApplicationStatus::Draft, &[ApplicationStatus::Submitted]),
    (ApplicationStatus::Submitted, &[]),
    (ApplicationStatus::UnderReview, &[]),
    (ApplicationStatus::Approved, &[]),
    (ApplicationStatus::Rejected, &[]),
    (ApplicationStatus::Completed, &[]),
];

pub fn allowed_targets(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    ALLOWED_TRANSITIONS
        .iter()
        .find(|(state, _)| *state == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

pub fn can_transition(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    allowed_targets(from).contains(&to)
}

pub fn check_transition(from: ApplicationStatus, to: ApplicationStatus) -> Result<(), AppError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(AppError::InvalidStatusTransition { from, to })
    }
}
