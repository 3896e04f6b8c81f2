/// Observable state of the most recent submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn is_idle(&self) -> bool {
        *self == SubmissionStatus::Idle
    }

    pub fn is_loading(&self) -> bool {
        *self == SubmissionStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        *self == SubmissionStatus::Success
    }

    pub fn is_error(&self) -> bool {
        *self == SubmissionStatus::Error
    }
}
