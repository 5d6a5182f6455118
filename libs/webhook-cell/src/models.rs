use shared_database::UpsertOutcome;

pub const WELCOME_TEXT: &str =
    "加入成功 ✅ 我們已記錄您的顯示名稱；治療師稍後會更新為您的正式姓名。";
pub const EMPTY_ECHO_TEXT: &str = "(空訊息)";

/// Result of one best-effort step. A failed step never stops the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<T> {
    Done(T),
    Failed(String),
    Skipped(&'static str),
}

impl<T> StepOutcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done(_))
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for StepOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => StepOutcome::Done(value),
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowOutcome {
    pub user_id: String,
    /// Display name from the messaging profile.
    pub profile: StepOutcome<String>,
    pub registry: StepOutcome<UpsertOutcome>,
    pub welcome: StepOutcome<()>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Current-month stats, replied to the admin.
    Stats,
    /// Preview of tomorrow's digest; patients are not messaged.
    Tomorrow,
    Echo(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Followed(FollowOutcome),
    AdminReplied {
        command: AdminCommand,
        reply: StepOutcome<()>,
    },
    Ignored(&'static str),
}
