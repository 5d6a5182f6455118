use crate::models::GoogleEvent;

/// True when `operator_email` created or organizes the event, or attends it
/// without having declined. E-mail comparison ignores case. An empty
/// operator e-mail owns nothing.
pub fn is_owned_by(event: &GoogleEvent, operator_email: &str) -> bool {
    let me = operator_email.trim().to_lowercase();
    if me.is_empty() {
        return false;
    }

    let same = |email: Option<&str>| email.map(|e| e.trim().to_lowercase() == me).unwrap_or(false);

    if same(event.creator.as_ref().and_then(|p| p.email.as_deref()))
        || same(event.organizer.as_ref().and_then(|p| p.email.as_deref()))
    {
        return true;
    }

    event
        .attendees
        .iter()
        .any(|a| same(a.email.as_deref()) && a.response_status.as_deref() != Some("declined"))
}
