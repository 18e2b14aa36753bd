use crate::{count, format, is_visible, CountPolicy, Limit, Message, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountResult {
    pub count: usize,
    /// `limit - count`; negative once the limit is exceeded.
    pub remaining: i64,
}

/// Everything published for one recount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub result: CountResult,
    pub message: Message,
    pub visible: bool,
}

/// Runs the full pipeline for `text`. Returns `None` for unlimited policies,
/// which have nothing to report.
pub fn evaluate(policy: &CountPolicy, text: &str) -> Option<Feedback> {
    let Limit::Max(limit) = policy.limit else {
        return None;
    };
    let count = count(text, policy.mode);
    let remaining = i64::from(limit) - count as i64;
    Some(Feedback {
        result: CountResult { count, remaining },
        message: format(remaining, Unit::from(policy.mode)),
        visible: is_visible(count, limit, policy.threshold_percent),
    })
}
