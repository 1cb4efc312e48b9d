use tracing::trace;

use crate::error::{Result, WikiError};

/// Default cap on full rewrite passes. Each pass peels one nesting level, so
/// this is far above anything a real article needs.
pub const DEFAULT_MAX_PASSES: usize = 256;

/// Apply `pass` until it stops changing the text.
///
/// Fails with [`WikiError::NotConverged`] if the text is still changing after
/// `max_passes` applications.
pub fn fixed_point<F>(stage: &'static str, text: &str, max_passes: usize, pass: F) -> Result<String>
where
    F: Fn(&str) -> String,
{
    let mut current = text.to_string();
    for n in 1..=max_passes {
        let next = pass(&current);
        if next == current {
            trace!(stage, passes = n, "converged");
            return Ok(next);
        }
        current = next;
    }
    Err(WikiError::NotConverged {
        stage,
        passes: max_passes,
    })
}
