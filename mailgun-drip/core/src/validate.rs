use crate::{
    error::{Error, Result},
    scheduler::SchedulerOptions,
};

/// Checks that the construction parameters every scheduler needs are present.
///
/// Presence is what counts: an empty string is a defined value.
///
/// # Errors
///
/// Returns [`Error::MissingRequiredField`] naming the first absent field.
pub fn validate_options(options: &SchedulerOptions) -> Result<()> {
    let required = [("api_key", options.api_key.is_some()), ("domain", options.domain.is_some())];

    for (field, present) in required {
        if !present {
            return Err(Error::MissingRequiredField { field });
        }
    }

    Ok(())
}
