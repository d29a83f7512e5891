//! Human-readable descriptions of thrown JavaScript values

use rquickjs::convert::Coerced;
use rquickjs::{Ctx, Exception, Value};

/// Describe a thrown value the way an uncaught error is reported
///
/// Error objects render as `Name: message` followed by the stack trace;
/// any other value uses its `String()` conversion.
#[must_use]
pub fn describe(value: &Value<'_>) -> String {
    if let Some(exception) = value.as_exception() {
        return describe_exception(exception);
    }
    value
        .get::<Coerced<String>>()
        .map(|coerced| coerced.0)
        .unwrap_or_else(|_| format!("uncaught {:?} value", value.type_of()))
}

fn describe_exception(exception: &Exception<'_>) -> String {
    let name = exception
        .get::<_, Option<String>>("name")
        .ok()
        .flatten()
        .unwrap_or_else(|| "Error".to_string());

    let headline = match exception.message() {
        Some(message) if !message.is_empty() => format!("{name}: {message}"),
        _ => name,
    };

    match exception.stack() {
        Some(stack) if !stack.trim().is_empty() => format!("{headline}\n{}", stack.trim_end()),
        _ => headline,
    }
}

/// Turn an engine error into a description, taking the pending exception
/// off the context when there is one
pub fn caught(ctx: &Ctx<'_>, error: rquickjs::Error) -> String {
    if matches!(error, rquickjs::Error::Exception) {
        describe(&ctx.catch())
    } else {
        error.to_string()
    }
}
