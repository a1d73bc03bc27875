/// Something that happened to a view: a user action or a settled request.
///
/// Controllers turn completed side effects (a poll result, a send response)
/// into intents; the view's reducer is the only consumer.
pub trait Intent: Send + 'static {}
