//! Command paths and literal tokens used by the service.

/// Requests a new session identifier.
pub const START: &str = "start";
/// Signals that the local user is typing.
pub const TYPING: &str = "typing";
/// Signals that the local user stopped typing.
pub const STOPPED_TYPING: &str = "stoppedtyping";
/// Sends one chat message.
pub const SEND: &str = "send";
/// Long-polls for accumulated events.
pub const EVENTS: &str = "events";
/// Leaves the current conversation.
pub const DISCONNECT: &str = "disconnect";
/// Service-wide counters.
pub const STATUS: &str = "status";
/// Falls back from topic matching to random matching.
pub const STOP_COMMON_LIKES: &str = "stoplookingforcommonlikes";
/// Answers a captcha challenge.
pub const RECAPTCHA: &str = "recaptcha";
/// Renders a chat log image (served by the log host).
pub const GENERATE: &str = "generate";

/// Body returned by fire-and-forget actions on success.
pub const ACK: &str = "win";
/// Body returned by `/recaptcha` when the answer is wrong.
pub const FAIL: &str = "fail";
