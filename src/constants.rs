//! # System Constants
//!
//! Reserved handler names, hook namespaces, trigger labels and tracked
//! event names that define the operational vocabulary of the SDK core.
//!
//! Handler and hook names are stable wire-level strings shared with
//! external collaborators; changing them is a breaking contract change.

/// Reserved handler registry keys.
pub mod handlers {
    /// Platform authentication step of the login pipeline
    pub const AUTHENTICATE: &str = "handler.authenticate";

    /// SDK login step of the login pipeline
    pub const LOGIN: &str = "handler.login";

    /// Payment method selection step of the payment pipeline
    pub const PAY_METHODS: &str = "handler.pay.methods";

    /// Text content validation
    pub const TEXT: &str = "handler.text";

    /// Media (audio/video) content validation
    pub const MEDIA: &str = "handler.media";

    /// Image content validation
    pub const IMAGE: &str = "handler.image";
}

/// Reserved timer names.
pub mod timers {
    /// Token refresh timer, armed once per successful login
    pub const TOKEN_REFRESH: &str = "sys.token.refresh";
}

/// Hook bus namespaces.
///
/// `SYS.*` names are reserved for core-published error classes; external
/// registrations go through the case-normalized `USER.` namespace.
pub mod hooks {
    /// Prefix applied to every externally registered or published hook
    pub const USER_PREFIX: &str = "USER.";

    /// Initialization aggregation failures
    pub const ERR_INITIALIZE: &str = "SYS.error.init";

    /// Plugin load failures
    pub const ERR_PLUGIN: &str = "SYS.error.plugin";

    /// Login pipeline failures
    pub const ERR_LOGIN: &str = "SYS.error.login";

    /// Payment pipeline failures
    pub const ERR_PAY: &str = "SYS.error.pay";

    /// Completed payment notification carrying request and response
    pub const PAYED: &str = "handler.payed";
}

/// Trigger labels attached to core-produced outcomes.
pub mod triggers {
    /// Initialization task whose payload hot-swaps the application config
    pub const APP_INITIALIZE: &str = "app.initialize";

    /// Aggregate produced by the initialization barrier
    pub const INITIALIZER: &str = "initializer";

    /// Idempotent short-circuit for an already logged-in session
    pub const ALREADY_LOGIN: &str = "already.login";

    /// Successful completion of the login pipeline
    pub const LOGIN_SDK: &str = "login.sdk";

    /// Handler registry dispatch failures
    pub const HANDLER_CALL: &str = "sdk.handler.call";
}

/// Tracked event names pushed through the analytics fan-out.
pub mod events {
    /// Fired after platform authentication succeeds, before SDK login
    pub const LOGIN_AUTHENTICATE: &str = "login.authenticate";
}

/// File extension tables for the media validation operations.
pub mod media {
    pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

    pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "flv", "webm"];

    pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "ogg", "flac", "m4a"];

    /// Container formats accepted by media validation in addition to the
    /// audio and video tables
    pub const MEDIA_EXTENSIONS: &[&str] = &["m3u8", "ts"];
}
