//! Application-wide constants.

/// Amount added to the simulated progress on every tick.
pub const PROGRESS_STEP: u8 = 10;

/// Time between two progress ticks, in milliseconds.
pub const PROGRESS_INTERVAL_MS: u64 = 50;

/// Delay between progress reaching 100 and the completion callback, in milliseconds.
pub const REDIRECT_DELAY_MS: u64 = 300;

/// Upper bound of the progress indicator.
pub const PROGRESS_MAX: u8 = 100;

/// File size shown to the user. Displayed only, never enforced.
pub const MAX_FILE_SIZE_HINT_MB: u64 = 50;

/// Content types the upload widget accepts.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Value of the file input `accept` attribute.
pub const ACCEPTED_EXTENSIONS: &str = ".jpg,.png,.jpeg";

/// Key under which the hosting configuration is stored.
pub const HOSTING_CONFIG_KEY: &str = "roomify_hosting_config";

/// Domain suffix appended to a hosting subdomain.
pub const HOSTING_DOMAIN_SUFFIX: &str = ".puter.site";

/// Prefix of every generated hosting slug.
pub const HOSTING_SLUG_PREFIX: &str = "roomify";

/// Length of the random part of a hosting slug.
pub const HOSTING_SLUG_RANDOM_LEN: usize = 6;

// User-facing texts of the upload surface
pub const PROMPT_SIGNED_IN: &str = "Click to upload or just drag and drop";
pub const PROMPT_SIGNED_OUT: &str = "Sign in or Sign up with Puter to upload";
pub const STATUS_ANALYZING: &str = "Analyzing Floor Plan...";
pub const STATUS_REDIRECTING: &str = "Redirecting...";
