//! Integration test crate for Montage.
//!
//! This crate exists solely to hold cross-crate integration tests. It
//! depends on the whole workspace to verify the pieces work together.

#[cfg(test)]
mod audio;

#[cfg(test)]
mod export;

#[cfg(test)]
mod playback;

#[cfg(test)]
mod timeline;

#[cfg(test)]
pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}
