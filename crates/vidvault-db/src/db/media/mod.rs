#[allow(clippy::module_inception)]
pub mod media;
pub mod progress;

pub use media::MediaRepository;
pub use progress::ProgressRepository;
