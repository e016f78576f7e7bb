pub mod error;
pub mod model;
pub mod service;

pub use error::SessionError;
pub use model::{clip_file_name, download_file_name, HistoryEntry, SessionState};
pub use service::{
    ClipDownload, GenerateCommand, GenerateOutcome, ProviderStatus, SessionService,
};
