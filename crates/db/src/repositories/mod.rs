pub mod cover_image_repo;
pub mod cover_job_repo;
pub mod credit_repo;
pub mod generation_error_repo;
pub mod generation_job_repo;
pub mod lyrics_repo;
pub mod track_repo;

pub use cover_image_repo::CoverImageRepo;
pub use cover_job_repo::CoverJobRepo;
pub use credit_repo::CreditRepo;
pub use generation_error_repo::GenerationErrorRepo;
pub use generation_job_repo::GenerationJobRepo;
pub use lyrics_repo::LyricsRepo;
pub use track_repo::TrackRepo;
