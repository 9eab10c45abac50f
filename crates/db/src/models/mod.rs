pub mod cover_image;
pub mod cover_job;
pub mod credit;
pub mod generation_error;
pub mod generation_job;
pub mod lyrics;
pub mod track;
