pub mod config;
pub mod subtitles;
