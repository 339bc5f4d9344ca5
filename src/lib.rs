//! Playlist import library - shared modules for all binaries.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod playlist;
pub mod progress;
pub mod scoring;
pub mod select;
pub mod spotify;

#[cfg(test)]
mod testing;
