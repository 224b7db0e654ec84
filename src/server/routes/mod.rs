pub mod algorithms;
pub mod auth;
pub mod content;
pub mod files;
pub mod pages;
