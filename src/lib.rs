/*
 * Responsibility
 * - module 構成の宣言 (main.rs からは app::run() だけを使う)
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
