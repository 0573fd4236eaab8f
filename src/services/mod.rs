// src/services/mod.rs
pub mod calendar_bridge;
pub mod heatmap_service;
