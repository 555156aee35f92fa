//! Divination content engine.
//!
//! - Seeded generators for almanac, bazi, zhouyi, astrology, tarot and the
//!   keyword-driven methods (dream, numerology, qimen, face, palmistry,
//!   generic fortune)
//! - A deterministic personality questionnaire scorer (`mbti`)
//! - A cascading section parser that turns any text blob into titled sections
//! - An assembler that prefers an external completion and falls back to local
//!   simulation with a visible disclaimer
//! - A repair pipeline for persisted results that are empty or corrupt
//!
//! The HTTP layer (`routes`) is a thin wrapper over `logic`.

pub mod assembler;
pub mod calendar;
pub mod completion;
pub mod config;
pub mod domain;
pub mod error;
pub mod generators;
pub mod logic;
pub mod mbti;
pub mod methods;
pub mod parser;
pub mod protocol;
pub mod render;
pub mod repair;
pub mod rng;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod util;

pub use domain::{DivinationResult, Section};
pub use error::DivinationError;
pub use routes::build_router;
pub use state::AppState;
