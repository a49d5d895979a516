//! # Consultant
//!
//! Customer-support chat backend for an electronics store. A customer's conversation is a
//! session; each question is answered by the LLM gateway from a prompt built out of fixed
//! policy text, a similar catalog product and the session's prior turns. A background reaper
//! evicts idle anonymous sessions and compacts idle registered ones into keywords.
//!
//! ## Modules
//!
//! - [`session`] – Session Store, credentials, per-session locks
//! - [`context`] – Context Builder
//! - [`products`] – product-detail sources
//! - [`reaper`] – Session Reaper and compaction
//! - [`service`] – start / message / end / register / login / product
//! - [`telegram`] – teloxide front-end
//! - [`core`], [`config`], [`cli`], [`components`], [`runner`] – ambient wiring

pub mod cli;
pub mod components;
pub mod config;
pub mod context;
pub mod core;
pub mod products;
pub mod reaper;
pub mod runner;
pub mod service;
pub mod session;
pub mod telegram;

pub use cli::{load_config, Cli, Commands};
pub use components::{assemble, build_components, product_source, Components};
pub use config::AppConfig;
pub use context::{render_history, ContextBuilder, SimilarProduct};
pub use self::core::{
    init_tracing, Bot, Chat, ConsultantError, Handler, HandlerResponse, Message, Result,
    ToCoreMessage, ToCoreUser, User,
};
pub use products::{FileProductSource, HttpProductSource, ProductDetailSource, ProductDocument};
pub use reaper::{Compactor, Reaper, SweepReport};
pub use runner::{load_products, run_bot, run_sweep, seed_products};
pub use service::{replies, ConsultantService, ServiceReply, SessionHandle};
pub use session::{Credentials, SessionLocks, SessionStore};
pub use telegram::{ConsultantHandler, TelegramBotAdapter};
