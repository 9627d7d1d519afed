//! # gh-standup
//!
//! Collects a developer's recent work into one snapshot for standup
//! reports: uncommitted and unpushed git state across several local
//! working copies, plus the developer's GitHub-wide commits, pull requests
//! and issues.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────────────┐   ┌──────────────┐
//! │   Config    │──▶│          Aggregator          │──▶│  Aggregated  │
//! │ directories │   │ ┌──────────┐  ┌────────────┐ │   │   Activity   │
//! │ user, days  │   │ │ Collector│  │ GitHub     │ │   │   (JSON)     │
//! └─────────────┘   │ │ N tasks  │  │ 1 call     │ │   └──────────────┘
//!                   │ └────┬─────┘  └─────┬──────┘ │
//!                   └──────┼──────────────┼────────┘
//!                          ▼              ▼
//!                     git (CLI)      gh CLI / REST API
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! standup dirs                       # show configured directories
//! standup collect                    # JSON snapshot for the default window
//! standup collect --yesterday        # Friday..today when run on a Monday
//! standup collect --last-week -o snapshot.json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and directory selection |
//! | [`models`] | Core data types |
//! | [`traits`] | Git and GitHub capability traits |
//! | [`connector_git`] | `git` CLI backend |
//! | [`connector_github`] | `gh` CLI backend |
//! | [`connector_github_api`] | GitHub REST API backend |
//! | [`collect`] | Bounded, timeout-aware local change collection |
//! | [`activity`] | Single-call GitHub activity retrieval |
//! | [`aggregate`] | Pipeline orchestration |
//! | [`export`] | JSON output |

pub mod activity;
pub mod aggregate;
pub mod collect;
pub mod config;
pub mod connector_git;
pub mod connector_github;
pub mod connector_github_api;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod process;
pub mod sources;
pub mod traits;
pub mod window;
