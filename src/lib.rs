// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Hospital Staff API - role-gated REST service for hospital staff
//!
//! Receptionists and doctors register, log in for a signed session token,
//! and manage patient records on routes scoped to their role.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Password hashing, session tokens and the role gate
//! - `config` - Environment configuration
//! - `service` - Registration, login and patient management
//! - `storage` - Identity and patient persistence (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;
