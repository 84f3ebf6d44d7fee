// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Emargement - Training Session & Attendance Service
//!
//! REST backend where formateurs run training sessions and etudiants sign
//! their attendance ("émargement"), behind token authentication and
//! per-resource ownership rules.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Password hashing, tokens, guard and policy table
//! - `config` - Environment configuration
//! - `storage` - Embedded redb store and typed repositories
//! - `validation` - Declared payload shapes and the validation middleware

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod validation;
