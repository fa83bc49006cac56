//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Items per page on every list endpoint
pub const PAGE_SIZE: i64 = 10;

/// Today's date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Page query parameter (`?page=N`, 1-based)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    /// Requested page, never below 1
    pub fn number(&self) -> i64 {
        i64::from(self.page.unwrap_or(1).max(1))
    }

    /// SQL `LIMIT`
    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }

    /// SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        (self.number() - 1) * PAGE_SIZE
    }
}

/// One page of a listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub total: i64,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, query: PageQuery, total: i64) -> Self {
        let page = query.number();
        Self {
            has_next: page * PAGE_SIZE < total,
            items,
            page,
            total,
        }
    }
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.@+-]{3,150}$").expect("valid username regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// Validate username format
pub fn is_valid_username(username: &str) -> bool {
    username_regex().is_match(username)
}

/// Validate email format (shape only)
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && email_regex().is_match(email)
}

/// Join the first three names with ", "
pub fn display_first_three<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().take(3).collect::<Vec<_>>().join(", ")
}

/// Trim a free-text field, rejecting it if it exceeds `max_len` characters
pub fn clean_text(value: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_len {
        None
    } else {
        Some(trimmed.to_string())
    }
}
