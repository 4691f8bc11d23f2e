#![doc(test(attr(deny(warnings))))]

//! Tracker Core offers the expense, budget-goal, and profile stores that
//! back the Expense Tracker application's dashboard, expense, budget, and
//! report pages.

pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod store;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Tracker Core tracing initialized.");
    });
}
