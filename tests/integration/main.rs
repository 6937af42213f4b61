#[path = "../common/mod.rs"]
mod common;

mod api_tests;
mod ledger_tests;
mod storage;
