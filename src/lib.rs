pub mod access;
pub mod catalog;
pub mod check;
pub mod database;
pub mod executor;
pub mod expression;
pub mod planner;
pub mod sql;
