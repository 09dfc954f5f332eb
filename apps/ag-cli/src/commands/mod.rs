pub mod audit;
pub mod check;
pub mod classify;
pub mod demo;
pub mod eval;
